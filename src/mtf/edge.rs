use super::{transfer::line_spread, EdgeProfile, MtfError};

/// Index of the steepest intensity change in the profile
///
/// It is the index of the largest absolute first difference, the first one if
/// several are equal: for a step between samples `i` and `i+1` the edge is at `i`.
pub fn locate_edge(profile: &EdgeProfile) -> Result<usize, MtfError> {
    if profile.len() < 2 {
        return Err(MtfError::DegenerateProfile(profile.len()));
    }
    let lsf = line_spread(profile);
    let (index, _) = lsf
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(k, max), (i, &value)| {
            if value > max {
                (i, value)
            } else {
                (k, max)
            }
        });
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtf::Orientation;

    fn profile(values: &[f64]) -> EdgeProfile {
        EdgeProfile::new(Orientation::Vertical, 0, values.to_vec())
    }

    #[test]
    fn rising_edge() {
        assert_eq!(locate_edge(&profile(&[0., 0., 0., 10., 10., 10.])).unwrap(), 2);
    }

    #[test]
    fn falling_edge() {
        assert_eq!(locate_edge(&profile(&[200., 200., 190., 20., 15.])).unwrap(), 2);
    }

    #[test]
    fn first_of_equal_steps() {
        assert_eq!(locate_edge(&profile(&[0., 5., 10., 15.])).unwrap(), 0);
    }

    #[test]
    fn too_short() {
        for values in [vec![], vec![1.]] {
            assert!(matches!(
                locate_edge(&profile(&values)),
                Err(MtfError::DegenerateProfile(n)) if n == values.len()
            ));
        }
    }
}
