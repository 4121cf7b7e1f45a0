use std::ops::Range;

use rustfft::{num_complex::Complex, FftPlanner};

use super::MtfError;

/// Samples `[edge - range, edge + range)` of the profile
///
/// The edge must satisfy `range <= edge <= profile.len() - range - 1`.
pub fn edge_window(profile: &[f64], edge: usize, range: usize) -> Result<Range<usize>, MtfError> {
    let out_of_range = || MtfError::WindowOutOfRange {
        edge,
        range,
        len: profile.len(),
    };
    if range == 0 || edge < range {
        return Err(out_of_range());
    }
    match profile.len().checked_sub(range + 1) {
        Some(last) if edge <= last => Ok(edge - range..edge + range),
        _ => Err(out_of_range()),
    }
}

/// Line spread function: absolute first difference of the edge spread function
pub fn line_spread(edge_spread: &[f64]) -> Vec<f64> {
    edge_spread
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .collect()
}

/// Modulation transfer function: magnitude of the discrete Fourier transform of the line spread function
///
/// The transform is not normalized, the zero frequency bin is the sum of the LSF.
pub fn modulation_transfer(lsf: &[f64]) -> Vec<f64> {
    if lsf.is_empty() {
        return vec![];
    }
    let fft = FftPlanner::<f64>::new().plan_fft_forward(lsf.len());
    let mut buffer: Vec<Complex<f64>> = lsf.iter().map(|&x| Complex::new(x, 0.)).collect();
    fft.process(&mut buffer);
    buffer.into_iter().map(|c| c.norm()).collect()
}

/// LSF and MTF of an edge profile window
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub edge: usize,
    pub window: Range<usize>,
    pub lsf: Vec<f64>,
    pub mtf: Vec<f64>,
}
impl TransferFunction {
    /// Computes the LSF and the MTF of the window of half width `range` centered on `edge`
    pub fn new(profile: &[f64], edge: usize, range: usize) -> Result<Self, MtfError> {
        let window = edge_window(profile, edge, range)?;
        let lsf = line_spread(&profile[window.clone()]);
        let mtf = modulation_transfer(&lsf);
        Ok(Self {
            edge,
            window,
            lsf,
            mtf,
        })
    }
    /// MTF from zero up to the Nyquist frequency
    pub fn usable_mtf(&self) -> &[f64] {
        let n = self.mtf.len();
        &self.mtf[..(n / 2 + 1).min(n)]
    }
    /// MTF scaled to 1 at zero frequency, `None` if the LSF is flat
    pub fn normalized_mtf(&self) -> Option<Vec<f64>> {
        match self.mtf.first() {
            Some(&dc) if dc > 0. => Some(self.mtf.iter().map(|x| x / dc).collect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| if i < n / 2 { 10. } else { 200. }).collect()
    }

    #[test]
    fn window_bounds() {
        let profile = ramp(10);
        assert_eq!(edge_window(&profile, 3, 3).unwrap(), 0..6);
        assert_eq!(edge_window(&profile, 6, 3).unwrap(), 3..9);
        for (edge, range) in [(2, 3), (7, 3), (9, 1), (5, 0), (20, 3), (5, 11)] {
            assert!(
                matches!(
                    edge_window(&profile, edge, range),
                    Err(MtfError::WindowOutOfRange { .. })
                ),
                "edge {edge}, range {range}"
            );
        }
    }

    #[test]
    fn lsf_of_step() {
        assert_eq!(line_spread(&[0., 0., 0., 10., 10., 10.]), vec![0., 0., 10., 0., 0.]);
        assert_eq!(line_spread(&[5., 2.]), vec![3.]);
        assert!(line_spread(&[1.]).is_empty());
    }

    #[test]
    fn mtf_of_impulse_is_flat() {
        let mtf = modulation_transfer(&[0., 0., 10., 0., 0.]);
        assert_eq!(mtf.len(), 5);
        assert!(mtf.iter().all(|x| (x - 10.).abs() < 1e-9));
    }

    #[test]
    fn mtf_is_symmetric() {
        let lsf = [1., 3., 7., 2., 0.5, 0.25];
        let mtf = modulation_transfer(&lsf);
        assert!((mtf[0] - lsf.iter().sum::<f64>()).abs() < 1e-9);
        for k in 1..lsf.len() {
            assert!((mtf[k] - mtf[lsf.len() - k]).abs() < 1e-9);
        }
    }

    #[test]
    fn transfer_function_lengths() {
        let profile = ramp(40);
        for range in 1..=10 {
            let tf = TransferFunction::new(&profile, 19, range).unwrap();
            assert_eq!(tf.window.len(), 2 * range);
            assert_eq!(tf.lsf.len(), 2 * range - 1);
            assert_eq!(tf.mtf.len(), tf.lsf.len());
        }
    }

    #[test]
    fn normalized_and_usable_mtf() {
        let tf = TransferFunction::new(&ramp(20), 9, 4).unwrap();
        assert_eq!(tf.usable_mtf().len(), 4);
        let normalized = tf.normalized_mtf().unwrap();
        assert!((normalized[0] - 1.).abs() < 1e-12);
        let flat = TransferFunction::new(&[1.; 10], 4, 2).unwrap();
        assert!(flat.normalized_mtf().is_none());
    }

    #[test]
    fn empty_transfer_function() {
        let tf = TransferFunction {
            edge: 0,
            window: 0..0,
            lsf: vec![],
            mtf: vec![],
        };
        assert!(tf.usable_mtf().is_empty());
        assert!(tf.normalized_mtf().is_none());
    }
}
