use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};

use nalgebra::DMatrix;

use super::{EdgeProfile, MtfError, PickPoint};

type Result<T> = std::result::Result<T, MtfError>;

/// Source of manually selected pick points and edge positions
pub trait Selector {
    fn pick_point(&mut self, image: &DMatrix<f64>) -> Result<PickPoint>;
    fn pick_edge(&mut self, profile: &EdgeProfile) -> Result<usize>;
}

/// Replays pre-recorded selections
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    points: VecDeque<PickPoint>,
    edges: VecDeque<usize>,
}
impl Scripted {
    pub fn point(mut self, point: PickPoint) -> Self {
        self.points.push_back(point);
        self
    }
    pub fn edge(mut self, edge: usize) -> Self {
        self.edges.push_back(edge);
        self
    }
    /// Defers to `fallback` once the recorded selections are exhausted
    pub fn or_else<S: Selector>(self, fallback: S) -> Fallback<S> {
        Fallback {
            scripted: self,
            fallback,
        }
    }
}
impl Selector for Scripted {
    fn pick_point(&mut self, _image: &DMatrix<f64>) -> Result<PickPoint> {
        self.points
            .pop_front()
            .ok_or_else(|| MtfError::Selection("no pick point left".into()))
    }
    fn pick_edge(&mut self, _profile: &EdgeProfile) -> Result<usize> {
        self.edges
            .pop_front()
            .ok_or_else(|| MtfError::Selection("no edge position left".into()))
    }
}

/// Recorded selections first, then another selector
#[derive(Debug)]
pub struct Fallback<S> {
    scripted: Scripted,
    fallback: S,
}
impl<S: Selector> Selector for Fallback<S> {
    fn pick_point(&mut self, image: &DMatrix<f64>) -> Result<PickPoint> {
        match self.scripted.points.pop_front() {
            Some(point) => Ok(point),
            None => self.fallback.pick_point(image),
        }
    }
    fn pick_edge(&mut self, profile: &EdgeProfile) -> Result<usize> {
        match self.scripted.edges.pop_front() {
            Some(edge) => Ok(edge),
            None => self.fallback.pick_edge(profile),
        }
    }
}

/// Asks for the selections on a terminal
pub struct Prompt<R, W> {
    input: R,
    output: W,
}
impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
    fn ask(&mut self, question: &str) -> Result<Vec<usize>> {
        write!(self.output, "{question}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MtfError::Selection("no answer".into()));
        }
        line.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|e| MtfError::Selection(format!("{s:?}: {e}")))
            })
            .collect()
    }
}
impl<R: BufRead, W: Write> Selector for Prompt<R, W> {
    fn pick_point(&mut self, image: &DMatrix<f64>) -> Result<PickPoint> {
        let (height, width) = image.shape();
        let question = format!(
            "Pick point for the horizontal and vertical profiles as `row column` ({height}x{width} image)"
        );
        match self.ask(&question)?.as_slice() {
            &[row, column] => Ok(PickPoint::new(row, column)),
            answer => Err(MtfError::Selection(format!(
                "expected a row and a column, found {answer:?}"
            ))),
        }
    }
    fn pick_edge(&mut self, profile: &EdgeProfile) -> Result<usize> {
        let question = format!(
            "Approximate middle of the knife edge in the {} profile [0-{}]",
            profile.orientation(),
            profile.len().saturating_sub(1)
        );
        match self.ask(&question)?.as_slice() {
            &[edge] => Ok(edge),
            answer => Err(MtfError::Selection(format!(
                "expected a single index, found {answer:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtf::Orientation;
    use std::io;

    fn profile() -> EdgeProfile {
        EdgeProfile::new(Orientation::Horizontal, 0, vec![0.; 8])
    }

    #[test]
    fn scripted_selections() {
        let mut selector = Scripted::default().point(PickPoint::new(3, 4)).edge(5);
        let image = DMatrix::zeros(8, 8);
        assert_eq!(selector.pick_point(&image).unwrap(), PickPoint::new(3, 4));
        assert_eq!(selector.pick_edge(&profile()).unwrap(), 5);
        assert!(matches!(
            selector.pick_edge(&profile()),
            Err(MtfError::Selection(_))
        ));
    }

    #[test]
    fn fallback_after_script() {
        let prompt = Prompt::new("1 2\n".as_bytes(), io::sink());
        let mut selector = Scripted::default().edge(4).or_else(prompt);
        let image = DMatrix::zeros(8, 8);
        assert_eq!(selector.pick_edge(&profile()).unwrap(), 4);
        assert_eq!(selector.pick_point(&image).unwrap(), PickPoint::new(1, 2));
        assert!(selector.pick_edge(&profile()).is_err());
    }

    #[test]
    fn prompt_answers() {
        let mut output = vec![];
        let mut prompt = Prompt::new("12, 40\n7\nfoo\n".as_bytes(), &mut output);
        let image = DMatrix::zeros(64, 64);
        assert_eq!(prompt.pick_point(&image).unwrap(), PickPoint::new(12, 40));
        assert_eq!(prompt.pick_edge(&profile()).unwrap(), 7);
        assert!(prompt.pick_edge(&profile()).is_err());
        assert!(prompt.pick_edge(&profile()).is_err());
        drop(prompt);
        assert!(String::from_utf8(output).unwrap().contains("knife edge"));
    }
}
