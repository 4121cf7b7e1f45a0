use nalgebra::DMatrix;

use crate::frame::{Frame, FrameError};

/// Red, green and blue weights
///
/// The blue weight is not the ITU-R 601 one (0.114), the weights are kept
/// as they are for the MTF curves to be comparable with earlier results.
pub const RGB_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.144];

/// Converts a frame to a single channel image
///
/// RGB and RGBA frames are weighted with [RGB_WEIGHTS], the alpha channel is
/// ignored; single channel frames are returned as is.
pub fn to_grayscale(frame: &Frame) -> Result<DMatrix<f64>, FrameError> {
    let [r, g, b] = RGB_WEIGHTS;
    match frame.channels() {
        1 => Ok(DMatrix::from_fn(frame.height(), frame.width(), |i, j| {
            frame.pixel(i, j)[0]
        })),
        3 | 4 => Ok(DMatrix::from_fn(frame.height(), frame.width(), |i, j| {
            let p = frame.pixel(i, j);
            r * p[0] + g * p[1] + b * p[2]
        })),
        n => Err(FrameError::Channels(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_weights() {
        let frame = Frame::new(1, 2, 3, vec![100., 0., 0., 10., 20., 30.]).unwrap();
        let gray = to_grayscale(&frame).unwrap();
        assert_eq!(gray.shape(), (1, 2));
        assert!((gray[(0, 0)] - 29.9).abs() < 1e-12);
        assert!((gray[(0, 1)] - (2.99 + 11.74 + 4.32)).abs() < 1e-12);
    }

    #[test]
    fn alpha_is_ignored() {
        let rgb = Frame::new(1, 1, 3, vec![1., 2., 3.]).unwrap();
        let rgba = Frame::new(1, 1, 4, vec![1., 2., 3., 255.]).unwrap();
        assert_eq!(to_grayscale(&rgb).unwrap(), to_grayscale(&rgba).unwrap());
    }

    #[test]
    fn gray_passes_through() {
        let frame = Frame::gray(2, 3, vec![0., 1., 2., 3., 4., 5.]).unwrap();
        let gray = to_grayscale(&frame).unwrap();
        assert_eq!(gray[(1, 0)], 3.);
        assert_eq!(gray[(0, 2)], 2.);
    }

    #[test]
    fn luma_alpha_is_rejected() {
        let frame = Frame::new(1, 1, 2, vec![1., 2.]).unwrap();
        assert!(matches!(to_grayscale(&frame), Err(FrameError::Channels(2))));
    }
}
