use crate::frame::{Frame, FrameError};

/// Mean of all the samples of a frame, all channels included
pub fn mean_brightness(frame: &Frame) -> Result<f64, FrameError> {
    if frame.is_empty() {
        return Err(FrameError::Empty);
    }
    let samples = frame.samples();
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}
