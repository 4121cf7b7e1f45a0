use crate::{
    exposure::{ExposureError, RetentionError},
    frame::FrameError,
    mtf::MtfError,
    report::ReportError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `frame` module")]
    Frame(#[from] FrameError),
    #[error("Error in the `exposure` module")]
    Exposure(#[from] ExposureError),
    #[error("Error in the `exposure::retention` module")]
    Retention(#[from] RetentionError),
    #[error("Error in the `mtf` module")]
    Mtf(#[from] MtfError),
    #[error("Error in the `report` module")]
    Report(#[from] ReportError),
}
pub type Result<T> = std::result::Result<T, Error>;
