//! # X-ray calibration image series quality assessment
//!
//! Two analyses are provided:
//!  - [exposure]: finds the best exposed image of each series of images
//!    acquired in a capture session, and deletes the series or the images of a
//!    series that are too dark to be useful,
//!  - [mtf]: estimates the modulation transfer function of the imaging system
//!    from the image of a knife-edge test target.
//!
//! Results are sent to [report] sinks.

use std::path::Path;

pub mod error;
pub mod exposure;
pub mod frame;
pub mod mtf;
pub mod report;
pub mod viewer;

pub use error::{Error, Result};
pub use frame::{Frame, FrameLoader, ImageFileLoader};

/// Loads an image and runs the MTF analysis on it
pub fn analyze_image<L, S>(
    path: &Path,
    loader: &L,
    config: &mtf::MtfConfig,
    selector: &mut S,
) -> Result<mtf::MtfAnalysis>
where
    L: FrameLoader + ?Sized,
    S: mtf::Selector + ?Sized,
{
    let frame = loader.load(path)?;
    log::info!(
        "Loaded {:?}: {}x{} pixels, {} channel(s)",
        path,
        frame.height(),
        frame.width(),
        frame.channels()
    );
    Ok(mtf::analyze(&frame, config, selector)?)
}
