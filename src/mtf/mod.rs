//! Knife-edge modulation transfer function
//!
//! The image is converted to grayscale, a row and a column are extracted
//! through a pick point, the knife edge is located on the profile and the
//! line spread and modulation transfer functions are computed on a window
//! centered on the edge.
//!
//! ```no_run
//! use std::path::Path;
//! use xray_qa::{mtf, FrameLoader, ImageFileLoader};
//!
//! let frame = ImageFileLoader.load(Path::new("knife-edge.jpg"))?;
//! let analysis = mtf::analyze(&frame, &mtf::MtfConfig::default(), &mut mtf::Scripted::default())?;
//! for edge in analysis.edges {
//!     let tf = edge.result?;
//!     println!("{}: edge at {}, MTF: {:?}", edge.orientation, tf.edge, tf.usable_mtf());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io;

use crate::frame::{Frame, FrameError};

mod edge;
mod grayscale;
mod profile;
mod selection;
mod transfer;
pub use edge::locate_edge;
pub use grayscale::{to_grayscale, RGB_WEIGHTS};
pub use profile::{extract_profiles, EdgeProfile, Orientation, PickPoint, Profiles};
pub use selection::{Fallback, Prompt, Scripted, Selector};
pub use transfer::{edge_window, line_spread, modulation_transfer, TransferFunction};

#[derive(Debug, thiserror::Error)]
pub enum MtfError {
    #[error("pick point {pick} is outside the {height}x{width} image")]
    OutOfBounds {
        pick: PickPoint,
        height: usize,
        width: usize,
    },
    #[error("a profile of {0} sample(s) is too short to locate an edge")]
    DegenerateProfile(usize),
    #[error("edge window {edge}±{range} does not fit in a profile of {len} samples")]
    WindowOutOfRange { edge: usize, range: usize, len: usize },
    #[error("selection failed: {0}")]
    Selection(String),
    #[error("selection prompt failed")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
type Result<T> = std::result::Result<T, MtfError>;

/// MTF analysis settings
#[derive(Debug, Clone, PartialEq)]
pub struct MtfConfig {
    /// Half width of the window around the edge
    pub edge_range: usize,
    /// Pick point used unless `pick_manually` is set
    pub pick: PickPoint,
    pub pick_manually: bool,
    pub edge_manually: bool,
    /// Profiles to analyze
    pub orientations: Vec<Orientation>,
}
impl Default for MtfConfig {
    fn default() -> Self {
        Self {
            edge_range: 100,
            pick: PickPoint::default(),
            pick_manually: false,
            edge_manually: false,
            orientations: vec![Orientation::Vertical],
        }
    }
}
impl MtfConfig {
    pub fn edge_range(self, edge_range: usize) -> Self {
        Self { edge_range, ..self }
    }
    pub fn pick(self, pick: PickPoint) -> Self {
        Self { pick, ..self }
    }
    pub fn pick_manually(self) -> Self {
        Self {
            pick_manually: true,
            ..self
        }
    }
    pub fn edge_manually(self) -> Self {
        Self {
            edge_manually: true,
            ..self
        }
    }
    pub fn orientations(self, orientations: Vec<Orientation>) -> Self {
        Self {
            orientations,
            ..self
        }
    }
}

/// Result of the analysis of one profile
#[derive(Debug)]
pub struct EdgeAnalysis {
    pub orientation: Orientation,
    pub result: Result<TransferFunction>,
}

#[derive(Debug)]
pub struct MtfAnalysis {
    pub profiles: Profiles,
    pub edges: Vec<EdgeAnalysis>,
}

/// Profile and transfer function of one image profile, as handed to the report sinks
#[derive(Debug, Clone, Copy)]
pub struct MtfReport<'a> {
    /// Name of the analyzed image
    pub name: &'a str,
    pub profile: &'a EdgeProfile,
    pub transfer: &'a TransferFunction,
}

/// Locates the edge of a profile and computes its transfer function
pub fn edge_transfer<S: Selector + ?Sized>(
    profile: &EdgeProfile,
    config: &MtfConfig,
    selector: &mut S,
) -> Result<TransferFunction> {
    let edge = if config.edge_manually {
        selector.pick_edge(profile)?
    } else {
        locate_edge(profile)?
    };
    log::info!(
        "{} profile: edge at {edge} ({})",
        profile.orientation(),
        if config.edge_manually {
            "selected manually"
        } else {
            "selected automatically"
        }
    );
    TransferFunction::new(profile, edge, config.edge_range)
}

/// Runs the MTF analysis of a knife-edge image
///
/// Failing to analyze a profile does not prevent the analysis of the other one.
pub fn analyze<S: Selector + ?Sized>(
    frame: &Frame,
    config: &MtfConfig,
    selector: &mut S,
) -> Result<MtfAnalysis> {
    let image = to_grayscale(frame)?;
    let (height, width) = image.shape();
    log::info!(
        "The image is {height} by {width} pixels big, that is {:.3} MPx",
        (height * width) as f64 * 1e-6
    );
    let pick = if config.pick_manually {
        selector.pick_point(&image)?
    } else {
        config.pick
    };
    log::info!(
        "selected horizontal line {} and vertical line {}",
        pick.row,
        pick.column
    );
    let profiles = extract_profiles(&image, pick)?;
    for profile in [&profiles.horizontal, &profiles.vertical] {
        if let Some((min, max)) = profile.range() {
            log::info!(
                "The {} profile goes from {min:.2} to {max:.2}",
                profile.orientation()
            );
        }
    }
    let mut edges = Vec::with_capacity(config.orientations.len());
    for &orientation in &config.orientations {
        let result = edge_transfer(profiles.get(orientation), config, selector);
        if let Err(e) = &result {
            log::warn!("{orientation} profile analysis failed: {e}");
        }
        edges.push(EdgeAnalysis {
            orientation,
            result,
        });
    }
    Ok(MtfAnalysis { profiles, edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    // vertical knife edge at column 12, horizontal one at row 5
    fn knife_edge() -> Frame {
        let (height, width) = (16, 24);
        let samples = (0..height)
            .flat_map(|i| {
                (0..width).flat_map(move |j| {
                    let v = if j > 12 { 200. } else { 20. } + if i > 5 { 30. } else { 0. };
                    [v, v, v]
                })
            })
            .collect();
        Frame::new(height, width, 3, samples).unwrap()
    }

    #[test]
    fn automatic_edges() {
        let config = MtfConfig::default()
            .pick(PickPoint::new(8, 4))
            .edge_range(4)
            .orientations(vec![Orientation::Horizontal, Orientation::Vertical]);
        let analysis = analyze(&knife_edge(), &config, &mut Scripted::default()).unwrap();
        let edges: Vec<_> = analysis
            .edges
            .iter()
            .map(|e| e.result.as_ref().unwrap().edge)
            .collect();
        assert_eq!(edges, vec![12, 5]);
        let tf = analysis.edges[0].result.as_ref().unwrap();
        assert_eq!(tf.window, 8..16);
        assert_eq!(tf.lsf.len(), 7);
        assert_eq!(tf.mtf.len(), 7);
    }

    #[test]
    fn manual_selection() {
        let config = MtfConfig::default()
            .pick_manually()
            .edge_manually()
            .edge_range(3)
            .orientations(vec![Orientation::Horizontal]);
        let mut selector = Scripted::default().point(PickPoint::new(2, 3)).edge(10);
        let analysis = analyze(&knife_edge(), &config, &mut selector).unwrap();
        assert_eq!(analysis.profiles.pick, PickPoint::new(2, 3));
        let tf = analysis.edges[0].result.as_ref().unwrap();
        assert_eq!((tf.edge, tf.window.clone()), (10, 7..13));
    }

    #[test]
    fn window_failure_is_per_profile() {
        let config = MtfConfig::default()
            .pick(PickPoint::new(8, 4))
            .edge_range(6)
            .orientations(vec![Orientation::Horizontal, Orientation::Vertical]);
        let analysis = analyze(&knife_edge(), &config, &mut Scripted::default()).unwrap();
        assert!(analysis.edges[0].result.is_ok());
        assert!(matches!(
            analysis.edges[1].result,
            Err(MtfError::WindowOutOfRange {
                edge: 5,
                range: 6,
                len: 16
            })
        ));
    }

    #[test]
    fn default_pick_outside_small_image() {
        let err = analyze(&knife_edge(), &MtfConfig::default(), &mut Scripted::default())
            .unwrap_err();
        assert!(matches!(err, MtfError::OutOfBounds { .. }));
    }
}
