use std::path::{Path, PathBuf};

use image::DynamicImage;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to decode {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame has no samples")]
    Empty,
    #[error("{len} samples do not fit a {height}x{width}x{channels} frame")]
    Shape {
        len: usize,
        height: usize,
        width: usize,
        channels: usize,
    },
    #[error("{0} channel(s) cannot be converted to grayscale, expected 1, 3 or 4")]
    Channels(usize),
}
type Result<T> = std::result::Result<T, FrameError>;

/// Decoded image samples
///
/// Samples are stored row-major with the channels last, i.e. the sample of
/// channel `k` at (`row`,`column`) is at `(row * width + column) * channels + k`.
/// The sample values are the raw pixel values of the file (0-255 for 8 bits images).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    height: usize,
    width: usize,
    channels: usize,
    samples: Vec<f64>,
}
impl Frame {
    /// Creates a new frame from channel-last samples
    pub fn new(height: usize, width: usize, channels: usize, samples: Vec<f64>) -> Result<Self> {
        if samples.len() != height * width * channels {
            return Err(FrameError::Shape {
                len: samples.len(),
                height,
                width,
                channels,
            });
        }
        Ok(Self {
            height,
            width,
            channels,
            samples,
        })
    }
    /// Creates a single channel frame
    pub fn gray(height: usize, width: usize, samples: Vec<f64>) -> Result<Self> {
        Self::new(height, width, 1, samples)
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn channels(&self) -> usize {
        self.channels
    }
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Returns the samples of the pixel at (`row`,`column`)
    pub fn pixel(&self, row: usize, column: usize) -> &[f64] {
        let i = (row * self.width + column) * self.channels;
        &self.samples[i..i + self.channels]
    }
}

fn widen<T: Copy + Into<f64>>(raw: Vec<T>) -> Vec<f64> {
    raw.into_iter().map(Into::into).collect()
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let (channels, samples) = match image {
            DynamicImage::ImageLuma8(buffer) => (1, widen(buffer.into_raw())),
            DynamicImage::ImageLumaA8(buffer) => (2, widen(buffer.into_raw())),
            DynamicImage::ImageRgb8(buffer) => (3, widen(buffer.into_raw())),
            DynamicImage::ImageRgba8(buffer) => (4, widen(buffer.into_raw())),
            DynamicImage::ImageLuma16(buffer) => (1, widen(buffer.into_raw())),
            DynamicImage::ImageLumaA16(buffer) => (2, widen(buffer.into_raw())),
            DynamicImage::ImageRgb16(buffer) => (3, widen(buffer.into_raw())),
            DynamicImage::ImageRgba16(buffer) => (4, widen(buffer.into_raw())),
            DynamicImage::ImageRgb32F(buffer) => (3, widen(buffer.into_raw())),
            DynamicImage::ImageRgba32F(buffer) => (4, widen(buffer.into_raw())),
            other => (4, widen(other.into_rgba16().into_raw())),
        };
        Self {
            height,
            width,
            channels,
            samples,
        }
    }
}

/// Image decoding interface
pub trait FrameLoader {
    fn load(&self, path: &Path) -> Result<Frame>;
}
impl<F> FrameLoader for F
where
    F: Fn(&Path) -> Result<Frame>,
{
    fn load(&self, path: &Path) -> Result<Frame> {
        self(path)
    }
}

/// Decodes image files with the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileLoader;
impl FrameLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<Frame> {
        let image = image::open(path).map_err(|source| FrameError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let frame = Frame::from(image);
        if frame.is_empty() {
            return Err(FrameError::Empty);
        }
        Ok(frame)
    }
}
