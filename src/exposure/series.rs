use std::{
    fs,
    path::{Path, PathBuf},
};

use super::ExposureError;

type Result<T> = std::result::Result<T, ExposureError>;

/// Images of one capture session, in acquisition order
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureSeries {
    origin: PathBuf,
    /// Path of `origin` relative to the walked root
    name: PathBuf,
    files: Vec<PathBuf>,
}
impl ExposureSeries {
    pub fn new<P: Into<PathBuf>>(origin: P, files: Vec<PathBuf>) -> Self {
        let origin = origin.into();
        Self {
            name: base_name(&origin),
            origin,
            files,
        }
    }
    /// Sets the series name, e.g. `run-1/stack` for nested series
    pub fn named<P: Into<PathBuf>>(self, name: P) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }
    /// Lists the files with the given extension in `origin`, sorted by name
    pub fn from_dir<P: AsRef<Path>>(origin: P, extension: &str) -> Result<Self> {
        let origin = origin.as_ref();
        let dir = origin
            .to_str()
            .ok_or_else(|| ExposureError::NonUtf8Path(origin.to_path_buf()))?;
        let pattern = Path::new(&glob::Pattern::escape(dir))
            .join(format!("*.{extension}"))
            .to_string_lossy()
            .into_owned();
        let mut files = glob::glob(&pattern)?
            .collect::<std::result::Result<Vec<PathBuf>, glob::GlobError>>()?;
        files.retain(|file| file.is_file());
        files.sort();
        Ok(Self::new(origin, files))
    }
    /// Collects the series of every directory below `root`, `root` excluded
    ///
    /// Directories are visited depth first in name order.
    pub fn walk<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<Self>> {
        let root = root.as_ref();
        let mut dirs = vec![];
        sub_directories(root, &mut dirs)?;
        log::info!("Found {} directories in {:?}", dirs.len(), root);
        dirs.into_iter()
            .map(|dir| -> Result<Self> {
                let name = dir.strip_prefix(root).map(Path::to_path_buf);
                let series = Self::from_dir(&dir, extension)?;
                Ok(match name {
                    Ok(name) => series.named(name),
                    Err(_) => series,
                })
            })
            .collect()
    }
    /// Series directory
    pub fn origin(&self) -> &Path {
        &self.origin
    }
    /// Series name, the directory path relative to the walked root
    pub fn relative_path(&self) -> &Path {
        &self.name
    }
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
    pub fn len(&self) -> usize {
        self.files.len()
    }
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub(super) fn base_name(origin: &Path) -> PathBuf {
    origin
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| origin.to_path_buf())
}

// symbolic links are not followed
fn sub_directories(dir: &Path, dirs: &mut Vec<PathBuf>) -> Result<()> {
    let read_dir = |path: &Path| {
        fs::read_dir(path).map_err(|source| ExposureError::ReadDir {
            path: path.to_path_buf(),
            source,
        })
    };
    let mut children = vec![];
    let entry_error = |source| ExposureError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    for entry in read_dir(dir)? {
        let entry = entry.map_err(entry_error)?;
        if entry.file_type().map_err(entry_error)?.is_dir() {
            children.push(entry.path());
        }
    }
    children.sort();
    for child in children {
        dirs.push(child.clone());
        sub_directories(&child, dirs)?;
    }
    Ok(())
}
