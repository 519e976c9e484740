use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read TLE catalog '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TLE source is unavailable. {0}")]
    Unavailable(String),
}

/// Where fresh element sets come from.
///
/// Implementations return catalog text in the `FORMAT=TLE` layout (name line,
/// line 1, line 2 per record); splitting and parsing is done by the caller.
pub trait TleSource {
    fn fetch(&mut self) -> Result<String, SourceError>;
}

/// Reads the whole catalog from a file on every fetch
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSource {
            path: path.as_ref().to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TleSource for FileSource {
    fn fetch(&mut self) -> Result<String, SourceError> {
        debug!(path = %self.path.display(), "Reading TLE catalog");
        fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl<T: TleSource + ?Sized> TleSource for Box<T> {
    fn fetch(&mut self) -> Result<String, SourceError> {
        (**self).fetch()
    }
}
