//! Track references
//!
//! A [`TrackSource`] identifies something a deck can play: a local file or a
//! remote http(s) resource. It is parsed once at the edge (URL text box, file
//! drop, command line) so everything downstream works with a validated value.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Errors produced while turning user input into a [`TrackSource`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Empty track reference")]
    Empty,

    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    /// Plain paths must be absolute; relative ones depend on the cwd of whoever
    /// produced them
    #[error("Track path must be absolute: {0}")]
    RelativePath(String),
}

/// A validated reference to a playable audio resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackSource {
    /// Local file (also produced by `file://` URLs)
    Path(PathBuf),
    /// Remote http(s) resource
    Url(Url),
}

impl TrackSource {
    /// Parse a URL string or absolute file path
    ///
    /// `file://` URLs are normalized to [`TrackSource::Path`], so the same file
    /// reached via a drop and via a typed URL shares one cache entry.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, SourceError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SourceError::Empty);
        }

        match Url::parse(trimmed) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(TrackSource::Path)
                .map_err(|()| SourceError::InvalidFileUrl(trimmed.to_string())),
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Ok(TrackSource::Url(url))
            }
            // Windows drive letters ("C:\...") parse as a one-letter scheme
            Ok(url) if url.scheme().len() > 1 => Err(SourceError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                url: trimmed.to_string(),
            }),
            _ => Self::from_path(trimmed),
        }
    }

    /// Wrap a filesystem path (must be absolute)
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(SourceError::RelativePath(path.display().to_string()));
        }
        Ok(TrackSource::Path(path.to_path_buf()))
    }

    /// Local path, if this is a file source
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            TrackSource::Path(path) => Some(path),
            TrackSource::Url(_) => None,
        }
    }

    /// File extension, used as a format hint for the decoder
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            TrackSource::Path(path) => path.file_name()?.to_string_lossy().into_owned(),
            TrackSource::Url(url) => url.path_segments()?.last()?.to_string(),
        };
        Path::new(&name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Short human-readable name (file name without directories)
    pub fn display_name(&self) -> String {
        match self {
            TrackSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            TrackSource::Url(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSource::Path(path) => write!(f, "{}", path.display()),
            TrackSource::Url(url) => write!(f, "{}", url),
        }
    }
}
