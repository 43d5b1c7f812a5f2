use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("image URL failed to parse: {raw}")]
    InvalidUrl { raw: String },
}

/// Where a question image lives: a bundled file or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    FilePath(PathBuf),
    Url(Url),
}

impl ImageRef {
    /// # Errors
    ///
    /// Returns `ImageRefError::Empty` for an empty path.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ImageRefError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ImageRefError::Empty);
        }
        Ok(ImageRef::FilePath(path))
    }

    /// # Errors
    ///
    /// Returns `ImageRefError::Empty` for a blank string and
    /// `ImageRefError::InvalidUrl` when URL parsing fails.
    pub fn from_url(url: impl AsRef<str>) -> Result<Self, ImageRefError> {
        let raw = url.as_ref().trim();
        if raw.is_empty() {
            return Err(ImageRefError::Empty);
        }
        let parsed = Url::parse(raw).map_err(|_| ImageRefError::InvalidUrl {
            raw: raw.to_string(),
        })?;
        Ok(ImageRef::Url(parsed))
    }

    /// Interprets a raw reference: anything with a scheme separator is a URL,
    /// the rest is a file path.
    ///
    /// # Errors
    ///
    /// Returns `ImageRefError` for blank or unparseable references.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ImageRefError> {
        let raw = raw.as_ref().trim();
        if raw.contains("://") {
            Self::from_url(raw)
        } else {
            Self::from_file(raw)
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageRef::FilePath(path) => Some(path.as_path()),
            ImageRef::Url(_) => None,
        }
    }

    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            ImageRef::Url(url) => Some(url),
            ImageRef::FilePath(_) => None,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::FilePath(path) => write!(f, "{}", path.display()),
            ImageRef::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_routes_urls_and_paths() {
        let url = ImageRef::parse("https://example.com/fig1.png").unwrap();
        assert!(url.as_url().is_some());

        let file = ImageRef::parse("images/fig1.png").unwrap();
        assert_eq!(file.as_path(), Some(Path::new("images/fig1.png")));
    }

    #[test]
    fn blank_reference_is_rejected() {
        assert_eq!(ImageRef::parse("   "), Err(ImageRefError::Empty));
    }

    #[test]
    fn bad_url_is_rejected() {
        let err = ImageRef::parse("ht!tp://nope").unwrap_err();
        assert!(matches!(err, ImageRefError::InvalidUrl { .. }));
    }
}
