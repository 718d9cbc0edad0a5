use std::fmt::{Display, Formatter};

/// Error type for loading and decoding sample assets.
#[derive(Debug)]
pub enum AssetLoadError {
    NotFound(String),
    Io(std::io::Error),
    Decode(String),
    UnsupportedFormat(String),
    Empty(String),
}

impl Display for AssetLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "asset not found: {}", path),
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::UnsupportedFormat(err) => write!(f, "unsupported format: {}", err),
            Self::Empty(err) => write!(f, "empty asset: {}", err),
        }
    }
}

impl std::error::Error for AssetLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetLoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<symphonia::core::errors::Error> for AssetLoadError {
    fn from(value: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;
        match value {
            Error::IoError(err) => Self::Io(err),
            Error::Unsupported(what) => Self::UnsupportedFormat(what.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}
