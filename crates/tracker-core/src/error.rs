use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classification surfaced to the notification layer for a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Server,
    Network,
}

impl TrackerError {
    /// Classify an HTTP failure status.
    ///
    /// 404 is `NotFound`, any other 4xx (conflicts included) is `Validation`,
    /// everything else is treated as a server fault.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            400..=499 => Self::Validation(message),
            _ => Self::Server(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            // A response we cannot read is reported like any other server fault.
            Self::Server(_) | Self::Serialization(_) | Self::Io(_) | Self::Config(_) => {
                ErrorKind::Server
            }
        }
    }
}
