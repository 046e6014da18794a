//! Error types for Pipedrift core.

use std::{error::Error, fmt};

/// Error type for Pipedrift core operations.
#[derive(Debug)]
pub enum PipedriftError {
    /// A repository reference that could not be split into owner and name.
    InvalidRepo(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for PipedriftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRepo(reference) => {
                write!(f, "invalid repository format: {reference}")
            }
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for PipedriftError {}

/// Convenience result type for Pipedrift core.
pub type Result<T> = std::result::Result<T, PipedriftError>;

#[cfg(test)]
mod tests {
    use super::PipedriftError;

    #[test]
    fn invalid_repo_formats_message() {
        let error = PipedriftError::InvalidRepo("owner-only".to_string());
        assert_eq!(format!("{error}"), "invalid repository format: owner-only");
    }

    #[test]
    fn other_error_formats_message() {
        let error = PipedriftError::Other("fetch failed".to_string());
        assert_eq!(format!("{error}"), "fetch failed");
    }
}
