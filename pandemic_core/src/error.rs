//! Error types for the pandemic_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pandemic_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Card registry source could not be read
    #[error("Could not load cards from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure outside the library, such as the terminal line editor
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let other = Error::Other("Line editor failed: terminal closed".into());
        assert_eq!(other.to_string(), "Line editor failed: terminal closed");

        let load = Error::Load {
            path: PathBuf::from("cities.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(load.to_string(), "Could not load cards from cities.txt: missing");
    }
}
