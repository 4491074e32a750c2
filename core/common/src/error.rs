//! Common error types for Cirrus.

use thiserror::Error;

/// Top-level error type for Cirrus operations.
///
/// No variant is fatal to the process: every failure is returned to the
/// caller, who can inspect it and recover (register a provider, fix the
/// configuration, retry with a different key).
#[derive(Debug, Error)]
pub enum Error {
    /// No client factory is bound for the requested provider name.
    ///
    /// Recoverable: register a provider (or install an override) and retry.
    /// Carries the requested name and the currently registered names to aid
    /// diagnosis.
    #[error("no storage client registered for provider '{name}' (known providers: {})", format_known(.known))]
    Unconfigured {
        /// The provider name that was requested.
        name: String,
        /// Names with a factory currently registered, sorted.
        known: Vec<String>,
    },

    /// Requested object or file is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A backend factory could not construct a client from its configuration.
    ///
    /// Recoverable only by fixing the configuration; the message identifies
    /// the bad input.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_known(known: &[String]) -> String {
    if known.is_empty() {
        "(none)".to_string()
    } else {
        known.join(", ")
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_lists_known_providers() {
        let err = Error::Unconfigured {
            name: "default".to_string(),
            known: vec!["gcs".to_string(), "s3".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'default'"));
        assert!(msg.contains("gcs, s3"));
    }

    #[test]
    fn test_unconfigured_with_empty_registry_says_none() {
        let err = Error::Unconfigured {
            name: "default".to_string(),
            known: vec![],
        };
        assert!(err.to_string().contains("(none)"));
    }
}
