use thiserror::Error;

/// Unified error type for manifest-publish operations
#[derive(Error, Debug)]
pub enum ManifestPublishError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in manifest-publish
pub type Result<T> = std::result::Result<T, ManifestPublishError>;

impl ManifestPublishError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ManifestPublishError::Config(msg.into())
    }

    /// Create a lookup error with context
    pub fn lookup(msg: impl Into<String>) -> Self {
        ManifestPublishError::Lookup(msg.into())
    }

    /// Create a remote operation error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ManifestPublishError::Remote(msg.into())
    }

    /// Create a template error with context
    pub fn template(msg: impl Into<String>) -> Self {
        ManifestPublishError::Template(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestPublishError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ManifestPublishError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(ManifestPublishError::lookup("test")
            .to_string()
            .contains("Lookup"));
        assert!(ManifestPublishError::template("test")
            .to_string()
            .contains("Template"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ManifestPublishError::config("x"), "Configuration error"),
            (ManifestPublishError::lookup("x"), "Lookup failed"),
            (ManifestPublishError::remote("x"), "Remote operation failed"),
            (ManifestPublishError::template("x"), "Template error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_error_special_characters_in_messages() {
        let special_chars = vec![
            "message with\nnewline",
            "message with 'quotes'",
            "message with \\ backslash",
        ];

        for msg in special_chars {
            let err = ManifestPublishError::remote(msg);
            assert!(err.to_string().contains("Remote"));
        }
    }
}
