use thiserror::Error;

/// Top-level error type for armlink.
#[derive(Debug, Error)]
pub enum ArmlinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// Station configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid tick_ms: {0} (must be > 0)")]
    InvalidTickMs(u64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised at the document boundary (arm configuration, sequence,
/// and mapping JSON documents).
///
/// A failed import leaves core state unchanged — documents are parsed in
/// full before anything is applied.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {document} document: {message}")]
    Invalid { document: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armlink_error_from_config_error() {
        let err = ConfigError::InvalidTickMs(0);
        let top: ArmlinkError = err.into();
        assert!(matches!(top, ArmlinkError::Config(_)));
        assert!(top.to_string().contains("tick_ms"));
    }

    #[test]
    fn armlink_error_from_document_error() {
        let err = DocumentError::Invalid {
            document: "sequence".into(),
            message: "not an object".into(),
        };
        let top: ArmlinkError = err.into();
        assert!(matches!(top, ArmlinkError::Document(_)));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn document_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let doc_err: DocumentError = json_err.into();
        assert!(matches!(doc_err, DocumentError::Json(_)));
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidTickMs(0).to_string(),
            "Invalid tick_ms: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "tick_ms".into(),
                message: "too large".into()
            }
            .to_string(),
            "Invalid value for tick_ms: too large"
        );
    }

    #[test]
    fn document_error_display_messages() {
        assert_eq!(
            DocumentError::Invalid {
                document: "mapping".into(),
                message: "expected object".into()
            }
            .to_string(),
            "Invalid mapping document: expected object"
        );
    }
}
