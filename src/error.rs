//! Error types for Funeral Desk.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Access gate errors.
///
/// Guards themselves never fail; these only surface when a guard is looked
/// up by name at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Unknown guard: {name}")]
    UnknownGuard { name: String },
}

/// Wizard form and error-tree errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Invalid field path {path:?}: {reason}")]
    InvalidFieldPath { path: String, reason: String },

    #[error("Invalid error tree: {0}")]
    InvalidErrorTree(String),

    #[error("Unknown wizard form: {form}")]
    UnknownForm { form: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wizard_error_converts_into_top_level() {
        let err: Error = WizardError::UnknownForm {
            form: "cremation".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Wizard error: Unknown wizard form: cremation"
        );
    }

    #[test]
    fn invalid_value_message_names_key() {
        let err = ConfigError::InvalidValue {
            key: "FUNERAL_DESK_HTTP_PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert!(err.to_string().contains("FUNERAL_DESK_HTTP_PORT"));
    }
}
