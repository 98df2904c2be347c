use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootfigError {
    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unresolved template keys: {}", .0.join(", "))]
    UnresolvedTemplate(Vec<String>),

    #[error("Rendered configuration does not match the bootstrap schema: {0}")]
    SchemaViolation(String),
}

impl BootfigError {
    pub(crate) fn invalid_option(option: &str, reason: impl Into<String>) -> Self {
        BootfigError::InvalidOption {
            option: option.to_string(),
            reason: reason.into(),
        }
    }
}
