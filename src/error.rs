use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors from the fallible surfaces around the engine (config, I/O,
/// rendering, user-supplied patterns). The scan and challenge entry points
/// themselves never fail.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Rule error ({rule_id}): {message}")]
    Rule { rule_id: String, message: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Could not determine provider/resource type for {0}; pass --provider and --resource-type")]
    UndetectedContext(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl GuardError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
