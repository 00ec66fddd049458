use std::path::PathBuf;

/// Startup-time configuration failures. All of them are fatal.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("webhook {0:?} is declared more than once")]
    DuplicateWebhook(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("environment variable {var} has an invalid value: {value:?}")]
    Env { var: &'static str, value: String },
}

/// Failures reported by the chat delivery collaborator.
#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("telegram API returned {status}: {description}")]
    Api { status: u16, description: String },

    #[error("telegram reply could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}
