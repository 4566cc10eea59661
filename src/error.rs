use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any non-2xx response. The body is kept verbatim for diagnostics.
    #[error("uri: {uri}, status: {status}, body: {body}")]
    Remote {
        uri: String,
        status: u16,
        body: String,
    },

    #[error("the set item '{0}' was not in key.keypart=value format")]
    MalformedOverride(String),

    #[error("plan '{plan_id}' already exists for offer '{offer_id}'")]
    PlanExists { plan_id: String, offer_id: String },

    #[error("no plan '{plan_id}' was found in offer '{offer_id}'")]
    PlanNotFound { plan_id: String, offer_id: String },

    #[error("no version '{version}' was found in plan '{plan_id}'")]
    VersionNotFound { plan_id: String, version: String },

    #[error("plan '{plan_id}' is a {found} plan and cannot take a {requested} image")]
    ImageVariantMismatch {
        plan_id: String,
        requested: &'static str,
        found: &'static str,
    },

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, CliError>;
