use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagegateError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
