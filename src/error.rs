use thiserror::Error;

/// Failures of rush lifecycle commands (not answer rejections, which are values)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RushError {
    #[error("a rush session is already active in channel {0}")]
    AlreadyActive(String),

    #[error("no rush session in channel {0}")]
    NotFound(String),

    #[error("only the host can start the rush")]
    NotHost,

    #[error("the rush has already started")]
    AlreadyStarted,

    #[error("the rush is no longer accepting input")]
    NotAccepting,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("rating store unavailable: {0}")]
    Unavailable(String),
}
