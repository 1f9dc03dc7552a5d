use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TvError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired code")]
    InvalidCode,

    #[error("duplicate resource: {0}")]
    Duplicate(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("email error: {0}")]
    Email(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type TvResult<T> = Result<T, TvError>;
