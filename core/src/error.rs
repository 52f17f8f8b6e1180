use crate::types::Tokens;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: Tokens, available: Tokens },

    #[error("League '{id}' not found")]
    UnknownLeague { id: String },

    #[error("Token overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
