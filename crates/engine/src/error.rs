//! The module contains the errors the engine can raise.
//!
//! Every domain rule violation maps to exactly one variant:
//!
//! - [`NotFound`] a referenced post/offer/user is absent.
//! - [`Forbidden`] the actor lacks the required relationship.
//! - [`Conflict`] the current state forbids the transition.
//! - [`InvalidArgument`] the input is malformed or self-referential.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`Forbidden`]: EngineError::Forbidden
//! [`Conflict`]: EngineError::Conflict
//! [`InvalidArgument`]: EngineError::InvalidArgument
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
