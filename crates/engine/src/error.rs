//! The module contains the errors the engine can throw.
//!
//! Business-rule errors ([`Validation`], [`InsufficientQuantity`],
//! [`InvalidStateTransition`]) are recoverable and returned synchronously to
//! the caller. [`InvariantViolation`] is fatal: it signals a concurrency bug
//! or data corruption and is never auto-corrected.
//!
//! [`Validation`]: EngineError::Validation
//! [`InsufficientQuantity`]: EngineError::InsufficientQuantity
//! [`InvalidStateTransition`]: EngineError::InvalidStateTransition
//! [`InvariantViolation`]: EngineError::InvariantViolation
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: i64, available: i64 },
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::InsufficientQuantity {
                    requested: req_a,
                    available: avail_a,
                },
                Self::InsufficientQuantity {
                    requested: req_b,
                    available: avail_b,
                },
            ) => req_a == req_b && avail_a == avail_b,
            (Self::InvalidStateTransition(a), Self::InvalidStateTransition(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
