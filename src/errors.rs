//! Unified error types and result handling for `GarageBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation failures are
//! raised before any store call; store failures carry the underlying `DbErr` text.

use poise::serenity_prelude as serenity;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All errors produced by the application.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed. Raised before any write.
    #[error("{message}")]
    Validation {
        /// User-facing description of what is wrong
        message: String,
    },

    /// A monetary amount is negative, NaN or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No customer with the given id exists.
    #[error("Customer {id} not found")]
    CustomerNotFound {
        /// Customer id that was looked up
        id: i64,
    },

    /// No vehicle with the given id exists.
    #[error("Vehicle {id} not found")]
    VehicleNotFound {
        /// Vehicle id that was looked up
        id: i64,
    },

    /// No part with the given id exists.
    #[error("Part {id} not found")]
    PartNotFound {
        /// Part id that was looked up
        id: i64,
    },

    /// No service order with the given id exists.
    #[error("Service order {id} not found")]
    OrderNotFound {
        /// Order id that was looked up
        id: i64,
    },

    /// The vehicle chosen for an order belongs to a different customer.
    #[error("Vehicle {vehicle_id} does not belong to customer {customer_id}")]
    VehicleOwnerMismatch {
        /// Vehicle that was selected
        vehicle_id: i64,
        /// Customer the order is for
        customer_id: i64,
    },

    /// The order has already been finalized; finalizing again would consume stock twice.
    #[error("Service order {id} is already finalized")]
    OrderAlreadyFinalized {
        /// Order id
        id: i64,
    },

    /// Not enough stock on hand to consume the requested quantity.
    #[error("Insufficient stock for '{part}': {available} on hand, {requested} requested")]
    InsufficientStock {
        /// Part name
        part: String,
        /// Quantity currently on hand
        available: i32,
        /// Quantity the finalization tried to consume
        requested: i32,
    },

    /// A delete was refused because other records still reference the row.
    #[error("Cannot delete {entity} {id}: check for dependent records")]
    HasDependents {
        /// Kind of record ("customer", "vehicle", ...)
        entity: &'static str,
        /// Id of the record
        id: i64,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Store-call failure (network, constraint, schema).
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure (config file, database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a reply failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<serenity::Error>),
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Returns true for errors caused by the request itself (bad input, missing rows,
    /// business rules) rather than by the infrastructure. The bot shows these to the
    /// user verbatim.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAmount { .. }
                | Self::CustomerNotFound { .. }
                | Self::VehicleNotFound { .. }
                | Self::PartNotFound { .. }
                | Self::OrderNotFound { .. }
                | Self::VehicleOwnerMismatch { .. }
                | Self::OrderAlreadyFinalized { .. }
                | Self::InsufficientStock { .. }
                | Self::HasDependents { .. }
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Maps a failed delete to [`Error::HasDependents`] when the store rejected it
    /// because of a foreign key.
    pub(crate) fn from_delete(err: DbErr, entity: &'static str, id: i64) -> Self {
        let is_fk_violation = matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
            || err.to_string().contains("FOREIGN KEY constraint failed");

        if is_fk_violation {
            Self::HasDependents { entity, id }
        } else {
            Self::Database(err)
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_flagged() {
        assert!(Error::validation("Customer name is required").is_user_error());
        assert!(
            Error::HasDependents {
                entity: "customer",
                id: 1
            }
            .is_user_error()
        );
        assert!(!Error::Database(DbErr::Custom("boom".to_string())).is_user_error());
    }

    #[test]
    fn test_from_delete_keeps_unrelated_errors() {
        let err = Error::from_delete(DbErr::Custom("disk full".to_string()), "part", 3);
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_dependents_message_mentions_records() {
        let err = Error::HasDependents {
            entity: "vehicle",
            id: 7,
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete vehicle 7: check for dependent records"
        );
    }
}
