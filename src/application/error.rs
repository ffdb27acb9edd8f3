use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::{CarId, CustomerId, RentalId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),

    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Car not found: {0}")]
    CarNotFound(CarId),

    #[error("Rental not found: {0}")]
    RentalNotFound(RentalId),

    #[error("Rental {0} is already closed")]
    RentalAlreadyClosed(RentalId),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid distance: {0} km (must be a non-negative number)")]
    InvalidDistance(f64),

    #[error("End time {end} is before start time {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
}
