// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use rental_ledger::application::RentalLedger;
use rental_ledger::domain::{parse_timestamp, CarId, CustomerId};
use tempfile::TempDir;

pub const EPSILON: f64 = 1e-9;

/// Helper to create a test ledger with a temporary database
pub async fn test_ledger() -> Result<(RentalLedger, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let ledger = RentalLedger::init(db_path.to_str().unwrap()).await?;
    Ok((ledger, temp_dir))
}

/// Helper to parse a `YYYY-MM-DD HH:MM:SS` string
pub fn ts(input: &str) -> NaiveDateTime {
    parse_timestamp(input).unwrap()
}

/// Test fixture: the demo fleet and a single customer
pub struct Fleet {
    pub model_3: CarId,
    pub model_y: CarId,
    pub customer: CustomerId,
}

impl Fleet {
    /// Model 3 at 15.0/h and 0.5/km, Model Y at 20.0/h and 0.6/km
    pub async fn create(ledger: &RentalLedger) -> Result<Self> {
        let model_3 = ledger.register_car("Model 3", 15.0, 0.5).await?;
        let model_y = ledger.register_car("Model Y", 20.0, 0.6).await?;
        let customer = ledger
            .register_customer("Jānis Bērziņš", "janis.berzins@example.com")
            .await?;
        Ok(Self {
            model_3,
            model_y,
            customer,
        })
    }
}
