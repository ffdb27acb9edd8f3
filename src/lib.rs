pub mod application;
pub mod cli;
pub mod domain;
pub mod storage;

pub use application::RentalLedger;
pub use domain::*;
pub use storage::Repository;
