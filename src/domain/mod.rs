mod billing;
mod car;
mod customer;
mod rental;
mod timestamp;

pub use billing::*;
pub use car::*;
pub use customer::*;
pub use rental::*;
pub use timestamp::*;
