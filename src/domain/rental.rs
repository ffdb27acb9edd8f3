use chrono::NaiveDateTime;
use serde::Serialize;

use super::{CarId, CustomerId};

pub type RentalId = i64;

/// A rental transaction. Open until `end_time` is set, then closed for good.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rental {
    pub id: RentalId,
    pub customer_id: CustomerId,
    pub car_id: CarId,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub km_driven: Option<f64>,
    pub total_amount: Option<f64>,
}

impl Rental {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Elapsed rental time in fractional hours, if the rental is closed.
    pub fn duration_hours(&self) -> Option<f64> {
        self.end_time
            .map(|end| super::elapsed_hours(self.start_time, end))
    }
}

/// Id and charged total of a rental, as reported by the rental listing.
/// `total_amount` is `None` while the rental is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalTotal {
    pub rental_id: RentalId,
    pub total_amount: Option<f64>,
}
