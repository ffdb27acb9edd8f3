use serde::Serialize;

pub type CarId = i64;

/// A rentable car and the two rates it is billed at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    /// Charge per hour of rental.
    pub hourly_rate: f64,
    /// Charge per kilometer driven.
    pub km_rate: f64,
}

impl Car {
    pub fn rates(&self) -> Rates {
        Rates {
            hourly: self.hourly_rate,
            per_km: self.km_rate,
        }
    }
}

/// The pair of rates a rental charge is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub hourly: f64,
    pub per_km: f64,
}

/// A rate is usable when it is a finite, non-negative number.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate >= 0.0
}
