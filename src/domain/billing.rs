use chrono::NaiveDateTime;

use super::Rates;

/// Elapsed time between two instants in fractional hours.
/// Negative when `end` precedes `start`.
pub fn elapsed_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// Compute the charge for a rental.
/// Charge = hours * hourly rate + kilometers * per-km rate
pub fn rental_charge(
    rates: Rates,
    start: NaiveDateTime,
    end: NaiveDateTime,
    km_driven: f64,
) -> f64 {
    elapsed_hours(start, end) * rates.hourly + km_driven * rates.per_km
}

/// Format an amount as a human-readable string with two decimals.
/// Example: 55.0 -> "55.00"
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}
