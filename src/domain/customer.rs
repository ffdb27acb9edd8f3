use serde::Serialize;

pub type CustomerId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub full_name: String,
    /// Unique across all customers.
    pub email: String,
}
