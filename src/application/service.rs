use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::domain::{
    is_valid_rate, rental_charge, truncate_to_seconds, Car, CarId, Customer, CustomerId, Rental,
    RentalId, RentalTotal,
};
use crate::storage::{is_unique_violation, Repository};

use super::AppError;

/// Application service owning every car, customer and rental record.
/// This is the primary interface for any client (CLI, tests, scripts).
pub struct RentalLedger {
    repo: Repository,
}

/// Detailed rental information
pub struct RentalInfo {
    pub rental: Rental,
    pub car: Car,
    pub customer: Customer,
}

impl RentalLedger {
    /// Create a new ledger with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating and migrating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url)
            .await
            .map_err(AppError::StorageUnavailable)?;
        debug!(database = database_path, "Database ready");
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url)
            .await
            .map_err(AppError::StorageUnavailable)?;
        Ok(Self::new(repo))
    }

    // ========================
    // Car operations
    // ========================

    /// Register a new car.
    pub async fn register_car(
        &self,
        model: &str,
        hourly_rate: f64,
        km_rate: f64,
    ) -> Result<CarId, AppError> {
        if !is_valid_rate(hourly_rate) {
            return Err(AppError::InvalidRate(format!(
                "hourly rate {} must be a non-negative number",
                hourly_rate
            )));
        }
        if !is_valid_rate(km_rate) {
            return Err(AppError::InvalidRate(format!(
                "km rate {} must be a non-negative number",
                km_rate
            )));
        }

        let id = self.repo.insert_car(model, hourly_rate, km_rate).await?;
        info!(car_id = id, model, hourly_rate, km_rate, "Car registered");
        Ok(id)
    }

    /// Get a car by ID.
    pub async fn get_car(&self, id: CarId) -> Result<Car, AppError> {
        self.repo
            .get_car(id)
            .await?
            .ok_or(AppError::CarNotFound(id))
    }

    /// List all cars.
    pub async fn list_cars(&self) -> Result<Vec<Car>, AppError> {
        Ok(self.repo.list_cars().await?)
    }

    // ========================
    // Customer operations
    // ========================

    /// Register a new customer. The email must not belong to another customer.
    pub async fn register_customer(
        &self,
        full_name: &str,
        email: &str,
    ) -> Result<CustomerId, AppError> {
        if self.repo.get_customer_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyRegistered(email.to_string()));
        }

        let id = self
            .repo
            .insert_customer(full_name, email)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::EmailAlreadyRegistered(email.to_string())
                } else {
                    AppError::Database(err)
                }
            })?;

        info!(customer_id = id, full_name, "Customer registered");
        Ok(id)
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        self.repo
            .get_customer(id)
            .await?
            .ok_or(AppError::CustomerNotFound(id))
    }

    /// List all customers.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.repo.list_customers().await?)
    }

    // ========================
    // Rental operations
    // ========================

    /// Open a rental of `car_id` by `customer_id` starting at `start_time`.
    pub async fn open_rental(
        &self,
        customer_id: CustomerId,
        car_id: CarId,
        start_time: NaiveDateTime,
    ) -> Result<RentalId, AppError> {
        // Both references must exist before the rental row is written
        self.get_customer(customer_id).await?;
        self.get_car(car_id).await?;

        let start_time = truncate_to_seconds(start_time);
        let id = self
            .repo
            .insert_rental(customer_id, car_id, start_time)
            .await?;

        info!(
            rental_id = id,
            customer_id,
            car_id,
            start = %start_time,
            "Rental opened"
        );
        Ok(id)
    }

    /// Close an open rental and record its charge.
    ///
    /// The charge is `hours * hourly_rate + km_driven * km_rate`, using the
    /// rates of the rented car. A rental can be closed only once.
    pub async fn close_rental(
        &self,
        rental_id: RentalId,
        end_time: NaiveDateTime,
        km_driven: f64,
    ) -> Result<Rental, AppError> {
        if !km_driven.is_finite() || km_driven < 0.0 {
            return Err(AppError::InvalidDistance(km_driven));
        }

        let mut rental = self
            .repo
            .get_rental(rental_id)
            .await?
            .ok_or(AppError::RentalNotFound(rental_id))?;

        if rental.is_closed() {
            return Err(AppError::RentalAlreadyClosed(rental_id));
        }

        let end_time = truncate_to_seconds(end_time);
        if end_time < rental.start_time {
            return Err(AppError::EndBeforeStart {
                start: rental.start_time,
                end: end_time,
            });
        }

        let car = self.get_car(rental.car_id).await?;
        let total_amount = rental_charge(car.rates(), rental.start_time, end_time, km_driven);

        // Guarded update: only an open row is touched
        if !self
            .repo
            .close_rental(rental_id, end_time, km_driven, total_amount)
            .await?
        {
            return Err(AppError::RentalAlreadyClosed(rental_id));
        }

        rental.end_time = Some(end_time);
        rental.km_driven = Some(km_driven);
        rental.total_amount = Some(total_amount);

        info!(
            rental_id,
            km_driven,
            total_amount,
            end = %end_time,
            "Rental closed"
        );
        Ok(rental)
    }

    /// Get detailed rental information.
    pub async fn get_rental_info(&self, id: RentalId) -> Result<RentalInfo, AppError> {
        let rental = self
            .repo
            .get_rental(id)
            .await?
            .ok_or(AppError::RentalNotFound(id))?;
        let car = self.get_car(rental.car_id).await?;
        let customer = self.get_customer(rental.customer_id).await?;

        Ok(RentalInfo {
            rental,
            car,
            customer,
        })
    }

    /// List every rental's ID and total in insertion order.
    /// Open rentals have no total.
    pub async fn list_rentals(&self) -> Result<Vec<RentalTotal>, AppError> {
        let totals = self.repo.list_rental_totals().await?;
        debug!(count = totals.len(), "Listed rentals");
        Ok(totals)
    }
}
