use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    format_timestamp, parse_timestamp, Car, CarId, Customer, CustomerId, Rental, RentalId,
    RentalTotal,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying cars, customers and rentals.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// The pool holds a single connection, so statements never interleave.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Car operations
    // ========================

    /// Insert a car and return its assigned ID.
    pub async fn insert_car(&self, model: &str, hourly_rate: f64, km_rate: f64) -> Result<CarId> {
        let result = sqlx::query("INSERT INTO cars (model, hourly_rate, km_rate) VALUES (?, ?, ?)")
            .bind(model)
            .bind(hourly_rate)
            .bind(km_rate)
            .execute(&self.pool)
            .await
            .context("Failed to save car")?;
        Ok(result.last_insert_rowid())
    }

    /// Get a car by ID.
    pub async fn get_car(&self, id: CarId) -> Result<Option<Car>> {
        let row = sqlx::query("SELECT id, model, hourly_rate, km_rate FROM cars WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch car")?;

        Ok(row.as_ref().map(Self::row_to_car))
    }

    /// List all cars in insertion order.
    pub async fn list_cars(&self) -> Result<Vec<Car>> {
        let rows = sqlx::query("SELECT id, model, hourly_rate, km_rate FROM cars ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list cars")?;

        Ok(rows.iter().map(Self::row_to_car).collect())
    }

    fn row_to_car(row: &SqliteRow) -> Car {
        Car {
            id: row.get("id"),
            model: row.get("model"),
            hourly_rate: row.get("hourly_rate"),
            km_rate: row.get("km_rate"),
        }
    }

    // ========================
    // Customer operations
    // ========================

    /// Insert a customer and return its assigned ID.
    /// Fails with a unique-constraint error when the email is taken.
    pub async fn insert_customer(&self, full_name: &str, email: &str) -> Result<CustomerId> {
        let result = sqlx::query("INSERT INTO customers (full_name, email) VALUES (?, ?)")
            .bind(full_name)
            .bind(email)
            .execute(&self.pool)
            .await
            .context("Failed to save customer")?;
        Ok(result.last_insert_rowid())
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, full_name, email FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch customer")?;

        Ok(row.as_ref().map(Self::row_to_customer))
    }

    /// Get a customer by email.
    pub async fn get_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, full_name, email FROM customers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch customer by email")?;

        Ok(row.as_ref().map(Self::row_to_customer))
    }

    /// List all customers in insertion order.
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT id, full_name, email FROM customers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list customers")?;

        Ok(rows.iter().map(Self::row_to_customer).collect())
    }

    fn row_to_customer(row: &SqliteRow) -> Customer {
        Customer {
            id: row.get("id"),
            full_name: row.get("full_name"),
            email: row.get("email"),
        }
    }

    // ========================
    // Rental operations
    // ========================

    /// Insert an open rental and return its assigned ID.
    pub async fn insert_rental(
        &self,
        customer_id: CustomerId,
        car_id: CarId,
        start_time: NaiveDateTime,
    ) -> Result<RentalId> {
        let result =
            sqlx::query("INSERT INTO rentals (customer_id, car_id, start_time) VALUES (?, ?, ?)")
                .bind(customer_id)
                .bind(car_id)
                .bind(format_timestamp(start_time))
                .execute(&self.pool)
                .await
                .context("Failed to save rental")?;
        Ok(result.last_insert_rowid())
    }

    /// Get a rental by ID.
    pub async fn get_rental(&self, id: RentalId) -> Result<Option<Rental>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, car_id, start_time, end_time, km_driven, total_amount
            FROM rentals
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch rental")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_rental(&row)?)),
            None => Ok(None),
        }
    }

    /// Close an open rental, recording its end time, distance and charge.
    /// Returns false when no open rental with that ID exists; a closed
    /// rental is never overwritten.
    pub async fn close_rental(
        &self,
        id: RentalId,
        end_time: NaiveDateTime,
        km_driven: f64,
        total_amount: f64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rentals
            SET end_time = ?, km_driven = ?, total_amount = ?
            WHERE id = ? AND end_time IS NULL
            "#,
        )
        .bind(format_timestamp(end_time))
        .bind(km_driven)
        .bind(total_amount)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to close rental")?;

        Ok(result.rows_affected() == 1)
    }

    /// List every rental's ID and total, in insertion order.
    pub async fn list_rental_totals(&self) -> Result<Vec<RentalTotal>> {
        let rows = sqlx::query("SELECT id, total_amount FROM rentals ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list rentals")?;

        Ok(rows
            .iter()
            .map(|row| RentalTotal {
                rental_id: row.get("id"),
                total_amount: row.get("total_amount"),
            })
            .collect())
    }

    fn row_to_rental(row: &SqliteRow) -> Result<Rental> {
        let start_time_str: String = row.get("start_time");
        let end_time_str: Option<String> = row.get("end_time");

        Ok(Rental {
            id: row.get("id"),
            customer_id: row.get("customer_id"),
            car_id: row.get("car_id"),
            start_time: parse_timestamp(&start_time_str).context("Invalid start_time timestamp")?,
            end_time: end_time_str
                .map(|s| parse_timestamp(&s))
                .transpose()
                .context("Invalid end_time timestamp")?,
            km_driven: row.get("km_driven"),
            total_amount: row.get("total_amount"),
        })
    }
}

/// True when the error was raised by a UNIQUE constraint.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}
