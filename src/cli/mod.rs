use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::RentalLedger;
use crate::domain::{format_amount, format_timestamp, parse_timestamp, RentalTotal};

/// Rental Ledger - Car Rental Records
#[derive(Parser)]
#[command(name = "rental-ledger")]
#[command(about = "A local-first record keeper for cars, customers and rentals")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "rental.db", env = "RENTAL_LEDGER_DB")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Car management commands
    #[command(subcommand)]
    Car(CarCommands),

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Rental lifecycle commands
    #[command(subcommand)]
    Rental(RentalCommands),

    /// List all rentals with their totals
    Rentals {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Run the demo sequence: two cars, one customer, one two-hour rental
    Demo,
}

#[derive(Subcommand)]
pub enum CarCommands {
    /// Register a new car
    Add {
        /// Car model name
        model: String,

        /// Charge per hour (e.g., "15.0")
        #[arg(long)]
        hourly_rate: f64,

        /// Charge per kilometer (e.g., "0.5")
        #[arg(long)]
        km_rate: f64,
    },

    /// List all cars
    List,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    Add {
        /// Customer full name
        full_name: String,

        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,
    },

    /// List all customers
    List,
}

#[derive(Subcommand)]
pub enum RentalCommands {
    /// Open a rental
    Open {
        /// Customer ID
        #[arg(long)]
        customer: i64,

        /// Car ID
        #[arg(long)]
        car: i64,

        /// Start time (YYYY-MM-DD HH:MM:SS, defaults to now)
        #[arg(long)]
        start: Option<String>,
    },

    /// Close a rental and compute its charge
    Close {
        /// Rental ID
        id: i64,

        /// Kilometers driven
        #[arg(long)]
        km: f64,

        /// End time (YYYY-MM-DD HH:MM:SS, defaults to now)
        #[arg(long)]
        end: Option<String>,
    },

    /// Show detailed rental information
    Show {
        /// Rental ID
        id: i64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_logging(self.verbose);

        match self.command {
            Commands::Init => {
                RentalLedger::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Car(car_cmd) => {
                let ledger = RentalLedger::connect(&self.database).await?;
                run_car_command(&ledger, car_cmd).await?;
            }

            Commands::Customer(customer_cmd) => {
                let ledger = RentalLedger::connect(&self.database).await?;
                run_customer_command(&ledger, customer_cmd).await?;
            }

            Commands::Rental(rental_cmd) => {
                let ledger = RentalLedger::connect(&self.database).await?;
                run_rental_command(&ledger, rental_cmd).await?;
            }

            Commands::Rentals { format } => {
                let ledger = RentalLedger::connect(&self.database).await?;
                let rentals = ledger.list_rentals().await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&rentals)?),
                    "table" => print_rentals(&rentals),
                    other => anyhow::bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Demo => {
                let ledger = RentalLedger::init(&self.database).await?;
                run_demo(&ledger).await?;
            }
        }

        Ok(())
    }
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

async fn run_car_command(ledger: &RentalLedger, cmd: CarCommands) -> Result<()> {
    match cmd {
        CarCommands::Add {
            model,
            hourly_rate,
            km_rate,
        } => {
            let id = ledger.register_car(&model, hourly_rate, km_rate).await?;
            println!("Registered car: {} (#{})", model, id);
        }

        CarCommands::List => {
            let cars = ledger.list_cars().await?;
            if cars.is_empty() {
                println!("No cars found.");
            } else {
                println!("{:<6} {:<24} {:>10} {:>10}", "ID", "MODEL", "PER HOUR", "PER KM");
                println!("{}", "-".repeat(53));
                for car in cars {
                    println!(
                        "{:<6} {:<24} {:>10} {:>10}",
                        car.id,
                        car.model,
                        format_amount(car.hourly_rate),
                        format_amount(car.km_rate)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_customer_command(ledger: &RentalLedger, cmd: CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Add { full_name, email } => {
            let id = ledger.register_customer(&full_name, &email).await?;
            println!("Registered customer: {} (#{})", full_name, id);
        }

        CustomerCommands::List => {
            let customers = ledger.list_customers().await?;
            if customers.is_empty() {
                println!("No customers found.");
            } else {
                println!("{:<6} {:<28} {}", "ID", "NAME", "EMAIL");
                println!("{}", "-".repeat(64));
                for customer in customers {
                    println!(
                        "{:<6} {:<28} {}",
                        customer.id, customer.full_name, customer.email
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_rental_command(ledger: &RentalLedger, cmd: RentalCommands) -> Result<()> {
    match cmd {
        RentalCommands::Open {
            customer,
            car,
            start,
        } => {
            let start_time = parse_time_or_now(start)?;
            let id = ledger.open_rental(customer, car, start_time).await?;
            println!("Opened rental #{} at {}", id, format_timestamp(start_time));
        }

        RentalCommands::Close { id, km, end } => {
            let end_time = parse_time_or_now(end)?;
            let rental = ledger.close_rental(id, end_time, km).await?;
            println!(
                "Closed rental #{}: total {}",
                rental.id,
                format_amount(rental.total_amount.unwrap_or_default())
            );
        }

        RentalCommands::Show { id } => {
            let info = ledger.get_rental_info(id).await?;
            let rental = &info.rental;

            println!("Rental #{}", rental.id);
            println!(
                "  Customer:  {} <{}>",
                info.customer.full_name, info.customer.email
            );
            println!(
                "  Car:       {} ({}/h, {}/km)",
                info.car.model,
                format_amount(info.car.hourly_rate),
                format_amount(info.car.km_rate)
            );
            println!("  Started:   {}", format_timestamp(rental.start_time));
            match (rental.end_time, rental.km_driven, rental.total_amount) {
                (Some(end), Some(km), Some(total)) => {
                    println!("  Ended:     {}", format_timestamp(end));
                    if let Some(hours) = rental.duration_hours() {
                        println!("  Duration:  {:.2} h", hours);
                    }
                    println!("  Distance:  {} km", km);
                    println!("  Total:     {}", format_amount(total));
                }
                _ => println!("  Status:    open"),
            }
        }
    }
    Ok(())
}

fn print_rentals(rentals: &[RentalTotal]) {
    if rentals.is_empty() {
        println!("No rentals found.");
        return;
    }
    for rental in rentals {
        let total = rental
            .total_amount
            .map(format_amount)
            .unwrap_or_else(|| "open".to_string());
        println!("Rental ID: {}, Total Amount: {}", rental.rental_id, total);
    }
}

/// Register two cars and one customer, then open a rental now and close it
/// two hours later with 50 km driven, and print the listing.
///
/// The demo customer's email is fixed, so a second run against the same
/// database registers the two cars again and then fails on the email.
async fn run_demo(ledger: &RentalLedger) -> Result<()> {
    let first_car = ledger.register_car("Model 3", 15.0, 0.5).await?;
    println!("Registered car: Model 3 (#{})", first_car);
    let second_car = ledger.register_car("Model Y", 20.0, 0.6).await?;
    println!("Registered car: Model Y (#{})", second_car);

    let customer = ledger
        .register_customer("Jānis Bērziņš", "janis.berzins@example.com")
        .await?;
    println!("Registered customer: Jānis Bērziņš (#{})", customer);

    let start = Local::now().naive_local();
    let rental = ledger.open_rental(customer, first_car, start).await?;
    println!("Opened rental #{}", rental);

    let closed = ledger
        .close_rental(rental, start + Duration::hours(2), 50.0)
        .await?;
    println!(
        "Closed rental #{}: total {}",
        closed.id,
        format_amount(closed.total_amount.unwrap_or_default())
    );

    print_rentals(&ledger.list_rentals().await?);
    Ok(())
}

/// Parse a `YYYY-MM-DD HH:MM:SS` argument, or use the current local time.
fn parse_time_or_now(input: Option<String>) -> Result<NaiveDateTime> {
    match input {
        Some(s) => parse_timestamp(&s)
            .with_context(|| format!("Invalid time '{}'. Use YYYY-MM-DD HH:MM:SS", s)),
        None => Ok(Local::now().naive_local()),
    }
}
