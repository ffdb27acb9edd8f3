mod common;

use anyhow::Result;
use chrono::Duration;
use common::{test_ledger, ts, Fleet, EPSILON};
use rental_ledger::application::AppError;

#[tokio::test]
async fn test_open_rental_is_listed_without_total() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let id = ledger
        .open_rental(fleet.customer, fleet.model_3, ts("2024-07-01 09:00:00"))
        .await?;

    let rentals = ledger.list_rentals().await?;
    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].rental_id, id);
    assert_eq!(rentals[0].total_amount, None);

    let info = ledger.get_rental_info(id).await?;
    assert!(info.rental.is_open());
    assert_eq!(info.rental.km_driven, None);
    assert_eq!(info.car.model, "Model 3");
    assert_eq!(info.customer.email, "janis.berzins@example.com");

    Ok(())
}

#[tokio::test]
async fn test_close_rental_two_hours_fifty_km() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let start = ts("2024-07-01 09:00:00");
    let id = ledger.open_rental(fleet.customer, fleet.model_3, start).await?;
    let closed = ledger
        .close_rental(id, start + Duration::hours(2), 50.0)
        .await?;

    assert!(closed.is_closed());
    assert!((closed.total_amount.unwrap() - 55.0).abs() < EPSILON);

    let rentals = ledger.list_rentals().await?;
    assert!((rentals[0].total_amount.unwrap() - 55.0).abs() < EPSILON);

    let info = ledger.get_rental_info(id).await?;
    assert_eq!(info.rental.end_time, Some(ts("2024-07-01 11:00:00")));
    assert_eq!(info.rental.km_driven, Some(50.0));

    Ok(())
}

#[tokio::test]
async fn test_close_rental_half_hour_no_distance() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let start = ts("2024-07-01 09:00:00");
    let id = ledger.open_rental(fleet.customer, fleet.model_y, start).await?;
    ledger
        .close_rental(id, start + Duration::minutes(30), 0.0)
        .await?;

    let rentals = ledger.list_rentals().await?;
    assert!((rentals[0].total_amount.unwrap() - 10.0).abs() < EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_close_rental_across_midnight() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let id = ledger
        .open_rental(fleet.customer, fleet.model_y, ts("2024-12-31 22:30:00"))
        .await?;
    let closed = ledger
        .close_rental(id, ts("2025-01-01 01:15:00"), 120.5)
        .await?;

    // 2.75 h * 20.0 + 120.5 km * 0.6
    let expected = 2.75 * 20.0 + 120.5 * 0.6;
    assert!((closed.total_amount.unwrap() - expected).abs() < EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_reclosing_is_rejected_and_total_preserved() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let start = ts("2024-07-01 09:00:00");
    let id = ledger.open_rental(fleet.customer, fleet.model_3, start).await?;
    ledger
        .close_rental(id, start + Duration::hours(2), 50.0)
        .await?;

    let result = ledger
        .close_rental(id, start + Duration::hours(10), 500.0)
        .await;
    assert!(matches!(result, Err(AppError::RentalAlreadyClosed(r)) if r == id));

    let info = ledger.get_rental_info(id).await?;
    assert_eq!(info.rental.end_time, Some(ts("2024-07-01 11:00:00")));
    assert_eq!(info.rental.km_driven, Some(50.0));
    assert!((info.rental.total_amount.unwrap() - 55.0).abs() < EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_open_rental_requires_existing_references() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;
    let start = ts("2024-07-01 09:00:00");

    let result = ledger.open_rental(999, fleet.model_3, start).await;
    assert!(matches!(result, Err(AppError::CustomerNotFound(999))));

    let result = ledger.open_rental(fleet.customer, 999, start).await;
    assert!(matches!(result, Err(AppError::CarNotFound(999))));

    assert!(ledger.list_rentals().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_close_rental_validation() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let start = ts("2024-07-01 09:00:00");
    let id = ledger.open_rental(fleet.customer, fleet.model_3, start).await?;

    let result = ledger.close_rental(404, start, 1.0).await;
    assert!(matches!(result, Err(AppError::RentalNotFound(404))));

    let result = ledger
        .close_rental(id, start - Duration::minutes(1), 1.0)
        .await;
    assert!(matches!(result, Err(AppError::EndBeforeStart { .. })));

    let result = ledger
        .close_rental(id, start + Duration::hours(1), -5.0)
        .await;
    assert!(matches!(result, Err(AppError::InvalidDistance(_))));

    // Still open after the rejected attempts
    assert_eq!(ledger.list_rentals().await?[0].total_amount, None);

    // Closing at the start instant charges distance only
    let closed = ledger.close_rental(id, start, 10.0).await?;
    assert!((closed.total_amount.unwrap() - 5.0).abs() < EPSILON);

    Ok(())
}

#[tokio::test]
async fn test_list_rentals_in_insertion_order() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    // Later start times first, to show ordering is by creation
    let first = ledger
        .open_rental(fleet.customer, fleet.model_3, ts("2024-08-10 10:00:00"))
        .await?;
    let second = ledger
        .open_rental(fleet.customer, fleet.model_y, ts("2024-08-01 10:00:00"))
        .await?;
    let third = ledger
        .open_rental(fleet.customer, fleet.model_3, ts("2024-07-01 10:00:00"))
        .await?;

    ledger
        .close_rental(second, ts("2024-08-01 11:00:00"), 10.0)
        .await?;

    let rentals = ledger.list_rentals().await?;
    let ids: Vec<_> = rentals.iter().map(|r| r.rental_id).collect();
    assert_eq!(ids, vec![first, second, third]);

    assert_eq!(rentals[0].total_amount, None);
    // 1h * 20.0 + 10 km * 0.6
    assert!((rentals[1].total_amount.unwrap() - 26.0).abs() < EPSILON);
    assert_eq!(rentals[2].total_amount, None);

    Ok(())
}

#[tokio::test]
async fn test_start_time_stored_at_second_precision() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let fleet = Fleet::create(&ledger).await?;

    let start = ts("2024-07-01 09:00:00") + Duration::milliseconds(750);
    let id = ledger.open_rental(fleet.customer, fleet.model_3, start).await?;

    let info = ledger.get_rental_info(id).await?;
    assert_eq!(info.rental.start_time, ts("2024-07-01 09:00:00"));

    Ok(())
}

#[tokio::test]
async fn test_get_missing_rental() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let result = ledger.get_rental_info(7).await;
    assert!(matches!(result, Err(AppError::RentalNotFound(7))));

    Ok(())
}
