//! Shared test utilities for `GarageBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        customer::{self, CustomerDetails},
        finalize::{self, FinalizeOrder},
        order::{self, NewOrder},
        part::{self, PartDetails},
        vehicle::{self, VehicleDetails},
    },
    entities::{self, service_order},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test customer with the given name.
///
/// # Defaults
/// * `phone`: `"11 99999-0000"`
/// * no e-mail, tax id or address
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    create_custom_customer(db, name, "11 99999-0000").await
}

/// Creates a test customer with a specific phone number.
pub async fn create_custom_customer(
    db: &DatabaseConnection,
    name: &str,
    phone: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(
        db,
        CustomerDetails {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test vehicle for a customer.
///
/// # Defaults
/// * make/model: Volkswagen Gol
/// * year: 2015
pub async fn create_test_vehicle(
    db: &DatabaseConnection,
    customer_id: i64,
    plate: &str,
) -> Result<entities::vehicle::Model> {
    vehicle::create_vehicle(
        db,
        VehicleDetails {
            customer_id,
            plate: plate.to_string(),
            make: "Volkswagen".to_string(),
            model: "Gol".to_string(),
            year: Some(2015),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test part with the given opening stock.
///
/// # Defaults
/// * `minimum_quantity`: 2
/// * `cost_price`: 20.0
/// * `sale_price`: 35.0
pub async fn create_test_part(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
) -> Result<entities::part::Model> {
    part::create_part(
        db,
        PartDetails {
            name: name.to_string(),
            minimum_quantity: 2,
            cost_price: 20.0,
            sale_price: 35.0,
            ..Default::default()
        },
        quantity,
    )
    .await
}

/// Opens a test order asking for an oil change.
pub async fn create_test_order(
    db: &DatabaseConnection,
    customer_id: i64,
    vehicle_id: i64,
) -> Result<service_order::Model> {
    order::create_order(
        db,
        NewOrder {
            customer_id,
            vehicle_id,
            services: vec!["Troca de óleo".to_string()],
            ..Default::default()
        },
    )
    .await
}

/// Opens and finalizes an order, then pins its completion time to `completed_at` so
/// revenue windows can be tested against a fixed clock.
pub async fn create_finalized_order(
    db: &DatabaseConnection,
    customer_id: i64,
    vehicle_id: i64,
    total: f64,
    completed_at: DateTime<Utc>,
) -> Result<service_order::Model> {
    let order = create_test_order(db, customer_id, vehicle_id).await?;
    let result = finalize::finalize_order(
        db,
        FinalizeOrder {
            order_id: order.id,
            total_amount: total.to_string(),
            ..Default::default()
        },
    )
    .await?;

    let mut active: service_order::ActiveModel = result.order.into();
    active.completed_at = Set(Some(completed_at));
    Ok(active.update(db).await?)
}

/// Sets up a test environment with one customer ("Maria") and her vehicle.
/// Returns (db, customer, vehicle).
pub async fn setup_with_vehicle() -> Result<(
    DatabaseConnection,
    entities::customer::Model,
    entities::vehicle::Model,
)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "Maria").await?;
    let vehicle = create_test_vehicle(&db, customer.id, "ABC1D23").await?;
    Ok((db, customer, vehicle))
}

/// Sets up a test environment with a customer, vehicle and one open order.
/// Returns (db, customer, vehicle, order).
pub async fn setup_with_order() -> Result<(
    DatabaseConnection,
    entities::customer::Model,
    entities::vehicle::Model,
    service_order::Model,
)> {
    let (db, customer, vehicle) = setup_with_vehicle().await?;
    let order = create_test_order(&db, customer.id, vehicle.id).await?;
    Ok((db, customer, vehicle, order))
}
