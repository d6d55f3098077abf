//! Vehicle business logic - Handles vehicle registration, lookup and removal.
//!
//! Every vehicle belongs to exactly one customer, checked before insert. Plates are
//! stored trimmed and upper-cased so lookups are consistent regardless of how staff
//! typed them.

use crate::{
    core::{matches_any, optional, required, search_key},
    entities::{Customer, Vehicle, customer, vehicle},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Editable vehicle fields, as entered in the vehicle form.
#[derive(Debug, Clone, Default)]
pub struct VehicleDetails {
    /// Owning customer (required, must exist)
    pub customer_id: i64,
    /// License plate (required)
    pub plate: String,
    /// Manufacturer (required)
    pub make: String,
    /// Model name (required)
    pub model: String,
    /// Model year
    pub year: Option<i32>,
    /// Body color
    pub color: Option<String>,
    /// Odometer reading in kilometers
    pub odometer_km: Option<i64>,
}

struct ValidVehicle {
    customer_id: i64,
    plate: String,
    make: String,
    model: String,
    year: Option<i32>,
    color: Option<String>,
    odometer_km: Option<i64>,
}

impl VehicleDetails {
    fn validate(self) -> Result<ValidVehicle> {
        let plate = required(&self.plate, "Plate")?.to_uppercase();
        let make = required(&self.make, "Make")?;
        let model = required(&self.model, "Model")?;

        if let Some(km) = self.odometer_km.filter(|km| *km < 0) {
            return Err(Error::validation(format!(
                "Odometer cannot be negative (got {km})"
            )));
        }

        Ok(ValidVehicle {
            customer_id: self.customer_id,
            plate,
            make,
            model,
            year: self.year,
            color: optional(self.color),
            odometer_km: self.odometer_km,
        })
    }
}

/// Formats a plate for display as `ABC-1234` or, for Mercosul plates, `ABC-1D23`.
///
/// Separators are stripped first. Anything shorter than six characters is returned as
/// typed.
#[must_use]
pub fn format_plate(plate: &str) -> String {
    let compact: String = plate
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_uppercase();

    if compact.len() >= 6 {
        format!("{}-{}", &compact[..3], &compact[3..])
    } else {
        plate.to_string()
    }
}

/// Retrieves every vehicle together with its owner, ordered by model.
pub async fn get_all_vehicles(
    db: &DatabaseConnection,
) -> Result<Vec<(vehicle::Model, Option<customer::Model>)>> {
    Vehicle::find()
        .find_also_related(Customer)
        .order_by_asc(vehicle::Column::Model)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a vehicle by id.
pub async fn get_vehicle_by_id(
    db: &DatabaseConnection,
    vehicle_id: i64,
) -> Result<Option<vehicle::Model>> {
    Vehicle::find_by_id(vehicle_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the vehicles owned by one customer, ordered by model.
pub async fn get_vehicles_for_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<vehicle::Model>> {
    Vehicle::find()
        .filter(vehicle::Column::CustomerId.eq(customer_id))
        .order_by_asc(vehicle::Column::Model)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Searches vehicles whose plate, make, model or owner name contains `term`
/// (case-insensitive). A blank term matches every vehicle.
pub async fn search_vehicles(
    db: &DatabaseConnection,
    term: &str,
) -> Result<Vec<(vehicle::Model, Option<customer::Model>)>> {
    let key = search_key(term);
    let mut vehicles = get_all_vehicles(db).await?;
    vehicles.retain(|(v, owner)| {
        matches_any(
            &key,
            [
                Some(v.plate.as_str()),
                Some(v.make.as_str()),
                Some(v.model.as_str()),
                owner.as_ref().map(|c| c.name.as_str()),
            ],
        )
    });
    Ok(vehicles)
}

async fn ensure_customer_exists(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?;
    Ok(())
}

/// Registers a vehicle for an existing customer.
///
/// # Errors
/// * `Validation` if plate, make or model is blank, or the odometer is negative
/// * `CustomerNotFound` if the owner does not exist
#[instrument(skip(db, details))]
pub async fn create_vehicle(
    db: &DatabaseConnection,
    details: VehicleDetails,
) -> Result<vehicle::Model> {
    let valid = details.validate()?;
    ensure_customer_exists(db, valid.customer_id).await?;

    let vehicle = vehicle::ActiveModel {
        customer_id: Set(valid.customer_id),
        plate: Set(valid.plate),
        make: Set(valid.make),
        model: Set(valid.model),
        year: Set(valid.year),
        color: Set(valid.color),
        odometer_km: Set(valid.odometer_km),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let created = vehicle.insert(db).await?;
    info!(vehicle_id = created.id, plate = %created.plate, "Vehicle registered");
    Ok(created)
}

/// Replaces the editable fields of a vehicle, including its owner.
///
/// # Errors
/// * `Validation` on bad input
/// * `VehicleNotFound` if no vehicle has this id
/// * `CustomerNotFound` if the new owner does not exist
pub async fn update_vehicle(
    db: &DatabaseConnection,
    vehicle_id: i64,
    details: VehicleDetails,
) -> Result<vehicle::Model> {
    let valid = details.validate()?;

    let mut vehicle: vehicle::ActiveModel = Vehicle::find_by_id(vehicle_id)
        .one(db)
        .await?
        .ok_or(Error::VehicleNotFound { id: vehicle_id })?
        .into();
    ensure_customer_exists(db, valid.customer_id).await?;

    vehicle.customer_id = Set(valid.customer_id);
    vehicle.plate = Set(valid.plate);
    vehicle.make = Set(valid.make);
    vehicle.model = Set(valid.model);
    vehicle.year = Set(valid.year);
    vehicle.color = Set(valid.color);
    vehicle.odometer_km = Set(valid.odometer_km);

    vehicle.update(db).await.map_err(Into::into)
}

/// Deletes a vehicle.
///
/// # Errors
/// * `VehicleNotFound` if no vehicle has this id
/// * `HasDependents` if service orders still reference the vehicle
#[instrument(skip(db))]
pub async fn delete_vehicle(db: &DatabaseConnection, vehicle_id: i64) -> Result<()> {
    let result = Vehicle::delete_by_id(vehicle_id)
        .exec(db)
        .await
        .map_err(|e| Error::from_delete(e, "vehicle", vehicle_id))?;

    if result.rows_affected == 0 {
        return Err(Error::VehicleNotFound { id: vehicle_id });
    }
    info!("Vehicle deleted");
    Ok(())
}
