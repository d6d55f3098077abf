//! Service order business logic - Opening, editing and looking up orders ("OS").
//!
//! Orders are created inside a transaction so the sequential order number and the
//! first status-history row are written together. Every status change, by hand or by
//! finalization, appends a row to the order's history.

use crate::{
    core::{matches_any, money::validate_amount, optional, search_key},
    entities::{
        Customer, OrderHistory, OrderPart, OrderStatus, Part, ServiceOrder, Vehicle, customer,
        order_history, order_part, part, service_order, vehicle,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, LoaderTrait, QueryOrder, Set, TransactionTrait, prelude::*,
};
use tracing::{info, instrument};

/// Separator between service labels in `requested_service`.
pub const SERVICE_SEPARATOR: &str = ", ";

/// Fields of the order form.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    /// Customer the work is for
    pub customer_id: i64,
    /// Vehicle being serviced; must belong to `customer_id`
    pub vehicle_id: i64,
    /// Selected catalog services (at least one)
    pub services: Vec<String>,
    /// Free-text problem description
    pub description: Option<String>,
    /// Responsible mechanic
    pub mechanic: Option<String>,
    /// Promised delivery date
    pub expected_date: Option<NaiveDate>,
    /// Estimate given to the customer
    pub estimated_budget: Option<f64>,
    /// Initial status. `None` means [`OrderStatus::ToReceive`] on create and
    /// "unchanged" on update.
    pub status: Option<OrderStatus>,
}

/// An order together with its customer and vehicle.
#[derive(Debug, Clone)]
pub struct OrderWithRelations {
    /// The order row
    pub order: service_order::Model,
    /// Owning customer
    pub customer: Option<customer::Model>,
    /// Serviced vehicle
    pub vehicle: Option<vehicle::Model>,
}

struct ValidOrder {
    customer_id: i64,
    vehicle_id: i64,
    requested_service: String,
    description: Option<String>,
    mechanic: Option<String>,
    expected_date: Option<NaiveDate>,
    estimated_budget: Option<f64>,
    status: Option<OrderStatus>,
}

/// Joins service labels into the stored `requested_service` text.
///
/// Labels are trimmed, blanks are dropped and repeated labels are kept once, in the
/// order they were selected.
#[must_use]
pub fn compose_requested_service<S: AsRef<str>>(services: &[S]) -> String {
    let mut seen: Vec<&str> = Vec::with_capacity(services.len());
    for service in services {
        let label = service.as_ref().trim();
        if !label.is_empty() && !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen.join(SERVICE_SEPARATOR)
}

/// Splits a stored `requested_service` back into its labels.
#[must_use]
pub fn split_requested_service(requested_service: &str) -> Vec<String> {
    requested_service
        .split(SERVICE_SEPARATOR.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Checks the form and the customer/vehicle references. Runs only reads.
async fn validate_order(db: &DatabaseConnection, order: NewOrder) -> Result<ValidOrder> {
    let requested_service = compose_requested_service(&order.services);
    if requested_service.is_empty() {
        return Err(Error::validation("Select at least one service"));
    }
    let estimated_budget = order.estimated_budget.map(validate_amount).transpose()?;

    Customer::find_by_id(order.customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound {
            id: order.customer_id,
        })?;

    let vehicle = Vehicle::find_by_id(order.vehicle_id)
        .one(db)
        .await?
        .ok_or(Error::VehicleNotFound {
            id: order.vehicle_id,
        })?;

    if vehicle.customer_id != order.customer_id {
        return Err(Error::VehicleOwnerMismatch {
            vehicle_id: vehicle.id,
            customer_id: order.customer_id,
        });
    }

    Ok(ValidOrder {
        customer_id: order.customer_id,
        vehicle_id: order.vehicle_id,
        requested_service,
        description: optional(order.description),
        mechanic: optional(order.mechanic),
        expected_date: order.expected_date,
        estimated_budget,
        status: order.status,
    })
}

/// Appends a status-history row. Works on a plain connection or inside a transaction.
pub(crate) async fn record_status_change<C>(
    conn: &C,
    order_id: i64,
    previous_status: Option<OrderStatus>,
    new_status: OrderStatus,
    note: Option<String>,
) -> Result<order_history::Model>
where
    C: ConnectionTrait,
{
    order_history::ActiveModel {
        order_id: Set(order_id),
        previous_status: Set(previous_status),
        new_status: Set(new_status),
        note: Set(optional(note)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

/// Opens a new service order.
///
/// The order gets the next sequential order number, `entry_date = now` and, unless
/// given, the status "A Receber". The number assignment, the insert and the first
/// history row happen in one transaction.
///
/// # Errors
/// Returns an error if:
/// - No service is selected or the estimate is negative
/// - The customer or vehicle does not exist
/// - The vehicle belongs to another customer
/// - The database operation fails
#[instrument(skip(db, order), fields(customer_id = order.customer_id, vehicle_id = order.vehicle_id))]
pub async fn create_order(db: &DatabaseConnection, order: NewOrder) -> Result<service_order::Model> {
    let valid = validate_order(db, order).await?;
    let status = valid.status.unwrap_or_default();

    let txn = db.begin().await?;

    let last_number = ServiceOrder::find()
        .filter(service_order::Column::OrderNumber.is_not_null())
        .order_by_desc(service_order::Column::OrderNumber)
        .one(&txn)
        .await?
        .and_then(|o| o.order_number)
        .unwrap_or(0);

    let now = chrono::Utc::now();
    let created = service_order::ActiveModel {
        order_number: Set(Some(last_number + 1)),
        customer_id: Set(valid.customer_id),
        vehicle_id: Set(valid.vehicle_id),
        requested_service: Set(valid.requested_service),
        description: Set(valid.description),
        mechanic: Set(valid.mechanic),
        estimated_budget: Set(valid.estimated_budget),
        status: Set(status),
        entry_date: Set(now),
        expected_date: Set(valid.expected_date),
        completed_at: Set(None),
        total_amount: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    record_status_change(&txn, created.id, None, status, None).await?;

    txn.commit().await?;

    info!(
        order_id = created.id,
        order_number = created.order_number,
        "Service order opened"
    );
    Ok(created)
}

/// Edits an order in place. Entry date and order number are kept; a status change
/// appends history.
///
/// # Errors
/// Returns an error if validation fails or the order does not exist.
#[instrument(skip(db, order))]
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    order: NewOrder,
) -> Result<service_order::Model> {
    let valid = validate_order(db, order).await?;

    let existing = ServiceOrder::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let previous_status = existing.status;
    let new_status = valid.status.unwrap_or(previous_status);

    let txn = db.begin().await?;

    let mut active: service_order::ActiveModel = existing.into();
    active.customer_id = Set(valid.customer_id);
    active.vehicle_id = Set(valid.vehicle_id);
    active.requested_service = Set(valid.requested_service);
    active.description = Set(valid.description);
    active.mechanic = Set(valid.mechanic);
    active.expected_date = Set(valid.expected_date);
    active.estimated_budget = Set(valid.estimated_budget);
    active.status = Set(new_status);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    if new_status != previous_status {
        record_status_change(&txn, order_id, Some(previous_status), new_status, None).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Moves an order to any status and records the change.
///
/// Setting the current status again is a no-op and writes no history.
///
/// # Errors
/// Returns an error if the order does not exist or the update fails.
#[instrument(skip(db, note))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
    note: Option<String>,
) -> Result<service_order::Model> {
    let existing = ServiceOrder::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let previous_status = existing.status;
    if previous_status == status {
        return Ok(existing);
    }

    let txn = db.begin().await?;

    let mut active: service_order::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    record_status_change(&txn, order_id, Some(previous_status), status, note).await?;

    txn.commit().await?;

    info!(from = %previous_status, to = %status, "Order status changed");
    Ok(updated)
}

/// Finds an order by id.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<service_order::Model>> {
    ServiceOrder::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an order by its human-facing number.
pub async fn get_order_by_number(
    db: &DatabaseConnection,
    order_number: i64,
) -> Result<Option<service_order::Model>> {
    ServiceOrder::find()
        .filter(service_order::Column::OrderNumber.eq(order_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All orders, newest entry first.
pub async fn get_all_orders(db: &DatabaseConnection) -> Result<Vec<service_order::Model>> {
    ServiceOrder::find()
        .order_by_desc(service_order::Column::EntryDate)
        .order_by_desc(service_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn attach_relations(
    db: &DatabaseConnection,
    orders: Vec<service_order::Model>,
) -> Result<Vec<OrderWithRelations>> {
    let customers = orders.load_one(Customer, db).await?;
    let vehicles = orders.load_one(Vehicle, db).await?;

    Ok(orders
        .into_iter()
        .zip(customers)
        .zip(vehicles)
        .map(|((order, customer), vehicle)| OrderWithRelations {
            order,
            customer,
            vehicle,
        })
        .collect())
}

/// All orders with their customer and vehicle, newest entry first.
pub async fn get_orders_with_relations(db: &DatabaseConnection) -> Result<Vec<OrderWithRelations>> {
    let orders = get_all_orders(db).await?;
    attach_relations(db, orders).await
}

/// Searches orders by order number, customer name or plate, optionally restricted to
/// one status. A blank term matches every order.
pub async fn search_orders(
    db: &DatabaseConnection,
    term: &str,
    status_filter: Option<OrderStatus>,
) -> Result<Vec<OrderWithRelations>> {
    let key = search_key(term);
    let number = key.trim_start_matches('#').parse::<i64>().ok();

    let mut query = ServiceOrder::find();
    if let Some(status) = status_filter {
        query = query.filter(service_order::Column::Status.eq(status));
    }
    let orders = query
        .order_by_desc(service_order::Column::EntryDate)
        .order_by_desc(service_order::Column::Id)
        .all(db)
        .await?;

    let mut found = attach_relations(db, orders).await?;
    if !key.is_empty() {
        found.retain(|o| {
            (number.is_some() && o.order.order_number == number)
                || matches_any(
                    &key,
                    [
                        o.customer.as_ref().map(|c| c.name.as_str()),
                        o.vehicle.as_ref().map(|v| v.plate.as_str()),
                    ],
                )
        });
    }
    Ok(found)
}

/// Status history of an order, oldest first.
pub async fn get_order_history(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_history::Model>> {
    OrderHistory::find()
        .filter(order_history::Column::OrderId.eq(order_id))
        .order_by_asc(order_history::Column::CreatedAt)
        .order_by_asc(order_history::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Parts consumed by an order, with the part rows.
pub async fn get_order_part_usages(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<(order_part::Model, Option<part::Model>)>> {
    OrderPart::find()
        .filter(order_part::Column::OrderId.eq(order_id))
        .find_also_related(Part)
        .order_by_asc(order_part::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an order together with its part usages and history.
///
/// Stock consumed by a finalized order is not returned to inventory.
///
/// # Errors
/// Returns `OrderNotFound` if no order has this id.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let result = ServiceOrder::delete_by_id(order_id)
        .exec(db)
        .await
        .map_err(|e| Error::from_delete(e, "service order", order_id))?;

    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound { id: order_id });
    }
    info!("Service order deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn order_for(customer_id: i64, vehicle_id: i64) -> NewOrder {
        NewOrder {
            customer_id,
            vehicle_id,
            services: vec!["Troca de óleo".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_compose_requested_service() {
        let composed = compose_requested_service(&[
            " Troca de óleo ",
            "",
            "Alinhamento",
            "Troca de óleo",
        ]);
        assert_eq!(composed, "Troca de óleo, Alinhamento");
        assert_eq!(compose_requested_service::<&str>(&[]), "");
    }

    #[test]
    fn test_split_requested_service() {
        assert_eq!(
            split_requested_service("Troca de óleo, Alinhamento"),
            vec!["Troca de óleo".to_string(), "Alinhamento".to_string()]
        );
        assert!(split_requested_service("").is_empty());
    }

    #[tokio::test]
    async fn test_create_order_requires_service() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut order = order_for(1, 1);
        order.services = vec!["  ".to_string()];
        let result = create_order(&db, order).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let mut order = order_for(1, 1);
        order.estimated_budget = Some(-10.0);
        let result = create_order(&db, order).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_defaults() -> Result<()> {
        let (db, customer, vehicle) = setup_with_vehicle().await?;

        let order = create_order(&db, order_for(customer.id, vehicle.id)).await?;

        assert_eq!(order.status, OrderStatus::ToReceive);
        assert_eq!(order.order_number, Some(1));
        assert_eq!(order.requested_service, "Troca de óleo");
        assert!(order.completed_at.is_none());
        assert!(order.total_amount.is_none());

        let history = get_order_history(&db, order.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].previous_status, None);
        assert_eq!(history[0].new_status, OrderStatus::ToReceive);
        Ok(())
    }

    #[tokio::test]
    async fn test_order_numbers_increase_by_one() -> Result<()> {
        let (db, customer, vehicle) = setup_with_vehicle().await?;

        let first = create_order(&db, order_for(customer.id, vehicle.id)).await?;
        let second = create_order(&db, order_for(customer.id, vehicle.id)).await?;
        let third = create_order(&db, order_for(customer.id, vehicle.id)).await?;

        assert_eq!(first.order_number, Some(1));
        assert_eq!(second.order_number, Some(2));
        assert_eq!(third.order_number, Some(3));

        let found = get_order_by_number(&db, 2).await?.unwrap();
        assert_eq!(found.id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_rejects_foreign_vehicle() -> Result<()> {
        let (db, _maria, vehicle) = setup_with_vehicle().await?;
        let joao = create_test_customer(&db, "João").await?;

        let result = create_order(&db, order_for(joao.id, vehicle.id)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::VehicleOwnerMismatch { .. }
        ));
        assert!(get_all_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_missing_references() -> Result<()> {
        let (db, customer, vehicle) = setup_with_vehicle().await?;

        let result = create_order(&db, order_for(999, vehicle.id)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CustomerNotFound { id: 999 }
        ));

        let result = create_order(&db, order_for(customer.id, 999)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::VehicleNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_keeps_number_and_logs_status() -> Result<()> {
        let (db, customer, vehicle, order) = setup_with_order().await?;

        let mut edit = order_for(customer.id, vehicle.id);
        edit.services = vec!["Alinhamento".to_string(), "Balanceamento".to_string()];
        edit.mechanic = Some("Germano".to_string());
        edit.status = Some(OrderStatus::InProgress);
        let updated = update_order(&db, order.id, edit).await?;

        assert_eq!(updated.order_number, order.order_number);
        assert_eq!(updated.entry_date, order.entry_date);
        assert_eq!(updated.requested_service, "Alinhamento, Balanceamento");
        assert_eq!(updated.status, OrderStatus::InProgress);

        let history = get_order_history(&db, order.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].previous_status, Some(OrderStatus::ToReceive));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status_any_transition() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;

        update_order_status(&db, order.id, OrderStatus::AwaitingPart, None).await?;
        let back = update_order_status(
            &db,
            order.id,
            OrderStatus::ToReceive,
            Some("Peça chegou".to_string()),
        )
        .await?;
        assert_eq!(back.status, OrderStatus::ToReceive);

        // Same status again writes nothing
        update_order_status(&db, order.id, OrderStatus::ToReceive, None).await?;

        let history = get_order_history(&db, order.id).await?;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].note.as_deref(), Some("Peça chegou"));

        let missing = update_order_status(&db, 999, OrderStatus::InProgress, None).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::OrderNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_orders() -> Result<()> {
        let (db, _customer, vehicle, order) = setup_with_order().await?;
        let other_customer = create_test_customer(&db, "João Souza").await?;
        let other_vehicle = create_test_vehicle(&db, other_customer.id, "XYZ9Z99").await?;
        let other = create_order(&db, order_for(other_customer.id, other_vehicle.id)).await?;
        update_order_status(&db, other.id, OrderStatus::InProgress, None).await?;

        let by_name = search_orders(&db, "souza", None).await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].order.id, other.id);
        assert_eq!(by_name[0].customer.as_ref().unwrap().name, "João Souza");

        let by_plate = search_orders(&db, &vehicle.plate, None).await?;
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].order.id, order.id);

        let accented = search_orders(&db, "JOÃO", None).await?;
        assert_eq!(accented.len(), 1);
        assert_eq!(accented[0].order.id, other.id);

        let by_number = search_orders(&db, "#1", None).await?;
        assert!(by_number.iter().any(|o| o.order.id == order.id));

        let in_progress = search_orders(&db, "", Some(OrderStatus::InProgress)).await?;
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].order.id, other.id);

        let all = get_orders_with_relations(&db).await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|o| o.customer.is_some() && o.vehicle.is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_cascades_history() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;

        delete_order(&db, order.id).await?;
        assert!(get_order_by_id(&db, order.id).await?.is_none());
        assert!(get_order_history(&db, order.id).await?.is_empty());

        let again = delete_order(&db, order.id).await;
        assert!(matches!(again.unwrap_err(), Error::OrderNotFound { .. }));
        Ok(())
    }
}
