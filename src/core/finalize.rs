//! Order finalization - closes a service order, fixes its total and consumes stock.
//!
//! The whole sequence runs in one transaction: the order update, the usage rows, the
//! stock decrements and the history row either all persist or none do. Stock is
//! decremented with a conditional `UPDATE ... WHERE quantity >= n`, so two concurrent
//! finalizations of the same part can neither lose an update nor drive it negative.

use crate::{
    core::{money::parse_amount, optional, order::record_status_change},
    entities::{OrderStatus, Part, ServiceOrder, order_part, part, service_order},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// One line of the "parts used" list on the finalization form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartUsageInput {
    /// Selected part, `None` when the line was left empty
    pub part_id: Option<i64>,
    /// Units consumed
    pub quantity: i32,
}

/// Everything the finalization form submits.
#[derive(Debug, Clone, Default)]
pub struct FinalizeOrder {
    /// Order being closed
    pub order_id: i64,
    /// Total as typed by staff ("500,00", "R$ 1.200,00", "350.5")
    pub total_amount: String,
    /// Parts used on the job; empty or zero-quantity lines are ignored
    pub part_usages: Vec<PartUsageInput>,
    /// Closing notes
    pub notes: Option<String>,
}

/// Outcome of a successful finalization.
#[derive(Debug, Clone)]
pub struct FinalizationResult {
    /// The finalized order
    pub order: service_order::Model,
    /// Usage rows written for this order
    pub usages: Vec<order_part::Model>,
    /// Consumed parts as they are after the decrement
    pub parts: Vec<part::Model>,
}

/// Keeps the lines that name a part and a positive quantity.
fn effective_usages(usages: &[PartUsageInput]) -> Vec<(i64, i32)> {
    usages
        .iter()
        .filter_map(|usage| match usage.part_id {
            Some(part_id) if usage.quantity > 0 => Some((part_id, usage.quantity)),
            _ => None,
        })
        .collect()
}

/// Takes `quantity` units out of stock, refusing to go below zero.
async fn consume_stock<C>(conn: &C, part_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Part::update_many()
        .col_expr(
            part::Column::Quantity,
            Expr::col(part::Column::Quantity).sub(quantity),
        )
        .col_expr(
            part::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(part::Column::Id.eq(part_id))
        .filter(part::Column::Quantity.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        return Ok(());
    }

    match Part::find_by_id(part_id).one(conn).await? {
        None => Err(Error::PartNotFound { id: part_id }),
        Some(part) => Err(Error::InsufficientStock {
            part: part.name,
            available: part.quantity,
            requested: quantity,
        }),
    }
}

/// Finalizes a service order.
///
/// The total is parsed before anything touches the store. Inside a single transaction
/// the order is marked "Finalizado" with its total, notes and completion time, each
/// used part is decremented and recorded against the order, and a history row is
/// appended. Any failure rolls everything back.
///
/// # Errors
/// Returns an error if:
/// - The total is blank, not a number, negative or not finite (no store call is made)
/// - The order does not exist
/// - The order was already finalized
/// - A used part does not exist or has fewer units on hand than requested
/// - The database operation fails
#[instrument(skip(db, request), fields(order_id = request.order_id))]
pub async fn finalize_order(
    db: &DatabaseConnection,
    request: FinalizeOrder,
) -> Result<FinalizationResult> {
    let total = parse_amount(&request.total_amount)?;
    let usages = effective_usages(&request.part_usages);
    let notes = optional(request.notes);

    let txn = db.begin().await?;

    let order = ServiceOrder::find_by_id(request.order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound {
            id: request.order_id,
        })?;
    if order.completed_at.is_some() {
        return Err(Error::OrderAlreadyFinalized { id: order.id });
    }
    let previous_status = order.status;

    let now = chrono::Utc::now();
    let mut active: service_order::ActiveModel = order.into();
    active.status = Set(OrderStatus::Finalized);
    active.total_amount = Set(Some(total));
    active.notes = Set(notes);
    active.completed_at = Set(Some(now));
    active.updated_at = Set(now);
    let finalized = active.update(&txn).await?;

    let mut usage_rows = Vec::with_capacity(usages.len());
    let mut part_ids = Vec::with_capacity(usages.len());
    for (part_id, quantity) in usages {
        // Decrement before inserting so a missing part reports PartNotFound rather than
        // a foreign key failure.
        consume_stock(&txn, part_id, quantity).await?;

        let usage = order_part::ActiveModel {
            order_id: Set(finalized.id),
            part_id: Set(part_id),
            quantity: Set(quantity),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        debug!(part_id, quantity, "Part consumed");

        usage_rows.push(usage);
        if !part_ids.contains(&part_id) {
            part_ids.push(part_id);
        }
    }

    record_status_change(
        &txn,
        finalized.id,
        Some(previous_status),
        OrderStatus::Finalized,
        None,
    )
    .await?;

    let parts = if part_ids.is_empty() {
        Vec::new()
    } else {
        Part::find()
            .filter(part::Column::Id.is_in(part_ids))
            .all(&txn)
            .await?
    };

    txn.commit().await?;

    info!(
        order_number = finalized.order_number,
        total,
        parts_used = usage_rows.len(),
        "Service order finalized"
    );

    Ok(FinalizationResult {
        order: finalized,
        usages: usage_rows,
        parts,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{order, part::get_part_by_id},
        test_utils::*,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request(order_id: i64, total: &str, usages: Vec<PartUsageInput>) -> FinalizeOrder {
        FinalizeOrder {
            order_id,
            total_amount: total.to_string(),
            part_usages: usages,
            notes: None,
        }
    }

    fn usage(part_id: i64, quantity: i32) -> PartUsageInput {
        PartUsageInput {
            part_id: Some(part_id),
            quantity,
        }
    }

    #[test]
    fn test_effective_usages_drops_blank_lines() {
        let lines = [
            usage(1, 2),
            PartUsageInput {
                part_id: None,
                quantity: 3,
            },
            usage(2, 0),
            usage(3, -1),
        ];
        assert_eq!(effective_usages(&lines), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_empty_total_makes_no_store_calls() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = finalize_order(&db, request(1, "   ", vec![usage(1, 2)])).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = finalize_order(&db, request(1, "abc", vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = finalize_order(&db, request(1, "-5", vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_without_parts() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;
        let part = create_test_part(&db, "Filtro de óleo", 10).await?;

        let result = finalize_order(&db, request(order.id, "500,00", vec![])).await?;

        assert_eq!(result.order.status, OrderStatus::Finalized);
        assert_eq!(result.order.total_amount, Some(500.0));
        assert!(result.order.completed_at.is_some());
        assert!(result.usages.is_empty());
        assert!(order::get_order_part_usages(&db, order.id).await?.is_empty());
        assert_eq!(get_part_by_id(&db, part.id).await?.unwrap().quantity, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_consumes_stock() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;
        let part = create_test_part(&db, "Filtro de óleo", 10).await?;

        let mut req = request(order.id, "R$ 1.250,50", vec![usage(part.id, 2)]);
        req.notes = Some("Cliente avisado".to_string());
        let result = finalize_order(&db, req).await?;

        assert_eq!(result.order.total_amount, Some(1250.5));
        assert_eq!(result.order.notes.as_deref(), Some("Cliente avisado"));
        assert_eq!(result.parts.len(), 1);
        assert_eq!(result.parts[0].quantity, 8);

        let usages = order::get_order_part_usages(&db, order.id).await?;
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].0.order_id, order.id);
        assert_eq!(usages[0].0.part_id, part.id);
        assert_eq!(usages[0].0.quantity, 2);
        assert_eq!(get_part_by_id(&db, part.id).await?.unwrap().quantity, 8);

        let history = order::get_order_history(&db, order.id).await?;
        let last = history.last().unwrap();
        assert_eq!(last.previous_status, Some(OrderStatus::ToReceive));
        assert_eq!(last.new_status, OrderStatus::Finalized);
        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;
        let plenty = create_test_part(&db, "Óleo 5W30", 10).await?;
        let scarce = create_test_part(&db, "Correia dentada", 1).await?;

        let result = finalize_order(
            &db,
            request(order.id, "300", vec![usage(plenty.id, 4), usage(scarce.id, 2)]),
        )
        .await;

        match result.unwrap_err() {
            Error::InsufficientStock {
                part,
                available,
                requested,
            } => {
                assert_eq!(part, "Correia dentada");
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing persisted, including the first decrement
        assert_eq!(get_part_by_id(&db, plenty.id).await?.unwrap().quantity, 10);
        assert_eq!(get_part_by_id(&db, scarce.id).await?.unwrap().quantity, 1);
        assert!(order::get_order_part_usages(&db, order.id).await?.is_empty());
        let reloaded = order::get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(reloaded.status, OrderStatus::ToReceive);
        assert!(reloaded.completed_at.is_none());
        assert!(reloaded.total_amount.is_none());
        assert_eq!(order::get_order_history(&db, order.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_part_is_reported() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;

        let result = finalize_order(&db, request(order.id, "100", vec![usage(999, 1)])).await;
        assert!(matches!(result.unwrap_err(), Error::PartNotFound { id: 999 }));

        let reloaded = order::get_order_by_id(&db, order.id).await?.unwrap();
        assert!(reloaded.completed_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_finalize_twice_is_rejected() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;
        let part = create_test_part(&db, "Pastilha", 5).await?;

        finalize_order(&db, request(order.id, "200", vec![usage(part.id, 1)])).await?;
        // Moving the order on afterwards does not reopen it for finalization
        order::update_order_status(&db, order.id, OrderStatus::ReadyForPickup, None).await?;

        let again = finalize_order(&db, request(order.id, "200", vec![usage(part.id, 1)])).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::OrderAlreadyFinalized { .. }
        ));
        assert_eq!(get_part_by_id(&db, part.id).await?.unwrap().quantity, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_order() -> Result<()> {
        let db = setup_test_db().await?;
        let result = finalize_order(&db, request(42, "10", vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::OrderNotFound { id: 42 }));
        Ok(())
    }
}
