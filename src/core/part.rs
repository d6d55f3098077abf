//! Parts inventory business logic - Handles part registration, lookup, restocking and
//! low-stock reporting.
//!
//! Stock on hand is only ever changed with atomic `quantity = quantity ± n` updates, here
//! for restocking and in [`crate::core::finalize`] for consumption. Editing a part's
//! details never touches its quantity.

use crate::{
    core::{matches_any, money::validate_amount, optional, required, search_key},
    entities::{Part, part},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Editable part fields, as entered in the part form.
#[derive(Debug, Clone, Default)]
pub struct PartDetails {
    /// Part name (required)
    pub name: String,
    /// Manufacturer or internal code
    pub code: Option<String>,
    /// Low-stock threshold
    pub minimum_quantity: i32,
    /// Purchase price per unit
    pub cost_price: f64,
    /// Sale price per unit
    pub sale_price: f64,
    /// Supplier name
    pub supplier: Option<String>,
    /// Shelf or bin location
    pub location: Option<String>,
}

struct ValidPart {
    name: String,
    code: Option<String>,
    minimum_quantity: i32,
    cost_price: f64,
    sale_price: f64,
    supplier: Option<String>,
    location: Option<String>,
}

impl PartDetails {
    fn validate(self) -> Result<ValidPart> {
        let name = required(&self.name, "Part name")?;
        if self.minimum_quantity < 0 {
            return Err(Error::validation("Minimum quantity cannot be negative"));
        }
        Ok(ValidPart {
            name,
            code: optional(self.code),
            minimum_quantity: self.minimum_quantity,
            cost_price: validate_amount(self.cost_price)?,
            sale_price: validate_amount(self.sale_price)?,
            supplier: optional(self.supplier),
            location: optional(self.location),
        })
    }
}

/// Retrieves all parts ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_parts(db: &DatabaseConnection) -> Result<Vec<part::Model>> {
    Part::find()
        .order_by_asc(part::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific part by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_part_by_id(db: &DatabaseConnection, part_id: i64) -> Result<Option<part::Model>> {
    Part::find_by_id(part_id).one(db).await.map_err(Into::into)
}

/// Finds a part by its exact name. Used by the chat commands, where staff pick parts by
/// name from autocomplete.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_part_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<part::Model>> {
    Part::find()
        .filter(part::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Searches parts whose name, code or supplier contains `term` (case-insensitive).
/// A blank term matches every part.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_parts(db: &DatabaseConnection, term: &str) -> Result<Vec<part::Model>> {
    let key = search_key(term);
    let mut parts = get_all_parts(db).await?;
    parts.retain(|p| {
        matches_any(
            &key,
            [Some(p.name.as_str()), p.code.as_deref(), p.supplier.as_deref()],
        )
    });
    Ok(parts)
}

/// Parts whose stock is at or below their minimum quantity.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_low_stock_parts(db: &DatabaseConnection) -> Result<Vec<part::Model>> {
    Part::find()
        .filter(Expr::col(part::Column::Quantity).lte(Expr::col(part::Column::MinimumQuantity)))
        .order_by_asc(part::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a new part with its opening stock.
///
/// # Errors
/// Returns an error if:
/// - The name is blank
/// - The opening or minimum quantity is negative
/// - A price is negative or not finite
/// - The database insert operation fails
#[instrument(skip(db, details))]
pub async fn create_part(
    db: &DatabaseConnection,
    details: PartDetails,
    opening_quantity: i32,
) -> Result<part::Model> {
    let valid = details.validate()?;
    if opening_quantity < 0 {
        return Err(Error::validation("Quantity cannot be negative"));
    }

    let now = chrono::Utc::now().naive_utc();
    let part = part::ActiveModel {
        name: Set(valid.name),
        code: Set(valid.code),
        quantity: Set(opening_quantity),
        minimum_quantity: Set(valid.minimum_quantity),
        cost_price: Set(valid.cost_price),
        sale_price: Set(valid.sale_price),
        supplier: Set(valid.supplier),
        location: Set(valid.location),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = part.insert(db).await?;
    info!(part_id = created.id, name = %created.name, "Part registered");
    Ok(created)
}

/// Updates a part's details. The quantity on hand is left unchanged.
///
/// # Errors
/// Returns an error if validation fails or the part does not exist.
pub async fn update_part(
    db: &DatabaseConnection,
    part_id: i64,
    details: PartDetails,
) -> Result<part::Model> {
    let valid = details.validate()?;

    let mut part: part::ActiveModel = Part::find_by_id(part_id)
        .one(db)
        .await?
        .ok_or(Error::PartNotFound { id: part_id })?
        .into();

    part.name = Set(valid.name);
    part.code = Set(valid.code);
    part.minimum_quantity = Set(valid.minimum_quantity);
    part.cost_price = Set(valid.cost_price);
    part.sale_price = Set(valid.sale_price);
    part.supplier = Set(valid.supplier);
    part.location = Set(valid.location);
    part.updated_at = Set(chrono::Utc::now().naive_utc());

    part.update(db).await.map_err(Into::into)
}

/// Adds received units to a part's stock with a single atomic update.
///
/// # Errors
/// Returns an error if:
/// - `quantity` is not positive
/// - The part does not exist
#[instrument(skip(db))]
pub async fn restock_part(
    db: &DatabaseConnection,
    part_id: i64,
    quantity: i32,
) -> Result<part::Model> {
    if quantity <= 0 {
        return Err(Error::validation("Restock quantity must be positive"));
    }

    let result = Part::update_many()
        .col_expr(
            part::Column::Quantity,
            Expr::col(part::Column::Quantity).add(quantity),
        )
        .col_expr(
            part::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(part::Column::Id.eq(part_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::PartNotFound { id: part_id });
    }

    let part = Part::find_by_id(part_id)
        .one(db)
        .await?
        .ok_or(Error::PartNotFound { id: part_id })?;
    info!(on_hand = part.quantity, "Part restocked");
    Ok(part)
}

/// Deletes a part.
///
/// # Errors
/// * `PartNotFound` if no part has this id
/// * `HasDependents` if a finalized order recorded usage of the part
#[instrument(skip(db))]
pub async fn delete_part(db: &DatabaseConnection, part_id: i64) -> Result<()> {
    let result = Part::delete_by_id(part_id)
        .exec(db)
        .await
        .map_err(|e| Error::from_delete(e, "part", part_id))?;

    if result.rows_affected == 0 {
        return Err(Error::PartNotFound { id: part_id });
    }
    info!("Part deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::finalize::{FinalizeOrder, PartUsageInput, finalize_order};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_part_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Blank name
        let result = create_part(&db, PartDetails::default(), 1).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Negative price
        let details = PartDetails {
            name: "Filtro".to_string(),
            sale_price: -1.0,
            ..Default::default()
        };
        let result = create_part(&db, details, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        // Negative opening stock
        let details = PartDetails {
            name: "Filtro".to_string(),
            ..Default::default()
        };
        let result = create_part(&db, details, -3).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_lookup_part() -> Result<()> {
        let db = setup_test_db().await?;
        let part = create_test_part(&db, "Filtro de óleo", 10).await?;

        assert_eq!(part.quantity, 10);
        let by_name = get_part_by_name(&db, "Filtro de óleo").await?.unwrap();
        assert_eq!(by_name.id, part.id);
        assert!(get_part_by_id(&db, part.id + 1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_part_keeps_quantity() -> Result<()> {
        let db = setup_test_db().await?;
        let part = create_test_part(&db, "Pastilha", 4).await?;

        let updated = update_part(
            &db,
            part.id,
            PartDetails {
                name: "Pastilha de freio".to_string(),
                minimum_quantity: 2,
                cost_price: 30.0,
                sale_price: 55.0,
                supplier: Some("Bosch".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Pastilha de freio");
        assert_eq!(updated.sale_price, 55.0);
        assert_eq!(updated.quantity, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_part_adds_atomically() -> Result<()> {
        let db = setup_test_db().await?;
        let part = create_test_part(&db, "Vela", 2).await?;

        let restocked = restock_part(&db, part.id, 5).await?;
        assert_eq!(restocked.quantity, 7);

        let result = restock_part(&db, part.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = restock_part(&db, 999, 1).await;
        assert!(matches!(result.unwrap_err(), Error::PartNotFound { id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_low_stock_parts() -> Result<()> {
        let db = setup_test_db().await?;
        // create_test_part uses a minimum of 2
        create_test_part(&db, "Correia", 1).await?;
        create_test_part(&db, "Junta", 2).await?;
        create_test_part(&db, "Óleo 5W30", 20).await?;

        let low = get_low_stock_parts(&db).await?;
        let names: Vec<_> = low.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Correia", "Junta"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_parts_by_supplier_and_code() -> Result<()> {
        let db = setup_test_db().await?;
        create_part(
            &db,
            PartDetails {
                name: "Amortecedor".to_string(),
                code: Some("AM-220".to_string()),
                supplier: Some("Cofap".to_string()),
                ..Default::default()
            },
            3,
        )
        .await?;
        create_test_part(&db, "Filtro de ar", 3).await?;

        assert_eq!(search_parts(&db, "cofap").await?.len(), 1);
        assert_eq!(search_parts(&db, "am-2").await?.len(), 1);
        assert_eq!(search_parts(&db, "filtro").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_parts_single_character_and_accents() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_part(&db, "X", 1).await?;
        create_test_part(&db, "LÂMPADA H4", 6).await?;

        let found = search_parts(&db, "x").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "X");

        assert_eq!(search_parts(&db, "lâmpada").await?.len(), 1);
        assert_eq!(search_parts(&db, " ").await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_part() -> Result<()> {
        let db = setup_test_db().await?;
        let part = create_test_part(&db, "Lâmpada", 1).await?;

        delete_part(&db, part.id).await?;
        assert!(get_all_parts(&db).await?.is_empty());

        let again = delete_part(&db, part.id).await;
        assert!(matches!(again.unwrap_err(), Error::PartNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_part_used_on_an_order_is_refused() -> Result<()> {
        let (db, _customer, _vehicle, order) = setup_with_order().await?;
        let part = create_test_part(&db, "Pastilha de freio", 4).await?;

        finalize_order(
            &db,
            FinalizeOrder {
                order_id: order.id,
                total_amount: "300,00".to_string(),
                part_usages: vec![PartUsageInput {
                    part_id: Some(part.id),
                    quantity: 2,
                }],
                notes: None,
            },
        )
        .await?;

        let err = delete_part(&db, part.id).await.unwrap_err();
        assert!(matches!(
            err,
            Error::HasDependents { entity: "part", id } if id == part.id
        ));
        assert_eq!(get_part_by_id(&db, part.id).await?.unwrap().quantity, 2);
        Ok(())
    }
}
