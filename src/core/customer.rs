//! Customer business logic - list, search, create, update and delete customers.
//!
//! Only name and phone are required. Deleting a customer who still owns vehicles or
//! orders is refused by the store and reported as `HasDependents`.

use crate::{
    core::{MIN_SEARCH_LEN, matches_any, optional, required, search_key},
    entities::{Customer, customer},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Editable customer fields, as entered in the customer form.
#[derive(Debug, Clone, Default)]
pub struct CustomerDetails {
    /// Full name (required)
    pub name: String,
    /// Phone number (required)
    pub phone: String,
    /// E-mail address
    pub email: Option<String>,
    /// Tax identifier (CPF/CNPJ)
    pub tax_id: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

struct ValidCustomer {
    name: String,
    phone: String,
    email: Option<String>,
    tax_id: Option<String>,
    address: Option<String>,
}

impl CustomerDetails {
    fn validate(self) -> Result<ValidCustomer> {
        Ok(ValidCustomer {
            name: required(&self.name, "Customer name")?,
            phone: required(&self.phone, "Customer phone")?,
            email: optional(self.email),
            tax_id: optional(self.tax_id),
            address: optional(self.address),
        })
    }
}

/// Retrieves every customer ordered alphabetically by name.
pub async fn get_all_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>> {
    Customer::find()
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by id.
pub async fn get_customer_by_id(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Searches customers whose name, phone or e-mail contains `term` (case-insensitive,
/// accents included).
///
/// Terms shorter than [`MIN_SEARCH_LEN`] characters return an empty list without
/// querying the store.
pub async fn search_customers(db: &DatabaseConnection, term: &str) -> Result<Vec<customer::Model>> {
    if term.trim().chars().count() < MIN_SEARCH_LEN {
        return Ok(Vec::new());
    }

    let key = search_key(term);
    let mut customers = get_all_customers(db).await?;
    customers.retain(|c| {
        matches_any(
            &key,
            [Some(c.name.as_str()), Some(c.phone.as_str()), c.email.as_deref()],
        )
    });
    Ok(customers)
}

/// Registers a new customer.
///
/// # Errors
/// * `Validation` if name or phone is blank
/// * `Database` if the insert fails
#[instrument(skip(db, details))]
pub async fn create_customer(
    db: &DatabaseConnection,
    details: CustomerDetails,
) -> Result<customer::Model> {
    let valid = details.validate()?;

    let customer = customer::ActiveModel {
        name: Set(valid.name),
        phone: Set(valid.phone),
        email: Set(valid.email),
        tax_id: Set(valid.tax_id),
        address: Set(valid.address),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let created = customer.insert(db).await?;
    info!(customer_id = created.id, "Customer registered");
    Ok(created)
}

/// Replaces the editable fields of an existing customer.
///
/// # Errors
/// * `Validation` if name or phone is blank
/// * `CustomerNotFound` if no customer has this id
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    details: CustomerDetails,
) -> Result<customer::Model> {
    let valid = details.validate()?;

    let mut customer: customer::ActiveModel = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?
        .into();

    customer.name = Set(valid.name);
    customer.phone = Set(valid.phone);
    customer.email = Set(valid.email);
    customer.tax_id = Set(valid.tax_id);
    customer.address = Set(valid.address);

    customer.update(db).await.map_err(Into::into)
}

/// Deletes a customer.
///
/// # Errors
/// * `CustomerNotFound` if no customer has this id
/// * `HasDependents` if vehicles or orders still reference the customer
#[instrument(skip(db))]
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let result = Customer::delete_by_id(customer_id)
        .exec(db)
        .await
        .map_err(|e| Error::from_delete(e, "customer", customer_id))?;

    if result.rows_affected == 0 {
        return Err(Error::CustomerNotFound { id: customer_id });
    }
    info!("Customer deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_customer_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_customer(
            &db,
            CustomerDetails {
                name: "  ".to_string(),
                phone: "11 99999-0000".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_customer(
            &db,
            CustomerDetails {
                name: "Maria".to_string(),
                phone: String::new(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_normalizes_optional_fields() -> Result<()> {
        let db = setup_test_db().await?;

        let customer = create_customer(
            &db,
            CustomerDetails {
                name: " Maria Silva ".to_string(),
                phone: "11 99999-0000".to_string(),
                email: Some("   ".to_string()),
                tax_id: Some("123.456.789-00".to_string()),
                address: None,
            },
        )
        .await?;

        assert_eq!(customer.name, "Maria Silva");
        assert_eq!(customer.email, None);
        assert_eq!(customer.tax_id.as_deref(), Some("123.456.789-00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_customers_by_name_and_phone() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_customer(&db, "Maria Silva", "11 99999-0000").await?;
        create_custom_customer(&db, "João Souza", "21 98888-1111").await?;

        let by_name = search_customers(&db, "silva").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Maria Silva");

        let by_phone = search_customers(&db, "98888").await?;
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "João Souza");

        // Too short to search
        assert!(search_customers(&db, "M").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_customers_folds_accented_case() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_customer(&db, "JOÃO SILVA", "11 97777-0000").await?;
        create_custom_customer(&db, "Ana Paula", "11 96666-0000").await?;

        let found = search_customers(&db, "joão").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "JOÃO SILVA");

        assert_eq!(search_customers(&db, "Ão s").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_customers_sorted() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_customer(&db, "Zeca", "1").await?;
        create_custom_customer(&db, "Ana", "2").await?;

        let all = get_all_customers(&db).await?;
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Zeca"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Maria").await?;

        let updated = update_customer(
            &db,
            customer.id,
            CustomerDetails {
                name: "Maria Souza".to_string(),
                phone: "11 90000-0000".to_string(),
                email: Some("maria@example.com".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Maria Souza");
        assert_eq!(updated.email.as_deref(), Some("maria@example.com"));

        let missing = update_customer(
            &db,
            999,
            CustomerDetails {
                name: "X".to_string(),
                phone: "1".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::CustomerNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Maria").await?;

        delete_customer(&db, customer.id).await?;
        assert!(get_customer_by_id(&db, customer.id).await?.is_none());

        let again = delete_customer(&db, customer.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::CustomerNotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_customer_with_vehicle_is_refused() -> Result<()> {
        let (db, customer, _vehicle) = setup_with_vehicle().await?;

        let result = delete_customer(&db, customer.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::HasDependents {
                entity: "customer",
                ..
            }
        ));
        assert!(get_customer_by_id(&db, customer.id).await?.is_some());
        Ok(())
    }
}
