//! Customer entity - The people who bring vehicles into the shop.
//!
//! Only name and phone are required; everything else is optional contact data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Optional e-mail address
    pub email: Option<String>,
    /// Optional tax identifier (CPF/CNPJ)
    pub tax_id: Option<String>,
    /// Optional postal address
    pub address: Option<String>,
    /// When the customer was registered
    pub created_at: DateTime,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer owns many vehicles
    #[sea_orm(has_many = "super::vehicle::Entity")]
    Vehicles,
    /// One customer has many service orders
    #[sea_orm(has_many = "super::service_order::Entity")]
    ServiceOrders,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
