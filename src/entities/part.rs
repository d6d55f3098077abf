//! Part entity - Inventory items consumed by service orders.
//!
//! `quantity` is the on-hand stock. It is set when the part is registered and after
//! that only moves through finalization (decrement) and restocking (increment).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Part database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    /// Unique identifier for the part
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Part name (e.g., "Filtro de óleo")
    pub name: String,
    /// Optional manufacturer or internal code
    pub code: Option<String>,
    /// Quantity on hand
    pub quantity: i32,
    /// Stock level at or below which the part is reported as low
    pub minimum_quantity: i32,
    /// Purchase price per unit
    pub cost_price: f64,
    /// Sale price per unit
    pub sale_price: f64,
    /// Supplier name
    pub supplier: Option<String>,
    /// Shelf or bin location in the shop
    pub location: Option<String>,
    /// When the part was registered
    pub created_at: DateTime,
    /// When the part was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Part and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One part appears in many order usages
    #[sea_orm(has_many = "super::order_part::Entity")]
    Usages,
}

impl Related<super::order_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
