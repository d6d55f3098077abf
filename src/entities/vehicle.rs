//! Vehicle entity - A car registered to exactly one customer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    /// Unique identifier for the vehicle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning customer
    pub customer_id: i64,
    /// License plate, stored upper-cased
    pub plate: String,
    /// Manufacturer (e.g., "Fiat")
    pub make: String,
    /// Model name (e.g., "Uno")
    pub model: String,
    /// Model year
    pub year: Option<i32>,
    /// Body color
    pub color: Option<String>,
    /// Odometer reading in kilometers
    pub odometer_km: Option<i64>,
    /// When the vehicle was registered
    pub created_at: DateTime,
}

/// Defines relationships between Vehicle and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vehicle belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Customer,
    /// One vehicle has many service orders
    #[sea_orm(has_many = "super::service_order::Entity")]
    ServiceOrders,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
