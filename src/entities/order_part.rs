//! Order part usage entity - Parts consumed when a service order is finalized.
//!
//! Rows are only ever inserted, by the finalization sequence, and never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order part usage database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_order_parts")]
pub struct Model {
    /// Unique identifier for the usage row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Service order the part was used on
    pub order_id: i64,
    /// Part that was consumed
    pub part_id: i64,
    /// Units consumed
    pub quantity: i32,
    /// When the usage was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between usages and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each usage belongs to one service order
    #[sea_orm(
        belongs_to = "super::service_order::Entity",
        from = "Column::OrderId",
        to = "super::service_order::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ServiceOrder,
    /// Each usage references one part
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Part,
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrder.def()
    }
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
