//! Order status history entity - One row per status change of a service order.

use super::service_order::OrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status change database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_order_history")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Service order whose status changed
    pub order_id: i64,
    /// Status before the change, `None` when the order was just opened
    pub previous_status: Option<OrderStatus>,
    /// Status after the change
    pub new_status: OrderStatus,
    /// Optional free-text note entered with the change
    pub note: Option<String>,
    /// When the change happened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between history rows and service orders
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each history row belongs to one service order
    #[sea_orm(
        belongs_to = "super::service_order::Entity",
        from = "Column::OrderId",
        to = "super::service_order::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ServiceOrder,
}

impl Related<super::service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
