//! Service order entity - The "OS" (ordem de serviço), one unit of billable repair work.
//!
//! Each order is tied to one customer and one vehicle. The status is stored as its
//! shop-facing label so the table stays readable from any SQL client.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a service order. There is no enforced transition graph;
/// staff move orders between statuses by hand, and only finalization sets `Finalized`
/// together with a total.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    /// Vehicle not yet received at the shop
    #[default]
    #[sea_orm(string_value = "A Receber")]
    ToReceive,
    /// Waiting for the customer to approve the estimate
    #[sea_orm(string_value = "Aguardando Aprovação")]
    AwaitingApproval,
    /// Waiting for a part to arrive
    #[sea_orm(string_value = "Aguardando Peça")]
    AwaitingPart,
    /// Work in progress
    #[sea_orm(string_value = "Em Execução")]
    InProgress,
    /// Closed and billed
    #[sea_orm(string_value = "Finalizado")]
    Finalized,
    /// Work done, waiting for the customer to pick the vehicle up
    #[sea_orm(string_value = "Pronto para Retirada")]
    ReadyForPickup,
}

impl OrderStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 6] = [
        Self::ToReceive,
        Self::AwaitingApproval,
        Self::AwaitingPart,
        Self::InProgress,
        Self::Finalized,
        Self::ReadyForPickup,
    ];

    /// The label stored in the database and shown to staff.
    #[must_use]
    pub fn label(self) -> String {
        self.to_value()
    }

    /// Parses a label, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == wanted)
    }

    /// Whether the order still counts as open work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Finalized)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Service order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sequential, human-facing order number ("OS #12")
    pub order_number: Option<i64>,
    /// Customer the work is for
    pub customer_id: i64,
    /// Vehicle being serviced
    pub vehicle_id: i64,
    /// Requested services, catalog labels joined with ", "
    pub requested_service: String,
    /// Free-text description of the problem
    pub description: Option<String>,
    /// Mechanic responsible for the job
    pub mechanic: Option<String>,
    /// Estimate given to the customer
    pub estimated_budget: Option<f64>,
    /// Current workflow status
    pub status: OrderStatus,
    /// When the vehicle entered the shop
    pub entry_date: DateTimeUtc,
    /// Promised delivery date
    pub expected_date: Option<Date>,
    /// When the order was finalized
    pub completed_at: Option<DateTimeUtc>,
    /// Billed total, set by finalization
    pub total_amount: Option<f64>,
    /// Closing notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between ServiceOrder and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Customer,
    /// Each order is for one vehicle
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Vehicle,
    /// Parts consumed by this order
    #[sea_orm(has_many = "super::order_part::Entity")]
    PartUsages,
    /// Status history of this order
    #[sea_orm(has_many = "super::order_history::Entity")]
    History,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::order_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartUsages.def()
    }
}

impl Related<super::order_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_label(&status.label()), Some(status));
        }
    }

    #[test]
    fn test_all_lists_every_status_with_its_stored_label() {
        assert_eq!(OrderStatus::iter().collect::<Vec<_>>(), OrderStatus::ALL.to_vec());
        assert_eq!(OrderStatus::Finalized.label(), "Finalizado");
        assert_eq!(OrderStatus::AwaitingPart.to_string(), "Aguardando Peça");
    }

    #[test]
    fn test_from_label_ignores_case_and_whitespace() {
        assert_eq!(
            OrderStatus::from_label("  em execução "),
            Some(OrderStatus::InProgress)
        );
        assert_eq!(OrderStatus::from_label("Cancelado"), None);
    }

    #[test]
    fn test_only_finalized_is_closed() {
        let open: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_open()).collect();
        assert_eq!(open.len(), 5);
        assert!(!OrderStatus::Finalized.is_open());
        assert_eq!(OrderStatus::default(), OrderStatus::ToReceive);
    }
}
