//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod customer;
pub mod order_history;
pub mod order_part;
pub mod part;
pub mod service_order;
pub mod vehicle;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use order_history::{
    Column as OrderHistoryColumn, Entity as OrderHistory, Model as OrderHistoryModel,
};
pub use order_part::{Column as OrderPartColumn, Entity as OrderPart, Model as OrderPartModel};
pub use part::{Column as PartColumn, Entity as Part, Model as PartModel};
pub use service_order::{
    Column as ServiceOrderColumn, Entity as ServiceOrder, Model as ServiceOrderModel, OrderStatus,
};
pub use vehicle::{Column as VehicleColumn, Entity as Vehicle, Model as VehicleModel};
