//! Home-screen counters.

use crate::{
    core::revenue::{RevenuePeriod, generate_revenue_report},
    entities::{Customer, OrderStatus, Part, ServiceOrder, Vehicle, part, service_order},
    errors::Result,
};
use sea_orm::{PaginatorTrait, prelude::*, sea_query::Expr};

/// Snapshot of the shop for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    /// Registered customers
    pub customers: u64,
    /// Registered vehicles
    pub vehicles: u64,
    /// Orders not yet finalized
    pub open_orders: u64,
    /// Finalized orders, all time
    pub finalized_orders: u64,
    /// Parts in the catalog
    pub parts: u64,
    /// Parts at or below their minimum stock
    pub low_stock_parts: u64,
    /// Revenue of finalized orders this month
    pub month_revenue: f64,
}

/// Collects the dashboard counters and this month's revenue.
///
/// # Errors
/// Returns an error if a database query fails.
pub async fn get_dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    let customers = Customer::find().count(db).await?;
    let vehicles = Vehicle::find().count(db).await?;
    let open_orders = ServiceOrder::find()
        .filter(service_order::Column::Status.ne(OrderStatus::Finalized))
        .count(db)
        .await?;
    let finalized_orders = ServiceOrder::find()
        .filter(service_order::Column::Status.eq(OrderStatus::Finalized))
        .count(db)
        .await?;
    let parts = Part::find().count(db).await?;
    let low_stock_parts = Part::find()
        .filter(Expr::col(part::Column::Quantity).lte(Expr::col(part::Column::MinimumQuantity)))
        .count(db)
        .await?;
    let month_revenue = generate_revenue_report(db, RevenuePeriod::CurrentMonth)
        .await?
        .total;

    Ok(DashboardStats {
        customers,
        vehicles,
        open_orders,
        finalized_orders,
        parts,
        low_stock_parts,
        month_revenue,
    })
}
