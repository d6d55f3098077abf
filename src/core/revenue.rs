//! Revenue reporting business logic.
//!
//! Aggregates the totals of finalized orders over a chosen window and compares them
//! with the calendar month before. Windows are half-open `[start, end)` in UTC.
//! [`resolve_window`] is pure, so every period can be tested against a fixed "now".

use crate::{
    entities::{Customer, OrderStatus, ServiceOrder, Vehicle, service_order},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{DatabaseConnection, LoaderTrait, QueryOrder, prelude::*};
use tracing::{debug, instrument};

/// Period selector on the revenue screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevenuePeriod {
    /// From the first day of this month until now
    #[default]
    CurrentMonth,
    /// The whole previous calendar month
    PreviousMonth,
    /// The last 30 days until now
    Last30Days,
    /// The last 90 days until now
    Last90Days,
    /// From January 1st until now
    CurrentYear,
    /// Explicit dates, both inclusive. Falls back to the current month unless both are set.
    Custom {
        /// First day included
        start: Option<NaiveDate>,
        /// Last day included
        end: Option<NaiveDate>,
    },
}

/// A half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindow {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

/// One finalized order in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueEntry {
    /// Order id
    pub order_id: i64,
    /// Human-facing order number
    pub order_number: Option<i64>,
    /// Customer name, if the customer row could be loaded
    pub customer_name: Option<String>,
    /// Vehicle plate, if the vehicle row could be loaded
    pub plate: Option<String>,
    /// When the order was finalized
    pub completed_at: DateTime<Utc>,
    /// Billed total
    pub total_amount: f64,
}

/// Revenue figures for one window, compared with the previous calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueReport {
    /// Window the figures cover
    pub window: RevenueWindow,
    /// Finalized orders in the window, most recent first
    pub entries: Vec<RevenueEntry>,
    /// Sum of totals in the window
    pub total: f64,
    /// Number of finalized orders in the window
    pub count: usize,
    /// `total / count`, 0 when there are no orders
    pub average: f64,
    /// Sum of totals in the previous calendar month
    pub previous_total: f64,
    /// Change versus the previous month in percent, 0 when that month had no revenue
    pub percent_change: f64,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn first_of_previous_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) - Duration::days(1))
}

/// Resolves a period into concrete bounds relative to `now`.
///
/// Windows that run "until now" end one microsecond after `now` so an order finalized
/// at this very instant is included.
///
/// # Errors
/// Returns `Error::Validation` if a custom end date is the last representable day.
pub fn resolve_window(period: RevenuePeriod, now: DateTime<Utc>) -> Result<RevenueWindow> {
    let today = now.date_naive();
    let until_now = now + Duration::microseconds(1);

    let window = match period {
        RevenuePeriod::CurrentMonth => RevenueWindow {
            start: start_of_day(first_of_month(today)),
            end: until_now,
        },
        RevenuePeriod::PreviousMonth => previous_month_window(now),
        RevenuePeriod::Last30Days => RevenueWindow {
            start: now - Duration::days(30),
            end: until_now,
        },
        RevenuePeriod::Last90Days => RevenueWindow {
            start: now - Duration::days(90),
            end: until_now,
        },
        RevenuePeriod::CurrentYear => RevenueWindow {
            start: start_of_day(today - Duration::days(i64::from(today.ordinal0()))),
            end: until_now,
        },
        RevenuePeriod::Custom {
            start: Some(start),
            end: Some(end),
        } => {
            let day_after = end
                .succ_opt()
                .ok_or_else(|| Error::validation(format!("End date {end} is out of range")))?;
            RevenueWindow {
                start: start_of_day(start),
                end: start_of_day(day_after),
            }
        }
        RevenuePeriod::Custom { .. } => return resolve_window(RevenuePeriod::CurrentMonth, now),
    };
    Ok(window)
}

/// The calendar month before the one containing `now`.
#[must_use]
pub fn previous_month_window(now: DateTime<Utc>) -> RevenueWindow {
    let today = now.date_naive();
    RevenueWindow {
        start: start_of_day(first_of_previous_month(today)),
        end: start_of_day(first_of_month(today)),
    }
}

/// Percentage change from `previous` to `current`. Exactly 0 when `previous` is 0.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

async fn finalized_orders_in(
    db: &DatabaseConnection,
    window: RevenueWindow,
) -> Result<Vec<service_order::Model>> {
    ServiceOrder::find()
        .filter(service_order::Column::Status.eq(OrderStatus::Finalized))
        .filter(service_order::Column::TotalAmount.is_not_null())
        .filter(service_order::Column::CompletedAt.gte(window.start))
        .filter(service_order::Column::CompletedAt.lt(window.end))
        .order_by_desc(service_order::Column::CompletedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

fn sum_totals(orders: &[service_order::Model]) -> f64 {
    orders.iter().filter_map(|o| o.total_amount).sum()
}

/// Builds the revenue report for `period` as of now.
///
/// # Errors
/// Returns an error if the period cannot be resolved or a database query fails.
pub async fn generate_revenue_report(
    db: &DatabaseConnection,
    period: RevenuePeriod,
) -> Result<RevenueReport> {
    generate_revenue_report_at(db, period, Utc::now()).await
}

/// Builds the revenue report for `period` as of `now`.
///
/// # Errors
/// Returns an error if the period cannot be resolved or a database query fails.
#[instrument(skip(db))]
pub async fn generate_revenue_report_at(
    db: &DatabaseConnection,
    period: RevenuePeriod,
    now: DateTime<Utc>,
) -> Result<RevenueReport> {
    let window = resolve_window(period, now)?;
    let orders = finalized_orders_in(db, window).await?;
    let previous = finalized_orders_in(db, previous_month_window(now)).await?;

    let customers = orders.load_one(Customer, db).await?;
    let vehicles = orders.load_one(Vehicle, db).await?;

    let total = sum_totals(&orders);
    let previous_total = sum_totals(&previous);
    let count = orders.len();
    // Cast safety: order counts are far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let average = if count == 0 { 0.0 } else { total / count as f64 };

    let entries = orders
        .into_iter()
        .zip(customers)
        .zip(vehicles)
        .filter_map(|((order, customer), vehicle)| {
            Some(RevenueEntry {
                order_id: order.id,
                order_number: order.order_number,
                customer_name: customer.map(|c| c.name),
                plate: vehicle.map(|v| v.plate),
                completed_at: order.completed_at?,
                total_amount: order.total_amount?,
            })
        })
        .collect();

    debug!(count, total, previous_total, "Revenue report built");

    Ok(RevenueReport {
        window,
        entries,
        total,
        count,
        average,
        previous_total,
        percent_change: percent_change(total, previous_total),
    })
}
