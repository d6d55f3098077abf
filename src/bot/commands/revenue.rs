//! Revenue Discord command - totals of finalized orders over a period.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, parse_date, reply_user_error},
        core::{
            money::format_currency,
            revenue::{RevenuePeriod, RevenueReport, generate_revenue_report},
            vehicle::format_plate,
        },
        errors::{Error, Result},
    };
    use chrono::Duration;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Turns the command arguments into a period. Unknown names are rejected; a custom
    /// period with a missing date falls back to the current month.
    pub(crate) fn parse_period(
        period: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<RevenuePeriod> {
        let period = match period.map(|p| p.trim().to_lowercase()).as_deref() {
            None | Some("current-month") => RevenuePeriod::CurrentMonth,
            Some("previous-month") => RevenuePeriod::PreviousMonth,
            Some("last-30-days") => RevenuePeriod::Last30Days,
            Some("last-90-days") => RevenuePeriod::Last90Days,
            Some("current-year") => RevenuePeriod::CurrentYear,
            Some("custom") => RevenuePeriod::Custom {
                start: start.map(parse_date).transpose()?,
                end: end.map(parse_date).transpose()?,
            },
            Some(other) => {
                return Err(Error::validation(format!(
                    "Unknown period '{other}'. Use one of: {}",
                    autocomplete::PERIOD_CHOICES.join(", ")
                )));
            }
        };
        Ok(period)
    }

    pub(crate) fn format_change(report: &RevenueReport) -> String {
        let arrow = if report.percent_change >= 0.0 { "📈" } else { "📉" };
        format!("{arrow} {:+.1}%", report.percent_change)
    }

    /// Shows revenue, order count, average ticket and change versus last month.
    #[poise::command(slash_command, prefix_command)]
    pub async fn revenue(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Period (default: current-month)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
        #[description = "First day for a custom period (YYYY-MM-DD)"] start: Option<String>,
        #[description = "Last day for a custom period (YYYY-MM-DD)"] end: Option<String>,
    ) -> Result<()> {
        let period = match parse_period(period.as_deref(), start.as_deref(), end.as_deref()) {
            Ok(period) => period,
            Err(e) => return reply_user_error(ctx, e).await,
        };

        let report = match generate_revenue_report(&ctx.data().database, period).await {
            Ok(report) => report,
            Err(e) if e.is_user_error() => return reply_user_error(ctx, e).await,
            Err(e) => return Err(e),
        };

        let mut recent = String::new();
        for entry in report.entries.iter().take(10) {
            writeln!(
                &mut recent,
                "• OS #{} · {} · {} · {}",
                entry
                    .order_number
                    .map_or_else(|| "?".to_string(), |n| n.to_string()),
                entry.customer_name.as_deref().unwrap_or("?"),
                entry.plate.as_deref().map_or_else(|| "?".to_string(), format_plate),
                format_currency(entry.total_amount)
            )?;
        }
        if recent.is_empty() {
            recent.push_str("No finalized orders in this period.");
        }

        // The window end is exclusive; show the last day it covers.
        let last_day = (report.window.end - Duration::microseconds(1)).format("%d/%m/%Y");

        let embed = serenity::CreateEmbed::default()
            .title("**💰 Revenue Report**")
            .description(format!(
                "{} to {}",
                report.window.start.format("%d/%m/%Y"),
                last_day
            ))
            .color(0x0000_FF00)
            .fields(vec![
                ("Total", format_currency(report.total), true),
                ("Orders", report.count.to_string(), true),
                ("Average", format_currency(report.average), true),
                ("vs. last month", format_change(&report), false),
                ("Recent orders", recent, false),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
