//! Dashboard Discord command - a one-glance summary of the shop.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{dashboard, money::format_currency},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows customer, vehicle, order and stock counters plus this month's revenue.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let stats = dashboard::get_dashboard_stats(&ctx.data().database).await?;

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{} - Dashboard**", ctx.data().shop.name))
            .color(0x0034_98DB)
            .fields(vec![
                ("👤 Customers", stats.customers.to_string(), true),
                ("🚗 Vehicles", stats.vehicles.to_string(), true),
                ("📦 Parts", stats.parts.to_string(), true),
                ("🛠️ Open orders", stats.open_orders.to_string(), true),
                ("✅ Finalized orders", stats.finalized_orders.to_string(), true),
                ("⚠️ Low stock", stats.low_stock_parts.to_string(), true),
                (
                    "💰 Revenue this month",
                    format_currency(stats.month_revenue),
                    false,
                ),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
