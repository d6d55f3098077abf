//! Service order Discord commands - `/order open|list|info|status|finalize|delete`.
//!
//! Orders are addressed by their human-facing number. Finalization takes up to three
//! part/quantity pairs; blank pairs are ignored.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, parse_date, reply_user_error},
        core::{
            finalize::{self, FinalizeOrder, PartUsageInput},
            money::{format_currency, parse_amount},
            order::{self, NewOrder, OrderWithRelations},
            part,
            vehicle::format_plate,
        },
        entities::{OrderStatus, service_order},
        errors::{Error, Result},
    };
    use chrono::NaiveDate;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const DATE_FORMAT: &str = "%d/%m/%Y";

    /// Looks an order up by number, telling the user when it does not exist.
    async fn find_order(
        ctx: poise::Context<'_, BotData, Error>,
        number: i64,
    ) -> Result<Option<service_order::Model>> {
        let found = order::get_order_by_number(&ctx.data().database, number).await?;
        if found.is_none() {
            ctx.say(format!("❌ Order #{number} not found.")).await?;
        }
        Ok(found)
    }

    fn parse_status(label: &str) -> Result<OrderStatus> {
        OrderStatus::from_label(label)
            .ok_or_else(|| Error::validation(format!("'{label}' is not an order status")))
    }

    /// Optional `/order open` arguments that arrive as text.
    type OpenOptions = (Option<NaiveDate>, Option<f64>, Option<OrderStatus>);

    fn parse_open_options(
        expected_date: Option<&str>,
        estimated_budget: Option<&str>,
        status: Option<&str>,
    ) -> Result<OpenOptions> {
        Ok((
            expected_date.map(parse_date).transpose()?,
            estimated_budget.map(parse_amount).transpose()?,
            status.map(parse_status).transpose()?,
        ))
    }

    fn order_title(order: &service_order::Model) -> String {
        order
            .order_number
            .map_or_else(|| format!("Order {}", order.id), |n| format!("OS #{n}"))
    }

    fn order_field(entry: &OrderWithRelations) -> (String, String, bool) {
        let customer = entry
            .customer
            .as_ref()
            .map_or("?", |c| c.name.as_str());
        let plate = entry
            .vehicle
            .as_ref()
            .map_or_else(|| "?".to_string(), |v| format_plate(&v.plate));
        let total = entry
            .order
            .total_amount
            .map(|t| format!(" · {}", format_currency(t)))
            .unwrap_or_default();
        (
            format!("{} · {}", order_title(&entry.order), entry.order.status),
            format!(
                "👤 {customer} · 🚗 {plate}\n🔧 {}{total}",
                entry.order.requested_service
            ),
            false,
        )
    }

    /// Parent command for service orders.
    #[poise::command(
        slash_command,
        subcommands(
            "order_open",
            "order_list",
            "order_info",
            "order_status",
            "order_finalize",
            "order_delete"
        )
    )]
    pub async fn order(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Service orders. Subcommands: `open`, `list`, `info`, `status`, `finalize`, `delete`.",
        )
        .await?;
        Ok(())
    }

    /// Opens a new service order for a customer's vehicle.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "open")]
    pub async fn order_open(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer ID"] customer_id: i64,
        #[description = "Vehicle ID (must belong to the customer)"] vehicle_id: i64,
        #[description = "Requested service"]
        #[autocomplete = "autocomplete::autocomplete_service"]
        service: String,
        #[description = "Another service"]
        #[autocomplete = "autocomplete::autocomplete_service"]
        service2: Option<String>,
        #[description = "Another service"]
        #[autocomplete = "autocomplete::autocomplete_service"]
        service3: Option<String>,
        #[description = "Responsible mechanic"]
        #[autocomplete = "autocomplete::autocomplete_mechanic"]
        mechanic: Option<String>,
        #[description = "Problem description"] description: Option<String>,
        #[description = "Promised date (YYYY-MM-DD)"] expected_date: Option<String>,
        #[description = "Estimate (e.g., 350,00)"] estimated_budget: Option<String>,
        #[description = "Initial status (default: A Receber)"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: Option<String>,
    ) -> Result<()> {
        let shop = &ctx.data().shop;

        let mut services = Vec::new();
        for requested in [Some(service), service2, service3].into_iter().flatten() {
            let Some(canonical) = shop.canonical_service(&requested) else {
                ctx.say(format!(
                    "❌ '{}' is not in the service catalog.",
                    requested.trim()
                ))
                .await?;
                return Ok(());
            };
            services.push(canonical.to_string());
        }

        if let Some(name) = mechanic.as_deref().filter(|m| !shop.is_known_mechanic(m)) {
            ctx.say(format!(
                "❌ '{name}' is not on the mechanic roster ({}).",
                shop.mechanics.join(", ")
            ))
            .await?;
            return Ok(());
        }

        let parsed = parse_open_options(
            expected_date.as_deref(),
            estimated_budget.as_deref(),
            status.as_deref(),
        );
        let (expected_date, estimated_budget, status) = match parsed {
            Ok(values) => values,
            Err(e) => return reply_user_error(ctx, e).await,
        };

        let new_order = NewOrder {
            customer_id,
            vehicle_id,
            services,
            description,
            mechanic,
            expected_date,
            estimated_budget,
            status,
        };

        match order::create_order(&ctx.data().database, new_order).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ {} opened: {} ({}).",
                    order_title(&created),
                    created.requested_service,
                    created.status
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Lists orders, newest first, optionally filtered by status or search text.
    #[poise::command(slash_command, rename = "list")]
    pub async fn order_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only orders with this status"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: Option<String>,
        #[description = "Order number, customer name or plate"] search: Option<String>,
    ) -> Result<()> {
        let status_filter = match status.as_deref().map(parse_status).transpose() {
            Ok(filter) => filter,
            Err(e) => return reply_user_error(ctx, e).await,
        };

        let orders = order::search_orders(
            &ctx.data().database,
            search.as_deref().unwrap_or_default(),
            status_filter,
        )
        .await?;

        if orders.is_empty() {
            ctx.say("No service orders found.").await?;
            return Ok(());
        }

        let fields: Vec<_> = orders.iter().take(25).map(order_field).collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Service Orders**")
            .color(0x0034_98DB)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} order(s)",
                orders.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows one order with its parts and status history.
    #[poise::command(slash_command, rename = "info")]
    pub async fn order_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] number: i64,
    ) -> Result<()> {
        let Some(found) = find_order(ctx, number).await? else {
            return Ok(());
        };
        let db = &ctx.data().database;

        let customer = crate::core::customer::get_customer_by_id(db, found.customer_id).await?;
        let vehicle = crate::core::vehicle::get_vehicle_by_id(db, found.vehicle_id).await?;
        let usages = order::get_order_part_usages(db, found.id).await?;
        let history = order::get_order_history(db, found.id).await?;

        let mut details = String::new();
        writeln!(
            &mut details,
            "👤 {}",
            customer.map_or_else(|| "?".to_string(), |c| format!("{} ({})", c.name, c.phone))
        )?;
        writeln!(
            &mut details,
            "🚗 {}",
            vehicle.map_or_else(
                || "?".to_string(),
                |v| format!("{} {} {}", format_plate(&v.plate), v.make, v.model)
            )
        )?;
        writeln!(&mut details, "🔧 {}", found.requested_service)?;
        if let Some(mechanic) = &found.mechanic {
            writeln!(&mut details, "🧑‍🔧 {mechanic}")?;
        }
        if let Some(description) = &found.description {
            writeln!(&mut details, "📝 {description}")?;
        }
        writeln!(
            &mut details,
            "📥 Entry: {}",
            found.entry_date.format(DATE_FORMAT)
        )?;
        if let Some(expected) = found.expected_date {
            writeln!(&mut details, "📅 Promised: {}", expected.format(DATE_FORMAT))?;
        }
        if let Some(budget) = found.estimated_budget {
            writeln!(&mut details, "💬 Estimate: {}", format_currency(budget))?;
        }
        if let Some(total) = found.total_amount {
            writeln!(&mut details, "💰 Total: **{}**", format_currency(total))?;
        }
        if let Some(completed) = found.completed_at {
            writeln!(
                &mut details,
                "✅ Finalized: {}",
                completed.format(DATE_FORMAT)
            )?;
        }
        if let Some(notes) = &found.notes {
            writeln!(&mut details, "🗒️ {notes}")?;
        }

        let mut parts_text = String::new();
        for (usage, used_part) in &usages {
            let name = used_part.as_ref().map_or("?", |p| p.name.as_str());
            writeln!(&mut parts_text, "• {} × {name}", usage.quantity)?;
        }
        if parts_text.is_empty() {
            parts_text.push_str("None");
        }

        let mut history_text = String::new();
        for change in &history {
            let from = change
                .previous_status
                .map_or_else(|| "new".to_string(), |s| s.to_string());
            write!(
                &mut history_text,
                "• {} {from} → {}",
                change.created_at.format("%d/%m %H:%M"),
                change.new_status
            )?;
            if let Some(note) = &change.note {
                write!(&mut history_text, " ({note})")?;
            }
            history_text.push('\n');
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}** · {}", order_title(&found), found.status))
            .description(details)
            .color(if found.status.is_open() {
                0x00F3_9C12
            } else {
                0x0000_FF00
            })
            .field("Parts used", parts_text, false)
            .field("History", history_text, false);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Moves an order to any status.
    #[poise::command(slash_command, rename = "status")]
    pub async fn order_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] number: i64,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: String,
        #[description = "Note for the history"] note: Option<String>,
    ) -> Result<()> {
        let status = match parse_status(&status) {
            Ok(status) => status,
            Err(e) => return reply_user_error(ctx, e).await,
        };
        let Some(found) = find_order(ctx, number).await? else {
            return Ok(());
        };

        match order::update_order_status(&ctx.data().database, found.id, status, note).await {
            Ok(updated) => {
                ctx.say(format!(
                    "🔄 {} is now **{}**.",
                    order_title(&updated),
                    updated.status
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Finalizes an order: sets the total and consumes the parts used.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "finalize")]
    pub async fn order_finalize(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] number: i64,
        #[description = "Total charged (e.g., 500,00)"] total: String,
        #[description = "Part used"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        part1: Option<String>,
        #[description = "Units of part 1 (default 1)"] qty1: Option<i32>,
        #[description = "Part used"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        part2: Option<String>,
        #[description = "Units of part 2 (default 1)"] qty2: Option<i32>,
        #[description = "Part used"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        part3: Option<String>,
        #[description = "Units of part 3 (default 1)"] qty3: Option<i32>,
        #[description = "Closing notes"] notes: Option<String>,
    ) -> Result<()> {
        let Some(found) = find_order(ctx, number).await? else {
            return Ok(());
        };
        let db = &ctx.data().database;

        let mut part_usages = Vec::new();
        for (name, quantity) in [(part1, qty1), (part2, qty2), (part3, qty3)] {
            let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
                continue;
            };
            let Some(found_part) = part::get_part_by_name(db, &name).await? else {
                ctx.say(format!("❌ Part '{name}' not found.")).await?;
                return Ok(());
            };
            part_usages.push(PartUsageInput {
                part_id: Some(found_part.id),
                quantity: quantity.unwrap_or(1),
            });
        }

        let request = FinalizeOrder {
            order_id: found.id,
            total_amount: total,
            part_usages,
            notes,
        };

        match finalize::finalize_order(db, request).await {
            Ok(result) => {
                let mut message = format!(
                    "✅ {} finalized. Total: **{}**",
                    order_title(&result.order),
                    format_currency(result.order.total_amount.unwrap_or_default())
                );
                for used in &result.parts {
                    write!(
                        &mut message,
                        "\n📦 {}: {} left",
                        used.name, used.quantity
                    )?;
                    if used.quantity <= used.minimum_quantity {
                        message.push_str(" ⚠️ low stock");
                    }
                }
                ctx.say(message).await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Deletes an order with its part usages and history.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn order_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] number: i64,
    ) -> Result<()> {
        let Some(found) = find_order(ctx, number).await? else {
            return Ok(());
        };

        match order::delete_order(&ctx.data().database, found.id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ {} deleted.", order_title(&found)))
                    .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
