//! Parts inventory Discord commands - `/part add|list|low_stock|restock|update|delete`.
//!
//! Parts are picked by name through autocomplete. Stock only goes up through
//! `restock` and down through order finalization.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, reply_user_error},
        core::{
            money::format_currency,
            part::{self, PartDetails},
        },
        entities::part::Model as PartModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn part_field(p: &PartModel) -> (String, String, bool) {
        let warning = if p.quantity <= p.minimum_quantity {
            " ⚠️"
        } else {
            ""
        };
        let code = p
            .code
            .as_deref()
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        let location = p
            .location
            .as_deref()
            .map(|l| format!(" · 📍 {l}"))
            .unwrap_or_default();
        (
            format!("{}{code}{warning}", p.name),
            format!(
                "Stock: **{}** (min {}) · Sale {}{location}",
                p.quantity,
                p.minimum_quantity,
                format_currency(p.sale_price)
            ),
            false,
        )
    }

    async fn send_part_list(
        ctx: poise::Context<'_, BotData, Error>,
        title: &str,
        color: u32,
        parts: &[PartModel],
    ) -> Result<()> {
        let fields: Vec<_> = parts.iter().take(25).map(part_field).collect();
        let embed = serenity::CreateEmbed::default()
            .title(title)
            .color(color)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} part(s)",
                parts.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for the parts inventory.
    #[poise::command(
        slash_command,
        subcommands(
            "part_add",
            "part_list",
            "part_low_stock",
            "part_restock",
            "part_update",
            "part_delete"
        )
    )]
    pub async fn part(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Parts inventory. Subcommands: `add`, `list`, `low_stock`, `restock`, `update`, `delete`.",
        )
        .await?;
        Ok(())
    }

    /// Registers a new part with its opening stock.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "add")]
    pub async fn part_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part name (e.g., 'Filtro de óleo')"] name: String,
        #[description = "Units on hand now"] quantity: i32,
        #[description = "Low-stock threshold"] minimum_quantity: Option<i32>,
        #[description = "Purchase price per unit"] cost_price: Option<f64>,
        #[description = "Sale price per unit"] sale_price: Option<f64>,
        #[description = "Manufacturer or internal code"] code: Option<String>,
        #[description = "Supplier"] supplier: Option<String>,
        #[description = "Shelf or bin"] location: Option<String>,
    ) -> Result<()> {
        let details = PartDetails {
            name,
            code,
            minimum_quantity: minimum_quantity.unwrap_or(0),
            cost_price: cost_price.unwrap_or(0.0),
            sale_price: sale_price.unwrap_or(0.0),
            supplier,
            location,
        };

        match part::create_part(&ctx.data().database, details, quantity).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Part **{}** registered with {} unit(s) in stock.",
                    created.name, created.quantity
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Lists all parts, or searches them by name, code or supplier.
    #[poise::command(slash_command, rename = "list")]
    pub async fn part_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name, code or supplier"] search: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let parts = match search.as_deref() {
            Some(term) => part::search_parts(db, term).await?,
            None => part::get_all_parts(db).await?,
        };

        if parts.is_empty() {
            ctx.say("No parts found. Use `/part add` to register some!")
                .await?;
            return Ok(());
        }
        send_part_list(ctx, "**Parts Inventory**", 0x0058_65F2, &parts).await
    }

    /// Lists parts at or below their minimum stock.
    #[poise::command(slash_command, rename = "low_stock")]
    pub async fn part_low_stock(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let low = part::get_low_stock_parts(&ctx.data().database).await?;
        if low.is_empty() {
            ctx.say("✅ Every part is above its minimum stock.").await?;
            return Ok(());
        }
        send_part_list(ctx, "**⚠️ Low Stock**", 0x00E7_4C3C, &low).await
    }

    /// Adds received units to a part's stock.
    #[poise::command(slash_command, rename = "restock")]
    pub async fn part_restock(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to restock"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        name: String,
        #[description = "Units received"] quantity: i32,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(found) = part::get_part_by_name(db, &name).await? else {
            ctx.say(format!("❌ Part '{name}' not found.")).await?;
            return Ok(());
        };

        match part::restock_part(db, found.id, quantity).await {
            Ok(updated) => {
                ctx.say(format!(
                    "📦 **{}** restocked: {} unit(s) on hand.",
                    updated.name, updated.quantity
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Updates a part's details. Stock is changed with `restock`, not here.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "update")]
    pub async fn part_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to update"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "Low-stock threshold"] minimum_quantity: Option<i32>,
        #[description = "Purchase price per unit"] cost_price: Option<f64>,
        #[description = "Sale price per unit"] sale_price: Option<f64>,
        #[description = "Manufacturer or internal code"] code: Option<String>,
        #[description = "Supplier"] supplier: Option<String>,
        #[description = "Shelf or bin"] location: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(current) = part::get_part_by_name(db, &name).await? else {
            ctx.say(format!("❌ Part '{name}' not found.")).await?;
            return Ok(());
        };

        let details = PartDetails {
            name: new_name.unwrap_or(current.name),
            code: code.or(current.code),
            minimum_quantity: minimum_quantity.unwrap_or(current.minimum_quantity),
            cost_price: cost_price.unwrap_or(current.cost_price),
            sale_price: sale_price.unwrap_or(current.sale_price),
            supplier: supplier.or(current.supplier),
            location: location.or(current.location),
        };

        match part::update_part(db, current.id, details).await {
            Ok(updated) => {
                ctx.say(format!("✅ Part **{}** updated.", updated.name))
                    .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Deletes a part that was never used on an order.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn part_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part to delete"]
        #[autocomplete = "autocomplete::autocomplete_part_name"]
        name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(found) = part::get_part_by_name(db, &name).await? else {
            ctx.say(format!("❌ Part '{name}' not found.")).await?;
            return Ok(());
        };

        match part::delete_part(db, found.id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Part '{}' deleted.", found.name)).await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
