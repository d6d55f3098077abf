//! Vehicle Discord commands - `/vehicle add|list|update|delete`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_user_error},
        core::vehicle::{self, VehicleDetails, format_plate},
        entities::{customer, vehicle::Model as VehicleModel},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn vehicle_field(v: &VehicleModel, owner: Option<&customer::Model>) -> (String, String, bool) {
        let year = v.year.map(|y| format!(" {y}")).unwrap_or_default();
        let color = v
            .color
            .as_deref()
            .map(|c| format!(" · {c}"))
            .unwrap_or_default();
        let owner = owner.map_or("Unknown owner", |c| c.name.as_str());
        (
            format!("#{} {}", v.id, format_plate(&v.plate)),
            format!("{} {}{year}{color}\n👤 {owner}", v.make, v.model),
            false,
        )
    }

    /// Parent command for managing vehicles.
    #[poise::command(
        slash_command,
        subcommands("vehicle_add", "vehicle_list", "vehicle_update", "vehicle_delete")
    )]
    pub async fn vehicle(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Vehicle management. Subcommands: `add`, `list`, `update`, `delete`.")
            .await?;
        Ok(())
    }

    /// Registers a vehicle for an existing customer.
    #[poise::command(slash_command, rename = "add")]
    pub async fn vehicle_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Owner's customer ID"] customer_id: i64,
        #[description = "License plate"] plate: String,
        #[description = "Manufacturer (e.g., Fiat)"] make: String,
        #[description = "Model (e.g., Uno)"] model: String,
        #[description = "Model year"] year: Option<i32>,
        #[description = "Color"] color: Option<String>,
        #[description = "Odometer in km"] odometer_km: Option<i64>,
    ) -> Result<()> {
        let details = VehicleDetails {
            customer_id,
            plate,
            make,
            model,
            year,
            color,
            odometer_km,
        };

        match vehicle::create_vehicle(&ctx.data().database, details).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Vehicle **{}** ({} {}) registered (ID {}).",
                    format_plate(&created.plate),
                    created.make,
                    created.model,
                    created.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Lists vehicles, or searches them by plate, make, model or owner.
    #[poise::command(slash_command, rename = "list")]
    pub async fn vehicle_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Plate, make, model or owner name"] search: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let vehicles = match search.as_deref() {
            Some(term) => vehicle::search_vehicles(db, term).await?,
            None => vehicle::get_all_vehicles(db).await?,
        };

        if vehicles.is_empty() {
            ctx.say("No vehicles found.").await?;
            return Ok(());
        }

        let fields: Vec<_> = vehicles
            .iter()
            .take(25)
            .map(|(v, owner)| vehicle_field(v, owner.as_ref()))
            .collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Vehicles**")
            .color(0x0058_65F2)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} vehicle(s)",
                vehicles.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Updates a vehicle. Omitted fields keep their current value.
    #[poise::command(slash_command, rename = "update")]
    pub async fn vehicle_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Vehicle ID"] id: i64,
        #[description = "New owner's customer ID"] customer_id: Option<i64>,
        #[description = "License plate"] plate: Option<String>,
        #[description = "Manufacturer"] make: Option<String>,
        #[description = "Model"] model: Option<String>,
        #[description = "Model year"] year: Option<i32>,
        #[description = "Color"] color: Option<String>,
        #[description = "Odometer in km"] odometer_km: Option<i64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(current) = vehicle::get_vehicle_by_id(db, id).await? else {
            ctx.say(format!("❌ Vehicle {id} not found.")).await?;
            return Ok(());
        };

        let details = VehicleDetails {
            customer_id: customer_id.unwrap_or(current.customer_id),
            plate: plate.unwrap_or(current.plate),
            make: make.unwrap_or(current.make),
            model: model.unwrap_or(current.model),
            year: year.or(current.year),
            color: color.or(current.color),
            odometer_km: odometer_km.or(current.odometer_km),
        };

        match vehicle::update_vehicle(db, id, details).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Vehicle **{}** updated.",
                    format_plate(&updated.plate)
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Deletes a vehicle that has no service orders.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn vehicle_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Vehicle ID"] id: i64,
    ) -> Result<()> {
        match vehicle::delete_vehicle(&ctx.data().database, id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Vehicle {id} deleted.")).await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
