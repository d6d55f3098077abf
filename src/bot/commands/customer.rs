//! Customer Discord commands - `/customer add|list|search|update|delete`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_user_error},
        core::customer::{self, CustomerDetails},
        entities::customer::Model as CustomerModel,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn customer_field(c: &CustomerModel) -> (String, String, bool) {
        let email = c
            .email
            .as_deref()
            .map(|e| format!("\n✉️ {e}"))
            .unwrap_or_default();
        let tax_id = c
            .tax_id
            .as_deref()
            .map(|t| format!("\n🪪 {t}"))
            .unwrap_or_default();
        (
            format!("#{} {}", c.id, c.name),
            format!("📞 {}{email}{tax_id}", c.phone),
            false,
        )
    }

    async fn send_customer_list(
        ctx: poise::Context<'_, BotData, Error>,
        title: &str,
        customers: &[CustomerModel],
    ) -> Result<()> {
        let fields: Vec<_> = customers.iter().take(25).map(customer_field).collect();
        let embed = serenity::CreateEmbed::default()
            .title(title)
            .color(0x0058_65F2)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} customer(s)",
                customers.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for managing customers.
    #[poise::command(
        slash_command,
        subcommands(
            "customer_add",
            "customer_list",
            "customer_search",
            "customer_update",
            "customer_delete"
        )
    )]
    pub async fn customer(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Customer management. Subcommands: `add`, `list`, `search`, `update`, `delete`.",
        )
        .await?;
        Ok(())
    }

    /// Registers a new customer.
    #[poise::command(slash_command, rename = "add")]
    pub async fn customer_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Full name"] name: String,
        #[description = "Phone number"] phone: String,
        #[description = "E-mail address"] email: Option<String>,
        #[description = "CPF or CNPJ"] tax_id: Option<String>,
        #[description = "Address"] address: Option<String>,
    ) -> Result<()> {
        let details = CustomerDetails {
            name,
            phone,
            email,
            tax_id,
            address,
        };

        match customer::create_customer(&ctx.data().database, details).await {
            Ok(created) => {
                ctx.say(format!(
                    "✅ Customer **{}** registered (ID {}).",
                    created.name, created.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Lists all customers alphabetically.
    #[poise::command(slash_command, rename = "list")]
    pub async fn customer_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let customers = customer::get_all_customers(&ctx.data().database).await?;
        if customers.is_empty() {
            ctx.say("No customers yet. Use `/customer add` to register one.")
                .await?;
            return Ok(());
        }
        send_customer_list(ctx, "**Customers**", &customers).await
    }

    /// Searches customers by name, phone or e-mail.
    #[poise::command(slash_command, rename = "search")]
    pub async fn customer_search(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "At least 2 characters of a name, phone or e-mail"] term: String,
    ) -> Result<()> {
        let found = customer::search_customers(&ctx.data().database, &term).await?;
        if found.is_empty() {
            ctx.say(format!("No customers match '{}'.", term.trim()))
                .await?;
            return Ok(());
        }
        send_customer_list(ctx, &format!("**Customers matching '{}'**", term.trim()), &found).await
    }

    /// Updates a customer's details. Omitted fields keep their current value.
    #[poise::command(slash_command, rename = "update")]
    pub async fn customer_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer ID"] id: i64,
        #[description = "Full name"] name: Option<String>,
        #[description = "Phone number"] phone: Option<String>,
        #[description = "E-mail address"] email: Option<String>,
        #[description = "CPF or CNPJ"] tax_id: Option<String>,
        #[description = "Address"] address: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(current) = customer::get_customer_by_id(db, id).await? else {
            ctx.say(format!("❌ Customer {id} not found.")).await?;
            return Ok(());
        };

        let details = CustomerDetails {
            name: name.unwrap_or(current.name),
            phone: phone.unwrap_or(current.phone),
            email: email.or(current.email),
            tax_id: tax_id.or(current.tax_id),
            address: address.or(current.address),
        };

        match customer::update_customer(db, id, details).await {
            Ok(updated) => {
                ctx.say(format!("✅ Customer **{}** updated.", updated.name))
                    .await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }

    /// Deletes a customer who has no vehicles or orders.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn customer_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer ID"] id: i64,
    ) -> Result<()> {
        match customer::delete_customer(&ctx.data().database, id).await {
            Ok(()) => {
                ctx.say(format!("🗑️ Customer {id} deleted.")).await?;
                Ok(())
            }
            Err(e) => reply_user_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
