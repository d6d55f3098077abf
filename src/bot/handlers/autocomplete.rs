//! Autocomplete handlers for Discord slash command parameters.
//!
//! Parts come from the database; services and mechanics come from the shop catalog;
//! statuses and report periods are fixed lists.

use crate::{bot::BotData, core::part, entities::OrderStatus, errors::Error};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Report periods accepted by `/revenue`.
pub const PERIOD_CHOICES: [&str; 6] = [
    "current-month",
    "previous-month",
    "last-30-days",
    "last-90-days",
    "current-year",
    "custom",
];

fn matching<'a, I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let partial_lower = partial.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().contains(&partial_lower))
        .map(ToString::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggests part names, with the matching ones sorted alphabetically.
pub async fn autocomplete_part_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(parts) = part::get_all_parts(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(parts.iter().map(|p| p.name.as_str()), partial)
}

/// Suggests services from the catalog.
pub async fn autocomplete_service(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(ctx.data().shop.services.iter().map(String::as_str), partial)
}

/// Suggests mechanics from the roster.
pub async fn autocomplete_mechanic(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(ctx.data().shop.mechanics.iter().map(String::as_str), partial)
}

/// Suggests order status labels.
pub async fn autocomplete_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let labels: Vec<String> = OrderStatus::ALL.iter().map(|s| s.label()).collect();
    matching(labels.iter().map(String::as_str), partial)
}

/// Suggests revenue report periods.
pub async fn autocomplete_period(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(PERIOD_CHOICES, partial)
}
