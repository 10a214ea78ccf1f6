// Team composition: the wizard entry point plus the views built on top of it.

use crate::core::roster::roster_views::display_name;
use crate::discord::access_checks::captain_only;
use crate::discord::commands::teams::autocomplete_team;
use crate::discord::components::wizard_menu;
use crate::discord::notify;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Embeds hold at most 25 fields.
const MAX_FIELDS: usize = 25;
/// Embed field values are capped at 1024 characters.
const MAX_FIELD_VALUE: usize = 1024;

fn clip(value: String) -> String {
    if value.chars().count() <= MAX_FIELD_VALUE {
        return value;
    }
    let mut clipped: String = value.chars().take(MAX_FIELD_VALUE - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Set your team's ideal composition, role by role.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn set_team_comp(
    ctx: Context<'_>,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
    #[description = "Number of roles (1-8)"] num_roles: u32,
) -> Result<(), Error> {
    let prompt = ctx
        .data()
        .wizard
        .start_composition(ctx.author().id.get(), &team_name, num_roles as usize)
        .await?;

    ctx.send(
        poise::CreateReply::default()
            .content(format!("**{}**", prompt.title))
            .components(wizard_menu::prompt_components(&prompt))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// View the current team composition.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn view_team_comp(
    ctx: Context<'_>,
    #[description = "Team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let comp = ctx.data().roster.composition(&team_name).await?;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Current Team Composition for {team_name}"))
        .color(0x3498db);
    for (index, role) in comp.roles.iter().enumerate().take(MAX_FIELDS) {
        embed = embed.field(
            format!("Role {}", index + 1),
            format!(
                "Class: {}\nBuild: {}\nSeriousness: {}",
                role.class, role.build, role.seriousness
            ),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// See which composition slots are filled or empty.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn compare_team_comp(
    ctx: Context<'_>,
    #[description = "Team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let (report, players) = ctx.data().roster.compare_composition(&team_name).await?;

    let filled: Vec<String> = report
        .filled
        .iter()
        .map(|slot| {
            let name = slot
                .player_id
                .map(|id| display_name(&players, id))
                .unwrap_or_default();
            format!(
                "**Role {}:** {} - Filled by: {}",
                slot.index,
                slot.role.summary(),
                name
            )
        })
        .collect();
    let unfilled: Vec<String> = report
        .unfilled
        .iter()
        .map(|slot| {
            format!(
                "**Role {}:** {} - No player assigned",
                slot.index,
                slot.role.summary()
            )
        })
        .collect();
    let extra: Vec<String> = report
        .extra
        .iter()
        .map(|id| format!("Extra Player: {} (No defined role)", display_name(&players, *id)))
        .collect();

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Team Composition Comparison for {team_name}"))
        .color(0x3498db);
    for (title, lines) in [
        ("Filled Roles", filled),
        ("Unfilled Roles", unfilled),
        ("Extra Players", extra),
    ] {
        if !lines.is_empty() {
            embed = embed.field(title, clip(lines.join("\n")), false);
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Get suggested players to fill your team.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn suggest_autofill(
    ctx: Context<'_>,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let suggestions = ctx
        .data()
        .roster
        .suggest_autofill(ctx.author().id.get(), &team_name)
        .await?;

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Suggested Autofills for {team_name}"))
        .color(0x3498db);
    let mut suggested = Vec::new();
    for suggestion in suggestions.iter().take(MAX_FIELDS) {
        let value = if suggestion.matches.is_empty() {
            "No matching players found.".to_string()
        } else {
            suggestion
                .matches
                .iter()
                .map(|player| {
                    format!(
                        "{} - Build: {}, Exp: {}, Avail: {}",
                        player.username,
                        player.build,
                        if player.experience { "Yes" } else { "No" },
                        player.availability
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };
        suggested.extend(suggestion.matches.iter().map(|player| player.id));
        embed = embed.field(suggestion.role.label(), clip(value), false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    let message = format!(
        "You have been suggested for a role in team {team_name}. The captain may contact you soon."
    );
    let delivered = notify::dm_all(ctx.http(), &suggested, &message).await;
    tracing::info!(
        team = %team_name,
        suggested = suggested.len(),
        delivered,
        "Autofill suggestions sent"
    );
    Ok(())
}
