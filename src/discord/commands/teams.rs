// Team lifecycle commands: create, leave, list, show and council removal.

use crate::core::roster::{parse_yes_no, roster_views, RosterError};
use crate::discord::access_checks::{captain_only, council_only};
use crate::discord::commands::say_blocks;
use crate::discord::notify;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Team names for autocomplete, matched case-insensitively on any substring.
pub async fn autocomplete_team<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let names: Vec<String> = match ctx.data().roster.teams().await {
        Ok(teams) => teams.0.into_keys().collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Team autocomplete failed");
            Vec::new()
        }
    };
    let partial = partial.to_lowercase();
    names
        .into_iter()
        .filter(move |name| name.to_lowercase().contains(&partial))
        .take(25)
}

/// Create a new team.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn create_team(
    ctx: Context<'_>,
    #[description = "Team name (3-50 characters)"] team_name: String,
    #[description = "Join the team yourself? (yes/no)"] join: String,
) -> Result<(), Error> {
    let join = parse_yes_no(&join).ok_or(RosterError::InvalidJoinDecision)?;
    let author = ctx.author();
    let team = ctx
        .data()
        .roster
        .create_team(author.id.get(), &author.name, &team_name, join)
        .await?;

    ctx.say(format!("Team {} has been created!", team.name))
        .await?;
    Ok(())
}

/// Leave your current team.
#[poise::command(slash_command, guild_only)]
pub async fn leave_team(
    ctx: Context<'_>,
    #[description = "Team to leave (defaults to your team)"]
    #[autocomplete = "autocomplete_team"]
    team_name: Option<String>,
) -> Result<(), Error> {
    let author = ctx.author();
    let team = ctx
        .data()
        .roster
        .leave(author.id.get(), team_name.as_deref())
        .await?;

    notify::dm(
        ctx.http(),
        team.captain_id,
        format!("{} has left your team {}.", author.name, team.name),
    )
    .await;

    ctx.say(format!("You have successfully left the team {}.", team.name))
        .await?;
    Ok(())
}

/// List all current teams.
#[poise::command(slash_command, guild_only)]
pub async fn list_teams(
    ctx: Context<'_>,
    #[description = "Show team members (default: yes)"] show_members: Option<bool>,
    #[description = "Show each member's profile (default: no)"] show_member_info: Option<bool>,
) -> Result<(), Error> {
    let roster = &ctx.data().roster;
    let teams = roster.teams().await?;
    if teams.0.is_empty() {
        ctx.say("No teams have been created yet.").await?;
        return Ok(());
    }
    let players = roster.players().await?;

    let blocks = roster_views::render_team_listing(
        &teams,
        &players,
        show_members.unwrap_or(true),
        show_member_info.unwrap_or(false),
    );
    say_blocks(ctx, blocks).await
}

/// Show one team by name, or your own team.
#[poise::command(slash_command, guild_only)]
pub async fn show_team(
    ctx: Context<'_>,
    #[description = "Team name (defaults to your team)"]
    #[autocomplete = "autocomplete_team"]
    team_name: Option<String>,
    #[description = "Show each member's profile (default: no)"] show_member_info: Option<bool>,
) -> Result<(), Error> {
    let roster = &ctx.data().roster;
    let team = match team_name {
        Some(name) => roster.team(&name).await?,
        None => roster
            .team_of(ctx.author().id.get())
            .await?
            .ok_or(RosterError::NotInAnyTeam)?,
    };
    let players = roster.players().await?;

    let blocks = roster_views::render_team(&team, &players, show_member_info.unwrap_or(false));
    say_blocks(ctx, blocks).await
}

/// Council override to remove a player from a team.
#[poise::command(slash_command, guild_only, check = "council_only")]
pub async fn remove_player(
    ctx: Context<'_>,
    #[description = "Player to remove"] member: serenity::User,
    #[description = "Team (defaults to the player's team)"]
    #[autocomplete = "autocomplete_team"]
    team_name: Option<String>,
) -> Result<(), Error> {
    let team = ctx
        .data()
        .roster
        .remove_player(member.id.get(), team_name.as_deref())
        .await?;

    notify::dm(
        ctx.http(),
        member.id.get(),
        format!("You have been removed from team {} by the council.", team.name),
    )
    .await;

    ctx.say(format!("{} has been removed from team {}.", member.name, team.name))
        .await?;
    Ok(())
}
