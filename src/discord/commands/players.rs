// Player profile commands.

use crate::core::roster::{roster_views, ProfileUpdate};
use crate::discord::commands::say_blocks;
use crate::discord::components::wizard_menu;
use crate::discord::{Context, Error};

/// Register as a player (resets any existing profile).
#[poise::command(slash_command, guild_only)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    let prompt = ctx
        .data()
        .wizard
        .start_registration(author.id.get(), &author.name)
        .await?;

    let components = wizard_menu::prompt_components(&prompt);
    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "Fill out everything to register for Ladder Reset.\n**{}**",
                prompt.title
            ))
            .components(components)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Fill in availability, experience and first-reset details.
#[poise::command(slash_command, guild_only)]
pub async fn update_profile(
    ctx: Context<'_>,
    #[description = "When you can play, e.g. 'Weekends, evenings EST'"] availability: Option<
        String,
    >,
    #[description = "Have you played a ladder reset before?"] experience: Option<bool>,
    #[description = "Is this your first ladder reset?"] first_reset: Option<bool>,
) -> Result<(), Error> {
    if availability.is_none() && experience.is_none() && first_reset.is_none() {
        ctx.send(
            poise::CreateReply::default()
                .content("Nothing to update. Pass at least one option.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let update = ProfileUpdate {
        availability,
        experience,
        first_reset,
    };
    let player = ctx
        .data()
        .roster
        .update_profile(ctx.author().id.get(), update)
        .await?;

    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "Profile updated. Availability: {} | Experience: {} | First reset: {}",
                if player.availability.is_empty() {
                    "-"
                } else {
                    player.availability.as_str()
                },
                yes_no(player.experience),
                yes_no(player.first_reset)
            ))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// List all registered players with their details in a table.
#[poise::command(slash_command, guild_only)]
pub async fn list_players(
    ctx: Context<'_>,
    #[description = "Name, Class, Build, Seriousness, Team, Experience, Timezone or Availability"]
    sort_by: Option<String>,
) -> Result<(), Error> {
    let rows = ctx
        .data()
        .roster
        .player_table(sort_by.as_deref())
        .await?;

    if rows.is_empty() {
        ctx.say("No players are registered yet.").await?;
        return Ok(());
    }

    say_blocks(ctx, roster_views::render_player_table(&rows)).await
}

/// Abandon any registration or composition wizard you have open.
#[poise::command(slash_command)]
pub async fn cancel_wizard(ctx: Context<'_>) -> Result<(), Error> {
    let cancelled = ctx.data().wizard.cancel(ctx.author().id.get());
    let content = if cancelled == 0 {
        "You have no open selections."
    } else {
        "Your open selections have been cancelled. Answers given so far are kept."
    };
    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}
