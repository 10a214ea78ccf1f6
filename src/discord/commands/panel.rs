use crate::discord::components::reset_panel;
use crate::discord::{Context, Error};

/// Show the ladder reset related buttons.
#[poise::command(slash_command, guild_only)]
pub async fn show_reset_buttons(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content("Ladder Reset:")
            .components(reset_panel::panel_buttons()),
    )
    .await?;
    Ok(())
}
