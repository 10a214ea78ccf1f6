// Discord commands module.
// Each feature gets its own command file.

pub mod composition;
pub mod help;
pub mod panel;
pub mod plan;
pub mod players;
pub mod presence;
pub mod requests;
pub mod teams;

use crate::discord::{Context, Data, Error};

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        players::register(),
        players::update_profile(),
        players::list_players(),
        players::cancel_wizard(),
        teams::create_team(),
        teams::leave_team(),
        teams::list_teams(),
        teams::show_team(),
        teams::remove_player(),
        requests::invite_player(),
        requests::accept_invite(),
        requests::decline_invite(),
        requests::apply_team(),
        requests::view_applications(),
        requests::accept_member(),
        requests::decline_member(),
        composition::set_team_comp(),
        composition::view_team_comp(),
        composition::compare_team_comp(),
        composition::suggest_autofill(),
        plan::set_team_plan(),
        plan::view_team_plan(),
        panel::show_reset_buttons(),
        help::helpme(),
    ]
}

/// Send pre-rendered code blocks, one message each.
pub async fn say_blocks(ctx: Context<'_>, blocks: Vec<String>) -> Result<(), Error> {
    for block in blocks {
        ctx.say(block).await?;
    }
    Ok(())
}
