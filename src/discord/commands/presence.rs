// Bot presence shown in the member list.

use poise::serenity_prelude as serenity;

pub fn on_ready(ctx: &serenity::Context, teams: usize) {
    let activity = if teams == 0 {
        serenity::ActivityData::watching("for /register")
    } else {
        serenity::ActivityData::watching(format!("{teams} ladder teams"))
    };
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}
