// Invitations (captain -> player) and applications (player -> captain).

use crate::discord::access_checks::captain_only;
use crate::discord::commands::teams::autocomplete_team;
use crate::discord::notify;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Invite a player to your team.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn invite_player(
    ctx: Context<'_>,
    #[description = "Player to invite"] member: serenity::User,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    ctx.data()
        .roster
        .invite(ctx.author().id.get(), member.id.get(), &team_name)
        .await?;

    let delivered = notify::dm(
        ctx.http(),
        member.id.get(),
        format!(
            "You have been invited to join team {team_name}. Use /accept_invite {team_name} to accept or /decline_invite {team_name} to decline."
        ),
    )
    .await;

    if delivered {
        ctx.say(format!("Invitation sent to {}.", member.name)).await?;
    } else {
        ctx.say("The invitation was recorded, but the DM could not be delivered. They may have DMs disabled.")
            .await?;
    }
    Ok(())
}

/// Accept an invitation to join a team.
#[poise::command(slash_command, guild_only)]
pub async fn accept_invite(
    ctx: Context<'_>,
    #[description = "Team that invited you"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    answer_invite(ctx, team_name, true).await
}

/// Decline an invitation to join a team.
#[poise::command(slash_command, guild_only)]
pub async fn decline_invite(
    ctx: Context<'_>,
    #[description = "Team that invited you"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    answer_invite(ctx, team_name, false).await
}

async fn answer_invite(ctx: Context<'_>, team_name: String, accept: bool) -> Result<(), Error> {
    let author = ctx.author();
    let team = ctx
        .data()
        .roster
        .respond_to_invitation(author.id.get(), &team_name, accept)
        .await?;

    let (to_captain, reply) = if accept {
        (
            format!("{} has accepted your invitation to join team {}.", author.name, team.name),
            format!("You have joined team {}!", team.name),
        )
    } else {
        (
            format!("{} has declined your invitation to join team {}.", author.name, team.name),
            format!("You have declined the invitation to join team {}.", team.name),
        )
    };
    notify::dm(ctx.http(), team.captain_id, to_captain).await;

    ctx.say(reply).await?;
    Ok(())
}

/// Apply to join a team.
#[poise::command(slash_command, guild_only)]
pub async fn apply_team(
    ctx: Context<'_>,
    #[description = "Team to apply to"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let author = ctx.author();
    let (_, team) = ctx
        .data()
        .roster
        .apply(author.id.get(), &team_name)
        .await?;

    notify::dm(
        ctx.http(),
        team.captain_id,
        format!("{} has applied to join your team {}.", author.name, team.name),
    )
    .await;

    ctx.say(format!("You have applied to join team {}.", team.name))
        .await?;
    Ok(())
}

/// View pending applications to your team.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn view_applications(
    ctx: Context<'_>,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let pending = ctx
        .data()
        .roster
        .pending_applications(ctx.author().id.get(), &team_name)
        .await?;

    if pending.is_empty() {
        ctx.say("No pending applications.").await?;
        return Ok(());
    }

    // Embeds hold at most 25 fields.
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Pending Applications for {team_name}"))
        .color(0x3498db);
    for (application, player) in pending.iter().take(25) {
        embed = embed.field(
            format!("#{} {}", application.id, player.username),
            format!(
                "Class: {}\nBuild: {}\nSeriousness: {}\nTimezone: {}\nExperience: {}\nAvailability: {}",
                or_dash(&player.class),
                or_dash(&player.build),
                or_dash(&player.seriousness),
                or_dash(&player.timezone),
                if player.experience { "Yes" } else { "No" },
                or_dash(&player.availability),
            ),
            false,
        );
    }
    if pending.len() > 25 {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "{} more not shown",
            pending.len() - 25
        )));
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Accept a player's application.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn accept_member(
    ctx: Context<'_>,
    #[description = "Applicant"] member: serenity::User,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    answer_application(ctx, member, team_name, true).await
}

/// Decline a player's application.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn decline_member(
    ctx: Context<'_>,
    #[description = "Applicant"] member: serenity::User,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    answer_application(ctx, member, team_name, false).await
}

async fn answer_application(
    ctx: Context<'_>,
    member: serenity::User,
    team_name: String,
    accept: bool,
) -> Result<(), Error> {
    let team = ctx
        .data()
        .roster
        .respond_to_application(ctx.author().id.get(), member.id.get(), &team_name, accept)
        .await?;

    let (to_player, reply) = if accept {
        (
            format!("Your application to join team {} has been accepted!", team.name),
            format!("{} has been added to your team.", member.name),
        )
    } else {
        (
            format!("Your application to join team {} has been declined.", team.name),
            format!("{}'s application has been declined.", member.name),
        )
    };
    notify::dm(ctx.http(), member.id.get(), to_player).await;

    ctx.say(reply).await?;
    Ok(())
}
