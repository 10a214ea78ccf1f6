// Team plan: a multi-message dialogue for the captain, and a read view for the team.

use crate::core::roster::team_plan::{PlanDraft, PlanInput};
use crate::discord::access_checks::captain_only;
use crate::discord::commands::teams::autocomplete_team;
use crate::discord::notify;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const MAX_DESCRIPTION: usize = 4096;

/// Set or update your team's plan for ladder reset.
#[poise::command(slash_command, guild_only, check = "captain_only")]
pub async fn set_team_plan(
    ctx: Context<'_>,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let author_id = ctx.author().id;
    let roster = &ctx.data().roster;
    roster.captained_team(author_id.get(), &team_name).await?;

    ctx.say("Please enter your team plan. Type 'done' when finished or 'cancel' to cancel.")
        .await?;

    let mut draft = PlanDraft::new();
    loop {
        let next = serenity::MessageCollector::new(ctx.serenity_context())
            .author_id(author_id)
            .channel_id(ctx.channel_id())
            .timeout(ctx.data().plan_timeout)
            .next()
            .await;

        let Some(message) = next else {
            tracing::info!(user_id = author_id.get(), team = %team_name, "Plan dialogue timed out");
            ctx.say("No input received in time. Team plan setting canceled.")
                .await?;
            return Ok(());
        };

        match PlanInput::classify(&message.content) {
            PlanInput::Cancel => {
                ctx.say("Team plan setting canceled.").await?;
                return Ok(());
            }
            PlanInput::Done => break,
            PlanInput::Line(line) => {
                draft.push(line);
                ctx.say("Added to plan. Type 'done' when finished or continue typing.")
                    .await?;
            }
        }
    }

    if draft.is_empty() {
        ctx.say("The plan is empty, nothing was saved.").await?;
        return Ok(());
    }

    let team = roster
        .set_plan(author_id.get(), &team_name, draft.finish())
        .await?;
    ctx.say(format!("Team plan for {} has been set.", team.name))
        .await?;

    let recipients = roster.recipients(&team, author_id.get());
    let message = format!(
        "The team plan for {} has been updated by your captain.",
        team.name
    );
    let delivered = notify::dm_all(ctx.http(), &recipients, &message).await;
    tracing::info!(team = %team.name, recipients = recipients.len(), delivered, "Plan update announced");
    Ok(())
}

/// View your team's plan for ladder reset.
#[poise::command(slash_command, guild_only)]
pub async fn view_team_plan(
    ctx: Context<'_>,
    #[description = "Your team"]
    #[autocomplete = "autocomplete_team"]
    team_name: String,
) -> Result<(), Error> {
    let plan = ctx
        .data()
        .roster
        .plan(ctx.author().id.get(), &team_name)
        .await?;

    let description: String = plan.chars().take(MAX_DESCRIPTION).collect();
    let embed = serenity::CreateEmbed::new()
        .title(format!("Team Plan for {team_name}"))
        .description(description)
        .color(0x3498db);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
