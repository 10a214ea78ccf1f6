// The ladder reset panel: Register / Show Teams / Create Team buttons and the
// create-team modal behind the last one.

use crate::core::access::Capability;
use crate::core::roster::{parse_yes_no, roster_views, DocumentStore, RosterError, RosterService};
use crate::discord::access_checks::member_permits;
use crate::discord::components::wizard_menu;
use crate::discord::error_reply::user_message;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub const REGISTER: &str = "ladder:panel:register";
pub const SHOW_TEAMS: &str = "ladder:panel:teams";
pub const CREATE_TEAM: &str = "ladder:panel:create_team";
pub const CREATE_TEAM_MODAL: &str = "ladder:modal:create_team";

const TEAM_NAME_INPUT: &str = "team_name";
const JOIN_INPUT: &str = "join";
const NO_TEAMS: &str = "No teams have been created yet.";

pub fn panel_buttons() -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(REGISTER)
            .label("Register")
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(SHOW_TEAMS)
            .label("Show Teams")
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new(CREATE_TEAM)
            .label("Create Team")
            .style(serenity::ButtonStyle::Success),
    ])]
}

fn ephemeral(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

fn create_team_modal() -> serenity::CreateModal {
    let name = serenity::CreateInputText::new(
        serenity::InputTextStyle::Short,
        "Team Name",
        TEAM_NAME_INPUT,
    )
    .placeholder("Enter your team name")
    .min_length(3)
    .max_length(50)
    .required(true);
    let join = serenity::CreateInputText::new(
        serenity::InputTextStyle::Short,
        "Join the team yourself? (yes/no)",
        JOIN_INPUT,
    )
    .placeholder("yes")
    .max_length(3)
    .required(true);

    serenity::CreateModal::new(CREATE_TEAM_MODAL, "Create Team").components(vec![
        serenity::CreateActionRow::InputText(name),
        serenity::CreateActionRow::InputText(join),
    ])
}

pub async fn handle_button(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let user = &interaction.user;
    match interaction.data.custom_id.as_str() {
        REGISTER => {
            let response = match data
                .wizard
                .start_registration(user.id.get(), &user.name)
                .await
            {
                Ok(prompt) => serenity::CreateInteractionResponse::Message(
                    wizard_menu::prompt_message(None, &prompt).ephemeral(true),
                ),
                Err(e) => {
                    let error: Error = Box::new(e);
                    ephemeral(user_message(&error))
                }
            };
            interaction.create_response(&ctx.http, response).await?;
        }
        SHOW_TEAMS => match team_listing(&*data.roster).await {
            Ok(blocks) => send_blocks(ctx, interaction, &blocks).await?,
            Err(e) => {
                tracing::error!(error = %e, "Could not list teams for the panel");
                let error: Error = Box::new(e);
                interaction
                    .create_response(&ctx.http, ephemeral(user_message(&error)))
                    .await?;
            }
        },
        CREATE_TEAM => {
            let allowed =
                member_permits(ctx, data, interaction.member.as_ref(), Capability::Captain).await;
            let response = if allowed {
                serenity::CreateInteractionResponse::Modal(create_team_modal())
            } else {
                ephemeral(data.access.denial(Capability::Captain))
            };
            interaction.create_response(&ctx.http, response).await?;
        }
        other => tracing::debug!(custom_id = other, "Unknown panel button"),
    }
    Ok(())
}

/// Blocks shown by the Show Teams button.
async fn team_listing<S: DocumentStore>(
    roster: &RosterService<S>,
) -> Result<Vec<String>, RosterError> {
    let teams = roster.teams().await?;
    if teams.0.is_empty() {
        return Ok(vec![NO_TEAMS.to_string()]);
    }
    let players = roster.players().await?;
    Ok(roster_views::render_team_listing(&teams, &players, true, false))
}

/// First block as the interaction response, the rest as ephemeral follow-ups.
async fn send_blocks(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    blocks: &[String],
) -> Result<(), Error> {
    let Some((first, rest)) = blocks.split_first() else {
        return Ok(());
    };
    interaction
        .create_response(&ctx.http, ephemeral(first.as_str()))
        .await?;
    for block in rest {
        interaction
            .create_followup(
                &ctx.http,
                serenity::CreateInteractionResponseFollowup::new()
                    .content(block)
                    .ephemeral(true),
            )
            .await?;
    }
    Ok(())
}

fn input_value(interaction: &serenity::ModalInteraction, custom_id: &str) -> Option<String> {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) if input.custom_id == custom_id => {
                input.value.clone()
            }
            _ => None,
        })
}

pub async fn handle_modal(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ModalInteraction,
) -> Result<(), Error> {
    if interaction.data.custom_id != CREATE_TEAM_MODAL {
        return Ok(());
    }

    // Roles may have changed since the modal was opened.
    if !member_permits(ctx, data, interaction.member.as_ref(), Capability::Captain).await {
        interaction
            .create_response(&ctx.http, ephemeral(data.access.denial(Capability::Captain)))
            .await?;
        return Ok(());
    }

    let name = input_value(interaction, TEAM_NAME_INPUT).unwrap_or_default();
    let join = input_value(interaction, JOIN_INPUT).unwrap_or_default();
    let user = &interaction.user;

    let result = match parse_yes_no(&join) {
        Some(join) => data
            .roster
            .create_team(user.id.get(), &user.name, &name, join)
            .await,
        None => Err(RosterError::InvalidJoinDecision),
    };
    let content = match result {
        Ok(team) => format!(
            "Team {} created successfully with {} as the captain.",
            team.name, team.captain_name
        ),
        Err(e) => {
            tracing::info!(user_id = user.id.get(), error = %e, "Create team from panel rejected");
            let error: Error = Box::new(e);
            user_message(&error)
        }
    };
    interaction
        .create_response(&ctx.http, ephemeral(content))
        .await?;
    Ok(())
}
