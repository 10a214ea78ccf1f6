// Select menus for the guided wizards.
//
// Each prompt is rendered as one string select whose custom id names the
// wizard run and the step it was built for:
// `ladder:wizard:<kind>:<session>:<role>:<field>`. Both travel with the
// component so an answer to an old menu can be told apart from an answer to
// the current one.

use crate::core::roster::ProfileField;
use crate::core::wizard::{Advance, Prompt, Step, WizardKind};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub const PREFIX: &str = "ladder:wizard:";

/// Discord caps a select menu at 25 options.
const MAX_OPTIONS: usize = 25;
const MAX_DESCRIPTION: usize = 100;

/// The prompt a select menu answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuRef {
    pub kind: WizardKind,
    pub session: u64,
    pub step: Step,
}

pub fn custom_id(prompt: &Prompt) -> String {
    format!(
        "{PREFIX}{}:{}:{}:{}",
        prompt.kind.token(),
        prompt.session,
        prompt.step.role,
        prompt.step.field.token()
    )
}

pub fn parse_custom_id(id: &str) -> Option<MenuRef> {
    let rest = id.strip_prefix(PREFIX)?;
    let mut parts = rest.split(':');
    let kind = WizardKind::from_token(parts.next()?)?;
    let session = parts.next()?.parse().ok()?;
    let role = parts.next()?.parse().ok()?;
    let field = ProfileField::from_token(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(MenuRef {
        kind,
        session,
        step: Step { role, field },
    })
}

pub fn prompt_components(prompt: &Prompt) -> Vec<serenity::CreateActionRow> {
    if prompt.choices.len() > MAX_OPTIONS {
        tracing::warn!(
            title = %prompt.title,
            options = prompt.choices.len(),
            "Prompt has more options than a select menu can show; extra options dropped"
        );
    }

    let options = prompt
        .choices
        .iter()
        .take(MAX_OPTIONS)
        .map(|choice| {
            let description: String = choice.description.chars().take(MAX_DESCRIPTION).collect();
            serenity::CreateSelectMenuOption::new(&choice.label, &choice.label)
                .description(description)
        })
        .collect();

    let menu = serenity::CreateSelectMenu::new(
        custom_id(prompt),
        serenity::CreateSelectMenuKind::String { options },
    )
    .placeholder(&prompt.placeholder)
    .min_values(1)
    .max_values(1);

    vec![serenity::CreateActionRow::SelectMenu(menu)]
}

/// Message body for a prompt, optionally preceded by a confirmation line.
pub fn prompt_message(
    confirmation: Option<&str>,
    prompt: &Prompt,
) -> serenity::CreateInteractionResponseMessage {
    let content = match confirmation {
        Some(text) => format!("{text}\n**{}**", prompt.title),
        None => format!("**{}**", prompt.title),
    };
    serenity::CreateInteractionResponseMessage::new()
        .content(content)
        .components(prompt_components(prompt))
}

/// Apply a select-menu answer and replace the menu with the next prompt.
pub async fn handle_select(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    menu: MenuRef,
) -> Result<(), Error> {
    let value = match &interaction.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    };
    let Some(value) = value else {
        return Ok(());
    };

    let user_id = interaction.user.id.get();
    let MenuRef {
        kind,
        session,
        step,
    } = menu;
    let response = match data.wizard.answer(user_id, kind, session, step, &value).await {
        Ok(Advance::Next {
            confirmation,
            prompt,
        }) => serenity::CreateInteractionResponse::UpdateMessage(prompt_message(
            Some(&confirmation),
            &prompt,
        )),
        Ok(Advance::Finished { confirmation }) => serenity::CreateInteractionResponse::UpdateMessage(
            serenity::CreateInteractionResponseMessage::new()
                .content(confirmation)
                .components(Vec::new()),
        ),
        Err(e) => {
            tracing::info!(user_id, kind = kind.token(), error = %e, "Wizard answer rejected");
            let error: Error = Box::new(e);
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(crate::discord::error_reply::user_message(&error))
                    .ephemeral(true),
            )
        }
    };

    interaction.create_response(&ctx.http, response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(kind: WizardKind, session: u64, step: Step) -> Prompt {
        Prompt {
            kind,
            session,
            step,
            title: String::new(),
            placeholder: String::new(),
            choices: Vec::new(),
        }
    }

    #[test]
    fn test_custom_id_carries_session_and_step() {
        let step = Step {
            role: 3,
            field: ProfileField::Build,
        };
        let id = custom_id(&prompt(WizardKind::Composition, 17, step));
        assert_eq!(id, "ladder:wizard:comp:17:3:build");
        assert_eq!(
            parse_custom_id(&id),
            Some(MenuRef {
                kind: WizardKind::Composition,
                session: 17,
                step
            })
        );
    }

    #[test]
    fn test_menus_of_different_runs_differ() {
        let step = Step::first(WizardKind::Composition);
        assert_ne!(
            custom_id(&prompt(WizardKind::Composition, 1, step)),
            custom_id(&prompt(WizardKind::Composition, 2, step))
        );
    }

    #[test]
    fn test_foreign_ids_are_ignored() {
        assert_eq!(parse_custom_id("ladder:panel:register"), None);
        assert_eq!(parse_custom_id("ladder:wizard:reg:0:class"), None);
        assert_eq!(parse_custom_id("ladder:wizard:reg:1:0:mood"), None);
        assert_eq!(parse_custom_id("ladder:wizard:reg:1:0:class:extra"), None);
    }
}
