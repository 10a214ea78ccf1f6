use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

// Sections in display order
const CATEGORY_ORDER: &[&str] = &[
    "Getting Started",
    "Joining a Team",
    "Captain Commands",
    "Team Composition Management",
    "Council",
];

struct CommandMetadata {
    category: &'static str,
    priority: i32,
    usage: &'static str,
    description: Option<&'static str>,
}

fn meta(
    category: &'static str,
    priority: i32,
    usage: &'static str,
    description: &'static str,
) -> CommandMetadata {
    CommandMetadata {
        category,
        priority,
        usage,
        description: Some(description),
    }
}

fn get_command_metadata(name: &str) -> CommandMetadata {
    match name {
        "register" => meta(
            "Getting Started",
            100,
            "",
            "Register yourself as a player for ladder reset.",
        ),
        "update_profile" => meta(
            "Getting Started",
            90,
            "[availability] [experience] [first_reset]",
            "Fill in the profile details the registration menus skip.",
        ),
        "list_players" => meta("Getting Started", 80, "[sort_by]", "Show every registered player."),
        "list_teams" => meta("Getting Started", 70, "", "List all available teams."),
        "show_team" => meta("Getting Started", 60, "[team_name]", "Show one team and its members."),
        "show_reset_buttons" => meta(
            "Getting Started",
            50,
            "",
            "Post the ladder reset panel with quick-action buttons.",
        ),
        "cancel_wizard" => meta(
            "Getting Started",
            10,
            "",
            "Abandon an open registration or composition menu.",
        ),
        "apply_team" => meta("Joining a Team", 100, "[team_name]", "Apply to join a team."),
        "accept_invite" => meta(
            "Joining a Team",
            90,
            "[team_name]",
            "Accept an invitation to join a team.",
        ),
        "decline_invite" => meta(
            "Joining a Team",
            80,
            "[team_name]",
            "Decline an invitation to join a team.",
        ),
        "leave_team" => meta("Joining a Team", 70, "[team_name]", "Leave your team."),
        "view_team_plan" => meta(
            "Joining a Team",
            60,
            "[team_name]",
            "View your team's ladder reset plan.",
        ),
        "create_team" => meta("Captain Commands", 100, "[team_name] [join]", "Create a new team."),
        "set_team_plan" => meta(
            "Captain Commands",
            90,
            "[team_name]",
            "Set or update your team's plan.",
        ),
        "invite_player" => meta(
            "Captain Commands",
            80,
            "[@player] [team_name]",
            "Invite a player to your team.",
        ),
        "view_applications" => meta(
            "Captain Commands",
            70,
            "[team_name]",
            "View pending applications to your team.",
        ),
        "accept_member" => meta(
            "Captain Commands",
            60,
            "[@player] [team_name]",
            "Accept a player's application.",
        ),
        "decline_member" => meta(
            "Captain Commands",
            50,
            "[@player] [team_name]",
            "Decline a player's application.",
        ),
        "set_team_comp" => meta(
            "Team Composition Management",
            100,
            "[team_name] [num_roles]",
            "Set your team's ideal composition.",
        ),
        "view_team_comp" => meta(
            "Team Composition Management",
            90,
            "[team_name]",
            "View your team's current composition.",
        ),
        "compare_team_comp" => meta(
            "Team Composition Management",
            80,
            "[team_name]",
            "Compare the current team composition and see which slots are filled or empty.",
        ),
        "suggest_autofill" => meta(
            "Team Composition Management",
            70,
            "[team_name]",
            "Get suggested players to fill your team.",
        ),
        "remove_player" => meta(
            "Council",
            100,
            "[@player] [team_name]",
            "Remove a player from a team.",
        ),
        _ => CommandMetadata {
            category: "Getting Started",
            priority: 0,
            usage: "",
            description: None,
        },
    }
}

/// Get help with how to use this bot.
#[poise::command(slash_command)]
pub async fn helpme(ctx: Context<'_>) -> Result<(), Error> {
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in &ctx.framework().options().commands {
        if command.hide_in_help || command.name == "helpme" {
            continue;
        }

        let metadata = get_command_metadata(&command.name);
        let description = metadata
            .description
            .or(command.description.as_deref())
            .unwrap_or("No description provided.");

        let entry = if metadata.usage.is_empty() {
            format!("**/{}** - {}", command.name, description)
        } else {
            format!("**/{} {}** - {}", command.name, metadata.usage, description)
        };

        categories
            .entry(metadata.category)
            .or_default()
            .push((metadata.priority, entry));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Bot Commands")
        .description("List of available commands:")
        .color(0x3498db);

    let mut sorted_categories: Vec<_> = categories.keys().cloned().collect();
    sorted_categories.sort_by(|a, b| {
        let pos_a = CATEGORY_ORDER.iter().position(|&x| x == *a).unwrap_or(999);
        let pos_b = CATEGORY_ORDER.iter().position(|&x| x == *b).unwrap_or(999);
        pos_a.cmp(&pos_b).then(a.cmp(b))
    });

    for category in sorted_categories {
        if let Some(entries) = categories.get_mut(category) {
            // Priority descending, then name
            entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            let formatted_entries: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();
            for (i, chunk) in chunk_entries(&formatted_entries).iter().enumerate() {
                let field_name = if i == 0 {
                    category.to_string()
                } else {
                    format!("{} (cont.)", category)
                };
                embed = embed.field(field_name, chunk.join("\n"), false);
            }
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current_chunk = Vec::new();
    let mut current_length = 0;

    for entry in entries {
        let entry_len = entry.len();
        // Field values cap at 1024; keep some headroom.
        if !current_chunk.is_empty() && current_length + entry_len + 1 > 1000 {
            chunks.push(current_chunk);
            current_chunk = Vec::new();
            current_length = 0;
        }

        current_chunk.push(entry.clone());
        current_length += entry_len + 1;
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_has_a_section() {
        for command in crate::discord::commands::all() {
            let metadata = get_command_metadata(&command.name);
            if command.name != "helpme" {
                assert!(
                    metadata.description.is_some(),
                    "{} has no help entry",
                    command.name
                );
            }
            assert!(CATEGORY_ORDER.contains(&metadata.category));
        }
    }

    #[test]
    fn test_chunks_stay_under_field_limit() {
        let entries: Vec<String> = (0..40).map(|i| format!("{i:>3} {}", "x".repeat(60))).collect();
        let chunks = chunk_entries(&entries);
        assert!(chunks.len() > 1);
        for chunk in chunks {
            assert!(chunk.join("\n").len() <= 1024);
        }
    }
}
