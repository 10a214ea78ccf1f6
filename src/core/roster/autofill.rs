// Autofill suggestions: for each declared role, find unattached players whose
// profile fits the role.

use super::roster_models::{Invitations, Player, Players, Role, Teams};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSuggestion {
    pub role: Role,
    pub matches: Vec<Player>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Class, build and availability are containment matches; a build of "any"
/// accepts every build. Seriousness must match exactly, ignoring case.
pub fn fits_role(player: &Player, role: &Role) -> bool {
    if !contains_ci(&player.class, &role.class) {
        return false;
    }
    if !role.build.eq_ignore_ascii_case("any") && !contains_ci(&player.build, &role.build) {
        return false;
    }
    if role.experience_required && !player.experience {
        return false;
    }
    if role.seriousness.to_lowercase() != player.seriousness.to_lowercase() {
        return false;
    }
    contains_ci(&player.availability, &role.availability)
}

/// Suggest up to `role.count` players per role.
///
/// Members of any team, players holding a pending invitation and the ids in
/// `also_excluded` are never suggested. A player matched for one role is not
/// offered again for a later role in the same run.
pub fn suggest_autofill(
    roles: &[Role],
    players: &Players,
    teams: &Teams,
    invitations: &Invitations,
    also_excluded: &[u64],
) -> Vec<RoleSuggestion> {
    let mut excluded: HashSet<u64> = teams
        .all_members()
        .chain(invitations.pending_players())
        .chain(also_excluded.iter().copied())
        .collect();

    roles
        .iter()
        .map(|role| {
            let wanted = role.count as usize;
            let mut matches = Vec::new();
            for player in players.0.values() {
                if matches.len() >= wanted {
                    break;
                }
                if excluded.contains(&player.id) || !fits_role(player, role) {
                    continue;
                }
                matches.push(player.clone());
            }

            excluded.extend(matches.iter().map(|p| p.id));
            RoleSuggestion {
                role: role.clone(),
                matches,
            }
        })
        .collect()
}
