// Derived, read-only views over the roster documents: player tables, team
// listings and the composition comparison. Everything here is pure so the
// Discord layer only has to send the strings.

use super::roster_models::{Player, Players, Role, Team, TeamComposition, Teams};

/// Discord rejects messages longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

const CODE_FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Class,
    Build,
    Seriousness,
    Team,
    Experience,
    Timezone,
    Availability,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Name,
        SortKey::Class,
        SortKey::Build,
        SortKey::Seriousness,
        SortKey::Team,
        SortKey::Experience,
        SortKey::Timezone,
        SortKey::Availability,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Class => "Class",
            SortKey::Build => "Build",
            SortKey::Seriousness => "Seriousness",
            SortKey::Team => "Team",
            SortKey::Experience => "Experience",
            SortKey::Timezone => "Timezone",
            SortKey::Availability => "Availability",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.label().to_lowercase() == wanted)
    }

    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|key| key.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One line of the player table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub name: String,
    pub class: String,
    pub build: String,
    pub seriousness: String,
    pub team: String,
    pub experience: String,
    pub timezone: String,
    pub availability: String,
}

impl PlayerRow {
    pub fn new(player: &Player, team: Option<&str>) -> Self {
        Self {
            name: player.username.clone(),
            class: or_na(&player.class),
            build: or_na(&player.build),
            seriousness: or_na(&player.seriousness),
            team: team.unwrap_or("No team").to_string(),
            experience: yes_no(player.experience).to_string(),
            timezone: or_na(&player.timezone),
            availability: or_na(&player.availability),
        }
    }

    fn sort_value(&self, key: SortKey) -> &str {
        match key {
            SortKey::Name => &self.name,
            SortKey::Class => &self.class,
            SortKey::Build => &self.build,
            SortKey::Seriousness => &self.seriousness,
            SortKey::Team => &self.team,
            SortKey::Experience => &self.experience,
            SortKey::Timezone => &self.timezone,
            SortKey::Availability => &self.availability,
        }
    }

    fn render(&self) -> String {
        format!(
            "| {:<15} | {:<11} | {:<12} | {:<11} | {:<12} | {:<3} | {:<3} | {:<12} |",
            self.name,
            self.class,
            self.build,
            self.seriousness,
            self.team,
            self.experience,
            self.timezone,
            self.availability
        )
    }
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Build a row per registered player, with the team resolved from `teams`.
pub fn player_rows(players: &Players, teams: &Teams, sort: Option<SortKey>) -> Vec<PlayerRow> {
    let mut rows: Vec<PlayerRow> = players
        .0
        .values()
        .map(|player| {
            let team = teams.team_of(player.id).map(|t| t.name.as_str());
            PlayerRow::new(player, team)
        })
        .collect();

    if let Some(key) = sort {
        rows.sort_by(|a, b| a.sort_value(key).cmp(b.sort_value(key)));
    }
    rows
}

fn table_header() -> Vec<String> {
    let separator = format!(
        "+{:-<17}+{:-<13}+{:-<14}+{:-<13}+{:-<14}+{:-<5}+{:-<5}+{:-<14}+",
        "", "", "", "", "", "", "", ""
    );
    let title = format!(
        "| {:<15} | {:<11} | {:<12} | {:<11} | {:<12} | {:<3} | {:<3} | {:<12} |",
        "Name", "Class", "Build", "Serious", "Team", "Exp", "Loc", "Availability"
    );
    vec![separator.clone(), title, separator]
}

pub fn render_player_table(rows: &[PlayerRow]) -> Vec<String> {
    let mut lines = table_header();
    let separator = lines[0].clone();
    lines.extend(rows.iter().map(PlayerRow::render));
    lines.push(separator);
    code_blocks(&lines)
}

/// Display name for a user id: the registered username, or "Unknown".
pub fn display_name(players: &Players, user_id: u64) -> String {
    players
        .0
        .get(&user_id)
        .map(|p| p.username.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn team_lines(team: &Team, players: &Players, show_members: bool, show_info: bool) -> Vec<String> {
    let mut lines = vec![format!("Team: {} | Captain: {}", team.name, team.captain_name)];
    if !show_members {
        return lines;
    }

    lines.push("Members:".to_string());
    if team.members.is_empty() {
        lines.push(" (no members yet)".to_string());
    }
    for member_id in &team.members {
        match players.0.get(member_id) {
            Some(player) if show_info => {
                lines.push(PlayerRow::new(player, Some(&team.name)).render());
            }
            _ => lines.push(format!(" - {}", display_name(players, *member_id))),
        }
    }
    lines
}

/// Every team, optionally with its members and their profiles.
pub fn render_team_listing(
    teams: &Teams,
    players: &Players,
    show_members: bool,
    show_info: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    for team in teams.0.values() {
        lines.extend(team_lines(team, players, show_members, show_info));
        lines.push("-".repeat(60));
    }
    code_blocks(&lines)
}

pub fn render_team(team: &Team, players: &Players, show_info: bool) -> Vec<String> {
    code_blocks(&team_lines(team, players, true, show_info))
}

/// Pack lines into as few fenced code blocks as fit the message limit.
/// A single line longer than the limit is truncated.
pub fn code_blocks(lines: &[String]) -> Vec<String> {
    let budget = MESSAGE_LIMIT - 2 * CODE_FENCE.len() - 1;
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let line: String = line.chars().take(budget).collect();
        if !current.is_empty() && current.len() + line.len() + 1 > budget {
            blocks.push(format!("{CODE_FENCE}{current}{CODE_FENCE}"));
            current.clear();
        }
        current.push_str(&line);
        current.push('\n');
    }

    if !current.is_empty() {
        blocks.push(format!("{CODE_FENCE}{current}{CODE_FENCE}"));
    }
    blocks
}

// ============================================================================
// COMPOSITION COMPARISON
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSlot {
    /// 1-based position in the composition.
    pub index: usize,
    pub role: Role,
    pub player_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionReport {
    pub filled: Vec<RoleSlot>,
    pub unfilled: Vec<RoleSlot>,
    /// Roster members beyond the number of declared roles.
    pub extra: Vec<u64>,
}

/// Map the roster positionally onto the declared roles.
pub fn compare_composition(composition: &TeamComposition, roster: &[u64]) -> CompositionReport {
    let mut report = CompositionReport::default();

    for (offset, role) in composition.roles.iter().enumerate() {
        let slot = RoleSlot {
            index: offset + 1,
            role: role.clone(),
            player_id: roster.get(offset).copied(),
        };
        if slot.player_id.is_some() {
            report.filled.push(slot);
        } else {
            report.unfilled.push(slot);
        }
    }

    if roster.len() > composition.roles.len() {
        report.extra = roster[composition.roles.len()..].to_vec();
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, name: &str, class: &str) -> Player {
        let mut p = Player::blank(id, name);
        p.class = class.to_string();
        p
    }

    fn team(name: &str, captain: u64, members: Vec<u64>) -> Team {
        Team {
            name: name.to_string(),
            captain_id: captain,
            captain_name: format!("captain{captain}"),
            members,
            plan: None,
        }
    }

    #[test]
    fn test_sort_key_parse_is_case_insensitive() {
        assert_eq!(SortKey::parse("CLASS"), Some(SortKey::Class));
        assert_eq!(SortKey::parse("availability"), Some(SortKey::Availability));
        assert_eq!(SortKey::parse("level"), None);
        assert!(SortKey::valid_values().starts_with("Name, Class"));
    }

    #[test]
    fn test_player_rows_resolve_team_and_sort() {
        let mut players = Players::default();
        players.0.insert(1, player(1, "zed", "Paladin"));
        players.0.insert(2, player(2, "amy", "Amazon"));
        let mut teams = Teams::default();
        teams.0.insert("Alpha".to_string(), team("Alpha", 9, vec![1]));

        let rows = player_rows(&players, &teams, Some(SortKey::Name));
        assert_eq!(rows[0].name, "amy");
        assert_eq!(rows[0].team, "No team");
        assert_eq!(rows[1].name, "zed");
        assert_eq!(rows[1].team, "Alpha");
        assert_eq!(rows[0].build, "N/A");
    }

    #[test]
    fn test_code_blocks_split_under_limit() {
        let lines: Vec<String> = (0..200).map(|i| format!("line number {i:>40}")).collect();
        let blocks = code_blocks(&lines);
        assert!(blocks.len() > 1);
        for block in &blocks {
            assert!(block.len() <= MESSAGE_LIMIT);
            assert!(block.starts_with("```") && block.ends_with("```"));
        }
        let total: usize = blocks.iter().map(|b| b.matches("line number").count()).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_team_listing_hides_members_when_asked() {
        let mut players = Players::default();
        players.0.insert(1, player(1, "amy", "Amazon"));
        let mut teams = Teams::default();
        teams.0.insert("Alpha".to_string(), team("Alpha", 9, vec![1]));

        let hidden = render_team_listing(&teams, &players, false, false).join("");
        assert!(hidden.contains("Team: Alpha | Captain: captain9"));
        assert!(!hidden.contains("amy"));

        let shown = render_team_listing(&teams, &players, true, false).join("");
        assert!(shown.contains(" - amy"));

        let detailed = render_team(&teams.0["Alpha"], &players, true).join("");
        assert!(detailed.contains("Amazon"));
    }

    #[test]
    fn test_compare_composition_positions() {
        let role = |class: &str| Role {
            class: class.to_string(),
            ..Role::default()
        };
        let comp = TeamComposition {
            team_id: "Alpha".to_string(),
            roles: vec![role("Sorceress"), role("Paladin"), role("Barbarian")],
        };

        let report = compare_composition(&comp, &[10, 11]);
        assert_eq!(report.filled.len(), 2);
        assert_eq!(report.filled[1].player_id, Some(11));
        assert_eq!(report.unfilled.len(), 1);
        assert_eq!(report.unfilled[0].index, 3);
        assert!(report.extra.is_empty());

        let crowded = compare_composition(&comp, &[1, 2, 3, 4, 5]);
        assert_eq!(crowded.extra, vec![4, 5]);
        assert!(crowded.unfilled.is_empty());
    }
}
