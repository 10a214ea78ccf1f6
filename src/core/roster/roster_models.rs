use super::roster_store::Document;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// ENTITIES
// ============================================================================

/// A registered player. Created blank by `/register`; the wizard then fills
/// the selectable fields one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(alias = "discord_id", deserialize_with = "numeric_id")]
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub seriousness: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub first_reset: bool,
    #[serde(default)]
    pub experience: bool,
    #[serde(default)]
    pub availability: String,
}

impl Player {
    pub fn blank(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            class: String::new(),
            build: String::new(),
            seriousness: String::new(),
            timezone: String::new(),
            first_reset: false,
            experience: false,
            availability: String::new(),
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Class => self.class = value,
            ProfileField::Build => self.build = value,
            ProfileField::Seriousness => self.seriousness = value,
            ProfileField::Timezone => self.timezone = value,
        }
    }
}

/// The single-choice fields a wizard step can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Class,
    Build,
    Seriousness,
    Timezone,
}

impl ProfileField {
    pub fn token(self) -> &'static str {
        match self {
            ProfileField::Class => "class",
            ProfileField::Build => "build",
            ProfileField::Seriousness => "seriousness",
            ProfileField::Timezone => "timezone",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "class" => Some(ProfileField::Class),
            "build" => Some(ProfileField::Build),
            "seriousness" => Some(ProfileField::Seriousness),
            "timezone" => Some(ProfileField::Timezone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "team_name")]
    pub name: String,
    pub captain_id: u64,
    pub captain_name: String,
    #[serde(default)]
    pub members: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl Team {
    pub fn has_member(&self, player_id: u64) -> bool {
        self.members.contains(&player_id)
    }

    /// Members used for planning and notification. When `captain_is_member`
    /// is set the captain is appended if they did not join explicitly.
    pub fn roster(&self, captain_is_member: bool) -> Vec<u64> {
        let mut roster = self.members.clone();
        if captain_is_member && !roster.contains(&self.captain_id) {
            roster.push(self.captain_id);
        }
        roster
    }
}

/// Ids were historically written as strings (`"discord_id": "123"`,
/// `"id": "4"`); accept both forms and always write numbers.
fn numeric_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id {text:?}"))),
    }
}

fn default_role_count() -> u32 {
    1
}

/// One desired slot of a team composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub seriousness: String,
    #[serde(default = "default_role_count")]
    pub count: u32,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub experience_required: bool,
}

impl Default for Role {
    fn default() -> Self {
        Self {
            class: String::new(),
            build: String::new(),
            seriousness: String::new(),
            count: default_role_count(),
            availability: String::new(),
            experience_required: false,
        }
    }
}

impl Role {
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Class => self.class = value,
            ProfileField::Build => self.build = value,
            ProfileField::Seriousness => self.seriousness = value,
            // Roles carry no timezone.
            ProfileField::Timezone => {}
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({}) x{}", self.class, self.build, self.count)
    }

    pub fn summary(&self) -> String {
        format!("{} - {} - {}", self.class, self.build, self.seriousness)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamComposition {
    pub team_id: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

/// An application (player asks to join) or an invitation (captain asks a
/// player). Both share the same shape and lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRequest {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,
    pub player_id: u64,
    pub team_id: String,
    pub status: RequestStatus,
}

impl TeamRequest {
    pub fn is_pending_for(&self, player_id: u64, team: &str) -> bool {
        self.status == RequestStatus::Pending && self.player_id == player_id && self.team_id == team
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Players(pub BTreeMap<u64, Player>);

impl Document for Players {
    const NAME: &'static str = "players";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Teams(pub BTreeMap<String, Team>);

impl Document for Teams {
    const NAME: &'static str = "teams";
}

impl Teams {
    /// The first team (in name order) listing `player_id` as a member.
    pub fn team_of(&self, player_id: u64) -> Option<&Team> {
        self.0.values().find(|team| team.has_member(player_id))
    }

    pub fn all_members(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.values().flat_map(|team| team.members.iter().copied())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compositions(pub BTreeMap<String, TeamComposition>);

impl Document for Compositions {
    const NAME: &'static str = "team_compositions";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Application,
    Invitation,
}

/// Shared access to the two request documents.
pub trait RequestBook: Document {
    const KIND: RequestKind;

    fn requests(&self) -> &BTreeMap<u64, TeamRequest>;
    fn requests_mut(&mut self) -> &mut BTreeMap<u64, TeamRequest>;

    fn max_id(&self) -> u64 {
        self.requests().keys().next_back().copied().unwrap_or(0)
    }

    fn pending_mut(&mut self, player_id: u64, team: &str) -> Option<&mut TeamRequest> {
        self.requests_mut()
            .values_mut()
            .find(|request| request.is_pending_for(player_id, team))
    }

    fn has_pending(&self, player_id: u64, team: &str) -> bool {
        self.requests()
            .values()
            .any(|request| request.is_pending_for(player_id, team))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Applications(pub BTreeMap<u64, TeamRequest>);

impl Document for Applications {
    const NAME: &'static str = "applications";
}

impl RequestBook for Applications {
    const KIND: RequestKind = RequestKind::Application;

    fn requests(&self) -> &BTreeMap<u64, TeamRequest> {
        &self.0
    }

    fn requests_mut(&mut self) -> &mut BTreeMap<u64, TeamRequest> {
        &mut self.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Invitations(pub BTreeMap<u64, TeamRequest>);

impl Document for Invitations {
    const NAME: &'static str = "invitations";
}

impl RequestBook for Invitations {
    const KIND: RequestKind = RequestKind::Invitation;

    fn requests(&self) -> &BTreeMap<u64, TeamRequest> {
        &self.0
    }

    fn requests_mut(&mut self) -> &mut BTreeMap<u64, TeamRequest> {
        &mut self.0
    }
}

impl Invitations {
    pub fn pending_players(&self) -> impl Iterator<Item = u64> + '_ {
        self.0
            .values()
            .filter(|inv| inv.status == RequestStatus::Pending)
            .map(|inv| inv.player_id)
    }
}

/// Monotonic id counters for the request documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub applications: u64,
    #[serde(default)]
    pub invitations: u64,
}

impl Document for Sequences {
    const NAME: &'static str = "sequences";
}

impl Sequences {
    /// Hand out the next id for `kind`, never going below `floor + 1` so a
    /// counter created after the fact skips ids already on disk.
    pub fn advance(&mut self, kind: RequestKind, floor: u64) -> u64 {
        let counter = match kind {
            RequestKind::Application => &mut self.applications,
            RequestKind::Invitation => &mut self.invitations,
        };
        *counter = (*counter).max(floor) + 1;
        *counter
    }
}

/// Parse a yes/no answer, case-insensitively.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_appends_captain_only_when_configured() {
        let team = Team {
            name: "Alpha".to_string(),
            captain_id: 1,
            captain_name: "cap".to_string(),
            members: vec![2, 3],
            plan: None,
        };

        assert_eq!(team.roster(false), vec![2, 3]);
        assert_eq!(team.roster(true), vec![2, 3, 1]);
    }

    #[test]
    fn test_sequence_skips_existing_ids() {
        let mut seq = Sequences::default();
        assert_eq!(seq.advance(RequestKind::Application, 0), 1);
        assert_eq!(seq.advance(RequestKind::Application, 0), 2);
        // Legacy file already holds ids up to 7
        assert_eq!(seq.advance(RequestKind::Invitation, 7), 8);
        assert_eq!(seq.invitations, 8);
        assert_eq!(seq.applications, 2);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Yes"), Some(true));
        assert_eq!(parse_yes_no(" NO "), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn test_role_defaults_when_fields_missing() {
        let role: Role = serde_json::from_str(r#"{"class": "Sorceress"}"#).unwrap();
        assert_eq!(role.class, "Sorceress");
        assert_eq!(role.count, 1);
        assert!(role.availability.is_empty());
        assert!(!role.experience_required);
    }

    #[test]
    fn test_reads_string_ids_from_older_files() {
        let players: Players = serde_json::from_str(
            r#"{
                "123456789012345678": {
                    "discord_id": "123456789012345678",
                    "username": "wanda",
                    "class": "Sorceress",
                    "build": "",
                    "seriousness": "",
                    "timezone": "",
                    "first_reset": false,
                    "experience": false,
                    "availability": ""
                }
            }"#,
        )
        .unwrap();
        let player = &players.0[&123456789012345678];
        assert_eq!(player.id, 123456789012345678);
        assert_eq!(player.class, "Sorceress");

        let invitations: Invitations = serde_json::from_str(
            r#"{"1": {"id": "1", "team_id": "Alpha", "player_id": 42, "status": "Pending"}}"#,
        )
        .unwrap();
        assert_eq!(invitations.0[&1].id, 1);
        assert_eq!(invitations.pending_players().collect::<Vec<_>>(), vec![42]);

        let applications: Applications = serde_json::from_str(
            r#"{"3": {"id": "3", "player_id": 7, "team_id": "Alpha", "status": "Declined"}}"#,
        )
        .unwrap();
        assert_eq!(applications.max_id(), 3);
    }

    #[test]
    fn test_writes_numeric_ids() {
        let json = serde_json::to_value(Player::blank(5, "amy")).unwrap();
        assert_eq!(json["id"], 5);
        assert!(json.get("discord_id").is_none());

        let bad = serde_json::from_str::<Player>(r#"{"discord_id": "abc", "username": "x"}"#);
        assert!(bad.is_err());
    }
}
