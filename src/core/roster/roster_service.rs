// Team lifecycle and registration logic.
//
// No Discord types in here: callers pass user ids and names, and get back
// domain values or a `RosterError` whose text is shown to the user as-is.
// Every mutation is a single `DocumentStore::update`, so the read-modify-write
// of one document never interleaves with another handler's.

use super::autofill::{suggest_autofill, RoleSuggestion};
use super::roster_models::{
    Applications, Compositions, Invitations, Player, Players, ProfileField, RequestBook,
    RequestStatus, Role, Sequences, Team, TeamComposition, TeamRequest, Teams,
};
use super::roster_store::{DocumentStore, StoreError};
use super::roster_views::{compare_composition, player_rows, CompositionReport, PlayerRow, SortKey};
use thiserror::Error;

pub const TEAM_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
pub const MAX_ROLES: usize = 8;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("You are not registered. Use /register first.")]
    NotRegistered,
    #[error("This player is not registered.")]
    PlayerNotRegistered,
    #[error("Team not found.")]
    TeamNotFound,
    #[error("A team with that name already exists.")]
    TeamExists,
    #[error("Team name must be between 3 and 50 characters.")]
    InvalidTeamName,
    #[error("Please answer yes or no for joining the team.")]
    InvalidJoinDecision,
    #[error("You are not the captain of this team.")]
    NotCaptain,
    #[error("You have already applied to this team.")]
    AlreadyApplied,
    #[error("An invitation has already been sent to this player.")]
    AlreadyInvited,
    #[error("This player is already on the team.")]
    AlreadyMember,
    #[error("This player has not applied to your team.")]
    NoPendingApplication,
    #[error("You do not have a pending invitation from this team.")]
    NoPendingInvitation,
    #[error("You are not part of any team.")]
    NotInAnyTeam,
    #[error("You are not a member of this team.")]
    NotTeamMember,
    #[error("That player is not on this team.")]
    PlayerNotOnTeam,
    #[error("No team composition found. Please set it using /set_team_comp.")]
    NoComposition,
    #[error("No plan has been set for team {0}.")]
    NoPlan(String),
    #[error("Invalid sort_by value: {0}. Please use one of: {1}.")]
    InvalidSortKey(String, String),
    #[error("Number of roles must be between 1 and {0}.")]
    InvalidRoleCount(usize),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Profile fields outside the wizard. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub availability: Option<String>,
    pub experience: Option<bool>,
    pub first_reset: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RosterSettings {
    /// Treat a captain as part of their team's roster even if they did not join.
    pub captain_is_member: bool,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            captain_is_member: false,
        }
    }
}

pub fn validate_role_count(num_roles: usize) -> Result<(), RosterError> {
    if (1..=MAX_ROLES).contains(&num_roles) {
        Ok(())
    } else {
        Err(RosterError::InvalidRoleCount(MAX_ROLES))
    }
}

pub struct RosterService<S: DocumentStore> {
    store: S,
    settings: RosterSettings,
}

impl<S: DocumentStore> RosterService<S> {
    pub fn new(store: S, settings: RosterSettings) -> Self {
        Self { store, settings }
    }

    // ========================================================================
    // PLAYERS
    // ========================================================================

    /// Create or reset a player's profile. Registering again wipes every
    /// selectable field.
    pub async fn register(&self, user_id: u64, username: &str) -> Result<Player, RosterError> {
        let player = Player::blank(user_id, username);
        let stored = player.clone();
        self.store
            .update(move |players: &mut Players| -> Result<(), RosterError> {
                players.0.insert(user_id, stored);
                Ok(())
            })
            .await?;

        tracing::info!(user_id, username, "Player registered");
        Ok(player)
    }

    pub async fn player(&self, user_id: u64) -> Result<Option<Player>, RosterError> {
        let players: Players = self.store.load().await?;
        Ok(players.0.get(&user_id).cloned())
    }

    pub async fn players(&self) -> Result<Players, RosterError> {
        Ok(self.store.load().await?)
    }

    async fn require_registered(&self, user_id: u64, err: RosterError) -> Result<Player, RosterError> {
        self.player(user_id).await?.ok_or(err)
    }

    /// Write one wizard answer into the player's profile.
    pub async fn set_player_field(
        &self,
        user_id: u64,
        field: ProfileField,
        value: &str,
    ) -> Result<Player, RosterError> {
        let player = self
            .store
            .update(|players: &mut Players| -> Result<Player, RosterError> {
                let player = players
                    .0
                    .get_mut(&user_id)
                    .ok_or(RosterError::NotRegistered)?;
                player.set(field, value);
                Ok(player.clone())
            })
            .await?;

        tracing::debug!(user_id, field = field.token(), value, "Player field updated");
        Ok(player)
    }

    pub async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<Player, RosterError> {
        self.store
            .update(move |players: &mut Players| -> Result<Player, RosterError> {
                let player = players
                    .0
                    .get_mut(&user_id)
                    .ok_or(RosterError::NotRegistered)?;
                if let Some(availability) = update.availability {
                    player.availability = availability;
                }
                if let Some(experience) = update.experience {
                    player.experience = experience;
                }
                if let Some(first_reset) = update.first_reset {
                    player.first_reset = first_reset;
                }
                Ok(player.clone())
            })
            .await
    }

    pub async fn player_table(&self, sort_by: Option<&str>) -> Result<Vec<PlayerRow>, RosterError> {
        let sort = match sort_by {
            Some(raw) => Some(SortKey::parse(raw).ok_or_else(|| {
                RosterError::InvalidSortKey(raw.to_string(), SortKey::valid_values())
            })?),
            None => None,
        };

        let players: Players = self.store.load().await?;
        let teams: Teams = self.store.load().await?;
        Ok(player_rows(&players, &teams, sort))
    }

    // ========================================================================
    // TEAMS
    // ========================================================================

    pub async fn teams(&self) -> Result<Teams, RosterError> {
        Ok(self.store.load().await?)
    }

    pub async fn team(&self, name: &str) -> Result<Team, RosterError> {
        let teams: Teams = self.store.load().await?;
        teams.0.get(name).cloned().ok_or(RosterError::TeamNotFound)
    }

    /// The first team (in name order) listing `user_id` as a member.
    pub async fn team_of(&self, user_id: u64) -> Result<Option<Team>, RosterError> {
        let teams: Teams = self.store.load().await?;
        Ok(teams.team_of(user_id).cloned())
    }

    /// Load a team and verify `user_id` captains it.
    pub async fn captained_team(&self, user_id: u64, name: &str) -> Result<Team, RosterError> {
        let team = self.team(name).await?;
        if team.captain_id != user_id {
            return Err(RosterError::NotCaptain);
        }
        Ok(team)
    }

    pub async fn create_team(
        &self,
        captain_id: u64,
        captain_name: &str,
        name: &str,
        join: bool,
    ) -> Result<Team, RosterError> {
        let name = name.trim();
        if !TEAM_NAME_LEN.contains(&name.chars().count()) {
            return Err(RosterError::InvalidTeamName);
        }

        let team = Team {
            name: name.to_string(),
            captain_id,
            captain_name: captain_name.to_string(),
            members: if join { vec![captain_id] } else { Vec::new() },
            plan: None,
        };
        let stored = team.clone();
        self.store
            .update(move |teams: &mut Teams| -> Result<(), RosterError> {
                if teams.0.contains_key(&stored.name) {
                    return Err(RosterError::TeamExists);
                }
                teams.0.insert(stored.name.clone(), stored);
                Ok(())
            })
            .await?;

        tracing::info!(captain_id, team = %team.name, join, "Team created");
        Ok(team)
    }

    async fn add_member(&self, team_name: &str, player_id: u64) -> Result<Team, RosterError> {
        self.store
            .update(|teams: &mut Teams| -> Result<Team, RosterError> {
                let team = teams
                    .0
                    .get_mut(team_name)
                    .ok_or(RosterError::TeamNotFound)?;
                if !team.has_member(player_id) {
                    team.members.push(player_id);
                }
                Ok(team.clone())
            })
            .await
    }

    /// Remove `player_id` from the named team, or from the first team listing
    /// them when no name is given.
    async fn detach(
        &self,
        player_id: u64,
        team_name: Option<&str>,
        not_member: RosterError,
        no_team: RosterError,
    ) -> Result<Team, RosterError> {
        self.store
            .update(|teams: &mut Teams| -> Result<Team, RosterError> {
                let name = match team_name {
                    Some(name) => {
                        let team = teams.0.get(name).ok_or(RosterError::TeamNotFound)?;
                        if !team.has_member(player_id) {
                            return Err(not_member);
                        }
                        name.to_string()
                    }
                    None => teams.team_of(player_id).ok_or(no_team)?.name.clone(),
                };

                let team = teams.0.get_mut(&name).ok_or(RosterError::TeamNotFound)?;
                team.members.retain(|id| *id != player_id);
                Ok(team.clone())
            })
            .await
    }

    pub async fn leave(&self, player_id: u64, team_name: Option<&str>) -> Result<Team, RosterError> {
        self.require_registered(player_id, RosterError::NotRegistered)
            .await?;
        let team = self
            .detach(
                player_id,
                team_name,
                RosterError::NotTeamMember,
                RosterError::NotInAnyTeam,
            )
            .await?;

        tracing::info!(player_id, team = %team.name, "Player left team");
        Ok(team)
    }

    /// Administrative removal; the player does not need a profile.
    pub async fn remove_player(
        &self,
        player_id: u64,
        team_name: Option<&str>,
    ) -> Result<Team, RosterError> {
        let team = self
            .detach(
                player_id,
                team_name,
                RosterError::PlayerNotOnTeam,
                RosterError::PlayerNotOnTeam,
            )
            .await?;

        tracing::info!(player_id, team = %team.name, "Player removed from team by council");
        Ok(team)
    }

    // ========================================================================
    // APPLICATIONS & INVITATIONS
    // ========================================================================

    async fn allocate_id<B: RequestBook>(&self) -> Result<u64, RosterError> {
        let book: B = self.store.load().await?;
        let floor = book.max_id();
        self.store
            .update(|seq: &mut Sequences| -> Result<u64, RosterError> {
                Ok(seq.advance(B::KIND, floor))
            })
            .await
    }

    /// Append a new pending request unless one is already pending for the pair.
    async fn open_request<B: RequestBook>(
        &self,
        player_id: u64,
        team_name: &str,
        conflict: RosterError,
    ) -> Result<TeamRequest, RosterError> {
        let id = self.allocate_id::<B>().await?;
        self.store
            .update(|book: &mut B| -> Result<TeamRequest, RosterError> {
                if book.has_pending(player_id, team_name) {
                    return Err(conflict);
                }
                let id = if book.requests().contains_key(&id) {
                    book.max_id() + 1
                } else {
                    id
                };
                let request = TeamRequest {
                    id,
                    player_id,
                    team_id: team_name.to_string(),
                    status: RequestStatus::Pending,
                };
                book.requests_mut().insert(id, request.clone());
                Ok(request)
            })
            .await
    }

    /// Flip the pending request for the pair to `status`.
    async fn resolve_request<B: RequestBook>(
        &self,
        player_id: u64,
        team_name: &str,
        status: RequestStatus,
        missing: RosterError,
    ) -> Result<TeamRequest, RosterError> {
        self.store
            .update(|book: &mut B| -> Result<TeamRequest, RosterError> {
                let request = book.pending_mut(player_id, team_name).ok_or(missing)?;
                request.status = status;
                Ok(request.clone())
            })
            .await
    }

    pub async fn apply(&self, player_id: u64, team_name: &str) -> Result<(TeamRequest, Team), RosterError> {
        self.require_registered(player_id, RosterError::NotRegistered)
            .await?;
        let team = self.team(team_name).await?;
        if team.has_member(player_id) {
            return Err(RosterError::AlreadyMember);
        }

        let application = self
            .open_request::<Applications>(player_id, team_name, RosterError::AlreadyApplied)
            .await?;

        tracing::info!(player_id, team = team_name, id = application.id, "Application created");
        Ok((application, team))
    }

    pub async fn invite(
        &self,
        captain_id: u64,
        player_id: u64,
        team_name: &str,
    ) -> Result<TeamRequest, RosterError> {
        let team = self.captained_team(captain_id, team_name).await?;
        self.require_registered(player_id, RosterError::PlayerNotRegistered)
            .await?;
        if team.has_member(player_id) {
            return Err(RosterError::AlreadyMember);
        }

        let invitation = self
            .open_request::<Invitations>(player_id, team_name, RosterError::AlreadyInvited)
            .await?;

        tracing::info!(captain_id, player_id, team = team_name, id = invitation.id, "Invitation created");
        Ok(invitation)
    }

    /// The invited player accepts or declines. Accepting adds them to the team.
    pub async fn respond_to_invitation(
        &self,
        player_id: u64,
        team_name: &str,
        accept: bool,
    ) -> Result<Team, RosterError> {
        self.require_registered(player_id, RosterError::NotRegistered)
            .await?;
        let team = self.team(team_name).await?;

        let status = if accept {
            RequestStatus::Accepted
        } else {
            RequestStatus::Declined
        };
        self.resolve_request::<Invitations>(
            player_id,
            team_name,
            status,
            RosterError::NoPendingInvitation,
        )
        .await?;

        tracing::info!(player_id, team = team_name, ?status, "Invitation answered");
        if accept {
            self.add_member(team_name, player_id).await
        } else {
            Ok(team)
        }
    }

    /// The captain accepts or declines an application. Accepting adds the player.
    pub async fn respond_to_application(
        &self,
        captain_id: u64,
        player_id: u64,
        team_name: &str,
        accept: bool,
    ) -> Result<Team, RosterError> {
        let team = self.captained_team(captain_id, team_name).await?;
        self.require_registered(player_id, RosterError::PlayerNotRegistered)
            .await?;

        let status = if accept {
            RequestStatus::Accepted
        } else {
            RequestStatus::Declined
        };
        self.resolve_request::<Applications>(
            player_id,
            team_name,
            status,
            RosterError::NoPendingApplication,
        )
        .await?;

        tracing::info!(captain_id, player_id, team = team_name, ?status, "Application answered");
        if accept {
            self.add_member(team_name, player_id).await
        } else {
            Ok(team)
        }
    }

    /// Pending applications for a captain's team, paired with the applicant's
    /// profile. Applications from players without a profile are skipped.
    pub async fn pending_applications(
        &self,
        captain_id: u64,
        team_name: &str,
    ) -> Result<Vec<(TeamRequest, Player)>, RosterError> {
        self.captained_team(captain_id, team_name).await?;
        let applications: Applications = self.store.load().await?;
        let players: Players = self.store.load().await?;

        Ok(applications
            .0
            .values()
            .filter(|app| app.team_id == team_name && app.status == RequestStatus::Pending)
            .filter_map(|app| {
                players
                    .0
                    .get(&app.player_id)
                    .map(|player| (app.clone(), player.clone()))
            })
            .collect())
    }

    // ========================================================================
    // COMPOSITION
    // ========================================================================

    /// Write one wizard answer into role `role_index` (1-based). Missing
    /// positions up to `role_index` are appended; an existing one is overwritten.
    pub async fn set_role_field(
        &self,
        team_name: &str,
        role_index: usize,
        field: ProfileField,
        value: &str,
    ) -> Result<Role, RosterError> {
        let role = self
            .store
            .update(|comps: &mut Compositions| -> Result<Role, RosterError> {
                let comp = comps
                    .0
                    .entry(team_name.to_string())
                    .or_insert_with(|| TeamComposition {
                        team_id: team_name.to_string(),
                        roles: Vec::new(),
                    });
                while comp.roles.len() < role_index {
                    comp.roles.push(Role::default());
                }
                let role = &mut comp.roles[role_index - 1];
                role.set(field, value);
                Ok(role.clone())
            })
            .await?;

        tracing::debug!(team = team_name, role_index, field = field.token(), value, "Role field updated");
        Ok(role)
    }

    /// Drop roles past `num_roles` left over from an older, longer composition.
    pub async fn finish_composition(
        &self,
        team_name: &str,
        num_roles: usize,
    ) -> Result<TeamComposition, RosterError> {
        let comp = self
            .store
            .update(|comps: &mut Compositions| -> Result<TeamComposition, RosterError> {
                let comp = comps
                    .0
                    .get_mut(team_name)
                    .ok_or(RosterError::NoComposition)?;
                comp.roles.truncate(num_roles);
                Ok(comp.clone())
            })
            .await?;

        tracing::info!(team = team_name, roles = comp.roles.len(), "Team composition completed");
        Ok(comp)
    }

    pub async fn composition(&self, team_name: &str) -> Result<TeamComposition, RosterError> {
        let comps: Compositions = self.store.load().await?;
        comps
            .0
            .get(team_name)
            .cloned()
            .ok_or(RosterError::NoComposition)
    }

    pub async fn compare_composition(
        &self,
        team_name: &str,
    ) -> Result<(CompositionReport, Players), RosterError> {
        let comp = self.composition(team_name).await?;
        let team = self.team(team_name).await?;
        let players: Players = self.store.load().await?;

        let roster = team.roster(self.settings.captain_is_member);
        Ok((compare_composition(&comp, &roster), players))
    }

    pub async fn suggest_autofill(
        &self,
        captain_id: u64,
        team_name: &str,
    ) -> Result<Vec<RoleSuggestion>, RosterError> {
        let team = self.captained_team(captain_id, team_name).await?;
        let comp = self.composition(team_name).await?;
        let players: Players = self.store.load().await?;
        let teams: Teams = self.store.load().await?;
        let invitations: Invitations = self.store.load().await?;

        let also_excluded = if self.settings.captain_is_member {
            vec![team.captain_id]
        } else {
            Vec::new()
        };
        Ok(suggest_autofill(
            &comp.roles,
            &players,
            &teams,
            &invitations,
            &also_excluded,
        ))
    }

    // ========================================================================
    // PLAN
    // ========================================================================

    /// Store a plan. Returns the team so the caller can notify its roster.
    pub async fn set_plan(
        &self,
        captain_id: u64,
        team_name: &str,
        plan: String,
    ) -> Result<Team, RosterError> {
        let team = self
            .store
            .update(|teams: &mut Teams| -> Result<Team, RosterError> {
                let team = teams
                    .0
                    .get_mut(team_name)
                    .ok_or(RosterError::TeamNotFound)?;
                if team.captain_id != captain_id {
                    return Err(RosterError::NotCaptain);
                }
                team.plan = Some(plan);
                Ok(team.clone())
            })
            .await?;

        tracing::info!(captain_id, team = team_name, "Team plan updated");
        Ok(team)
    }

    /// The plan, visible to roster members and the captain.
    pub async fn plan(&self, viewer_id: u64, team_name: &str) -> Result<String, RosterError> {
        let team = self.team(team_name).await?;
        let roster = team.roster(self.settings.captain_is_member);
        if viewer_id != team.captain_id && !roster.contains(&viewer_id) {
            return Err(RosterError::NotTeamMember);
        }

        match team.plan {
            Some(plan) if !plan.trim().is_empty() => Ok(plan),
            _ => Err(RosterError::NoPlan(team.name)),
        }
    }

    /// Roster ids that should hear about a change, excluding `except`.
    pub fn recipients(&self, team: &Team, except: u64) -> Vec<u64> {
        team.roster(self.settings.captain_is_member)
            .into_iter()
            .filter(|id| *id != except)
            .collect()
    }
}
