// Guided selection wizards.
//
// A session per (user, wizard kind) records the current step and the answers
// given so far. Each answer is checked against the options of the current
// step, written to the roster straight away, and then the session moves on.
// Nothing is rolled back if the user walks away: the profile or composition
// simply stays partially filled.

use super::wizard_models::{Advance, Answer, Prompt, Step, WizardKind, WizardSession, WizardTarget};
use crate::core::catalog::{choices, BuildCatalog, Choice, PLAYER_SERIOUSNESS, ROLE_SERIOUSNESS, TIMEZONES};
use crate::core::roster::{validate_role_count, DocumentStore, ProfileField, RosterError, RosterService};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("This selection has expired. Please start again.")]
    NoSession,
    #[error("This prompt is out of date. Please answer the latest one.")]
    StaleStep,
    #[error("'{value}' is not a valid choice. Valid options: {options}.")]
    InvalidChoice { value: String, options: String },
    #[error("No builds are listed for class {0}.")]
    UnknownClass(String),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

pub struct WizardService<S: DocumentStore> {
    roster: Arc<RosterService<S>>,
    catalog: Arc<BuildCatalog>,
    sessions: DashMap<(u64, WizardKind), WizardSession>,
    next_session: AtomicU64,
    ttl: Duration,
}

impl<S: DocumentStore> WizardService<S> {
    pub fn new(roster: Arc<RosterService<S>>, catalog: Arc<BuildCatalog>, ttl: Duration) -> Self {
        Self {
            roster,
            catalog,
            sessions: DashMap::new(),
            next_session: AtomicU64::new(1),
            ttl,
        }
    }

    /// Reset the caller's profile and open the registration wizard.
    pub async fn start_registration(&self, user_id: u64, username: &str) -> Result<Prompt, WizardError> {
        self.roster.register(user_id, username).await?;
        let session = WizardSession::new(
            self.session_id(),
            user_id,
            WizardKind::Registration,
            WizardTarget::Player,
        );
        self.open(session)
    }

    /// Open the composition wizard for a team the caller captains.
    pub async fn start_composition(
        &self,
        captain_id: u64,
        team_name: &str,
        num_roles: usize,
    ) -> Result<Prompt, WizardError> {
        validate_role_count(num_roles)?;
        let team = self.roster.captained_team(captain_id, team_name).await?;
        let target = WizardTarget::Team {
            name: team.name,
            num_roles,
        };
        let session =
            WizardSession::new(self.session_id(), captain_id, WizardKind::Composition, target);
        self.open(session)
    }

    fn session_id(&self) -> u64 {
        self.next_session.fetch_add(1, Ordering::Relaxed)
    }

    fn open(&self, session: WizardSession) -> Result<Prompt, WizardError> {
        let prompt = self.prompt(&session)?;
        tracing::debug!(user_id = session.user_id, kind = session.kind.token(), "Wizard started");
        self.sessions.insert((session.user_id, session.kind), session);
        Ok(prompt)
    }

    /// Apply one answer. `session_id` and `step` identify the prompt that was
    /// answered; an answer to anything but the current prompt of the open
    /// session is rejected without writing.
    pub async fn answer(
        &self,
        user_id: u64,
        kind: WizardKind,
        session_id: u64,
        step: Step,
        value: &str,
    ) -> Result<Advance, WizardError> {
        let key = (user_id, kind);
        let mut session = self
            .sessions
            .get(&key)
            .map(|s| s.clone())
            .ok_or(WizardError::NoSession)?;

        let now = Utc::now();
        if session.is_expired(now, self.ttl) {
            self.sessions.remove_if(&key, |_, s| s.id == session.id);
            return Err(WizardError::NoSession);
        }
        if session.id != session_id || session.step != step {
            return Err(WizardError::StaleStep);
        }

        let options = self.choices_for(&session, step)?;
        if !options.iter().any(|c| c.label == value) {
            return Err(WizardError::InvalidChoice {
                value: value.to_string(),
                options: options
                    .iter()
                    .map(|c| c.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        match &session.target {
            WizardTarget::Player => {
                self.roster.set_player_field(user_id, step.field, value).await?;
            }
            WizardTarget::Team { name, .. } => {
                self.roster
                    .set_role_field(name, step.role, step.field, value)
                    .await?;
            }
        }

        session.answers.push(Answer {
            step,
            value: value.to_string(),
        });
        session.last_activity = now;
        let confirmation = confirmation(&session.target, step, value);

        match step.next(&session.target) {
            Some(next) => {
                session.step = next;
                let prompt = self.prompt(&session)?;
                self.store_progress(key, step, session);
                Ok(Advance::Next {
                    confirmation,
                    prompt,
                })
            }
            None => {
                self.sessions.remove_if(&key, |_, s| s.id == session.id);
                if let WizardTarget::Team { name, num_roles } = &session.target {
                    self.roster.finish_composition(name, *num_roles).await?;
                }
                tracing::info!(user_id, kind = kind.token(), "Wizard finished");
                Ok(Advance::Finished { confirmation })
            }
        }
    }

    // The roster write above awaited, so the session may have been cancelled,
    // swept or replaced meanwhile. Only the run we read is moved forward.
    fn store_progress(&self, key: (u64, WizardKind), answered: Step, session: WizardSession) {
        match self.sessions.get_mut(&key) {
            Some(mut current) if current.id == session.id && current.step == answered => {
                *current = session;
            }
            _ => tracing::debug!(
                user_id = session.user_id,
                kind = session.kind.token(),
                "Wizard session changed during answer; progress dropped"
            ),
        }
    }

    /// Drop every open session of `user_id`. Returns how many were open.
    pub fn cancel(&self, user_id: u64) -> usize {
        [WizardKind::Registration, WizardKind::Composition]
            .into_iter()
            .filter(|kind| self.sessions.remove(&(user_id, *kind)).is_some())
            .count()
    }

    /// Drop sessions idle for longer than the configured timeout.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        before - self.sessions.len()
    }

    fn choices_for(&self, session: &WizardSession, step: Step) -> Result<Vec<Choice>, WizardError> {
        let list = match step.field {
            ProfileField::Class => self.catalog.class_choices(),
            ProfileField::Build => {
                let class = session
                    .answer_for(step.role, ProfileField::Class)
                    .unwrap_or_default();
                self.catalog
                    .build_choices(class)
                    .ok_or_else(|| WizardError::UnknownClass(class.to_string()))?
            }
            ProfileField::Seriousness => match session.target {
                WizardTarget::Player => choices(PLAYER_SERIOUSNESS),
                WizardTarget::Team { .. } => choices(ROLE_SERIOUSNESS),
            },
            ProfileField::Timezone => choices(TIMEZONES),
        };
        Ok(list)
    }

    fn prompt(&self, session: &WizardSession) -> Result<Prompt, WizardError> {
        let step = session.step;
        let (title, placeholder) = match (&session.target, step.field) {
            (WizardTarget::Player, ProfileField::Class) => {
                ("Class Selection".to_string(), "Choose your class...".to_string())
            }
            (WizardTarget::Player, ProfileField::Build) => {
                ("Build Selection".to_string(), "Choose your build...".to_string())
            }
            (WizardTarget::Player, ProfileField::Seriousness) => (
                "Seriousness Level".to_string(),
                "Choose your seriousness level...".to_string(),
            ),
            (WizardTarget::Player, ProfileField::Timezone) => (
                "Timezone".to_string(),
                "Choose your timezone... (Or closest one)".to_string(),
            ),
            (WizardTarget::Team { .. }, field) => (
                format!("Select {} for Role {}", field_title(field), step.role),
                format!("Choose {} for Role {}", field.token(), step.role),
            ),
        };

        Ok(Prompt {
            kind: session.kind,
            session: session.id,
            step,
            title,
            placeholder,
            choices: self.choices_for(session, step)?,
        })
    }
}

fn field_title(field: ProfileField) -> &'static str {
    match field {
        ProfileField::Class => "Class",
        ProfileField::Build => "Build",
        ProfileField::Seriousness => "Seriousness",
        ProfileField::Timezone => "Timezone",
    }
}

fn confirmation(target: &WizardTarget, step: Step, value: &str) -> String {
    match (target, step.field) {
        (WizardTarget::Player, ProfileField::Class) => {
            format!("Class selected: {value}. Now select your build.")
        }
        (WizardTarget::Player, ProfileField::Build) => {
            format!("Build selected: {value}. Now select your seriousness level.")
        }
        (WizardTarget::Player, ProfileField::Seriousness) => {
            format!("Seriousness level: {value}. Now select your timezone.")
        }
        (WizardTarget::Player, ProfileField::Timezone) => {
            format!("Timezone: {value}. Thank you for registering!")
        }
        (WizardTarget::Team { .. }, ProfileField::Class) => format!(
            "Class for Role {} set to: {value}. Now select the build.",
            step.role
        ),
        (WizardTarget::Team { .. }, ProfileField::Build) => format!(
            "Build for Role {} set to: {value}. Now select the seriousness level.",
            step.role
        ),
        (WizardTarget::Team { name, num_roles }, _) => {
            if step.role < *num_roles {
                format!(
                    "Seriousness for Role {} set to: {value}. Moving on to Role {}.",
                    step.role,
                    step.role + 1
                )
            } else {
                format!(
                    "Seriousness for Role {} set to: {value}. Team composition for {name} has been completed.",
                    step.role
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::roster_models::Player;
    use crate::core::roster::RosterSettings;
    use crate::infra::roster::InMemoryDocumentStore;

    const USER: u64 = 42;

    fn catalog() -> Arc<BuildCatalog> {
        let mut catalog = BuildCatalog::default();
        catalog.classes.insert(
            "Warrior".to_string(),
            vec!["Berserker".to_string(), "Guardian".to_string()],
        );
        catalog
            .classes
            .insert("Mage".to_string(), vec!["Frost".to_string()]);
        Arc::new(catalog)
    }

    fn wizard() -> (
        Arc<RosterService<InMemoryDocumentStore>>,
        WizardService<InMemoryDocumentStore>,
    ) {
        let roster = Arc::new(RosterService::new(
            InMemoryDocumentStore::new(),
            RosterSettings::default(),
        ));
        let wizard = WizardService::new(Arc::clone(&roster), catalog(), Duration::minutes(15));
        (roster, wizard)
    }

    fn step(role: usize, field: ProfileField) -> Step {
        Step { role, field }
    }

    /// Answer the prompt of USER's currently open session.
    async fn reply(
        wizard: &WizardService<InMemoryDocumentStore>,
        kind: WizardKind,
        step: Step,
        value: &str,
    ) -> Result<Advance, WizardError> {
        let session = wizard
            .sessions
            .get(&(USER, kind))
            .map(|s| s.id)
            .unwrap_or_default();
        wizard.answer(USER, kind, session, step, value).await
    }

    async fn captain_with_teams(roster: &RosterService<InMemoryDocumentStore>, teams: &[&str]) {
        roster.register(USER, "cap").await.unwrap();
        for team in teams {
            roster.create_team(USER, "cap", team, true).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_registration_end_to_end() {
        let (roster, wizard) = wizard();
        let prompt = wizard.start_registration(USER, "wanda").await.unwrap();
        assert_eq!(prompt.title, "Class Selection");
        assert_eq!(prompt.choices.len(), 2);

        let next = reply(&wizard, WizardKind::Registration, step(0, ProfileField::Class), "Warrior")
            .await
            .unwrap();
        match next {
            Advance::Next { prompt, .. } => {
                let builds: Vec<_> = prompt.choices.iter().map(|c| c.label.as_str()).collect();
                assert_eq!(builds, vec!["Berserker", "Guardian"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        reply(&wizard, WizardKind::Registration, step(0, ProfileField::Build), "Guardian")
            .await
            .unwrap();
        reply(&wizard, WizardKind::Registration, step(0, ProfileField::Seriousness), "Serious")
            .await
            .unwrap();
        let done = reply(&wizard, WizardKind::Registration, step(0, ProfileField::Timezone), "EST")
            .await
            .unwrap();
        assert!(matches!(done, Advance::Finished { .. }));
        assert!(!wizard.sessions.contains_key(&(USER, WizardKind::Registration)));

        let player = roster.player(USER).await.unwrap().unwrap();
        let mut expected = Player::blank(USER, "wanda");
        expected.class = "Warrior".to_string();
        expected.build = "Guardian".to_string();
        expected.seriousness = "Serious".to_string();
        expected.timezone = "EST".to_string();
        assert_eq!(player, expected);
    }

    #[tokio::test]
    async fn test_build_outside_class_is_rejected() {
        let (roster, wizard) = wizard();
        wizard.start_registration(USER, "wanda").await.unwrap();
        reply(&wizard, WizardKind::Registration, step(0, ProfileField::Class), "Mage")
            .await
            .unwrap();

        let err = reply(&wizard, WizardKind::Registration, step(0, ProfileField::Build), "Berserker")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidChoice { .. }));
        assert!(err.to_string().contains("Frost"));
        assert!(roster.player(USER).await.unwrap().unwrap().build.is_empty());
    }

    #[tokio::test]
    async fn test_stale_prompt_writes_nothing() {
        let (roster, wizard) = wizard();
        wizard.start_registration(USER, "wanda").await.unwrap();
        reply(&wizard, WizardKind::Registration, step(0, ProfileField::Class), "Warrior")
            .await
            .unwrap();

        // Old class menu clicked again
        let err = reply(&wizard, WizardKind::Registration, step(0, ProfileField::Class), "Mage")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::StaleStep));
        assert_eq!(roster.player(USER).await.unwrap().unwrap().class, "Warrior");
    }

    #[tokio::test]
    async fn test_answer_without_session() {
        let (_, wizard) = wizard();
        let err = reply(&wizard, WizardKind::Registration, step(0, ProfileField::Class), "Warrior")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::NoSession));
    }

    #[tokio::test]
    async fn test_composition_walks_every_role() {
        let (roster, wizard) = wizard();
        roster.register(USER, "cap").await.unwrap();
        roster.create_team(USER, "cap", "Alpha", true).await.unwrap();

        let err = wizard.start_composition(USER, "Alpha", 0).await.unwrap_err();
        assert!(matches!(err, WizardError::Roster(RosterError::InvalidRoleCount(_))));
        let err = wizard.start_composition(7, "Alpha", 2).await.unwrap_err();
        assert!(matches!(err, WizardError::Roster(RosterError::NotCaptain)));

        let prompt = wizard.start_composition(USER, "Alpha", 2).await.unwrap();
        assert_eq!(prompt.title, "Select Class for Role 1");

        let answers = [
            (1, ProfileField::Class, "Warrior"),
            (1, ProfileField::Build, "Berserker"),
            (1, ProfileField::Seriousness, "Hardcore"),
            (2, ProfileField::Class, "Mage"),
            (2, ProfileField::Build, "Frost"),
        ];
        for (role, field, value) in answers {
            let advance = reply(&wizard, WizardKind::Composition, step(role, field), value)
                .await
                .unwrap();
            assert!(matches!(advance, Advance::Next { .. }));
        }
        let done = reply(&wizard, WizardKind::Composition, step(2, ProfileField::Seriousness), "Casual")
            .await
            .unwrap();
        match done {
            Advance::Finished { confirmation } => {
                assert!(confirmation.contains("Team composition for Alpha has been completed"))
            }
            other => panic!("unexpected {other:?}"),
        }

        let comp = roster.composition("Alpha").await.unwrap();
        assert_eq!(comp.roles.len(), 2);
        assert_eq!(comp.roles[0].summary(), "Warrior - Berserker - Hardcore");
        assert_eq!(comp.roles[1].summary(), "Mage - Frost - Casual");
    }

    #[tokio::test]
    async fn test_shorter_composition_truncates_old_roles() {
        let (roster, wizard) = wizard();
        roster.register(USER, "cap").await.unwrap();
        roster.create_team(USER, "cap", "Alpha", true).await.unwrap();
        for role in 1..=3 {
            roster
                .set_role_field("Alpha", role, ProfileField::Class, "Mage")
                .await
                .unwrap();
        }

        wizard.start_composition(USER, "Alpha", 1).await.unwrap();
        for (field, value) in [
            (ProfileField::Class, "Warrior"),
            (ProfileField::Build, "Guardian"),
            (ProfileField::Seriousness, "Serious"),
        ] {
            reply(&wizard, WizardKind::Composition, step(1, field), value)
                .await
                .unwrap();
        }

        let comp = roster.composition("Alpha").await.unwrap();
        assert_eq!(comp.roles.len(), 1);
        assert_eq!(comp.roles[0].class, "Warrior");
    }

    #[tokio::test]
    async fn test_cancel_and_sweep() {
        let (_, wizard) = wizard();
        wizard.start_registration(USER, "wanda").await.unwrap();
        assert_eq!(wizard.cancel(USER), 1);
        assert_eq!(wizard.cancel(USER), 0);

        wizard.start_registration(USER, "wanda").await.unwrap();
        if let Some(mut session) = wizard.sessions.get_mut(&(USER, WizardKind::Registration)) {
            session.last_activity = Utc::now() - Duration::hours(1);
        }
        assert_eq!(wizard.sweep_expired(), 1);
        assert!(!wizard.sessions.contains_key(&(USER, WizardKind::Registration)));
    }

    #[tokio::test]
    async fn test_menu_of_replaced_composition_is_stale() {
        let (roster, wizard) = wizard();
        captain_with_teams(&roster, &["Alpha", "Bravo"]).await;

        let alpha = wizard.start_composition(USER, "Alpha", 2).await.unwrap();
        let bravo = wizard.start_composition(USER, "Bravo", 2).await.unwrap();
        assert_eq!(alpha.step, bravo.step);
        assert_ne!(alpha.session, bravo.session);

        let err = wizard
            .answer(USER, WizardKind::Composition, alpha.session, alpha.step, "Warrior")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::StaleStep));
        assert!(matches!(
            roster.composition("Alpha").await,
            Err(RosterError::NoComposition)
        ));
        assert!(matches!(
            roster.composition("Bravo").await,
            Err(RosterError::NoComposition)
        ));

        wizard
            .answer(USER, WizardKind::Composition, bravo.session, bravo.step, "Mage")
            .await
            .unwrap();
        assert_eq!(roster.composition("Bravo").await.unwrap().roles[0].class, "Mage");
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped_on_answer() {
        let (roster, wizard) = wizard();
        let prompt = wizard.start_registration(USER, "wanda").await.unwrap();
        if let Some(mut session) = wizard.sessions.get_mut(&(USER, WizardKind::Registration)) {
            session.last_activity = Utc::now() - Duration::hours(1);
        }

        let err = wizard
            .answer(USER, WizardKind::Registration, prompt.session, prompt.step, "Warrior")
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::NoSession));
        assert!(!wizard.sessions.contains_key(&(USER, WizardKind::Registration)));
        assert!(roster.player(USER).await.unwrap().unwrap().class.is_empty());
    }

    #[tokio::test]
    async fn test_progress_not_restored_over_newer_session() {
        let (_, wizard) = wizard();
        let first = wizard.start_registration(USER, "wanda").await.unwrap();
        let key = (USER, WizardKind::Registration);
        let mut advanced = wizard.sessions.get(&key).map(|s| s.clone()).unwrap();
        advanced.step = step(0, ProfileField::Build);

        // A fresh /register lands while the first answer is being written.
        let second = wizard.start_registration(USER, "wanda").await.unwrap();
        wizard.store_progress(key, first.step, advanced);

        let current = wizard.sessions.get(&key).unwrap();
        assert_eq!(current.id, second.session);
        assert_eq!(current.step, step(0, ProfileField::Class));
        drop(current);

        wizard.cancel(USER);
        let mut orphan = WizardSession::new(
            second.session,
            USER,
            WizardKind::Registration,
            WizardTarget::Player,
        );
        orphan.step = step(0, ProfileField::Build);
        wizard.store_progress(key, second.step, orphan);
        assert!(!wizard.sessions.contains_key(&key));
    }
}
