use crate::core::catalog::Choice;
use crate::core::roster::ProfileField;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardKind {
    /// Class -> Build -> Seriousness -> Timezone for the caller's profile.
    Registration,
    /// Class -> Build -> Seriousness, repeated for every role of a team.
    Composition,
}

impl WizardKind {
    pub fn token(self) -> &'static str {
        match self {
            WizardKind::Registration => "reg",
            WizardKind::Composition => "comp",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "reg" => Some(WizardKind::Registration),
            "comp" => Some(WizardKind::Composition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardTarget {
    Player,
    Team { name: String, num_roles: usize },
}

/// A position in a wizard. `role` is 0 for registration and the 1-based role
/// number for compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub role: usize,
    pub field: ProfileField,
}

impl Step {
    pub fn first(kind: WizardKind) -> Self {
        let role = match kind {
            WizardKind::Registration => 0,
            WizardKind::Composition => 1,
        };
        Self {
            role,
            field: ProfileField::Class,
        }
    }

    /// The step after this one, or `None` when the wizard is finished.
    pub fn next(self, target: &WizardTarget) -> Option<Self> {
        let field = match (self.field, target) {
            (ProfileField::Class, _) => ProfileField::Build,
            (ProfileField::Build, _) => ProfileField::Seriousness,
            (ProfileField::Seriousness, WizardTarget::Player) => ProfileField::Timezone,
            (ProfileField::Seriousness, WizardTarget::Team { num_roles, .. }) => {
                if self.role < *num_roles {
                    return Some(Self {
                        role: self.role + 1,
                        field: ProfileField::Class,
                    });
                }
                return None;
            }
            (ProfileField::Timezone, _) => return None,
        };
        Some(Self {
            role: self.role,
            field,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub step: Step,
    pub value: String,
}

/// Where a user is in a wizard and what they answered so far.
#[derive(Debug, Clone)]
pub struct WizardSession {
    /// Unique per opened wizard; menus from an earlier run of the same
    /// wizard carry a different id.
    pub id: u64,
    pub user_id: u64,
    pub kind: WizardKind,
    pub target: WizardTarget,
    pub step: Step,
    pub answers: Vec<Answer>,
    pub last_activity: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(id: u64, user_id: u64, kind: WizardKind, target: WizardTarget) -> Self {
        Self {
            id,
            user_id,
            kind,
            target,
            step: Step::first(kind),
            answers: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    /// Latest answer given for `field` of `role`.
    pub fn answer_for(&self, role: usize, field: ProfileField) -> Option<&str> {
        self.answers
            .iter()
            .rev()
            .find(|a| a.step.role == role && a.step.field == field)
            .map(|a| a.value.as_str())
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_activity > ttl
    }
}

/// What to show the user for the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: WizardKind,
    pub session: u64,
    pub step: Step,
    pub title: String,
    pub placeholder: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next { confirmation: String, prompt: Prompt },
    Finished { confirmation: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_sequence() {
        let target = WizardTarget::Player;
        let mut step = Step::first(WizardKind::Registration);
        let mut fields = vec![step.field];
        while let Some(next) = step.next(&target) {
            fields.push(next.field);
            step = next;
        }
        assert_eq!(
            fields,
            vec![
                ProfileField::Class,
                ProfileField::Build,
                ProfileField::Seriousness,
                ProfileField::Timezone
            ]
        );
    }

    #[test]
    fn test_composition_repeats_per_role() {
        let target = WizardTarget::Team {
            name: "Alpha".to_string(),
            num_roles: 2,
        };
        let mut step = Step::first(WizardKind::Composition);
        let mut visited = vec![(step.role, step.field)];
        while let Some(next) = step.next(&target) {
            visited.push((next.role, next.field));
            step = next;
        }
        assert_eq!(visited.len(), 6);
        assert_eq!(visited[3], (2, ProfileField::Class));
        assert_eq!(visited[5], (2, ProfileField::Seriousness));
    }

    #[test]
    fn test_session_expiry() {
        let mut session = WizardSession::new(1, 1, WizardKind::Registration, WizardTarget::Player);
        let now = Utc::now();
        assert!(!session.is_expired(now, Duration::minutes(15)));
        session.last_activity = now - Duration::minutes(16);
        assert!(session.is_expired(now, Duration::minutes(15)));
    }
}
