// Discord layer - commands, interactive components and notifications.

use std::sync::Arc;
use std::time::Duration;

use crate::core::access::AccessPolicy;
use crate::core::roster::RosterService;
use crate::core::wizard::WizardService;
use crate::infra::roster::JsonDocumentStore;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "components/component_router.rs"]
pub mod components;

#[path = "access_checks.rs"]
pub mod access_checks;

#[path = "error_reply.rs"]
pub mod error_reply;

#[path = "notify.rs"]
pub mod notify;

/// Shared state handed to every command and event.
pub struct Data {
    pub roster: Arc<RosterService<JsonDocumentStore>>,
    pub wizard: Arc<WizardService<JsonDocumentStore>>,
    pub access: Arc<AccessPolicy>,
    /// How long `set_team_plan` waits for the next line.
    pub plan_timeout: Duration,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
