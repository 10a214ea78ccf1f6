// Roster module - players, teams, compositions and the requests that connect them.

pub mod autofill;
pub mod roster_models;
mod roster_service;
pub mod roster_store;
pub mod roster_views;
pub mod team_plan;

pub use roster_models::{parse_yes_no, ProfileField};
pub use roster_service::{
    validate_role_count, ProfileUpdate, RosterError, RosterService, RosterSettings,
};
pub use roster_store::{Document, DocumentStore, StoreError};
