// Wizard module - step-by-step selection flows for profiles and team compositions.

mod wizard_models;
mod wizard_service;

pub use wizard_models::{Advance, Prompt, Step, WizardKind};
pub use wizard_service::{WizardError, WizardService};
