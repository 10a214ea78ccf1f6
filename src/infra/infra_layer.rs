// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "roster/mod.rs"]
pub mod roster;

#[path = "catalog/json_catalog.rs"]
pub mod catalog;

#[path = "config/env_config.rs"]
pub mod config;
