// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "access/access_policy.rs"]
pub mod access;

#[path = "catalog/build_catalog.rs"]
pub mod catalog;

#[path = "roster/mod.rs"]
pub mod roster;

#[path = "wizard/mod.rs"]
pub mod wizard;
