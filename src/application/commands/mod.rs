//! Command handlers
//!
//! Each verb is one module with a `run` body; the table below is the only
//! place a verb's capability and power requirements are declared.

pub mod database;
pub mod eject;
pub mod notify;
pub mod tell;

use crate::application::services::CommandRouter;
use crate::domain::value_objects::{Capability, GroupPower};

/// Build the full verb table.
pub fn register_all(router: &mut CommandRouter) {
    router.register("database", Capability::Database, None, database::run);
    router.register("notify", Capability::Notifications, None, notify::run);
    router.register("eject", Capability::Group, Some(GroupPower::Eject), eject::run);
    router.register("tell", Capability::Talk, None, tell::run);
}
