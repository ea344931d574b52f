//! Permission gate - capability and group-power checks
//!
//! Two layers: the local capability bitmask configured on the group, and
//! the in-world group power reported live by the world. The local check is
//! pure and always runs first; a denial there never costs a network round
//! trip. Power results are never cached: powers change in-world between
//! invocations.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::outbound::WorldPort;
use crate::domain::entities::Group;
use crate::domain::errors::CommandError;
use crate::domain::value_objects::{AgentId, Capability, GroupPower};

pub struct PermissionGate {
    world: Arc<dyn WorldPort>,
}

impl PermissionGate {
    pub fn new(world: Arc<dyn WorldPort>) -> Self {
        Self { world }
    }

    /// Local capability check. No I/O.
    pub fn check(&self, group: &Group, capability: Capability) -> Result<(), CommandError> {
        if group.capabilities.contains(capability) {
            Ok(())
        } else {
            Err(CommandError::PermissionDenied(capability))
        }
    }

    /// Live in-world power check. Only called once the local check has
    /// passed.
    pub async fn check_power(
        &self,
        group: &Group,
        agent: AgentId,
        power: GroupPower,
        deadline: Duration,
    ) -> Result<(), CommandError> {
        let powers = self.world.agent_powers(group.id, agent, deadline).await?;
        if powers.contains(power) {
            Ok(())
        } else {
            Err(CommandError::GroupPowerDenied(power))
        }
    }
}
