//! Value objects - Immutable objects defined by their attributes

mod capability;
mod ids;
mod kv_message;
mod notification;

pub use capability::{Capability, CapabilitySet, GroupPower, GroupPowerSet};
pub use ids::*;
pub use kv_message::KeyValueMessage;
pub use notification::{NotificationKind, NotificationMask};
