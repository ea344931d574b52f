//! Application services - Use case implementations
//!
//! The services that carry a command from arrival to result and a world
//! event to its subscribed destinations. Each accepts its dependencies as
//! ports, never as infrastructure types.

pub mod command_router;
pub mod notification_dispatcher;
pub mod notification_registry;
pub mod permission_gate;

pub use command_router::{CommandContext, CommandRouter, HandlerResult};
#[allow(unused_imports)]
pub use notification_dispatcher::{DeliveryReport, NotificationDispatcher};
#[allow(unused_imports)]
pub use notification_registry::{HttpDestination, NotificationRegistry};
pub use permission_gate::PermissionGate;
