//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP/TCP) can
//! consume them without the domain model knowing about transports.

mod command;
mod notification_items;

pub use command::CommandInvocation;
pub use notification_items::{NotificationQueueElement, NotificationTcpQueueElement};
