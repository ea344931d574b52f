//! Synchronization primitives shared by services and adapters

mod bridge;
mod group_lock;

#[allow(unused_imports)]
pub use bridge::{PendingReply, ReplyBridge, WaitTimeout};
pub use group_lock::GroupKeyedLock;
