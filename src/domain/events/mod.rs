//! Domain events - world happenings reported by the protocol client

pub mod world_events;

pub use world_events::{EventScope, WorldEvent};
