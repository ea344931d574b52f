//! Outbound ports - Interfaces that the application requires from external systems

mod notification_port;
mod store_port;
mod world_port;

pub use notification_port::{DeliveryError, HttpDeliveryPort, TcpDeliveryPort};
pub use store_port::{KeyValueStorePort, StoreError};
pub use world_port::{WorldError, WorldPort};
