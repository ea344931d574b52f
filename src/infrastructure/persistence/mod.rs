//! Persistence adapters
//!
//! The only durable state the engine owns is the per-group flat-file
//! key-value table.

mod kv_store;

pub use kv_store::FlatFileKeyValueStore;
