//! # Doofinder Sync Shared
//!
//! This crate defines the data types shared across the Doofinder sync crates:
//! the logical item type that names an index, and the status code that every
//! indexing operation reports back to its caller.

pub mod types;

pub use types::api_status::ApiStatus;
pub use types::item_type::ItemType;
