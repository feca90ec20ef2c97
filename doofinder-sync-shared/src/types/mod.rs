//! Core data types used across the Doofinder sync crates.

pub mod api_status;
pub mod item_type;

pub use api_status::ApiStatus;
pub use item_type::ItemType;
