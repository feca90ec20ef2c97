//! Interface definitions for the management API.
//!
//! The `ManagementApi` trait allows the indexer to run against the live
//! HTTP client, a throttled wrapper, or a mock.

mod management_api;

pub use management_api::ManagementApi;
