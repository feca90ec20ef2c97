//! # Doofinder Sync Repository
//!
//! This crate provides the interface to the Doofinder management API. It
//! includes the error taxonomy reported by the remote service, the
//! `ManagementApi` trait, a reqwest-backed implementation, a throttling
//! decorator that keeps the call rate under the provider limit, and a mock
//! client for tests.

pub mod config;
pub mod errors;
pub mod http;
pub mod interfaces;
pub mod mock;
pub mod throttle;
pub mod types;

pub use config::ManagementConfig;
pub use errors::ManagementError;
pub use http::ManagementClient;
pub use interfaces::ManagementApi;
pub use mock::{ManagementCall, MockManagementApi, Operation};
pub use throttle::Throttle;
pub use types::{CreateIndexRequest, IndexSummary, SearchEngine, GENERIC_PRESET};
