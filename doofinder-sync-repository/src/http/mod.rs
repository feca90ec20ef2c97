//! HTTP implementation of the management API.
//!
//! This module provides a concrete implementation of `ManagementApi`
//! that talks to the Doofinder management REST API with reqwest.

mod client;

pub use client::ManagementClient;
