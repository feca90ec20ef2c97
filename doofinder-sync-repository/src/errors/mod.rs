//! Error types for the Doofinder management API.

mod management_error;

pub use management_error::ManagementError;
