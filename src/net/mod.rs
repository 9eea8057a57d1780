//! Networking: wire types, envelope handling and the remote API client.

pub mod api;
pub mod envelope;
pub mod types;
