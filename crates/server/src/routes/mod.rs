//! Route handlers for the HTTP API.

pub mod health;
pub mod query;
pub mod stats;
