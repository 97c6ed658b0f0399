//! BagelDB client module.
//!
//! This module provides the client configuration and the REST client used
//! for every BagelDB operation.

mod client;
mod config;

pub use client::BagelClient;
pub use config::{BagelConfig, Protocol};
