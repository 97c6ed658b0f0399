//! BagelDB REST client for vecbridge.
//!
//! [`BagelClient`] wraps a `reqwest` client pointed at a BagelDB server and
//! resolves [`Cluster`] handles for upserts, deletes and similarity search.
//! It also implements [`VectorBackend`](vecbridge_vector::VectorBackend), so
//! it can be used behind a [`VectorStore`](vecbridge_vector::VectorStore).

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "vecbridge_bagel";

/// Tracing target for client operations.
pub const TRACING_TARGET_CLIENT: &str = "vecbridge_bagel::client";

mod backend;
mod cluster;
mod connect;
mod error;
mod types;

#[doc(hidden)]
pub mod prelude;

pub use crate::cluster::Cluster;
pub use crate::connect::{BagelClient, BagelConfig, Protocol};
pub use crate::error::{Error, Result};
