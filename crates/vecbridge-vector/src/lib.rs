#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod error;
mod health;
mod record;
mod store;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use backend::{LIVENESS_TOKEN, VectorBackend};
pub use error::{BoxedError, VectorError, VectorResult};
pub use health::{ServiceHealth, ServiceStatus};
pub use record::{BatchResult, Collection, Neighbor, QueryMatch, VectorRecord};
pub use store::{MAX_UPSERT_BATCH, VectorStore};

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "vecbridge_vector";
