//! Prelude module for vecbridge-bagel.
//!
//! Re-exports the client types together with the vector store types they are
//! used with.

pub use vecbridge_vector::{QueryMatch, VectorRecord, VectorStore};

pub use crate::cluster::Cluster;
pub use crate::connect::{BagelClient, BagelConfig, Protocol};
pub use crate::error::{Error, Result};
