//! Capability trait implemented by remote vector database clients.

use async_trait::async_trait;

use crate::error::VectorResult;
use crate::record::{Collection, Neighbor, VectorRecord};

/// Token a live service answers a ping with.
pub const LIVENESS_TOKEN: &str = "pong";

/// Trait for vector database backends.
///
/// Implementations are thin call-throughs to the remote service: no retries,
/// no caching, no batching. Transport and remote failures are returned as
/// [`VectorError::Backend`](crate::VectorError::Backend).
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn backend_name(&self) -> &'static str;

    /// Sends a liveness probe and returns the token the service answered with.
    async fn ping(&self) -> VectorResult<String>;

    /// Creates a collection, failing if it already exists.
    async fn create_collection(&self, name: &str) -> VectorResult<Collection>;

    /// Looks up an existing collection, failing if it does not exist.
    async fn get_collection(&self, name: &str) -> VectorResult<Collection>;

    /// Resolves a collection, creating it if absent.
    async fn get_or_create_collection(&self, name: &str) -> VectorResult<Collection>;

    /// Deletes a collection and everything in it.
    ///
    /// Returns the service's result object, or `Null` for an empty reply.
    async fn delete_collection(&self, name: &str) -> VectorResult<serde_json::Value>;

    /// Deletes records by their IDs.
    async fn delete(&self, collection: &Collection, ids: Vec<String>) -> VectorResult<()>;

    /// Upserts a single batch of records, returning the acknowledgement flag.
    async fn upsert(&self, collection: &Collection, records: &[VectorRecord])
    -> VectorResult<bool>;

    /// Runs a similarity search.
    ///
    /// Returns `None` when the service replied without a match list.
    async fn query(
        &self,
        collection: &Collection,
        embedding: &[f32],
        filter: Option<&serde_json::Value>,
        limit: usize,
    ) -> VectorResult<Option<Vec<Neighbor>>>;

    /// Counts the records stored in a collection.
    async fn count(&self, collection: &Collection) -> VectorResult<usize>;
}
