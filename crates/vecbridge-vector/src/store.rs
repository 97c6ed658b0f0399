//! Vector store facade over a [`VectorBackend`].

use std::time::Instant;

use crate::TRACING_TARGET;
use crate::backend::{LIVENESS_TOKEN, VectorBackend};
use crate::error::{VectorError, VectorResult};
use crate::health::ServiceHealth;
use crate::record::{BatchResult, Collection, QueryMatch, VectorRecord};

/// Maximum number of records sent in a single upsert call.
pub const MAX_UPSERT_BATCH: usize = 100;

/// Vector store that wraps a backend implementation.
///
/// Every mutating or query operation first probes the service. A probe that
/// answers with anything other than [`LIVENESS_TOKEN`] fails the operation
/// with [`VectorError::Unavailable`] before any other call is issued.
pub struct VectorStore {
    backend: Box<dyn VectorBackend>,
}

impl VectorStore {
    /// Creates a new vector store over the given backend.
    pub fn new(backend: impl VectorBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    /// Creates a new vector store over an already boxed backend.
    pub fn from_boxed(backend: Box<dyn VectorBackend>) -> Self {
        tracing::info!(
            target: TRACING_TARGET,
            backend = %backend.backend_name(),
            "Vector store initialized"
        );

        Self { backend }
    }

    /// Returns the name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Probes the service.
    ///
    /// Returns `Ok(true)` only if the service answered with the liveness
    /// token. Transport failures are returned as errors.
    pub async fn is_available(&self) -> VectorResult<bool> {
        let token = self.backend.ping().await?;
        Ok(token == LIVENESS_TOKEN)
    }

    /// Probes the service and reports its health with the round-trip time.
    pub async fn health_check(&self) -> ServiceHealth {
        let started_at = Instant::now();
        let result = self.backend.ping().await;
        let elapsed = started_at.elapsed();

        match result {
            Ok(token) if token == LIVENESS_TOKEN => {
                ServiceHealth::healthy().with_response_time(elapsed)
            }
            Ok(token) => ServiceHealth::unhealthy(format!("unexpected ping reply '{token}'"))
                .with_response_time(elapsed),
            Err(err) => ServiceHealth::unhealthy(err.to_string()).with_response_time(elapsed),
        }
    }

    /// Fails with [`VectorError::Unavailable`] unless the service is live.
    async fn ensure_available(&self, operation: &'static str) -> VectorResult<()> {
        if self.is_available().await? {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET,
            backend = %self.backend_name(),
            operation,
            "Service unavailable, operation rejected"
        );

        Err(VectorError::unavailable(format!(
            "cannot connect to {}; check the API key, host, or collection name",
            self.backend_name()
        )))
    }

    /// Resolves the named collection, creating it if absent.
    ///
    /// Nothing is cached: repeated calls resolve the collection again.
    pub async fn collection(&self, name: &str) -> VectorResult<Collection> {
        tracing::debug!(
            target: TRACING_TARGET,
            collection = %name,
            "Resolving collection"
        );
        self.backend.get_or_create_collection(name).await
    }

    /// Creates the named collection, failing if it already exists.
    pub async fn create_collection(&self, name: &str) -> VectorResult<Collection> {
        self.ensure_available("create_collection").await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %name,
            "Creating collection"
        );
        self.backend.create_collection(name).await
    }

    /// Deletes records by their IDs.
    ///
    /// The collection must already exist; a missing one is not created.
    pub async fn delete(&self, collection: &str, ids: Vec<String>) -> VectorResult<()> {
        self.ensure_available("delete").await?;

        let handle = self.backend.get_collection(collection).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            count = ids.len(),
            "Deleting vectors"
        );
        self.backend.delete(&handle, ids).await
    }

    /// Deletes a whole collection and returns the service's result object.
    pub async fn delete_all(&self, collection: &str) -> VectorResult<serde_json::Value> {
        self.ensure_available("delete_all").await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            "Deleting collection"
        );
        self.backend.delete_collection(collection).await
    }

    /// Upserts records in batches of at most [`MAX_UPSERT_BATCH`].
    ///
    /// Batches are sent in order, each awaited before the next. A failed
    /// batch stops the loop; earlier batches stay written.
    pub async fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> VectorResult<Vec<BatchResult>> {
        let started_at = Instant::now();
        self.ensure_available("upsert").await?;

        let handle = self.backend.get_or_create_collection(collection).await?;

        let mut results = Vec::with_capacity(records.len().div_ceil(MAX_UPSERT_BATCH));
        for (batch, chunk) in records.chunks(MAX_UPSERT_BATCH).enumerate() {
            let acknowledged = self.backend.upsert(&handle, chunk).await?;
            results.push(BatchResult {
                batch,
                count: chunk.len(),
                acknowledged,
            });
        }

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            count = records.len(),
            batches = results.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Upserted vectors"
        );

        Ok(results)
    }

    /// Runs a similarity search and scores each match as `1 - distance`.
    ///
    /// A reply without a match list is an error; an empty list is returned
    /// as an empty vector.
    pub async fn query(
        &self,
        collection: &str,
        embedding: Vec<f32>,
        filter: Option<serde_json::Value>,
        limit: usize,
    ) -> VectorResult<Vec<QueryMatch>> {
        let started_at = Instant::now();
        self.ensure_available("query").await?;

        let handle = self.backend.get_or_create_collection(collection).await?;

        let neighbors = self
            .backend
            .query(&handle, &embedding, filter.as_ref(), limit)
            .await?
            .ok_or_else(|| VectorError::no_matches(collection))?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            count = neighbors.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Queried vectors"
        );

        Ok(neighbors.into_iter().map(QueryMatch::from).collect())
    }

    /// Counts the records stored in a collection.
    pub async fn count(&self, collection: &str) -> VectorResult<usize> {
        self.ensure_available("count").await?;

        let handle = self.backend.get_or_create_collection(collection).await?;
        self.backend.count(&handle).await
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("backend", &self.backend_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mock::{MockBackend, MockCall, MockConfig};
    use crate::record::Neighbor;

    fn records(n: usize) -> Vec<VectorRecord> {
        (0..n)
            .map(|i| VectorRecord::new(format!("id-{i}"), vec![i as f32, 1.0]))
            .collect()
    }

    fn upsert_sizes(calls: &[MockCall]) -> Vec<usize> {
        calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Upsert { ids, .. } => Some(ids.len()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_is_available() {
        let store = VectorStore::new(MockBackend::default());
        assert!(store.is_available().await.unwrap());

        let store = VectorStore::new(MockBackend::unavailable());
        assert!(!store.is_available().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_available_propagates_transport_error() {
        let backend = MockBackend::new(MockConfig {
            unreachable: true,
            ..Default::default()
        });
        let store = VectorStore::new(backend);

        let err = store.is_available().await.unwrap_err();
        assert!(matches!(err, VectorError::Backend(_)));
    }

    #[tokio::test]
    async fn test_upsert_batches_in_order() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());

        let results = store.upsert("docs", records(250)).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.count).collect::<Vec<_>>(),
            vec![100, 100, 50]
        );
        assert_eq!(
            results.iter().map(|r| r.batch).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(results.iter().all(|r| r.acknowledged));

        let calls = backend.calls();
        assert_eq!(upsert_sizes(&calls), vec![100, 100, 50]);

        let sent: Vec<String> = calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Upsert { ids, .. } => Some(ids.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        let expected: Vec<String> = (0..250).map(|i| format!("id-{i}")).collect();
        assert_eq!(sent, expected);

        assert_eq!(backend.max_concurrent_upserts(), 1);
    }

    #[tokio::test]
    async fn test_upsert_exact_multiple() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());

        let results = store.upsert("docs", records(200)).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(upsert_sizes(&backend.calls()), vec![100, 100]);
    }

    #[tokio::test]
    async fn test_upsert_empty_issues_no_batches() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());

        let results = store.upsert("docs", Vec::new()).await.unwrap();

        assert!(results.is_empty());
        assert!(upsert_sizes(&backend.calls()).is_empty());
    }

    #[tokio::test]
    async fn test_upsert_stops_at_failed_batch() {
        let backend = MockBackend::new(MockConfig {
            fail_upsert_at: Some(1),
            ..Default::default()
        });
        let store = VectorStore::new(backend.clone());

        let err = store.upsert("docs", records(350)).await.unwrap_err();

        assert!(matches!(err, VectorError::Backend(_)));
        assert_eq!(upsert_sizes(&backend.calls()), vec![100, 100]);
        assert_eq!(backend.stored("docs"), 100);
    }

    #[tokio::test]
    async fn test_upsert_rejected_when_unavailable() {
        let backend = MockBackend::unavailable();
        let store = VectorStore::new(backend.clone());

        let err = store.upsert("docs", records(10)).await.unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(backend.calls(), vec![MockCall::Ping]);
    }

    #[tokio::test]
    async fn test_delete_rejected_when_unavailable() {
        let backend = MockBackend::unavailable();
        let store = VectorStore::new(backend.clone());

        let err = store
            .delete("docs", vec!["a".into(), "b".into()])
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(backend.calls(), vec![MockCall::Ping]);
    }

    #[tokio::test]
    async fn test_delete_all_rejected_when_unavailable() {
        let backend = MockBackend::unavailable();
        let store = VectorStore::new(backend.clone());

        let err = store.delete_all("docs").await.unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(backend.calls(), vec![MockCall::Ping]);
    }

    #[tokio::test]
    async fn test_delete_removes_ids() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());
        store.upsert("docs", records(5)).await.unwrap();

        store
            .delete("docs", vec!["id-0".into(), "id-1".into()])
            .await
            .unwrap();

        assert_eq!(backend.stored("docs"), 3);
        assert!(backend.calls().contains(&MockCall::Delete {
            collection: "docs".into(),
            ids: vec!["id-0".into(), "id-1".into()],
        }));
    }

    #[tokio::test]
    async fn test_delete_from_missing_collection_fails() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());

        let err = store
            .delete("missing", vec!["a".into()])
            .await
            .unwrap_err();

        assert!(matches!(err, VectorError::Backend(_)));
        assert_eq!(
            backend.calls(),
            vec![MockCall::Ping, MockCall::Get("missing".into())]
        );

        // The failed delete left nothing behind.
        store.create_collection("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_all_returns_result_object() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());
        store.collection("docs").await.unwrap();

        let result = store.delete_all("docs").await.unwrap();

        assert_eq!(result, json!({"deleted": "docs"}));
        assert!(
            backend
                .calls()
                .contains(&MockCall::DeleteCollection("docs".into()))
        );
    }

    #[tokio::test]
    async fn test_query_maps_distance_to_score() {
        let backend = MockBackend::new(MockConfig {
            neighbors: Some(vec![
                Neighbor::new("a", 0.0),
                Neighbor::new("b", 0.25),
                Neighbor::new("c", 1.0),
            ]),
            ..Default::default()
        });
        let store = VectorStore::new(backend.clone());

        let matches = store
            .query("docs", vec![0.1, 0.2], Some(json!({"kind": "note"})), 3)
            .await
            .unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        let scores: Vec<f32> = matches.iter().map(|m| m.score).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(scores, vec![1.0, 0.75, 0.0]);

        assert!(backend.calls().contains(&MockCall::Query {
            collection: "docs".into(),
            filter: Some(json!({"kind": "note"})),
            limit: 3,
        }));
    }

    #[tokio::test]
    async fn test_query_without_match_list_fails() {
        let backend = MockBackend::new(MockConfig {
            neighbors: None,
            ..Default::default()
        });
        let store = VectorStore::new(backend);

        let err = store.query("docs", vec![0.1], None, 5).await.unwrap_err();

        assert!(matches!(err, VectorError::NoMatches { collection } if collection == "docs"));
    }

    #[tokio::test]
    async fn test_query_with_empty_match_list_succeeds() {
        let backend = MockBackend::new(MockConfig {
            neighbors: Some(Vec::new()),
            ..Default::default()
        });
        let store = VectorStore::new(backend);

        let matches = store.query("docs", vec![0.1], None, 5).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_collection_is_idempotent() {
        let backend = MockBackend::default();
        let store = VectorStore::new(backend.clone());

        let first = store.collection("docs").await.unwrap();
        let second = store.collection("docs").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            backend
                .calls()
                .iter()
                .filter(|call| matches!(call, MockCall::GetOrCreate(_)))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_create_collection_rejects_existing() {
        let store = VectorStore::new(MockBackend::default());

        store.create_collection("docs").await.unwrap();
        let err = store.create_collection("docs").await.unwrap_err();

        assert!(matches!(err, VectorError::Backend(_)));
    }

    #[tokio::test]
    async fn test_count() {
        let store = VectorStore::new(MockBackend::default());
        store.upsert("docs", records(42)).await.unwrap();

        assert_eq!(store.count("docs").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_health_check() {
        let health = VectorStore::new(MockBackend::default()).health_check().await;
        assert!(health.is_healthy());
        assert!(health.response.is_some());

        let health = VectorStore::new(MockBackend::unavailable())
            .health_check()
            .await;
        assert!(!health.is_healthy());
        assert!(health.message.is_some());
    }
}
