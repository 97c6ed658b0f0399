//! Cluster handle bound to a [`BagelClient`].

use reqwest::Method;
use vecbridge_vector::{Collection, Neighbor, VectorRecord};

use crate::TRACING_TARGET_CLIENT;
use crate::connect::BagelClient;
use crate::error::{Error, Result};
use crate::types::{DeleteRecords, QueryRecords, QueryResults, UpsertRecords};

/// A resolved BagelDB cluster.
///
/// Handles are not cached by the client; resolve one whenever it is needed.
#[derive(Debug, Clone)]
pub struct Cluster {
    client: BagelClient,
    info: Collection,
}

impl Cluster {
    pub(crate) fn new(client: BagelClient, info: Collection) -> Self {
        Self { client, info }
    }

    /// Service-assigned cluster identifier.
    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// Cluster name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Returns the cluster description.
    pub fn info(&self) -> &Collection {
        &self.info
    }

    /// Consumes the handle, returning the cluster description.
    pub fn into_info(self) -> Collection {
        self.info
    }

    /// Upserts records in a single request.
    ///
    /// Returns whether the server acknowledged the write. The caller is
    /// responsible for keeping the request within the server's batch limit.
    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<bool> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            cluster = %self.name(),
            count = records.len(),
            "Upserting records"
        );

        let request = self
            .client
            .request(Method::POST, &["clusters", self.id(), "upsert"])?
            .json(&UpsertRecords::new(records));
        let reply = BagelClient::send_value(request).await?;

        Ok(!matches!(
            reply,
            serde_json::Value::Null | serde_json::Value::Bool(false)
        ))
    }

    /// Deletes records by their IDs.
    pub async fn delete(&self, ids: &[String]) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            cluster = %self.name(),
            count = ids.len(),
            "Deleting records"
        );

        let request = self
            .client
            .request(Method::POST, &["clusters", self.id(), "delete"])?
            .json(&DeleteRecords { ids });
        BagelClient::send_value(request).await?;
        Ok(())
    }

    /// Finds the `limit` nearest records to `embedding`.
    ///
    /// Returns `None` when the server replied without a match list.
    pub async fn find(
        &self,
        embedding: &[f32],
        limit: usize,
        filter: Option<&serde_json::Value>,
    ) -> Result<Option<Vec<Neighbor>>> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            cluster = %self.name(),
            dimensions = embedding.len(),
            limit,
            "Querying records"
        );

        let request = self
            .client
            .request(Method::POST, &["clusters", self.id(), "query"])?
            .json(&QueryRecords::new(embedding, limit, filter));
        let results: QueryResults = BagelClient::send_json(request).await?;

        results.into_neighbors()
    }

    /// Counts the records stored in the cluster.
    pub async fn count(&self) -> Result<usize> {
        let request = self
            .client
            .request(Method::GET, &["clusters", self.id(), "count"])?;
        let count: serde_json::Value = BagelClient::send_json(request).await?;

        count
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| Error::invalid_response(format!("expected a record count, got {count}")))
    }
}
