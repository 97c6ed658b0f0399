//! [`VectorBackend`] implementation for [`BagelClient`].

use async_trait::async_trait;
use vecbridge_vector::{Collection, Neighbor, VectorBackend, VectorRecord, VectorResult};

use crate::cluster::Cluster;
use crate::connect::BagelClient;

#[async_trait]
impl VectorBackend for BagelClient {
    fn backend_name(&self) -> &'static str {
        "bageldb"
    }

    async fn ping(&self) -> VectorResult<String> {
        Ok(BagelClient::ping(self).await?)
    }

    async fn create_collection(&self, name: &str) -> VectorResult<Collection> {
        let cluster = self.create_cluster(name).await?;
        Ok(cluster.into_info())
    }

    async fn get_collection(&self, name: &str) -> VectorResult<Collection> {
        let cluster = self.get_cluster(name).await?;
        Ok(cluster.into_info())
    }

    async fn get_or_create_collection(&self, name: &str) -> VectorResult<Collection> {
        let cluster = self.get_or_create_cluster(name).await?;
        Ok(cluster.into_info())
    }

    async fn delete_collection(&self, name: &str) -> VectorResult<serde_json::Value> {
        Ok(self.delete_cluster(name).await?)
    }

    async fn delete(&self, collection: &Collection, ids: Vec<String>) -> VectorResult<()> {
        Ok(self.cluster(collection).delete(&ids).await?)
    }

    async fn upsert(
        &self,
        collection: &Collection,
        records: &[VectorRecord],
    ) -> VectorResult<bool> {
        Ok(self.cluster(collection).upsert(records).await?)
    }

    async fn query(
        &self,
        collection: &Collection,
        embedding: &[f32],
        filter: Option<&serde_json::Value>,
        limit: usize,
    ) -> VectorResult<Option<Vec<Neighbor>>> {
        Ok(self
            .cluster(collection)
            .find(embedding, limit, filter)
            .await?)
    }

    async fn count(&self, collection: &Collection) -> VectorResult<usize> {
        Ok(self.cluster(collection).count().await?)
    }
}

impl BagelClient {
    /// Rebinds a resolved collection to this client.
    fn cluster(&self, collection: &Collection) -> Cluster {
        Cluster::new(self.clone(), collection.clone())
    }
}
