//! Records, collections and match types exchanged with a vector backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A vector record to be stored.
///
/// Records are created by the caller and forwarded untouched. Uniqueness of
/// `id` and consistency of dimensions are enforced by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique identifier within the collection.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Optional metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl VectorRecord {
    /// Creates a new record with an ID and embedding.
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: HashMap::new(),
        }
    }

    /// Replaces the metadata of the record.
    pub fn with_metadata(
        mut self,
        metadata: impl IntoIterator<Item = (impl Into<String>, serde_json::Value)>,
    ) -> Self {
        self.metadata = metadata.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A resolved remote collection.
///
/// Handles are not cached by the store; every operation resolves a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Service-assigned identifier.
    pub id: String,
    /// Collection name.
    pub name: String,
    /// Collection-level metadata, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Collection {
    /// Creates a collection handle from its identifier and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metadata: None,
        }
    }
}

/// A raw neighbor returned by a backend: an identifier and its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Record identifier.
    pub id: String,
    /// Distance reported by the service.
    pub distance: f32,
}

impl Neighbor {
    /// Creates a new neighbor.
    pub fn new(id: impl Into<String>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }
}

/// A scored query match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    /// Record identifier.
    pub id: String,
    /// Similarity score, `1 - distance`.
    pub score: f32,
}

impl From<Neighbor> for QueryMatch {
    fn from(neighbor: Neighbor) -> Self {
        Self {
            id: neighbor.id,
            score: 1.0 - neighbor.distance,
        }
    }
}

/// Outcome of a single upsert batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Zero-based position of the batch in the submitted sequence.
    pub batch: usize,
    /// Number of records sent in this batch.
    pub count: usize,
    /// Whether the service acknowledged the batch.
    pub acknowledged: bool,
}
