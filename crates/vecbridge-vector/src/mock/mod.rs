//! In-memory mock backend for testing.
//!
//! [`MockBackend`] keeps collections in memory and records every call it
//! receives, so tests can assert on what the [`VectorStore`] sent and in
//! which order.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! vecbridge-vector = { version = "...", features = ["test-utils"] }
//! ```
//!
//! [`VectorStore`]: crate::VectorStore

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::backend::{LIVENESS_TOKEN, VectorBackend};
use crate::error::{VectorError, VectorResult};
use crate::record::{Collection, Neighbor, VectorRecord};

/// A call received by the [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Ping,
    Create(String),
    Get(String),
    GetOrCreate(String),
    DeleteCollection(String),
    Delete {
        collection: String,
        ids: Vec<String>,
    },
    Upsert {
        collection: String,
        ids: Vec<String>,
    },
    Query {
        collection: String,
        filter: Option<serde_json::Value>,
        limit: usize,
    },
    Count(String),
}

/// Configuration for the mock backend.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Answer pings with the liveness token.
    pub alive: bool,
    /// Fail pings with a transport error.
    pub unreachable: bool,
    /// Neighbors returned by every query; `None` simulates a missing match list.
    pub neighbors: Option<Vec<Neighbor>>,
    /// Zero-based upsert call that fails with a backend error.
    pub fail_upsert_at: Option<usize>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            alive: true,
            unreachable: false,
            neighbors: Some(Vec::new()),
            fail_upsert_at: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    collections: HashMap<String, HashMap<String, VectorRecord>>,
    upserts: usize,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Default)]
struct MockInner {
    config: MockConfig,
    state: Mutex<MockState>,
}

/// Mock vector backend.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<MockInner>,
}

impl MockBackend {
    /// Creates a new mock backend with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        Self {
            inner: Arc::new(MockInner {
                config,
                state: Mutex::default(),
            }),
        }
    }

    /// Creates a mock backend whose pings answer with the wrong token.
    pub fn unavailable() -> Self {
        Self::new(MockConfig {
            alive: false,
            ..Default::default()
        })
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Returns the number of records stored in a collection.
    pub fn stored(&self, collection: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map_or(0, HashMap::len)
    }

    /// Returns the highest number of upserts that were in flight at once.
    pub fn max_concurrent_upserts(&self) -> usize {
        self.state().max_in_flight
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: MockCall) {
        self.state().calls.push(call);
    }

    fn handle(name: &str) -> Collection {
        Collection::new(format!("mock-{name}"), name)
    }
}

fn backend_error(message: &str) -> VectorError {
    VectorError::backend(io::Error::other(message.to_owned()))
}

#[async_trait]
impl VectorBackend for MockBackend {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn ping(&self) -> VectorResult<String> {
        self.record(MockCall::Ping);

        let config = &self.inner.config;
        if config.unreachable {
            return Err(VectorError::backend(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        Ok(if config.alive {
            LIVENESS_TOKEN.to_owned()
        } else {
            String::new()
        })
    }

    async fn create_collection(&self, name: &str) -> VectorResult<Collection> {
        let mut state = self.state();
        state.calls.push(MockCall::Create(name.to_owned()));

        if state.collections.contains_key(name) {
            return Err(backend_error("collection already exists"));
        }
        state.collections.insert(name.to_owned(), HashMap::new());
        Ok(Self::handle(name))
    }

    async fn get_collection(&self, name: &str) -> VectorResult<Collection> {
        let mut state = self.state();
        state.calls.push(MockCall::Get(name.to_owned()));

        if !state.collections.contains_key(name) {
            return Err(backend_error("collection not found"));
        }
        Ok(Self::handle(name))
    }

    async fn get_or_create_collection(&self, name: &str) -> VectorResult<Collection> {
        let mut state = self.state();
        state.calls.push(MockCall::GetOrCreate(name.to_owned()));
        state.collections.entry(name.to_owned()).or_default();
        Ok(Self::handle(name))
    }

    async fn delete_collection(&self, name: &str) -> VectorResult<serde_json::Value> {
        let mut state = self.state();
        state.calls.push(MockCall::DeleteCollection(name.to_owned()));
        state.collections.remove(name);
        Ok(json!({ "deleted": name }))
    }

    async fn delete(&self, collection: &Collection, ids: Vec<String>) -> VectorResult<()> {
        let mut state = self.state();
        if let Some(records) = state.collections.get_mut(&collection.name) {
            for id in &ids {
                records.remove(id);
            }
        }
        state.calls.push(MockCall::Delete {
            collection: collection.name.clone(),
            ids,
        });
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &Collection,
        records: &[VectorRecord],
    ) -> VectorResult<bool> {
        let index = {
            let mut state = self.state();
            state.calls.push(MockCall::Upsert {
                collection: collection.name.clone(),
                ids: records.iter().map(|r| r.id.clone()).collect(),
            });
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.upserts += 1;
            state.upserts - 1
        };

        // Give an overlapping caller a chance to start another batch.
        tokio::task::yield_now().await;

        let mut state = self.state();
        state.in_flight -= 1;

        if self.inner.config.fail_upsert_at == Some(index) {
            return Err(backend_error("upsert rejected"));
        }

        let stored = state
            .collections
            .entry(collection.name.clone())
            .or_default();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(true)
    }

    async fn query(
        &self,
        collection: &Collection,
        _embedding: &[f32],
        filter: Option<&serde_json::Value>,
        limit: usize,
    ) -> VectorResult<Option<Vec<Neighbor>>> {
        self.record(MockCall::Query {
            collection: collection.name.clone(),
            filter: filter.cloned(),
            limit,
        });

        Ok(self
            .inner
            .config
            .neighbors
            .clone()
            .map(|neighbors| neighbors.into_iter().take(limit).collect()))
    }

    async fn count(&self, collection: &Collection) -> VectorResult<usize> {
        self.record(MockCall::Count(collection.name.clone()));
        Ok(self.stored(&collection.name))
    }
}
