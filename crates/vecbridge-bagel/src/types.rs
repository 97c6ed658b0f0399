//! Request and response bodies of the BagelDB REST API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vecbridge_vector::{Neighbor, VectorRecord};

use crate::error::{Error, Result};

/// Body of `POST /clusters`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateCluster<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a serde_json::Map<String, serde_json::Value>>,
    pub get_or_create: bool,
}

/// Body of `POST /clusters/{id}/upsert`.
#[derive(Debug, Serialize)]
pub(crate) struct UpsertRecords<'a> {
    pub ids: Vec<&'a str>,
    pub embeddings: Vec<&'a [f32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Option<&'a HashMap<String, serde_json::Value>>>>,
}

impl<'a> UpsertRecords<'a> {
    /// Splits records into the column layout the API expects.
    ///
    /// `metadatas` is only sent when at least one record carries metadata.
    pub fn new(records: &'a [VectorRecord]) -> Self {
        let ids = records.iter().map(|r| r.id.as_str()).collect();
        let embeddings = records.iter().map(|r| r.vector.as_slice()).collect();

        let metadatas = records
            .iter()
            .any(|r| !r.metadata.is_empty())
            .then(|| {
                records
                    .iter()
                    .map(|r| (!r.metadata.is_empty()).then_some(&r.metadata))
                    .collect()
            });

        Self {
            ids,
            embeddings,
            metadatas,
        }
    }
}

/// Body of `POST /clusters/{id}/delete`.
#[derive(Debug, Serialize)]
pub(crate) struct DeleteRecords<'a> {
    pub ids: &'a [String],
}

/// Body of `POST /clusters/{id}/query`.
#[derive(Debug, Serialize)]
pub(crate) struct QueryRecords<'a> {
    pub query_embeddings: [&'a [f32]; 1],
    pub n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a serde_json::Value>,
    pub include: [&'static str; 1],
}

impl<'a> QueryRecords<'a> {
    /// Builds a single-embedding query that only asks for distances.
    ///
    /// The filter is forwarded as given; `where` is omitted only without one.
    pub fn new(embedding: &'a [f32], limit: usize, filter: Option<&'a serde_json::Value>) -> Self {
        Self {
            query_embeddings: [embedding],
            n_results: limit,
            filter,
            include: ["distances"],
        }
    }
}

/// Response of `POST /clusters/{id}/query`.
///
/// Both fields hold one row per query embedding.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueryResults {
    #[serde(default)]
    pub ids: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<f32>>>,
}

impl QueryResults {
    /// Pairs the first row of ids with its distances.
    ///
    /// Returns `None` when the response carries no match list. A present
    /// list without rows is an empty match set.
    pub fn into_neighbors(self) -> Result<Option<Vec<Neighbor>>> {
        let Some(rows) = self.ids else {
            return Ok(None);
        };
        let Some(ids) = rows.into_iter().next() else {
            return Ok(Some(Vec::new()));
        };

        let distances = self
            .distances
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| Error::invalid_response("query returned ids without distances"))?;

        if ids.len() != distances.len() {
            return Err(Error::invalid_response(format!(
                "query returned {} ids but {} distances",
                ids.len(),
                distances.len()
            )));
        }

        Ok(Some(
            ids.into_iter()
                .zip(distances)
                .map(|(id, distance)| Neighbor { id, distance })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_upsert_body_without_metadata() {
        let records = vec![
            VectorRecord::new("a", vec![0.5, 1.0]),
            VectorRecord::new("b", vec![1.5, 2.0]),
        ];

        let body = serde_json::to_value(UpsertRecords::new(&records)).unwrap();
        assert_eq!(
            body,
            json!({"ids": ["a", "b"], "embeddings": [[0.5, 1.0], [1.5, 2.0]]})
        );
    }

    #[test]
    fn test_upsert_body_aligns_metadata() {
        let records = vec![
            VectorRecord::new("a", vec![1.0]).with_field("kind", json!("note")),
            VectorRecord::new("b", vec![2.0]),
        ];

        let body = serde_json::to_value(UpsertRecords::new(&records)).unwrap();
        assert_eq!(body["metadatas"], json!([{"kind": "note"}, null]));
    }

    #[test]
    fn test_query_body_forwards_filter() {
        let embedding = [0.5_f32];

        let body = serde_json::to_value(QueryRecords::new(&embedding, 3, None)).unwrap();
        assert_eq!(
            body,
            json!({"query_embeddings": [[0.5]], "n_results": 3, "include": ["distances"]})
        );

        let empty = json!({});
        let body = serde_json::to_value(QueryRecords::new(&embedding, 3, Some(&empty))).unwrap();
        assert_eq!(body["where"], json!({}));

        let filter = json!({"table": "messages"});
        let body = serde_json::to_value(QueryRecords::new(&embedding, 3, Some(&filter))).unwrap();
        assert_eq!(body["where"], filter);
    }

    #[test]
    fn test_query_results_into_neighbors() {
        let results: QueryResults = serde_json::from_value(json!({
            "ids": [["a", "b"]],
            "distances": [[0.0, 0.25]]
        }))
        .unwrap();

        let neighbors = results.into_neighbors().unwrap().unwrap();
        assert_eq!(
            neighbors,
            vec![Neighbor::new("a", 0.0), Neighbor::new("b", 0.25)]
        );
    }

    #[test]
    fn test_query_results_without_ids() {
        let results: QueryResults = serde_json::from_value(json!({"ids": null})).unwrap();
        assert!(results.into_neighbors().unwrap().is_none());

        let results: QueryResults = serde_json::from_value(json!({})).unwrap();
        assert!(results.into_neighbors().unwrap().is_none());
    }

    #[test]
    fn test_query_results_with_empty_rows() {
        let results: QueryResults =
            serde_json::from_value(json!({"ids": [], "distances": []})).unwrap();
        assert_eq!(results.into_neighbors().unwrap(), Some(Vec::new()));

        let results: QueryResults =
            serde_json::from_value(json!({"ids": [[]], "distances": [[]]})).unwrap();
        assert_eq!(results.into_neighbors().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_query_results_length_mismatch() {
        let results: QueryResults = serde_json::from_value(json!({
            "ids": [["a", "b"]],
            "distances": [[0.1]]
        }))
        .unwrap();

        assert!(matches!(
            results.into_neighbors(),
            Err(Error::InvalidResponse(_))
        ));
    }
}
