//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! crate decoupled from `qdrant-client`.

use std::collections::HashMap;

use crate::config::{DistanceKind, VectorSpace};
use crate::errors::RagError;
use crate::record::{RagHit, RagRecord};

use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::{debug, info};

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Builds the client; no request is sent until first use.
    pub fn new(
        url: &str,
        api_key: Option<&str>,
        collection: &str,
        distance: DistanceKind,
    ) -> Result<Self, RagError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            distance,
        })
    }

    /// Drops the collection if present and creates it empty with `space`.
    pub async fn recreate_collection(&self, space: &VectorSpace) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if exists {
            info!(collection = %self.collection, "dropping existing collection");
            self.client
                .delete_collection(&self.collection)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
        }

        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection = %self.collection, size = space.size, distance = ?space.distance, "collection created");
        Ok(())
    }

    /// Upserts a batch of records, which must all carry embeddings.
    ///
    /// Returns the number of points sent.
    pub async fn upsert_records(&self, records: &[RagRecord]) -> Result<usize, RagError> {
        if records.is_empty() {
            debug!("no points provided for upsert");
            return Ok(0);
        }

        let points = records
            .iter()
            .map(to_point)
            .collect::<Result<Vec<_>, _>>()?;
        let n = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!(collection = %self.collection, points = n, "batch upserted");
        Ok(n)
    }

    /// Similarity search, best hits first.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> Result<Vec<RagHit>, RagError> {
        debug!(collection = %self.collection, top_k, exact, distance = ?self.distance, "qdrant search");

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(res
            .result
            .into_iter()
            .map(|p| hit_from_payload(p.score, p.payload))
            .collect())
    }

    /// Exact number of points in the collection; 0 when it does not exist.
    pub async fn count(&self) -> Result<u64, RagError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(0);
        }
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }
}

fn to_point(r: &RagRecord) -> Result<PointStruct, RagError> {
    let vector = r
        .embedding
        .clone()
        .ok_or_else(|| RagError::MissingEmbedding(r.id.clone()))?;
    let payload = Payload::try_from(json!({
        "text": r.text,
        "page": r.page,
        "source": r.source,
    }))
    .map_err(|e| RagError::Qdrant(e.to_string()))?;
    Ok(PointStruct::new(r.id.clone(), vector, payload))
}

fn hit_from_payload(score: f32, payload: HashMap<String, QValue>) -> RagHit {
    use qdrant_client::qdrant::value::Kind as K;

    let text = match payload.get("text").and_then(|v| v.kind.as_ref()) {
        Some(K::StringValue(s)) => s.clone(),
        _ => String::new(),
    };
    let page = match payload.get("page").and_then(|v| v.kind.as_ref()) {
        Some(K::IntegerValue(i)) => usize::try_from(*i).unwrap_or(0),
        Some(K::DoubleValue(f)) if *f >= 0.0 => *f as usize,
        _ => 0,
    };
    let source = match payload.get("source").and_then(|v| v.kind.as_ref()) {
        Some(K::StringValue(s)) => Some(s.clone()),
        _ => None,
    };
    RagHit {
        score,
        text,
        page,
        source,
    }
}
