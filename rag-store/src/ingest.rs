//! Ingestion pipeline: normalize → embed → drop and recreate the collection → upsert.
//!
//! The collection key never changes between runs, so every ingestion fully
//! replaces the previous contents.

use crate::config::{RagConfig, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::normalize::normalize_text;
use crate::record::RagRecord;
use crate::IndexBackend;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Upper bound for a single record's text after normalization.
const RECORD_MAX_CHARS: usize = 8_000;

pub(crate) async fn replace_collection(
    cfg: &RagConfig,
    index: &IndexBackend,
    writer: &Mutex<()>,
    mut records: Vec<RagRecord>,
    provider: &dyn EmbeddingsProvider,
) -> Result<usize, RagError> {
    let before = records.len();
    for r in &mut records {
        r.text = normalize_text(&r.text, RECORD_MAX_CHARS);
    }
    records.retain(|r| !r.text.is_empty());
    if records.len() < before {
        warn!(dropped = before - records.len(), "records without text skipped");
    }
    if records.is_empty() {
        return Err(RagError::Config("nothing to index: no record carries text".into()));
    }

    embed_missing(
        &mut records,
        provider,
        cfg.embedding_dim,
        cfg.embedding_concurrency,
    )
    .await?;

    let size = records
        .iter()
        .find_map(|r| r.embedding.as_ref().map(Vec::len))
        .ok_or_else(|| RagError::MissingEmbedding(records[0].id.clone()))?;
    debug!(size, "vector size determined");

    // Drop, recreate and upsert must not interleave with another replacement.
    let _guard = writer.lock().await;
    let stored = match index {
        IndexBackend::Local(local) => local.replace(records).await?,
        IndexBackend::Qdrant(q) => {
            q.recreate_collection(&VectorSpace {
                size,
                distance: cfg.distance,
            })
            .await?;
            let mut total = 0;
            for batch in records.chunks(cfg.upsert_batch.max(1)) {
                total += q.upsert_records(batch).await?;
            }
            total
        }
    };

    info!(collection = %cfg.collection, stored, "collection replaced");
    Ok(stored)
}
