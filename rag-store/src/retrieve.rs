//! Retrieval: embed the query and search the index.

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::record::{RagHit, RagQuery};
use crate::IndexBackend;

use tracing::trace;

/// Embeds the query text and returns the top-k hits, best first.
///
/// # Errors
/// Returns embedding/provider errors or backend failures.
pub(crate) async fn rag_context(
    cfg: &RagConfig,
    index: &IndexBackend,
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RagHit>, RagError> {
    trace!(top_k = query.top_k, "rag_context");
    if query.top_k == 0 || query.text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let qv = provider.embed(query.text).await?;
    let hits = match index {
        IndexBackend::Local(local) => local.search(&qv, query.top_k as usize).await?,
        IndexBackend::Qdrant(q) => q.search(qv, query.top_k, cfg.exact_search).await?,
    };

    trace!(hits = hits.len(), "rag_context done");
    Ok(hits)
}
