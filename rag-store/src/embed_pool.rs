//! Embedding executor with concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError, record::RagRecord};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Embeds texts for records that have no precomputed vectors.
///
/// # Arguments
/// - `records`: mutable slice of `RagRecord`s.
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size (error on mismatch).
///   Otherwise every vector must match the first one.
/// - `concurrency`: maximum number of concurrent embedding tasks.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or the provider's error if an embedding call fails.
pub async fn embed_missing(
    records: &mut [RagRecord],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<usize, RagError> {
    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| if r.embedding.is_none() { Some(i) } else { None })
        .collect();

    info!(
        total = records.len(),
        missing = idxs.len(),
        concurrency,
        "embedding records"
    );
    if idxs.is_empty() {
        debug!("nothing to embed");
        return Ok(0);
    }

    let results: Vec<(usize, Vec<f32>)> = stream::iter(idxs)
        .map(|i| {
            let text = records[i].text.clone();
            async move {
                let v = provider.embed(&text).await?;
                Ok::<(usize, Vec<f32>), RagError>((i, v))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    let mut want = expected_dim.or_else(|| records.iter().find_map(|r| r.embedding.as_ref().map(Vec::len)));
    let embedded = results.len();
    for (i, v) in results {
        match want {
            Some(w) if v.len() != w => {
                return Err(RagError::VectorSizeMismatch { got: v.len(), want: w });
            }
            None => want = Some(v.len()),
            _ => {}
        }
        records[i].embedding = Some(v);
    }

    debug!(embedded, dim = ?want, "embeddings filled");
    Ok(embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbedFuture;

    struct LenEmbedder;

    impl EmbeddingsProvider for LenEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
            Box::pin(async move { Ok(vec![1.0; text.len()]) })
        }
    }

    fn rec(ordinal: usize, text: &str) -> RagRecord {
        RagRecord::new("c", ordinal, 0, text, None)
    }

    #[tokio::test]
    async fn fills_only_missing_vectors() {
        let mut records = vec![rec(0, "abc"), rec(1, "xyz")];
        records[0].embedding = Some(vec![0.0; 3]);
        let n = embed_missing(&mut records, &LenEmbedder, None, 2).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(records[0].embedding, Some(vec![0.0; 3]));
        assert_eq!(records[1].embedding, Some(vec![1.0; 3]));
    }

    #[tokio::test]
    async fn inconsistent_dimensions_fail() {
        let mut records = vec![rec(0, "ab"), rec(1, "abc")];
        let err = embed_missing(&mut records, &LenEmbedder, None, 1).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { .. }));
    }

    #[tokio::test]
    async fn expected_dimension_is_enforced() {
        let mut records = vec![rec(0, "abcd")];
        let err = embed_missing(&mut records, &LenEmbedder, Some(3), 1).await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 4, want: 3 }));
    }
}
