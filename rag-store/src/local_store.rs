//! File-backed index: one JSONL file per collection, brute-force search.
//!
//! Each line is a serialized [`RagRecord`] including its embedding. The whole
//! collection is held in memory; writes replace the file atomically
//! (temp file + rename).

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::DistanceKind;
use crate::errors::RagError;
use crate::record::{RagHit, RagRecord};

pub struct LocalIndex {
    path: PathBuf,
    distance: DistanceKind,
    points: RwLock<Vec<RagRecord>>,
}

impl LocalIndex {
    /// Opens `<dir>/<collection>.jsonl`, loading it when it exists.
    pub async fn open(
        dir: impl AsRef<Path>,
        collection: &str,
        distance: DistanceKind,
    ) -> Result<Self, RagError> {
        let path = dir.as_ref().join(format!("{collection}.jsonl"));
        let points = match tokio::fs::read_to_string(&path).await {
            Ok(body) => parse_jsonl(&body)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no persisted index yet");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), points = points.len(), "local index opened");

        Ok(Self {
            path,
            distance,
            points: RwLock::new(points),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the whole collection with `records` and persists it.
    ///
    /// Every record must carry an embedding of the same size.
    pub async fn replace(&self, records: Vec<RagRecord>) -> Result<usize, RagError> {
        let mut dim = None;
        let mut body = String::new();
        for r in &records {
            let v = r
                .embedding
                .as_ref()
                .ok_or_else(|| RagError::MissingEmbedding(r.id.clone()))?;
            match dim {
                Some(want) if v.len() != want => {
                    return Err(RagError::VectorSizeMismatch { got: v.len(), want });
                }
                None => dim = Some(v.len()),
                _ => {}
            }
            body.push_str(&serde_json::to_string(r)?);
            body.push('\n');
        }

        // Held from the temp write through the rename: the temp path is shared.
        let mut points = self.points.write().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        let n = records.len();
        *points = records;

        info!(path = %self.path.display(), points = n, "local index replaced");
        Ok(n)
    }

    /// Top-`top_k` records by similarity to `vector`, best first.
    pub async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<RagHit>, RagError> {
        let points = self.points.read().await;
        let mut scored = Vec::with_capacity(points.len());
        for r in points.iter() {
            let Some(v) = r.embedding.as_deref() else {
                warn!(id = %r.id, "stored point without embedding skipped");
                continue;
            };
            if v.len() != vector.len() {
                return Err(RagError::VectorSizeMismatch {
                    got: vector.len(),
                    want: v.len(),
                });
            }
            scored.push((score(self.distance, vector, v), r));
        }

        match self.distance {
            DistanceKind::Euclid => scored.sort_by(|a, b| a.0.total_cmp(&b.0)),
            DistanceKind::Cosine | DistanceKind::Dot => scored.sort_by(|a, b| b.0.total_cmp(&a.0)),
        }

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, r)| RagHit {
                score,
                text: r.text.clone(),
                page: r.page,
                source: r.source.clone(),
            })
            .collect())
    }

    pub async fn count(&self) -> u64 {
        self.points.read().await.len() as u64
    }
}

fn parse_jsonl(body: &str) -> Result<Vec<RagRecord>, RagError> {
    let mut out = Vec::new();
    for (i, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let r: RagRecord = serde_json::from_str(line)
            .map_err(|e| RagError::Parse(format!("line {} parse error: {}", i + 1, e)))?;
        out.push(r);
    }
    Ok(out)
}

/// Cosine and dot: higher is closer. Euclid: distance, lower is closer.
fn score(kind: DistanceKind, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match kind {
        DistanceKind::Dot => dot,
        DistanceKind::Cosine => {
            let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
        }
        DistanceKind::Euclid => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}
