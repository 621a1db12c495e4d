//! Second-pass relevance ordering through the backend's rerank inference

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::config::SearchConfig;
use crate::models::SearchHit;
use crate::search::RankedIndex;
use crate::search::SearchBackend;

pub struct Reranker {
    backend: Option<Arc<dyn SearchBackend>>,
    inference_id: Option<String>,
}

impl Reranker {
    pub fn new(backend: Option<Arc<dyn SearchBackend>>, config: &SearchConfig) -> Self {
        let inference_id = Some(config.rerank_inference_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Self {
            backend,
            inference_id,
        }
    }

    /// Whether a rerank call would be attempted for non-empty input
    pub fn enabled(&self) -> bool {
        self.backend.is_some() && self.inference_id.is_some()
    }

    /// Reorder `hits` by rerank relevance. Returns the input unchanged when
    /// reranking is not configured, the input has no text, or the call fails.
    pub async fn rerank(&self, query: &str, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let (Some(backend), Some(inference_id)) = (self.backend.as_deref(), &self.inference_id)
        else {
            return hits;
        };
        if hits.is_empty() {
            return hits;
        }

        let texts: Vec<String> = hits.iter().map(|h| h.rerank_text().to_string()).collect();
        if texts.iter().all(String::is_empty) {
            debug!("No text to rerank, keeping search order");
            return hits;
        }

        match backend.rerank(inference_id, query, &texts).await {
            Ok(rankings) => apply_rankings(hits, &rankings),
            Err(e) => {
                warn!("Rerank request failed, keeping search order: {}", e);
                hits
            }
        }
    }
}

/// Order `hits` by `rankings`, annotating each with its relevance score.
///
/// Entries that are missing an index, repeat an index, or point past the end
/// are skipped. Hits no valid entry refers to follow in their original
/// relative order, so the output is always a permutation of the input.
pub fn apply_rankings(hits: Vec<SearchHit>, rankings: &[RankedIndex]) -> Vec<SearchHit> {
    let len = hits.len();
    let mut ranked: HashMap<usize, Option<f64>> = HashMap::with_capacity(rankings.len());
    let mut order: Vec<usize> = Vec::with_capacity(len);

    for entry in rankings {
        let Some(idx) = entry.index.and_then(|i| usize::try_from(i).ok()) else {
            continue;
        };
        if idx >= len || ranked.contains_key(&idx) {
            continue;
        }
        ranked.insert(idx, entry.relevance_score);
        order.push(idx);
    }
    order.extend((0..len).filter(|idx| !ranked.contains_key(idx)));

    let mut slots: Vec<Option<SearchHit>> = hits.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| {
            let mut hit = slots[idx].take()?;
            if let Some(score) = ranked.get(&idx) {
                hit.rerank_score = *score;
            }
            Some(hit)
        })
        .collect()
}
