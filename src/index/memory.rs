//! In-memory vector index for tests and local development.

use crate::error::Result;
use crate::index::{VectorIndex, VectorMatch, VectorRecord};
use crate::ingestion::ToolCard;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// HashMap-backed index with cosine similarity search.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: RwLock<HashMap<String, (Vec<f32>, ToolCard)>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let mut store = self.records.write().unwrap();
        for record in records {
            store.insert(record.id, (record.values, record.card));
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let store = self.records.read().unwrap();

        let mut matches: Vec<VectorMatch> = store
            .iter()
            .map(|(id, (values, card))| VectorMatch {
                id: id.clone(),
                score: cosine_similarity(vector, values) as f64,
                card: card.clone(),
            })
            .collect();

        // Secondary key keeps equal-score results deterministic despite
        // HashMap iteration order.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(top_k);

        Ok(matches)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
