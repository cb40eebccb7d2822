//! Sketch-to-photo retrieval evaluation
//!
//! Sketch queries are ranked against the photo gallery by cosine similarity.
//! Instance metrics ask whether the exact source photo is retrieved; category
//! metrics ask whether retrieved photos share the query's category.

use crate::config::EvalConfig;
use crate::error::{DatasetError, Result};
use crate::features::FeatureSet;
use crate::types::{photo_stem, sketch_photo_key};
use instant::Instant;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

/// Aggregate retrieval metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    /// Number of sketch queries
    pub sketches: usize,
    /// Number of gallery photos
    pub photos: usize,
    /// Fraction of queries whose source photo is ranked within K
    pub recall_at_k: BTreeMap<usize, f64>,
    /// Mean fraction of the top K sharing the query's category
    pub precision_at_k: BTreeMap<usize, f64>,
    /// Mean average precision with same-category photos as relevant
    pub mean_average_precision: f64,
    /// Queries whose source photo is absent from the gallery
    pub queries_without_photo: usize,
}

impl fmt::Display for RetrievalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "queries: {}, gallery: {}", self.sketches, self.photos)?;
        for (k, recall) in &self.recall_at_k {
            let precision = self.precision_at_k.get(k).copied().unwrap_or_default();
            writeln!(
                f,
                "  @{:<3} recall {:.4}  precision {:.4}",
                k, recall, precision
            )?;
        }
        write!(f, "  mAP {:.4}", self.mean_average_precision)
    }
}

/// Cosine similarity of every sketch (rows) against every photo (columns)
pub fn similarity_matrix(sketches: &FeatureSet, photos: &FeatureSet) -> Result<Array2<f32>> {
    if sketches.is_empty() {
        return Err(DatasetError::EmptyFeatureSet(sketches.model.clone()));
    }
    if photos.is_empty() {
        return Err(DatasetError::EmptyFeatureSet(photos.model.clone()));
    }
    if sketches.dimension != photos.dimension {
        return Err(DatasetError::DimensionMismatch {
            sketch: sketches.dimension,
            photo: photos.dimension,
        });
    }

    let sketch_matrix = sketches.matrix()?;
    let photo_matrix = photos.matrix()?;
    Ok(sketch_matrix.dot(&photo_matrix.t()))
}

/// Photo indices ordered by descending similarity; ties keep index order
#[must_use]
pub fn rank_row(similarities: ArrayView1<'_, f32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..similarities.len()).collect();
    order.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]));
    order
}

/// Evaluate sketch-to-photo retrieval
pub fn evaluate_retrieval(
    sketches: &FeatureSet,
    photos: &FeatureSet,
    config: &EvalConfig,
) -> Result<RetrievalMetrics> {
    let span = crate::spans::evaluation(sketches.len(), photos.len());
    let _enter = span.enter();

    config.validate()?;
    let start = Instant::now();
    let similarities = similarity_matrix(sketches, photos)?;

    let photo_index: HashMap<(&str, &str), usize> = photos
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| ((e.category.as_str(), photo_stem(e.file_name())), i))
        .collect();

    let mut hits: BTreeMap<usize, usize> = config.top_k.iter().map(|&k| (k, 0)).collect();
    let mut precision_sums: BTreeMap<usize, f64> = config.top_k.iter().map(|&k| (k, 0.0)).collect();
    // repeated cut-offs share one entry
    let cutoffs: Vec<usize> = hits.keys().copied().collect();
    let mut ap_sum = 0.0;
    let mut ap_queries = 0usize;
    let mut queries_without_photo = 0usize;

    for (row, sketch) in similarities.rows().into_iter().zip(&sketches.entries) {
        let ranking = rank_row(row);
        let relevant: Vec<bool> = ranking
            .iter()
            .map(|&p| photos.entries.get(p).is_some_and(|e| e.category == sketch.category))
            .collect();

        let target = photo_index
            .get(&(sketch.category.as_str(), sketch_photo_key(sketch.file_name())))
            .copied();
        let target_rank = target.and_then(|t| ranking.iter().position(|&p| p == t));
        if target.is_none() {
            queries_without_photo += 1;
        }

        for &k in &cutoffs {
            let cutoff = k.min(ranking.len());
            if target_rank.is_some_and(|r| r < k) {
                if let Some(count) = hits.get_mut(&k) {
                    *count += 1;
                }
            }
            let same = relevant.iter().take(cutoff).filter(|&&r| r).count();
            if let Some(sum) = precision_sums.get_mut(&k) {
                *sum += same as f64 / cutoff as f64;
            }
        }

        if let Some(ap) = average_precision(&relevant) {
            ap_sum += ap;
            ap_queries += 1;
        }
    }

    let query_count = sketches.len();
    let with_photo = query_count - queries_without_photo;
    let recall_at_k = hits
        .into_iter()
        .map(|(k, h)| (k, ratio(h as f64, with_photo)))
        .collect();
    let precision_at_k = precision_sums
        .into_iter()
        .map(|(k, s)| (k, ratio(s, query_count)))
        .collect();

    let metrics = RetrievalMetrics {
        sketches: query_count,
        photos: photos.len(),
        recall_at_k,
        precision_at_k,
        mean_average_precision: ratio(ap_sum, ap_queries),
        queries_without_photo,
    };

    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Ranking complete");
    info!(
        sketches = metrics.sketches,
        photos = metrics.photos,
        map = metrics.mean_average_precision,
        "Retrieval evaluated"
    );
    Ok(metrics)
}

/// Average precision of a ranked relevance list, `None` without relevant items
fn average_precision(relevant: &[bool]) -> Option<f64> {
    let mut found = 0usize;
    let mut sum = 0.0;
    for (rank, &is_relevant) in relevant.iter().enumerate() {
        if is_relevant {
            found += 1;
            sum += found as f64 / (rank + 1) as f64;
        }
    }
    (found > 0).then(|| sum / found as f64)
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
