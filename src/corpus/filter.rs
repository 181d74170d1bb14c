//! Alignment score filtering.
//!
//! The threshold's magnitude selects the mode:
//! - below 1, it is a score cutoff, capped to the 10th percentile of scores,
//! - from 1 up to the corpus size, it is the number of lowest-scored rows to drop.
//!
//! Row order is kept in both modes. Rows without a score count as scored 0.
use std::collections::BTreeSet;

use itertools::Itertools;

use super::parallel::{ParallelCorpus, Row, RowIndex};

/// Cutoff quantile used by the fractional mode.
const MAX_QUANTILE: f64 = 0.1;

fn score(row: &Row) -> f64 {
    row.score.unwrap_or(0.0)
}

/// Quantile with linear interpolation between closest ranks.
/// Returns [None] on empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted: Vec<f64> = values
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

pub fn filter_parallel_corpus(corpus: ParallelCorpus, score_threshold: f64) -> ParallelCorpus {
    if score_threshold < 1.0 {
        let scores: Vec<f64> = corpus.iter().map(score).collect();
        let cutoff = match quantile(&scores, MAX_QUANTILE) {
            Some(q) => q.min(score_threshold),
            None => return corpus,
        };
        let (kept, _) = corpus.partition(|row| score(row) > cutoff);
        kept
    } else if score_threshold < corpus.len() as f64 {
        let nb_dropped = score_threshold as usize;
        let dropped: BTreeSet<RowIndex> = corpus
            .iter()
            .sorted_by(|a, b| score(a).total_cmp(&score(b)))
            .take(nb_dropped)
            .map(|row| row.index)
            .collect();
        let (_, kept) = corpus.partition(|row| dropped.contains(&row.index));
        kept
    } else {
        corpus
    }
}
