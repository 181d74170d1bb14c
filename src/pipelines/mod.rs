//! Pipelines.
//!
//! The [preprocess::Preprocess] pipeline builds the datasets of an experiment.
//! The module provides a light [pipeline::Pipeline] trait
//! and the building blocks of preprocessing (datasets, alignment scores, statistics).
pub mod datasets;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod preprocess;
pub mod scores;
pub mod stats;

pub use datasets::{EvalSet, EvalSets, IsoPair, TrainSet};
pub use pipeline::Pipeline;
pub use preprocess::{CorpusAggregator, DatasetSizes, Preprocess, VREF_FILE};
pub use scores::{load_scores, ScoreFiles, ScoreSource, SCORES_FILE};
pub use stats::{scored_corpus_path, write_scored_corpus, write_stats, CorpusStats, STATS_FILE};
