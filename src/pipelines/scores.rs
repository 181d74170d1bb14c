//! Alignment score sources.
//!
//! Scores are produced by an external aligner over synchronised corpora
//! (see [crate::alignment::bulk_sync]): one score per row of the corpus built
//! with empty rows kept, in row order.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::CorpusPair;
use crate::corpus::{ParallelCorpus, RowIndex};
use crate::error::Error;
use crate::io::load_corpus;

pub const SCORES_FILE: &str = "alignment.scores.txt";

/// Provides alignment scores for the rows of a corpus pair.
pub trait ScoreSource {
    fn scores(&self, pair: &CorpusPair) -> Result<HashMap<RowIndex, f64>, Error>;
}

/// Scores read from `<scores_dir>/<src>/<trg>/alignment.scores.txt`.
#[derive(Debug, Clone)]
pub struct ScoreFiles {
    scores_dir: PathBuf,
    data_dir: PathBuf,
    vref_path: PathBuf,
}

impl ScoreFiles {
    pub fn new(scores_dir: &Path, data_dir: &Path, vref_path: &Path) -> Self {
        Self {
            scores_dir: scores_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            vref_path: vref_path.to_path_buf(),
        }
    }

    pub fn path(&self, pair: &CorpusPair) -> PathBuf {
        self.scores_dir
            .join(pair.src.to_string())
            .join(pair.trg.to_string())
            .join(SCORES_FILE)
    }
}

/// Parse one score per line.
pub fn load_scores(path: &Path) -> Result<Vec<f64>, Error> {
    load_corpus(path)?
        .map(|line| {
            let line = line?;
            line.parse::<f64>()
                .map_err(|_| Error::Custom(format!("invalid score {:?} in {:?}", line, path)))
        })
        .collect()
}

impl ScoreSource for ScoreFiles {
    fn scores(&self, pair: &CorpusPair) -> Result<HashMap<RowIndex, f64>, Error> {
        let path = self.path(pair);
        debug!("loading alignment scores from {:?}", path);
        let scores = load_scores(&path)?;
        // rows the aligner has seen
        let synced = ParallelCorpus::from_paths(
            &self.vref_path,
            &pair.src.path(&self.data_dir),
            &pair.trg.path(&self.data_dir),
            false,
        )?;
        if synced.len() != scores.len() {
            return Err(Error::Custom(format!(
                "{:?} holds {} scores for {} rows",
                path,
                scores.len(),
                synced.len()
            )));
        }
        Ok(synced.iter().map(|row| row.index).zip(scores).collect())
    }
}

impl ScoreSource for HashMap<RowIndex, f64> {
    fn scores(&self, _pair: &CorpusPair) -> Result<HashMap<RowIndex, f64>, Error> {
        Ok(self.clone())
    }
}
