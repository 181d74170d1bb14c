//! Per corpus pair statistics, written to `corpus-stats.csv`,
//! and the scored training pool of each pair.
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::corpus::ParallelCorpus;
use crate::error::Error;

pub const STATS_FILE: &str = "corpus-stats.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub src_project: String,
    pub trg_project: String,
    /// Rows before splitting.
    pub count: usize,
    pub align_score: f64,
    /// Rows removed by score filtering.
    pub filtered_count: usize,
    pub filtered_align_score: f64,
}

impl CorpusStats {
    pub fn log(&self) {
        info!(
            "{} -> {}: count {}, alignment {:.4}, filtered count {}, alignment (filtered) {:.4}",
            self.src_project,
            self.trg_project,
            self.count,
            self.align_score,
            self.filtered_count,
            self.filtered_align_score
        );
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub fn write_stats(dst: &Path, stats: &[CorpusStats]) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().from_path(dst)?;
    for entry in stats {
        out.serialize(CorpusStats {
            align_score: round4(entry.align_score),
            filtered_align_score: round4(entry.filtered_align_score),
            ..entry.clone()
        })?;
    }
    out.flush()?;
    Ok(())
}

/// `<exp_dir>/<src_project>_<trg_project>.csv`
pub fn scored_corpus_path(exp_dir: &Path, src_project: &str, trg_project: &str) -> PathBuf {
    exp_dir.join(format!("{}_{}.csv", src_project, trg_project))
}

#[derive(Serialize)]
struct ScoredRow<'a> {
    index: usize,
    vref: String,
    source: &'a str,
    target: &'a str,
    score: Option<f64>,
}

/// Write the rows of `corpus` with their alignment scores (empty when unknown).
pub fn write_scored_corpus(dst: &Path, corpus: &ParallelCorpus) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().from_path(dst)?;
    for row in corpus.iter() {
        out.serialize(ScoredRow {
            index: row.index.0,
            vref: row.vref.to_string(),
            source: &row.source,
            target: &row.target,
            score: row.score.map(round4),
        })?;
    }
    out.flush()?;
    info!("wrote {} scored rows to {:?}", corpus.len(), dst);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::corpus::RowIndex;

    #[test]
    fn write() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join(STATS_FILE);
        let stats = vec![CorpusStats {
            src_project: "WEB".to_string(),
            trg_project: "LU".to_string(),
            count: 10,
            align_score: 0.123456,
            filtered_count: 2,
            filtered_align_score: 0.5,
        }];
        write_stats(&dst, &stats).unwrap();
        let text = std::fs::read_to_string(&dst).unwrap();
        assert_eq!(
            text,
            "src_project,trg_project,count,align_score,filtered_count,filtered_align_score\nWEB,LU,10,0.1235,2,0.5\n"
        );
    }

    #[test]
    fn write_scored() {
        let dir = tempfile::tempdir().unwrap();
        let mut corpus = ParallelCorpus::from_lines(
            vec!["GEN 1:1", "GEN 1:2", "GEN 1:3"],
            vec!["in the beginning", "", "and god said, let there be light"],
            vec!["im anfang", "war leer", "und gott sprach"],
            true,
        )
        .unwrap();
        let scores: HashMap<RowIndex, f64> = [(RowIndex(0), 0.123456)].into();
        corpus.set_scores(&scores);

        let dst = scored_corpus_path(dir.path(), "WEB", "LU");
        assert_eq!(dst, dir.path().join("WEB_LU.csv"));
        write_scored_corpus(&dst, &corpus).unwrap();
        let text = std::fs::read_to_string(&dst).unwrap();
        assert_eq!(
            text,
            "index,vref,source,target,score\n\
             0,GEN 1:1,in the beginning,im anfang,0.1235\n\
             2,GEN 1:3,\"and god said, let there be light\",und gott sprach,\n"
        );
    }
}
