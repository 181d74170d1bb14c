/*! Alignment quality metrics

Aligner outputs are compared to a gold alignment in a metrics directory:

- `refs.txt`: one `BBBCCCVVV` verse reference per line,
- `alignments.gold.txt`: the reference alignments,
- `alignments.<aligner>.txt`: one file per evaluated aligner.
!*/
use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::alignment::{load_alignments, AlignerKind, Alignment};
use crate::corpus::{split_corpus, SplitSize};
use crate::error::Error;
use crate::io::load_corpus;
use crate::verse_ref::VerseRef;

pub const REFS_FILE: &str = "refs.txt";
pub const GOLD_FILE: &str = "alignments.gold.txt";

/// Link counts over a set of (hypothesis, reference) alignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentCounts {
    /// Hypothesis links.
    pub a: usize,
    /// Sure reference links.
    pub s: usize,
    /// Hypothesis links that are possible (or sure) in the reference.
    pub pa: usize,
    /// Hypothesis links that are sure in the reference.
    pub sa: usize,
}

pub fn get_alignment_counts(alignments: &[Alignment], references: &[Alignment]) -> AlignmentCounts {
    let mut counts = AlignmentCounts::default();
    for (alignment, reference) in alignments.iter().zip(references) {
        counts.a += alignment.len();
        for pair in reference.pairs() {
            let found = alignment.contains(pair.src, pair.trg);
            if reference.is_sure(pair) {
                counts.s += 1;
                if found {
                    counts.sa += 1;
                    counts.pa += 1;
                }
            } else if found {
                counts.pa += 1;
            }
        }
    }
    counts
}

/// Alignment error rate.
pub fn compute_aer(alignments: &[Alignment], references: &[Alignment]) -> f64 {
    let counts = get_alignment_counts(alignments, references);
    if counts.s + counts.a == 0 {
        return 0.0;
    }
    1.0 - (counts.pa + counts.sa) as f64 / (counts.s + counts.a) as f64
}

/// Returns (f-score, precision, recall).
pub fn compute_f_score(
    alignments: &[Alignment],
    references: &[Alignment],
    alpha: f64,
) -> (f64, f64, f64) {
    let counts = get_alignment_counts(alignments, references);
    let precision = if counts.a == 0 {
        1.0
    } else {
        counts.pa as f64 / counts.a as f64
    };
    let recall = if counts.s == 0 {
        1.0
    } else {
        counts.sa as f64 / counts.s as f64
    };
    let denominator = alpha / precision + (1.0 - alpha) / recall;
    let f_score = if denominator.is_finite() {
        1.0 / denominator
    } else {
        0.0
    };
    (f_score, precision, recall)
}

/// One line of a metrics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignerMetrics {
    #[serde(rename = "Aligner")]
    pub aligner: String,
    #[serde(rename = "AER")]
    pub aer: f64,
    #[serde(rename = "F-Score")]
    pub f_score: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
}

pub fn load_vrefs(path: &Path) -> Result<Vec<VerseRef>, Error> {
    load_corpus(path)?
        .map(|line| {
            let line = line?;
            let bbbcccvvv = line
                .parse::<u64>()
                .map_err(|_| Error::InvalidVerseRef(line.clone()))?;
            VerseRef::from_bbbcccvvv(bbbcccvvv)
        })
        .collect()
}

fn filter_by_book(
    vrefs: &[VerseRef],
    alignments: Vec<Alignment>,
    books: &BTreeSet<usize>,
) -> Vec<Alignment> {
    if books.is_empty() {
        return alignments;
    }
    vrefs
        .iter()
        .zip(alignments)
        .filter(|(vref, _)| books.contains(&vref.book_num()))
        .map(|(_, alignment)| alignment)
        .collect()
}

fn filter_by_index(alignments: Vec<Alignment>, indices: Option<&BTreeSet<usize>>) -> Vec<Alignment> {
    match indices {
        None => alignments,
        Some(indices) => alignments
            .into_iter()
            .enumerate()
            .filter(|(i, _)| indices.contains(i))
            .map(|(_, alignment)| alignment)
            .collect(),
    }
}

/// Evaluate every aligner output of `root_dir` against the gold alignments.
///
/// Rows are restricted to `books` when non empty, then to a random sample of
/// `test_size` rows when there are more.
pub fn compute_metrics<R: Rng + ?Sized>(
    root_dir: &Path,
    books: &BTreeSet<usize>,
    test_size: Option<usize>,
    rng: &mut R,
) -> Result<Vec<AlignerMetrics>, Error> {
    let vrefs = load_vrefs(&root_dir.join(REFS_FILE))?;
    let gold_path = root_dir.join(GOLD_FILE);
    let references = filter_by_book(&vrefs, load_alignments(&gold_path)?, books);
    let test_indices = test_size.and_then(|test_size| {
        split_corpus(
            references.len(),
            SplitSize::Count(test_size),
            &BTreeSet::new(),
            rng,
        )
    });
    let references = filter_by_index(references, test_indices.as_ref());
    info!("evaluating on {} gold alignments", references.len());

    let pattern = root_dir.join("alignments.*.txt");
    let mut metrics = Vec::new();
    for path in glob::glob(&pattern.to_string_lossy())? {
        let path = path?;
        if path == gold_path {
            continue;
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = file_name.split('.').nth(1).unwrap_or_default();
        let aligner: AlignerKind = id.parse()?;
        debug!("evaluating {:?}", path);

        let alignments = filter_by_book(&vrefs, load_alignments(&path)?, books);
        let alignments = filter_by_index(alignments, test_indices.as_ref());
        let aer = compute_aer(&alignments, &references);
        let (f_score, precision, recall) = compute_f_score(&alignments, &references, 0.5);
        metrics.push(AlignerMetrics {
            aligner: aligner.name().to_string(),
            aer,
            f_score,
            precision,
            recall,
        });
    }
    Ok(metrics)
}

pub fn write_metrics(dst: &Path, metrics: &[AlignerMetrics]) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().from_path(dst)?;
    for entry in metrics {
        out.serialize(entry)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn alignments(lines: &[&str]) -> Vec<Alignment> {
        lines.iter().map(|l| l.parse().unwrap()).collect()
    }

    #[test]
    fn counts() {
        let hyp = alignments(&["0-0 1-1 2-2", "0-1"]);
        let refs = alignments(&["0-0 1-1-0 2-1-1", "0-0"]);
        let counts = get_alignment_counts(&hyp, &refs);
        assert_eq!(
            counts,
            AlignmentCounts {
                a: 4,
                s: 3,
                pa: 2,
                sa: 1
            }
        );
        assert!((compute_aer(&hyp, &refs) - (1.0 - 3.0 / 7.0)).abs() < 1e-9);

        let (f, p, r) = compute_f_score(&hyp, &refs, 0.5);
        assert!((p - 0.5).abs() < 1e-9);
        assert!((r - 1.0 / 3.0).abs() < 1e-9);
        assert!((f - 0.4).abs() < 1e-9);
    }

    #[test]
    fn empty_counts() {
        assert_eq!(compute_aer(&[], &[]), 0.0);
        assert_eq!(compute_f_score(&[], &[], 0.5), (1.0, 1.0, 1.0));

        let hyp = alignments(&["0-1"]);
        let refs = alignments(&["0-0"]);
        let (f, p, r) = compute_f_score(&hyp, &refs, 0.5);
        assert_eq!((f, p, r), (0.0, 0.0, 0.0));
        assert_eq!(compute_aer(&hyp, &refs), 1.0);
    }

    #[test]
    fn metrics_dir() {
        let dir = tempfile::tempdir().unwrap();
        // GEN 1:1, GEN 1:2, MAT 1:1
        fs::write(dir.path().join(REFS_FILE), "001001001\n001001002\n040001001\n").unwrap();
        fs::write(dir.path().join(GOLD_FILE), "0-0\n0-0 1-1\n0-0\n").unwrap();
        fs::write(dir.path().join("alignments.fast_align.txt"), "0-0\n0-0 1-1\n0-1\n").unwrap();
        fs::write(dir.path().join("alignments.hmm.txt"), "0-0\n0-1\n0-0\n").unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let metrics = compute_metrics(dir.path(), &BTreeSet::new(), None, &mut rng).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].aligner, "FastAlign");
        assert_eq!(metrics[1].aligner, "HMM");

        let books = BTreeSet::from([1]);
        let metrics = compute_metrics(dir.path(), &books, None, &mut rng).unwrap();
        assert_eq!(metrics[0].aer, 0.0);
        assert_eq!(metrics[0].f_score, 1.0);

        let metrics = compute_metrics(dir.path(), &BTreeSet::new(), Some(1), &mut rng).unwrap();
        assert_eq!(metrics.len(), 2);

        let dst = dir.path().join("metrics.csv");
        write_metrics(&dst, &metrics).unwrap();
        let text = fs::read_to_string(&dst).unwrap();
        assert!(text.starts_with("Aligner,AER,F-Score,Precision,Recall\nFastAlign,"));

        fs::write(dir.path().join("alignments.giza.txt"), "0-0\n0-0\n0-0\n").unwrap();
        assert!(matches!(
            compute_metrics(dir.path(), &BTreeSet::new(), None, &mut rng),
            Err(Error::InvalidAligner(_))
        ));
    }
}
