//! Scripture parallel corpus.
//!
//! A [ParallelCorpus] is built by walking a verse reference file and two
//! verse-per-line text files in lockstep.
//!
//! A line holding exactly [RANGE_MARKER] belongs to the previous verse:
//! - when both sides hold the marker, the previous reference is extended to cover the line's verse,
//! - when only one side holds it, the reference is extended too,
//!   and the other side's text is appended to the previous row.
//!
//! Rows keep the physical line number they were read at ([RowIndex]).
//! Splits are expressed as sets of these indices, so they stay valid
//! after rows are dropped or filtered out.
use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    path::Path,
};

use log::{debug, warn};
use serde::Serialize;

use crate::error::Error;
use crate::io::{count_lines, load_corpus};
use crate::verse_ref::VerseRef;

/// Line value marking a continuation of the previous verse.
pub const RANGE_MARKER: &str = "<range>";

/// Number of verses of the reference versification file (`vref.txt`).
pub const VREF_COUNT: usize = 31_104;

/// Physical line number of a row in the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowIndex(pub usize);

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: RowIndex,
    pub vref: VerseRef,
    pub source: String,
    pub target: String,
    /// Alignment score, attached after construction.
    pub score: Option<f64>,
}

impl Row {
    pub fn new(index: usize, vref: VerseRef, source: &str, target: &str) -> Self {
        Self {
            index: RowIndex(index),
            vref,
            source: source.to_string(),
            target: target.to_string(),
            score: None,
        }
    }

    fn is_complete(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }
}

/// Accumulates rows, handling range markers.
#[derive(Debug, Default)]
pub struct ParallelCorpusBuilder {
    rows: Vec<Row>,
}

impl ParallelCorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the last row's reference with `vref`, if they share a chapter.
    fn merge_last(last: &mut Row, vref: &VerseRef) {
        if !last.vref.merge_range(vref) {
            warn!(
                "range marker at {} does not continue {} (chapter change), reference not merged",
                vref, last.vref
            );
        }
    }

    fn append(cell: &mut String, text: &str) {
        if text.is_empty() {
            return;
        }
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(text);
    }

    /// Process the line at `index`.
    pub fn push(&mut self, index: usize, vref: VerseRef, source: &str, target: &str) {
        let src_range = source == RANGE_MARKER;
        let trg_range = target == RANGE_MARKER;

        if !src_range && !trg_range {
            self.rows.push(Row::new(index, vref, source, target));
            return;
        }

        let last = match self.rows.last_mut() {
            Some(last) => last,
            None => {
                warn!("range marker at {} has no previous verse, skipping", vref);
                return;
            }
        };

        Self::merge_last(last, &vref);
        if src_range && !trg_range {
            Self::append(&mut last.target, target);
        } else if trg_range && !src_range {
            Self::append(&mut last.source, source);
        }
    }

    /// Finish the corpus.
    ///
    /// Rows with an empty side are dropped if `remove_empty_sentences` is set,
    /// or get both sides blanked otherwise (keeping row count and indices intact).
    pub fn build(mut self, remove_empty_sentences: bool) -> ParallelCorpus {
        if remove_empty_sentences {
            self.rows.retain(Row::is_complete);
        } else {
            for row in self.rows.iter_mut().filter(|row| !row.is_complete()) {
                row.source.clear();
                row.target.clear();
            }
        }
        ParallelCorpus { rows: self.rows }
    }
}

/// An ordered, index-preserving table of (reference, source, target) rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelCorpus {
    rows: Vec<Row>,
}

impl ParallelCorpus {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a corpus from in-memory lines.
    ///
    /// Streams of different lengths are truncated to the shortest one.
    pub fn from_lines<V, S, T>(
        vrefs: V,
        sources: S,
        targets: T,
        remove_empty_sentences: bool,
    ) -> Result<Self, Error>
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let lines = vrefs
            .into_iter()
            .map(|l| Ok(l.as_ref().trim().to_string()));
        let sources = sources
            .into_iter()
            .map(|l| Ok(l.as_ref().trim().to_string()));
        let targets = targets
            .into_iter()
            .map(|l| Ok(l.as_ref().trim().to_string()));
        Self::from_results(lines, sources, targets, remove_empty_sentences)
    }

    /// Build a corpus from a reference file and two text files.
    pub fn from_paths(
        vref_path: &Path,
        src_path: &Path,
        trg_path: &Path,
        remove_empty_sentences: bool,
    ) -> Result<Self, Error> {
        debug!(
            "building parallel corpus from {:?} and {:?}",
            src_path, trg_path
        );
        let nb_vrefs = count_lines(vref_path, |_| true)?;
        if nb_vrefs != VREF_COUNT {
            warn!(
                "{:?} holds {} verse references, expected {}",
                vref_path, nb_vrefs, VREF_COUNT
            );
        }
        Self::from_results(
            load_corpus(vref_path)?,
            load_corpus(src_path)?,
            load_corpus(trg_path)?,
            remove_empty_sentences,
        )
    }

    fn from_results<V, S, T>(
        mut vrefs: V,
        mut sources: S,
        mut targets: T,
        remove_empty_sentences: bool,
    ) -> Result<Self, Error>
    where
        V: Iterator<Item = Result<String, Error>>,
        S: Iterator<Item = Result<String, Error>>,
        T: Iterator<Item = Result<String, Error>>,
    {
        let mut builder = ParallelCorpusBuilder::new();
        let mut index = 0;
        loop {
            match (vrefs.next(), sources.next(), targets.next()) {
                (Some(vref), Some(source), Some(target)) => {
                    let vref = VerseRef::from_string(&vref?)?;
                    builder.push(index, vref, &source?, &target?);
                }
                (None, None, None) => break,
                _ => {
                    warn!(
                        "parallel streams have different lengths, truncating at line {}",
                        index
                    );
                    break;
                }
            }
            index += 1;
        }
        Ok(builder.build(remove_empty_sentences))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn indices(&self) -> BTreeSet<RowIndex> {
        self.rows.iter().map(|row| row.index).collect()
    }

    /// Keep rows whose book is in `books`.
    pub fn include_books(&self, books: &BTreeSet<usize>) -> Self {
        self.filter(|row| books.contains(&row.vref.book_num()))
    }

    /// Keep rows whose book is not in `books`.
    pub fn exclude_books(&self, books: &BTreeSet<usize>) -> Self {
        self.filter(|row| !books.contains(&row.vref.book_num()))
    }

    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Row) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Split rows in two corpora, the first holding rows matching `predicate`.
    pub fn partition<F>(self, predicate: F) -> (Self, Self)
    where
        F: Fn(&Row) -> bool,
    {
        let (matching, others) = self.rows.into_iter().partition(|r| predicate(r));
        (Self { rows: matching }, Self { rows: others })
    }

    /// Attach scores by row index. Rows with no score keep [None].
    pub fn set_scores(&mut self, scores: &HashMap<RowIndex, f64>) {
        for row in self.rows.iter_mut() {
            row.score = scores.get(&row.index).copied();
        }
    }

    pub fn clear_scores(&mut self) {
        for row in self.rows.iter_mut() {
            row.score = None;
        }
    }

    /// Mean of attached scores, 0 if there are none.
    pub fn mean_score(&self) -> f64 {
        let scores: Vec<f64> = self.rows.iter().filter_map(|r| r.score).collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Swap source and target of every row.
    pub fn mirrored(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .cloned()
                .map(|mut row| {
                    std::mem::swap(&mut row.source, &mut row.target);
                    row
                })
                .collect(),
        }
    }
}

impl IntoIterator for ParallelCorpus {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(corpus: &ParallelCorpus) -> Vec<usize> {
        corpus.iter().map(|r| r.index.0).collect()
    }

    #[test]
    fn end_to_end_range() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "GEN 1:2", "GEN 1:3"],
            ["in the beginning", "<range>", "god created"],
            ["im anfang", "war leer", "gott schuf"],
            true,
        )
        .unwrap();

        assert_eq!(corpus.len(), 2);
        let row0 = &corpus.rows()[0];
        assert_eq!(row0.index, RowIndex(0));
        assert_eq!(row0.vref.to_string(), "GEN 1:1-2");
        assert_eq!(row0.source, "in the beginning");
        assert_eq!(row0.target, "im anfang war leer");

        let row1 = &corpus.rows()[1];
        assert_eq!(row1.index, RowIndex(2));
        assert_eq!(row1.vref.to_string(), "GEN 1:3");
        assert_eq!(row1.source, "god created");
        assert_eq!(row1.target, "gott schuf");
    }

    #[test]
    fn both_sides_range() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "GEN 1:2", "GEN 1:3", "GEN 1:4"],
            ["a", "<range>", "<range>", "d"],
            ["w", "<range>", "<range>", "z"],
            true,
        )
        .unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.rows()[0].vref.to_string(), "GEN 1:1-3");
        assert_eq!(corpus.rows()[0].source, "a");
        assert_eq!(corpus.rows()[0].target, "w");
        assert_eq!(indices(&corpus), vec![0, 3]);
    }

    #[test]
    fn target_side_range() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "GEN 1:2"],
            ["a", "b"],
            ["ab", "<range>"],
            true,
        )
        .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.rows()[0].source, "a b");
        assert_eq!(corpus.rows()[0].target, "ab");
        assert_eq!(corpus.rows()[0].vref.to_string(), "GEN 1:1-2");
    }

    #[test]
    fn range_across_chapters_not_merged() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:31", "GEN 2:1", "GEN 2:2"],
            ["a", "<range>", "c"],
            ["x", "y", "z"],
            true,
        )
        .unwrap();
        // no new row, reference untouched, text still appended
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.rows()[0].vref.to_string(), "GEN 1:31");
        assert_eq!(corpus.rows()[0].target, "x y");
        assert_eq!(indices(&corpus), vec![0, 2]);
    }

    #[test]
    fn leading_range_skipped() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "GEN 1:2"],
            ["<range>", "b"],
            ["x", "y"],
            true,
        )
        .unwrap();
        assert_eq!(indices(&corpus), vec![1]);
    }

    #[test]
    fn empty_rows_subset() {
        let vrefs = ["GEN 1:1", "GEN 1:2", "GEN 1:3", "GEN 1:4", "GEN 1:5"];
        let src = ["a", "", "c", "d", ""];
        let trg = ["v", "w", "", "y", ""];
        let removed = ParallelCorpus::from_lines(vrefs, src, trg, true).unwrap();
        let kept = ParallelCorpus::from_lines(vrefs, src, trg, false).unwrap();

        assert_eq!(kept.len(), 5);
        assert_eq!(indices(&removed), vec![0, 3]);
        for row in removed.iter() {
            let same = kept.iter().find(|r| r.index == row.index).unwrap();
            assert_eq!(same, row);
        }
        // blanked, not dropped
        assert_eq!(kept.rows()[1].source, "");
        assert_eq!(kept.rows()[1].target, "");
        assert_eq!(kept.rows()[2].source, "");
    }

    #[test]
    fn truncate_to_shortest() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "GEN 1:2", "GEN 1:3"],
            ["a", "b"],
            ["x", "y", "z"],
            true,
        )
        .unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn invalid_vref() {
        let corpus = ParallelCorpus::from_lines(["GEN 1"], ["a"], ["x"], true);
        assert!(corpus.is_err());
    }

    #[test]
    fn books_and_mirror() {
        let corpus = ParallelCorpus::from_lines(
            ["GEN 1:1", "MAT 1:1", "REV 1:1"],
            ["a", "b", "c"],
            ["x", "y", "z"],
            true,
        )
        .unwrap();
        let nt: BTreeSet<usize> = (40..=66).collect();
        assert_eq!(indices(&corpus.include_books(&nt)), vec![1, 2]);
        assert_eq!(indices(&corpus.exclude_books(&nt)), vec![0]);

        let mirrored = corpus.mirrored();
        assert_eq!(mirrored.rows()[0].source, "x");
        assert_eq!(mirrored.rows()[0].target, "a");
    }

    #[test]
    fn scores() {
        let mut corpus =
            ParallelCorpus::from_lines(["GEN 1:1", "GEN 1:2"], ["a", "b"], ["x", "y"], true)
                .unwrap();
        assert_eq!(corpus.mean_score(), 0.0);
        let scores = [(RowIndex(0), 0.5), (RowIndex(1), 1.0)].into_iter().collect();
        corpus.set_scores(&scores);
        assert_eq!(corpus.mean_score(), 0.75);
        corpus.clear_scores();
        assert!(corpus.iter().all(|r| r.score.is_none()));
    }
}
