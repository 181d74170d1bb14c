//! Word translation tables.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::error::Error;
use crate::io::{load_corpus, write_corpus};

/// Tokens aligners add to their vocabularies.
pub const SPECIAL_TOKENS: [&str; 2] = ["NULL", "<UNUSED_WORD>"];

/// Source word -> target word -> translation probability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lexicon {
    table: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `source\ttarget\tprobability` file.
    pub fn load(path: &Path, include_special_tokens: bool) -> Result<Self, Error> {
        debug!("loading lexicon {:?}", path);
        let mut lexicon = Self::new();
        for line in load_corpus(path)? {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let (src, trg, prob) = match (fields.next(), fields.next(), fields.next()) {
                (Some(src), Some(trg), Some(prob)) => (src, trg, prob),
                _ => {
                    return Err(Error::Custom(format!(
                        "invalid lexicon entry {:?} in {:?}",
                        line, path
                    )))
                }
            };
            if !include_special_tokens
                && (SPECIAL_TOKENS.contains(&src) || SPECIAL_TOKENS.contains(&trg))
            {
                continue;
            }
            let prob = prob.parse::<f64>().map_err(|_| {
                Error::Custom(format!("invalid probability {:?} in {:?}", prob, path))
            })?;
            lexicon.insert(src, trg, prob);
        }
        Ok(lexicon)
    }

    pub fn insert(&mut self, src: &str, trg: &str, prob: f64) {
        self.table
            .entry(src.to_string())
            .or_default()
            .insert(trg.to_string(), prob);
    }

    pub fn get(&self, src: &str, trg: &str) -> Option<f64> {
        self.table.get(src).and_then(|row| row.get(trg)).copied()
    }

    pub fn source_words(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Target words of `src` with their probabilities.
    pub fn translations(&self, src: &str) -> impl Iterator<Item = (&str, f64)> {
        self.table
            .get(src)
            .into_iter()
            .flat_map(|row| row.iter().map(|(trg, prob)| (trg.as_str(), *prob)))
    }

    pub fn len(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge a source to target lexicon and a target to source lexicon,
    /// keeping the highest probability of both directions.
    pub fn symmetrize(direct: &Lexicon, inverse: &Lexicon) -> Lexicon {
        let mut lexicon = direct.clone();
        for (trg, row) in &inverse.table {
            for (src, prob) in row {
                match lexicon.get(src, trg) {
                    Some(current) if current >= *prob => (),
                    _ => lexicon.insert(src, trg, *prob),
                }
            }
        }
        lexicon
    }

    /// Entries sorted by source word, then by decreasing probability.
    pub fn entries(&self) -> Vec<(&str, &str, f64)> {
        let mut entries = Vec::with_capacity(self.len());
        for (src, row) in &self.table {
            let mut row: Vec<(&str, f64)> = row.iter().map(|(t, p)| (t.as_str(), *p)).collect();
            row.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            entries.extend(row.into_iter().map(|(trg, prob)| (src.as_str(), trg, prob)));
        }
        entries
    }

    pub fn write(&self, dst: &Path) -> Result<(), Error> {
        let lines = self
            .entries()
            .into_iter()
            .map(|(src, trg, prob)| format!("{}\t{}\t{}", src, trg, prob));
        write_corpus(dst, lines, false)
    }
}
