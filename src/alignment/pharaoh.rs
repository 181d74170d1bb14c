//! Pharaoh word alignments.
//!
//! A line holds space separated links `i-j` between the `i`th source token and
//! the `j`th target token. Reference alignments may flag a link as possible
//! (`i-j-0`) or sure (`i-j-1`); unflagged links are sure.
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::io::load_corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordPair {
    pub src: usize,
    pub trg: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    // link -> sure flag, when given
    links: BTreeMap<WordPair, Option<bool>>,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: usize, trg: usize, sure: Option<bool>) {
        self.links.insert(WordPair { src, trg }, sure);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, src: usize, trg: usize) -> bool {
        self.links.contains_key(&WordPair { src, trg })
    }

    /// A link is sure unless explicitly flagged as possible.
    pub fn is_sure(&self, pair: &WordPair) -> bool {
        !matches!(self.links.get(pair), Some(Some(false)))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &WordPair> {
        self.links.keys()
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut alignment = Alignment::new();
        for link in s.split_whitespace() {
            let invalid = || Error::InvalidAlignment(link.to_string());
            let parts: Vec<&str> = link.split('-').collect();
            let (src, trg, flag) = match parts.as_slice() {
                [src, trg] => (src, trg, None),
                [src, trg, flag] => (src, trg, Some(flag)),
                _ => return Err(invalid()),
            };
            let src = src.parse().map_err(|_| invalid())?;
            let trg = trg.parse().map_err(|_| invalid())?;
            let sure = match flag {
                None => None,
                Some(&"1") => Some(true),
                Some(&"0") => Some(false),
                Some(_) => return Err(invalid()),
            };
            alignment.insert(src, trg, sure);
        }
        Ok(alignment)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<String> = self
            .links
            .iter()
            .map(|(pair, sure)| match sure {
                None => format!("{}-{}", pair.src, pair.trg),
                Some(sure) => format!("{}-{}-{}", pair.src, pair.trg, u8::from(*sure)),
            })
            .collect();
        write!(f, "{}", links.join(" "))
    }
}

/// Load one alignment per line, skipping `#` comment lines.
pub fn load_alignments(path: &Path) -> Result<Vec<Alignment>, Error> {
    let mut alignments = Vec::new();
    for line in load_corpus(path)? {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        alignments.push(line.parse()?);
    }
    Ok(alignments)
}
