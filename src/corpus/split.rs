/*! Corpus splitting

Random, reproducible selection of evaluation partitions.

Randomness is always drawn from a caller-provided [Rng], seeded once per run.
!*/
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::str::FromStr;

use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;

use super::parallel::{ParallelCorpus, RowIndex};

/// Requested size of a partition.
///
/// Integers are absolute counts. Floats up to `1.0` are fractions of the corpus,
/// larger floats are truncated to counts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawSplitSize")]
pub enum SplitSize {
    Count(usize),
    Fraction(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSplitSize {
    Count(u64),
    Float(f64),
}

impl TryFrom<RawSplitSize> for SplitSize {
    type Error = String;

    fn try_from(raw: RawSplitSize) -> Result<Self, Self::Error> {
        match raw {
            RawSplitSize::Count(n) => Ok(SplitSize::Count(n as usize)),
            RawSplitSize::Float(f) if f >= 0.0 => Ok(SplitSize::from(f)),
            RawSplitSize::Float(f) => Err(format!("split size {} is negative", f)),
        }
    }
}

impl From<usize> for SplitSize {
    fn from(n: usize) -> Self {
        SplitSize::Count(n)
    }
}

impl From<f64> for SplitSize {
    fn from(f: f64) -> Self {
        if f <= 1.0 {
            SplitSize::Fraction(f)
        } else {
            SplitSize::Count(f as usize)
        }
    }
}

impl FromStr for SplitSize {
    type Err = String;

    /// Same rules as in configuration files: `250` is a count, `0.1` a fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return Ok(SplitSize::Count(n));
        }
        match s.parse::<f64>() {
            Ok(f) if f >= 0.0 && f.is_finite() => Ok(SplitSize::from(f)),
            _ => Err(format!("invalid split size {:?}", s)),
        }
    }
}

impl SplitSize {
    /// Number of items requested out of `corpus_size` (fractions are truncated).
    pub fn resolve(&self, corpus_size: usize) -> usize {
        match self {
            SplitSize::Count(n) => *n,
            SplitSize::Fraction(f) => (corpus_size as f64 * f) as usize,
        }
    }

    /// Same as [SplitSize::resolve], rounding fractions up.
    pub fn resolve_ceil(&self, corpus_size: usize) -> usize {
        match self {
            SplitSize::Count(n) => *n,
            SplitSize::Fraction(f) => (corpus_size as f64 * f).ceil() as usize,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            SplitSize::Count(n) => *n == 0,
            SplitSize::Fraction(f) => *f == 0.0,
        }
    }
}

/// Sample `split_size` positions out of `0..corpus_size`, skipping `used_indices`.
///
/// Returns [None] when the request covers the whole remaining population,
/// meaning "take everything that remains".
pub fn split_corpus<R: Rng + ?Sized>(
    corpus_size: usize,
    split_size: SplitSize,
    used_indices: &BTreeSet<usize>,
    rng: &mut R,
) -> Option<BTreeSet<usize>> {
    let split_size = split_size.resolve(corpus_size);
    let population: Vec<usize> = (0..corpus_size)
        .filter(|i| !used_indices.contains(i))
        .collect();
    if split_size >= population.len() {
        return None;
    }

    Some(
        population
            .choose_multiple(rng, split_size)
            .copied()
            .collect(),
    )
}

/// Sample at most `count` row indices out of `pool`.
pub fn sample_indices<R: Rng + ?Sized>(
    pool: &BTreeSet<RowIndex>,
    count: usize,
    rng: &mut R,
) -> BTreeSet<RowIndex> {
    let pool: Vec<RowIndex> = pool.iter().copied().collect();
    pool.choose_multiple(rng, count.min(pool.len()))
        .copied()
        .collect()
}

/// Split `corpus` in (remainder, split).
///
/// With `split_indices`, the split holds rows whose index belongs to the set
/// (unknown indices are ignored). Otherwise `split_size` rows are drawn at random:
/// nothing for a zero size, everything when the size covers the corpus.
pub fn split_parallel_corpus<R: Rng + ?Sized>(
    corpus: ParallelCorpus,
    split_size: SplitSize,
    split_indices: Option<&BTreeSet<RowIndex>>,
    rng: &mut R,
) -> (ParallelCorpus, ParallelCorpus) {
    if let Some(split_indices) = split_indices {
        let (split, remainder) = corpus.partition(|row| split_indices.contains(&row.index));
        return (remainder, split);
    }

    if split_size.is_zero() {
        return (corpus, ParallelCorpus::default());
    }
    let count = split_size.resolve_ceil(corpus.len());
    if count >= corpus.len() {
        return (ParallelCorpus::default(), corpus);
    }

    let chosen = sample_indices(&corpus.indices(), count, rng);
    let (split, remainder) = corpus.partition(|row| chosen.contains(&row.index));
    (remainder, split)
}
