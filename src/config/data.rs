//! `data` section of the experiment configuration.
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::noise::NoiseMethod;
use super::StringOrList;
use crate::canon::get_books;
use crate::corpus::SplitSize;
use crate::error::Error;

pub const DEFAULT_SEED: u64 = 111;
pub const DEFAULT_SPLIT_SIZE: usize = 250;
pub const DEFAULT_SHARED_VOCAB_SIZE: usize = 24_000;
pub const DEFAULT_VOCAB_SIZE: usize = 8_000;

/// Corpus file stem, `<iso>-<project>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ProjectId {
    iso: String,
    project: String,
}

impl ProjectId {
    pub fn iso(&self) -> &str {
        &self.iso
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Location of the project's verse-per-line file in `data_dir`.
    pub fn path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.txt", self))
    }
}

impl TryFrom<String> for ProjectId {
    type Error = String;

    fn try_from(stem: String) -> Result<Self, Self::Error> {
        match stem.split_once('-') {
            Some((iso, project)) if !iso.is_empty() && !project.is_empty() => Ok(Self {
                iso: iso.to_string(),
                project: project.to_string(),
            }),
            _ => Err(format!("{} is not named <iso>-<project>", stem)),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.iso, self.project)
    }
}

/// Get the (iso, project) of a corpus file.
pub fn get_iso(path: &Path) -> Result<ProjectId, Error> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config(format!("invalid corpus file name {:?}", path)))?;
    ProjectId::try_from(stem.to_string()).map_err(Error::Config)
}

/// Set of partitions a corpus pair contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StringOrList")]
pub struct DataFileType(u8);

impl DataFileType {
    pub const NONE: Self = Self(0);
    pub const TRAIN: Self = Self(1);
    pub const TEST: Self = Self(1 << 1);
    pub const VAL: Self = Self(1 << 2);
    pub const ALL: Self = Self(0b111);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for DataFileType {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for DataFileType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl TryFrom<StringOrList> for DataFileType {
    type Error = String;

    fn try_from(types: StringOrList) -> Result<Self, Self::Error> {
        types
            .items()
            .into_iter()
            .try_fold(Self::NONE, |acc, t| match t.to_lowercase().as_str() {
                "train" => Ok(acc | Self::TRAIN),
                "test" => Ok(acc | Self::TEST),
                "val" => Ok(acc | Self::VAL),
                other => Err(format!("invalid corpus pair type: {}", other)),
            })
    }
}

/// Book selection (`NT`, `OT` or book ids), parsed at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StringOrList")]
pub struct Books(BTreeSet<usize>);

impl Books {
    pub fn numbers(&self) -> &BTreeSet<usize> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<StringOrList> for Books {
    type Error = String;

    fn try_from(books: StringOrList) -> Result<Self, Self::Error> {
        get_books(&books.items())
            .map(Books)
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Casing {
    Lower,
    Preserve,
}

impl Default for Casing {
    fn default() -> Self {
        Casing::Lower
    }
}

fn default_size() -> SplitSize {
    SplitSize::Fraction(1.0)
}

/// A (source, target) corpus combination.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusPair {
    pub src: ProjectId,
    pub trg: ProjectId,
    #[serde(default, rename = "type")]
    pub kind: DataFileType,
    #[serde(default)]
    pub src_noise: Vec<NoiseMethod>,
    #[serde(default = "default_size")]
    pub size: SplitSize,
    pub test_size: Option<SplitSize>,
    pub val_size: Option<SplitSize>,
}

impl CorpusPair {
    pub fn is_train(&self) -> bool {
        self.kind.contains(DataFileType::TRAIN)
    }

    pub fn is_test(&self) -> bool {
        self.kind.contains(DataFileType::TEST)
    }

    pub fn is_val(&self) -> bool {
        self.kind.contains(DataFileType::VAL)
    }

    pub fn iso_pair(&self) -> (String, String) {
        (self.src.iso().to_string(), self.trg.iso().to_string())
    }

    /// Test partition size. `default` applies to train+test pairs.
    pub fn test_size(&self, default: SplitSize) -> SplitSize {
        match self.test_size {
            Some(size) => size,
            None if self.is_train() => default,
            None => self.size,
        }
    }

    /// Validation partition size. `default` applies to train+val pairs.
    pub fn val_size(&self, default: SplitSize) -> SplitSize {
        match self.val_size {
            Some(size) => size,
            None if self.is_train() => default,
            None => self.size,
        }
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_true() -> bool {
    true
}

fn default_val_size() -> SplitSize {
    SplitSize::Count(DEFAULT_SPLIT_SIZE)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub corpus_pairs: Vec<CorpusPair>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_true")]
    pub share_vocab: bool,
    pub vocab_size: Option<usize>,
    pub src_vocab_size: Option<usize>,
    pub trg_vocab_size: Option<usize>,
    pub casing: Option<Casing>,
    pub src_casing: Option<Casing>,
    pub trg_casing: Option<Casing>,
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub mixed_src: bool,
    #[serde(default)]
    pub disjoint_test: bool,
    #[serde(default)]
    pub disjoint_val: bool,
    #[serde(default)]
    pub score_threshold: f64,
    test_size: Option<SplitSize>,
    #[serde(default = "default_val_size")]
    pub val_size: SplitSize,
    #[serde(default)]
    pub corpus_books: Books,
    #[serde(default)]
    pub test_books: Books,
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.corpus_pairs.is_empty() {
            return Err(Error::Config("no corpus pairs configured".to_string()));
        }
        if self.share_vocab {
            if let (Some(src), Some(trg)) = (self.src_vocab_size, self.trg_vocab_size) {
                if src != trg {
                    return Err(Error::Config(format!(
                        "vocab is shared but src_vocab_size ({}) differs from trg_vocab_size ({})",
                        src, trg
                    )));
                }
            }
            if self.casing.is_none() {
                if let (Some(src), Some(trg)) = (self.src_casing, self.trg_casing) {
                    if src != trg {
                        return Err(Error::Config(format!(
                            "vocab is shared but src_casing ({:?}) differs from trg_casing ({:?})",
                            src, trg
                        )));
                    }
                }
            }
        }
        if self.score_threshold < 0.0 || !self.score_threshold.is_finite() {
            return Err(Error::Config(format!(
                "invalid score threshold {}",
                self.score_threshold
            )));
        }
        Ok(())
    }

    /// Test partition size, `0` by default when test books are set.
    pub fn test_size(&self) -> SplitSize {
        match self.test_size {
            Some(size) => size,
            None if !self.test_books.is_empty() => SplitSize::Count(0),
            None => SplitSize::Count(DEFAULT_SPLIT_SIZE),
        }
    }

    /// Source and target vocabulary sizes.
    pub fn vocab_sizes(&self) -> (usize, usize) {
        if self.share_vocab {
            let size = self
                .vocab_size
                .or(self.src_vocab_size)
                .or(self.trg_vocab_size)
                .unwrap_or(DEFAULT_SHARED_VOCAB_SIZE);
            (size, size)
        } else {
            let side = |size: Option<usize>| {
                size.or(self.vocab_size).unwrap_or(DEFAULT_VOCAB_SIZE)
            };
            (side(self.src_vocab_size), side(self.trg_vocab_size))
        }
    }

    /// Source and target casing.
    ///
    /// A shared vocabulary has a single casing: `casing`, else the one side that is set.
    pub fn casings(&self) -> (Casing, Casing) {
        if self.share_vocab {
            let casing = self
                .casing
                .or(self.src_casing)
                .or(self.trg_casing)
                .unwrap_or_default();
            (casing, casing)
        } else {
            let side = |casing: Option<Casing>| casing.or(self.casing).unwrap_or_default();
            (side(self.src_casing), side(self.trg_casing))
        }
    }

    pub fn src_projects(&self) -> BTreeSet<&ProjectId> {
        self.corpus_pairs.iter().map(|p| &p.src).collect()
    }

    pub fn trg_projects(&self) -> BTreeSet<&ProjectId> {
        self.corpus_pairs.iter().map(|p| &p.trg).collect()
    }

    pub fn trg_isos(&self) -> BTreeSet<&str> {
        self.corpus_pairs.iter().map(|p| p.trg.iso()).collect()
    }

    /// Whether sources get a `<2iso>` target language tag.
    pub fn write_trg_tag(&self) -> bool {
        self.trg_isos().len() > 1 || self.mirror
    }

    /// Whether sources are mixed, only meaningful with several source projects.
    pub fn is_mixed_src(&self) -> bool {
        self.mixed_src && self.src_projects().len() > 1
    }

    /// Whether same-language pairs are skipped.
    pub fn is_multilingual(&self) -> bool {
        self.src_projects().len() > 1 || self.trg_projects().len() > 1
    }
}
