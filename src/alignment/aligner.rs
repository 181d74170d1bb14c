//! Aligner identifiers and trained model lexicons.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::alignment::Lexicon;
use crate::error::Error;

pub const DIRECT_LEXICON_FILE: &str = "lexicon.direct.txt";
pub const INVERSE_LEXICON_FILE: &str = "lexicon.inverse.txt";

/// Word aligners whose outputs can be evaluated and whose models can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlignerKind {
    FastAlign,
    Ibm1,
    Ibm2,
    Hmm,
    Ibm3,
    Ibm4,
    Paratext,
}

impl AlignerKind {
    pub const ALL: [AlignerKind; 7] = [
        AlignerKind::FastAlign,
        AlignerKind::Ibm1,
        AlignerKind::Ibm2,
        AlignerKind::Hmm,
        AlignerKind::Ibm3,
        AlignerKind::Ibm4,
        AlignerKind::Paratext,
    ];

    /// Identifier used in file names and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            AlignerKind::FastAlign => "fast_align",
            AlignerKind::Ibm1 => "ibm1",
            AlignerKind::Ibm2 => "ibm2",
            AlignerKind::Hmm => "hmm",
            AlignerKind::Ibm3 => "ibm3",
            AlignerKind::Ibm4 => "ibm4",
            AlignerKind::Paratext => "pt",
        }
    }

    /// Display name, used in metric reports.
    pub fn name(&self) -> &'static str {
        match self {
            AlignerKind::FastAlign => "FastAlign",
            AlignerKind::Ibm1 => "IBM-1",
            AlignerKind::Ibm2 => "IBM-2",
            AlignerKind::Hmm => "HMM",
            AlignerKind::Ibm3 => "IBM-3",
            AlignerKind::Ibm4 => "IBM-4",
            AlignerKind::Paratext => "PT",
        }
    }

    /// The Paratext aligner only trains a source to target model.
    pub fn has_inverse_model(&self) -> bool {
        !matches!(self, AlignerKind::Paratext)
    }
}

impl FromStr for AlignerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.id() == s)
            .copied()
            .ok_or_else(|| Error::InvalidAligner(s.to_string()))
    }
}

impl fmt::Display for AlignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A trained aligner model directory.
#[derive(Debug, Clone)]
pub struct AlignerModel {
    kind: AlignerKind,
    model_dir: PathBuf,
}

impl AlignerModel {
    pub fn new(kind: AlignerKind, model_dir: &Path) -> Self {
        Self {
            kind,
            model_dir: model_dir.to_path_buf(),
        }
    }

    pub fn kind(&self) -> AlignerKind {
        self.kind
    }

    pub fn direct_lexicon_path(&self) -> PathBuf {
        self.model_dir.join(DIRECT_LEXICON_FILE)
    }

    pub fn inverse_lexicon_path(&self) -> PathBuf {
        self.model_dir.join(INVERSE_LEXICON_FILE)
    }

    pub fn direct_lexicon(&self, include_special_tokens: bool) -> Result<Lexicon, Error> {
        Lexicon::load(&self.direct_lexicon_path(), include_special_tokens)
    }

    pub fn inverse_lexicon(&self, include_special_tokens: bool) -> Result<Lexicon, Error> {
        if !self.kind.has_inverse_model() {
            return Err(Error::NoInverseModel);
        }
        Lexicon::load(&self.inverse_lexicon_path(), include_special_tokens)
    }

    /// Write the model lexicon to `dst`, symmetrized when an inverse model exists.
    pub fn extract_lexicon(&self, dst: &Path, include_special_tokens: bool) -> Result<Lexicon, Error> {
        let mut lexicon = self.direct_lexicon(include_special_tokens)?;
        if self.kind.has_inverse_model() {
            info!("symmetrizing {} lexicons", self.kind.name());
            let inverse = self.inverse_lexicon(include_special_tokens)?;
            lexicon = Lexicon::symmetrize(&lexicon, &inverse);
        }
        lexicon.write(dst)?;
        Ok(lexicon)
    }
}
