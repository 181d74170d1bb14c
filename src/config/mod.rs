/*! Experiment configuration

An experiment directory holds a `config.yml` with four sections:

- `data`: corpus pairs, split sizes, vocabulary and filtering settings ([DataConfig]),
- `train`: passed untouched to the training framework,
- `eval`: evaluation settings ([EvalConfig]),
- `params`: passed untouched to the training framework.

`data` and `eval` are checked at load time: unknown keys, invalid values
and inconsistent settings are errors.
!*/
mod data;
mod noise;

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use serde_yaml::Mapping;

pub use data::{
    get_iso, Books, Casing, CorpusPair, DataConfig, DataFileType, ProjectId, DEFAULT_SEED,
    DEFAULT_SPLIT_SIZE,
};
pub use noise::{apply_noise, NoiseMethod, BLANK_TOKEN};

use crate::error::Error;

pub const CONFIG_FILE: &str = "config.yml";

/// Either a comma separated string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    String(String),
    List(Vec<String>),
}

impl StringOrList {
    /// Trimmed, non empty items.
    pub fn items(&self) -> Vec<String> {
        let items: Vec<&str> = match self {
            StringOrList::String(s) => s.split(',').collect(),
            StringOrList::List(l) => l.iter().map(String::as_str).collect(),
        };
        items
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scorer {
    Bleu,
    SentenceBleu,
    Chrf3,
    Meteor,
    Wer,
    Ter,
}

fn default_scorers() -> Vec<Scorer> {
    vec![Scorer::Bleu]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    #[serde(default)]
    pub multi_ref_eval: bool,
    #[serde(default = "default_scorers")]
    pub scorers: Vec<Scorer>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            multi_ref_eval: false,
            scorers: default_scorers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub train: Mapping,
    #[serde(default)]
    pub eval: EvalConfig,
    #[serde(default)]
    pub params: Mapping,
    /// Sections handled by other tools (e.g. `model`), kept as is.
    #[serde(flatten)]
    pub extra: Mapping,
    #[serde(skip)]
    exp_dir: PathBuf,
}

impl Config {
    /// Load `config.yml` from an experiment directory.
    pub fn load(exp_dir: &Path) -> Result<Self, Error> {
        let path = exp_dir.join(CONFIG_FILE);
        debug!("loading configuration from {:?}", path);
        let text = std::fs::read_to_string(&path)?;
        let mut config = Self::from_yaml(&text)?;
        config.exp_dir = exp_dir.to_path_buf();
        Ok(config)
    }

    /// Parse and validate a configuration.
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        let config: Config = serde_yaml::from_str(text)?;
        config.data.validate()?;
        Ok(config)
    }

    pub fn exp_dir(&self) -> &Path {
        &self.exp_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "
data:
  corpus_pairs:
    - src: en-WEB
      trg: de-LU
      type: train,val
      src_noise:
        - dropout: 0.1
    - src: en-WEB
      trg: de-ELB
      type: test
  seed: 42
  test_books: NT
train:
  max_step: 1000
eval:
  multi_ref_eval: true
  scorers: [bleu, chrf3]
params:
  word_dropout: 0.1
";

    #[test]
    fn from_yaml() {
        let config = Config::from_yaml(CONFIG).unwrap();
        assert_eq!(config.data.seed, 42);
        assert_eq!(config.data.corpus_pairs.len(), 2);
        assert_eq!(
            config.data.corpus_pairs[0].src_noise,
            vec![NoiseMethod::Dropout(0.1)]
        );
        assert_eq!(config.data.test_books.numbers().len(), 27);
        assert!(config.eval.multi_ref_eval);
        assert_eq!(config.eval.scorers, vec![Scorer::Bleu, Scorer::Chrf3]);
        assert_eq!(config.train.len(), 1);
        assert_eq!(config.params.len(), 1);
    }

    #[test]
    fn defaults() {
        let config = Config::from_yaml("data: {corpus_pairs: [{src: en-WEB, trg: de-LU}]}").unwrap();
        assert_eq!(config.eval, EvalConfig::default());
        assert!(config.train.is_empty());
        assert!(config.extra.is_empty());
    }

    #[test]
    fn extra_sections() {
        let config = Config::from_yaml(&format!("{}model: SILTransformerBase
infer: {{beam_width: 4}}
", CONFIG)).unwrap();
        assert_eq!(config.extra.len(), 2);
        assert_eq!(
            config.extra.get("model").and_then(|v| v.as_str()),
            Some("SILTransformerBase")
        );
        assert!(config.extra.get("infer").unwrap().is_mapping());
        assert!(config.extra.get("data").is_none());
        assert_eq!(config.data.seed, 42);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            Config::from_yaml("data: {corpus_pairs: [{src: en-WEB, trg: de-LU}]}\neval: {scorers: [rouge]}"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            Config::from_yaml("data: {corpus_pairs: []}"),
            Err(Error::Config(_))
        ));
        assert!(Config::from_yaml("eval: {multi_ref_eval: true}").is_err());
    }

    #[test]
    fn load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), CONFIG).unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.exp_dir(), dir.path());

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(empty.path()), Err(Error::Io(_))));
    }
}
