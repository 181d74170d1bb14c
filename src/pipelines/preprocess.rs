/*! Scripture dataset preprocessing

Builds the training, validation and test sets of an experiment from its corpus pairs.

For each corpus pair, in configuration order:
1. the parallel corpus is built and restricted to the configured books (test books never go to training),
1. test rows are split off, reusing the indices chosen for the first pair of the same language pair,
1. training candidates get their alignment scores and are filtered by score,
1. validation rows are split off the same way as test rows,
1. the remaining rows are added to the training set, noised and tagged (and mirrored if requested).

Randomness comes from a single generator seeded from the configuration.
With statistics on, the scored training pool of each training pair is also written
to `<src_project>_<trg_project>.csv`.
!*/
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::datasets::{insert_trg_tag, write_test, write_train, write_val, EvalSets, IsoPair, TrainSet};
use super::pipeline::Pipeline;
use super::scores::{ScoreFiles, ScoreSource};
use super::stats::{scored_corpus_path, write_scored_corpus, write_stats, CorpusStats, STATS_FILE};
use crate::config::{apply_noise, Config, CorpusPair, DataConfig};
use crate::corpus::{
    filter_parallel_corpus, sample_indices, split_parallel_corpus, ParallelCorpus, RowIndex,
    SplitSize,
};
use crate::error::Error;

pub const VREF_FILE: &str = "vref.txt";

/// Accumulates the datasets of successive corpus pairs.
pub struct CorpusAggregator<'a> {
    data: &'a DataConfig,
    write_trg_tag: bool,
    multilingual: bool,
    test_indices: Option<BTreeSet<RowIndex>>,
    val_indices: Option<BTreeSet<RowIndex>>,
    train: TrainSet,
    val: EvalSets,
    test: EvalSets,
    stats: Vec<CorpusStats>,
}

impl<'a> CorpusAggregator<'a> {
    pub fn new(data: &'a DataConfig) -> Self {
        Self {
            data,
            write_trg_tag: data.write_trg_tag(),
            multilingual: data.is_multilingual(),
            test_indices: None,
            val_indices: None,
            train: TrainSet::new(data.is_mixed_src()),
            val: EvalSets::default(),
            test: EvalSets::default(),
            stats: Vec::new(),
        }
    }

    /// Whether a pair is left out (same language on both sides of a multilingual run).
    pub fn skips(&self, pair: &CorpusPair) -> bool {
        self.multilingual && pair.src.iso() == pair.trg.iso()
    }

    fn tag<'t>(&self, iso: &'t str) -> Option<&'t str> {
        self.write_trg_tag.then(|| iso)
    }

    /// Rows available for training, before any split.
    fn training_pool(&self, corpus: &ParallelCorpus) -> ParallelCorpus {
        let corpus_books = self.data.corpus_books.numbers();
        let test_books = self.data.test_books.numbers();
        if !corpus_books.is_empty() {
            let pool = corpus.include_books(corpus_books);
            if corpus_books.is_disjoint(test_books) {
                pool
            } else {
                pool.exclude_books(test_books)
            }
        } else if !test_books.is_empty() {
            corpus.exclude_books(test_books)
        } else {
            corpus.clone()
        }
    }

    /// Sample a global index set out of `pool` minus `exclude`.
    fn sample_disjoint<R: Rng + ?Sized>(
        pool: &ParallelCorpus,
        size: SplitSize,
        exclude: Option<&BTreeSet<RowIndex>>,
        rng: &mut R,
    ) -> BTreeSet<RowIndex> {
        let mut indices = pool.indices();
        if let Some(exclude) = exclude {
            indices.retain(|i| !exclude.contains(i));
        }
        let count = size.resolve_ceil(indices.len());
        sample_indices(&indices, count, rng)
    }

    /// Process a corpus pair.
    ///
    /// `scores` are only used for training pairs.
    pub fn add_pair<R: Rng + ?Sized>(
        &mut self,
        pair: &CorpusPair,
        corpus: ParallelCorpus,
        scores: Option<&HashMap<RowIndex, f64>>,
        rng: &mut R,
    ) {
        if self.skips(pair) {
            warn!("skipping {} -> {}: same language", pair.src, pair.trg);
            return;
        }
        let iso_pair: IsoPair = pair.iso_pair();
        let (src_iso, trg_iso) = (pair.src.iso(), pair.trg.iso());
        let (src_project, trg_project) = (pair.src.project(), pair.trg.project());

        let mut cur_train = self.training_pool(&corpus);
        let count = cur_train.len();
        if pair.is_train() {
            if let Some(scores) = scores {
                cur_train.set_scores(scores);
            }
        }

        if pair.is_test() {
            let test_size = pair.test_size(self.data.test_size());
            if self.data.disjoint_test && self.test_indices.is_none() {
                let exclude = self.val_indices.as_ref().filter(|_| self.data.disjoint_val);
                self.test_indices = Some(Self::sample_disjoint(&cur_train, test_size, exclude, rng));
            }
            let split_indices = self
                .test
                .pair_indices(&iso_pair)
                .or(self.test_indices.as_ref())
                .cloned();

            let test_books = self.data.test_books.numbers();
            let mut cur_test = if !test_books.is_empty() {
                let cur_test = corpus.include_books(test_books);
                if test_size.is_zero() {
                    cur_test
                } else {
                    split_parallel_corpus(cur_test, test_size, split_indices.as_ref(), rng).1
                }
            } else {
                let (rest, cur_test) =
                    split_parallel_corpus(cur_train, test_size, split_indices.as_ref(), rng);
                cur_train = rest;
                cur_test
            };
            cur_test.clear_scores();
            debug!("{} -> {}: {} test rows", pair.src, pair.trg, cur_test.len());
            let tag = self.tag(trg_iso);
            self.test.add(&iso_pair, trg_project, cur_test, tag);
        }

        if !pair.is_train() {
            return;
        }

        let align_score = cur_train.mean_score();
        let unfiltered = cur_train.len();
        if self.data.score_threshold > 0.0 {
            cur_train = filter_parallel_corpus(cur_train, self.data.score_threshold);
        }
        let stats = CorpusStats {
            src_project: src_project.to_string(),
            trg_project: trg_project.to_string(),
            count,
            align_score,
            filtered_count: unfiltered - cur_train.len(),
            filtered_align_score: cur_train.mean_score(),
        };
        stats.log();
        self.stats.push(stats);
        cur_train.clear_scores();

        let mut cur_val = ParallelCorpus::default();
        if pair.is_val() {
            let val_size = pair.val_size(self.data.val_size);
            if self.data.disjoint_val && self.val_indices.is_none() {
                let exclude = self.test_indices.as_ref().filter(|_| self.data.disjoint_test);
                self.val_indices = Some(Self::sample_disjoint(&cur_train, val_size, exclude, rng));
            }
            let split_indices = self
                .val
                .pair_indices(&iso_pair)
                .or(self.val_indices.as_ref())
                .cloned();
            let (rest, split) = split_parallel_corpus(cur_train, val_size, split_indices.as_ref(), rng);
            cur_train = rest;
            cur_val = split;
        }

        let (_, cur_train) = split_parallel_corpus(cur_train, pair.size, None, rng);
        if cur_train.is_empty() {
            warn!("{} -> {}: no training rows", pair.src, pair.trg);
        }
        debug!(
            "{} -> {}: {} training rows, {} validation rows",
            pair.src,
            pair.trg,
            cur_train.len(),
            cur_val.len()
        );

        if self.data.mirror {
            let mirror_pair: IsoPair = (trg_iso.to_string(), src_iso.to_string());
            let tag = self.tag(src_iso);
            self.val
                .add(&mirror_pair, src_project, cur_val.mirrored(), tag);
            let rows: Vec<(RowIndex, String, String)> = cur_train
                .mirrored()
                .into_iter()
                .map(|row| {
                    let source = match tag {
                        Some(iso) => insert_trg_tag(iso, &row.source),
                        None => row.source,
                    };
                    (row.index, source, row.target)
                })
                .collect();
            self.train.add(trg_project, src_project, rows);
        }

        let tag = self.tag(trg_iso);
        self.val.add(&iso_pair, trg_project, cur_val, tag);
        let rows: Vec<(RowIndex, String, String)> = cur_train
            .into_iter()
            .map(|row| {
                let source = apply_noise(&pair.src_noise, &row.source, rng);
                let source = match tag {
                    Some(iso) => insert_trg_tag(iso, &source),
                    None => source,
                };
                (row.index, source, row.target)
            })
            .collect();
        self.train.add(src_project, trg_project, rows);
    }

    pub fn test_indices(&self, iso_pair: &IsoPair) -> Option<&BTreeSet<RowIndex>> {
        self.test.pair_indices(iso_pair)
    }

    pub fn val_indices(&self, iso_pair: &IsoPair) -> Option<&BTreeSet<RowIndex>> {
        self.val.pair_indices(iso_pair)
    }

    pub fn train(&self) -> &TrainSet {
        &self.train
    }

    pub fn val(&self) -> &EvalSets {
        &self.val
    }

    pub fn test(&self) -> &EvalSets {
        &self.test
    }

    pub fn stats(&self) -> &[CorpusStats] {
        &self.stats
    }

    /// Write the datasets into `exp_dir`.
    pub fn write<R: Rng + ?Sized>(
        self,
        exp_dir: &Path,
        multi_ref_eval: bool,
        rng: &mut R,
    ) -> Result<DatasetSizes, Error> {
        let train = write_train(exp_dir, self.train, rng)?;
        let val = write_val(exp_dir, &self.val, multi_ref_eval, rng)?;
        let test = write_test(exp_dir, &self.test)?;
        Ok(DatasetSizes { train, val, test })
    }
}

/// Number of rows written per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatasetSizes {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

/// Preprocessing of an experiment.
pub struct Preprocess {
    config: Config,
    data_dir: PathBuf,
    scores: Option<Box<dyn ScoreSource>>,
    stats: bool,
}

impl Preprocess {
    /// `data_dir` holds `vref.txt` and the `<iso>-<project>.txt` corpus files.
    pub fn new(config: Config, data_dir: PathBuf, scores_dir: Option<PathBuf>, stats: bool) -> Self {
        let scores = scores_dir.map(|dir| {
            Box::new(ScoreFiles::new(&dir, &data_dir, &data_dir.join(VREF_FILE)))
                as Box<dyn ScoreSource>
        });
        Self::with_scores(config, data_dir, scores, stats)
    }

    pub fn with_scores(
        config: Config,
        data_dir: PathBuf,
        scores: Option<Box<dyn ScoreSource>>,
        stats: bool,
    ) -> Self {
        Self {
            config,
            data_dir,
            scores,
            stats,
        }
    }
}

impl Pipeline<DatasetSizes> for Preprocess {
    fn run(&self) -> Result<DatasetSizes, Error> {
        let data = &self.config.data;
        if data.score_threshold > 0.0 && self.scores.is_none() {
            return Err(Error::Config(
                "a score threshold is set but no alignment scores are available".to_string(),
            ));
        }
        let exp_dir = self.config.exp_dir();
        let vref_path = self.data_dir.join(VREF_FILE);
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(data);

        let (src_vocab_size, trg_vocab_size) = data.vocab_sizes();
        let (src_casing, trg_casing) = data.casings();
        info!(
            "vocab sizes: {} (source), {} (target), casing: {:?} (source), {:?} (target)",
            src_vocab_size, trg_vocab_size, src_casing, trg_casing
        );

        info!("collecting data sets");
        for pair in data.corpus_pairs.iter() {
            if aggregator.skips(pair) {
                warn!("skipping {} -> {}: same language", pair.src, pair.trg);
                continue;
            }
            let corpus = ParallelCorpus::from_paths(
                &vref_path,
                &pair.src.path(&self.data_dir),
                &pair.trg.path(&self.data_dir),
                true,
            )?;
            let wants_scores = pair.is_train() && (data.score_threshold > 0.0 || self.stats);
            let scores = match &self.scores {
                Some(source) if wants_scores => Some(source.scores(pair)?),
                _ => None,
            };
            if self.stats && pair.is_train() {
                let mut pool = aggregator.training_pool(&corpus);
                if let Some(scores) = &scores {
                    pool.set_scores(scores);
                }
                let dst = scored_corpus_path(exp_dir, pair.src.project(), pair.trg.project());
                write_scored_corpus(&dst, &pool)?;
            }
            aggregator.add_pair(pair, corpus, scores.as_ref(), &mut rng);
        }

        if self.stats {
            write_stats(&exp_dir.join(STATS_FILE), aggregator.stats())?;
        }
        let sizes = aggregator.write(exp_dir, self.config.eval.multi_ref_eval, &mut rng)?;
        info!(
            "wrote {} training, {} validation and {} test rows to {:?}",
            sizes.train, sizes.val, sizes.test, exp_dir
        );
        Ok(sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(yaml: &str) -> DataConfig {
        let data: DataConfig = serde_yaml::from_str(yaml).unwrap();
        data.validate().unwrap();
        data
    }

    /// Every verse of GEN 1-2 then MAT 1, with project specific texts.
    fn corpus(project: &str, n: usize) -> ParallelCorpus {
        let vrefs: Vec<String> = (0..n)
            .map(|i| match i {
                i if i < n / 2 => format!("GEN 1:{}", i + 1),
                i => format!("MAT 1:{}", i + 1),
            })
            .collect();
        let src: Vec<String> = (0..n).map(|i| format!("src {}", i)).collect();
        let trg: Vec<String> = (0..n).map(|i| format!("{} {}", project, i)).collect();
        ParallelCorpus::from_lines(vrefs, src, trg, true).unwrap()
    }

    fn iso(src: &str, trg: &str) -> IsoPair {
        (src.to_string(), trg.to_string())
    }

    #[test]
    fn same_language_pair_same_split() {
        let data = data(
            "corpus_pairs:
              - {src: en-WEB, trg: de-LU, test_size: 10, val_size: 10}
              - {src: en-WEB, trg: de-ELB, test_size: 10, val_size: 10}
              - {src: en-KJV, trg: de-LU, test_size: 10, val_size: 10}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 100), None, &mut rng);
        let first_test = aggregator.test_indices(&iso("en", "de")).unwrap().clone();
        let first_val = aggregator.val_indices(&iso("en", "de")).unwrap().clone();
        assert_eq!(first_test.len(), 10);
        assert_eq!(first_val.len(), 10);
        assert!(first_test.is_disjoint(&first_val));

        aggregator.add_pair(&data.corpus_pairs[1], corpus("ELB", 100), None, &mut rng);
        aggregator.add_pair(&data.corpus_pairs[2], corpus("LU", 100), None, &mut rng);

        let test = aggregator.test().get(&iso("en", "de")).unwrap();
        assert_eq!(test.indices(), first_test);
        assert_eq!(test.projects().len(), 2);
        let val = aggregator.val().get(&iso("en", "de")).unwrap();
        assert_eq!(val.indices(), first_val);
        // 3 pairs, 80 training rows each
        assert_eq!(aggregator.train().len(), 240);
    }

    #[test]
    fn disjoint_test_and_val() {
        let data = data(
            "{corpus_pairs: [
                {src: en-WEB, trg: de-LU, type: test, test_size: 20},
                {src: en-WEB, trg: fr-LSG, type: [train, val]}],
              val_size: 20, disjoint_test: true, disjoint_val: true}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        for (pair, project) in data.corpus_pairs.iter().zip(["LU", "LSG"]) {
            aggregator.add_pair(pair, corpus(project, 50), None, &mut rng);
        }
        let test = aggregator.test_indices(&iso("en", "de")).unwrap();
        let val = aggregator.val_indices(&iso("en", "fr")).unwrap();
        assert_eq!(test.len(), 20);
        assert_eq!(val.len(), 20);
        assert!(test.is_disjoint(val));
        assert_eq!(aggregator.train().len(), 30);
    }

    #[test]
    fn disjoint_val_before_test() {
        let data = data(
            "{corpus_pairs: [
                {src: en-WEB, trg: fr-LSG, type: [train, val]},
                {src: en-WEB, trg: de-LU, type: test, test_size: 20}],
              val_size: 20, disjoint_test: true, disjoint_val: true}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        for (pair, project) in data.corpus_pairs.iter().zip(["LSG", "LU"]) {
            aggregator.add_pair(pair, corpus(project, 50), None, &mut rng);
        }
        let val = aggregator.val_indices(&iso("en", "fr")).unwrap();
        let test = aggregator.test_indices(&iso("en", "de")).unwrap();
        assert_eq!(val.len(), 20);
        assert_eq!(test.len(), 20);
        assert!(test.is_disjoint(val));
        assert_eq!(aggregator.train().len(), 30);
    }

    #[test]
    fn fractional_sizes_round_up() {
        for disjoint in [true, false] {
            let data = data(&format!(
                "{{corpus_pairs: [{{src: en-WEB, trg: de-LU, type: test, test_size: 0.1}}],
                  disjoint_test: {}}}",
                disjoint
            ));
            let mut rng = StdRng::seed_from_u64(data.seed);
            let mut aggregator = CorpusAggregator::new(&data);
            aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 95), None, &mut rng);
            assert_eq!(aggregator.test_indices(&iso("en", "de")).unwrap().len(), 10);
        }
    }

    #[test]
    fn test_books_excluded_from_training() {
        let data = data(
            "{corpus_pairs: [{src: en-WEB, trg: de-LU}], test_books: NT, val_size: 5}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 40), None, &mut rng);

        let test = aggregator.test().get(&iso("en", "de")).unwrap();
        assert_eq!(test.len(), 20);
        assert!(test.rows().all(|(_, row)| row.vref.book() == "MAT"));
        assert_eq!(aggregator.val().nb_rows(), 5);
        assert_eq!(aggregator.train().len(), 15);
    }

    #[test]
    fn corpus_books() {
        let data = data(
            "{corpus_pairs: [{src: en-WEB, trg: de-LU, type: train}],
              corpus_books: [GEN, MAT], test_books: MAT}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 40), None, &mut rng);
        assert_eq!(aggregator.train().len(), 20);
        assert!(aggregator.test().is_empty());
    }

    #[test]
    fn score_filtering() {
        let data = data(
            "{corpus_pairs: [{src: en-WEB, trg: de-LU, type: train}], score_threshold: 5}",
        );
        let scores: HashMap<RowIndex, f64> = (0..20).map(|i| (RowIndex(i), i as f64 / 20.0)).collect();
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 20), Some(&scores), &mut rng);

        assert_eq!(aggregator.train().len(), 15);
        let stats = &aggregator.stats()[0];
        assert_eq!(stats.count, 20);
        assert_eq!(stats.filtered_count, 5);
        assert!(stats.filtered_align_score > stats.align_score);
    }

    #[test]
    fn mirror_and_tags() {
        let data = data(
            "{corpus_pairs: [{src: en-WEB, trg: de-LU, type: [train, val], val_size: 2}], mirror: true}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        aggregator.add_pair(&data.corpus_pairs[0], corpus("LU", 10), None, &mut rng);

        assert_eq!(aggregator.train().len(), 16);
        let val = aggregator.val();
        assert_eq!(val.len(), 2);
        let (_, row) = val.get(&iso("de", "en")).unwrap().rows().next().unwrap();
        assert!(row.source.starts_with("<2en> LU "));
        let (_, row) = val.get(&iso("en", "de")).unwrap().rows().next().unwrap();
        assert!(row.source.starts_with("<2de> src "));
    }

    #[test]
    fn self_pairs_skipped() {
        let data = data(
            "corpus_pairs:
              - {src: en-WEB, trg: en-KJV}
              - {src: en-WEB, trg: de-LU, type: train}",
        );
        let mut rng = StdRng::seed_from_u64(data.seed);
        let mut aggregator = CorpusAggregator::new(&data);
        assert!(aggregator.skips(&data.corpus_pairs[0]));
        for pair in data.corpus_pairs.iter() {
            aggregator.add_pair(pair, corpus("X", 10), None, &mut rng);
        }
        assert_eq!(aggregator.train().len(), 10);
        assert!(aggregator.test().is_empty());
    }

    #[test]
    fn threshold_without_scores() {
        let config = Config::from_yaml(
            "data: {corpus_pairs: [{src: en-WEB, trg: de-LU}], score_threshold: 0.1}",
        )
        .unwrap();
        let preprocess = Preprocess::new(config, PathBuf::from("data"), None, false);
        assert!(matches!(preprocess.run(), Err(Error::Config(_))));
    }
}
