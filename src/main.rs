//! # scripture-corpora
//!
//! Builds verse-aligned parallel corpora out of Bible translations,
//! and the train, validation and test sets of machine translation experiments.
//!
//! ## Getting started
//!
//! ```sh
//! scripture-corpora 0.1.0
//! scripture parallel corpora for machine translation experiments.
//!
//! USAGE:
//!     scripture-corpora <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     bulk-sync     Synchronise a source text with a directory of target texts
//!     corpus        Build a verse-aligned parallel corpus
//!     help          Prints this message or the help of the given subcommand(s)
//!     lexicon       Extract the lexicon of a trained aligner model
//!     metrics       Evaluate aligner outputs against gold alignments
//!     preprocess    Build the train, validation and test sets of an experiment
//!     split         Sample split indices
//! ```
//!
//! Logging is configured with `RUST_LOG` (e.g. `RUST_LOG=info`).
use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;

use scripture_corpora::alignment::{
    bulk_sync, compute_metrics, target_paths, write_metrics, AlignerKind, AlignerModel,
};
use scripture_corpora::canon::get_books;
use scripture_corpora::config::Config;
use scripture_corpora::corpus::{split_corpus, ParallelCorpus, SplitSize};
use scripture_corpora::error::Error;
use scripture_corpora::io::load_corpus;
use scripture_corpora::pipelines::{Pipeline, Preprocess, VREF_FILE};

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::ScriptureCorpora::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::ScriptureCorpora::Preprocess(p) => {
            let config = Config::load(&p.exp_dir)?;
            let sizes = Preprocess::new(config, p.data_dir, p.scores_dir, p.stats).run()?;
            info!(
                "train: {}, val: {}, test: {}",
                sizes.train, sizes.val, sizes.test
            );
        }

        cli::ScriptureCorpora::Corpus(c) => {
            let corpus = ParallelCorpus::from_paths(&c.vref, &c.src, &c.trg, !c.keep_empty)?;
            let mut out = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .from_path(&c.dst)?;
            out.write_record(["index", "vref", "source", "target"])?;
            for row in corpus.iter() {
                out.write_record([
                    row.index.to_string(),
                    row.vref.to_string(),
                    row.source.clone(),
                    row.target.clone(),
                ])?;
            }
            out.flush()?;
            info!("wrote {} rows to {:?}", corpus.len(), c.dst);
        }

        cli::ScriptureCorpora::Split(s) => {
            let split_size: SplitSize = s.split_size.parse()?;
            let mut used = BTreeSet::new();
            if let Some(path) = &s.used {
                for line in load_corpus(path)? {
                    let line = line?;
                    if line.is_empty() {
                        continue;
                    }
                    let index = line
                        .parse::<usize>()
                        .map_err(|_| Error::Custom(format!("invalid index {:?} in {:?}", line, path)))?;
                    used.insert(index);
                }
            }
            let mut rng = StdRng::seed_from_u64(s.seed);
            let indices = match split_corpus(s.size, split_size, &used, &mut rng) {
                Some(indices) => indices,
                None => (0..s.size).filter(|i| !used.contains(i)).collect(),
            };
            for index in indices {
                println!("{}", index);
            }
        }

        cli::ScriptureCorpora::Metrics(m) => {
            let books = match &m.books {
                Some(books) => get_books(&[books])?,
                None => BTreeSet::new(),
            };
            let mut rng = StdRng::seed_from_u64(m.seed);
            let metrics = compute_metrics(&m.root_dir, &books, m.test_size, &mut rng)?;
            println!("{:<12}{:>10}{:>10}{:>10}{:>10}", "", "AER", "F-Score", "Precision", "Recall");
            for row in &metrics {
                println!(
                    "{:<12}{:>10.4}{:>10.4}{:>10.4}{:>10.4}",
                    row.aligner, row.aer, row.f_score, row.precision, row.recall
                );
            }
            if let Some(dst) = &m.csv {
                write_metrics(dst, &metrics)?;
            }
        }

        cli::ScriptureCorpora::Lexicon(l) => {
            let kind: AlignerKind = l.aligner.parse()?;
            let model = AlignerModel::new(kind, &l.model_dir);
            let lexicon = model.extract_lexicon(&l.dst, l.include_special_tokens)?;
            info!("wrote {} entries to {:?}", lexicon.len(), l.dst);
        }

        cli::ScriptureCorpora::BulkSync(b) => {
            let vref = match b.vref {
                Some(vref) => vref,
                None => b
                    .src
                    .parent()
                    .map(|dir| dir.join(VREF_FILE))
                    .unwrap_or_else(|| VREF_FILE.into()),
            };
            let targets = target_paths(&b.trg_dir, &b.src, &vref)?;
            let report = bulk_sync(&vref, &b.src, &targets, &b.out_dir)?;
            info!(
                "synchronised: {}, skipped: {}, failed: {}",
                report.synced.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
    };
    Ok(())
}
