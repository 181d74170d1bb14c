//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "scripture-corpora",
    about = "scripture parallel corpora for machine translation experiments."
)]
/// Holds every command that is callable by the `scripture-corpora` command.
pub enum ScriptureCorpora {
    #[structopt(about = "Build the train, validation and test sets of an experiment")]
    Preprocess(Preprocess),
    #[structopt(about = "Build a verse-aligned parallel corpus")]
    Corpus(Corpus),
    #[structopt(about = "Sample split indices")]
    Split(Split),
    #[structopt(about = "Evaluate aligner outputs against gold alignments")]
    Metrics(Metrics),
    #[structopt(about = "Extract the lexicon of a trained aligner model")]
    Lexicon(Lexicon),
    #[structopt(about = "Synchronise a source text with a directory of target texts")]
    BulkSync(BulkSync),
}

#[derive(Debug, StructOpt)]
/// Preprocess command and parameters.
///
/// ```sh
/// scripture-corpora-preprocess 0.1.0
/// Build the train, validation and test sets of an experiment
///
/// USAGE:
///     scripture-corpora preprocess [FLAGS] [OPTIONS] <exp-dir> --data-dir <data-dir>
///
/// FLAGS:
///         --stats      write corpus-stats.csv and the scored training pools in the experiment directory
///
/// OPTIONS:
///         --data-dir <data-dir>        directory holding vref.txt and the corpus files
///         --scores-dir <scores-dir>    directory holding alignment scores
///
/// ARGS:
///     <exp-dir>    experiment directory (contains config.yml)
/// ```
pub struct Preprocess {
    #[structopt(parse(from_os_str), help = "experiment directory (contains config.yml)")]
    pub exp_dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "data-dir",
        help = "directory holding vref.txt and the corpus files"
    )]
    pub data_dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "scores-dir",
        help = "directory holding alignment scores"
    )]
    pub scores_dir: Option<PathBuf>,
    #[structopt(
        long = "stats",
        help = "write corpus-stats.csv and the scored training pools in the experiment directory"
    )]
    pub stats: bool,
}

#[derive(Debug, StructOpt)]
pub struct Corpus {
    #[structopt(parse(from_os_str), help = "verse reference file")]
    pub vref: PathBuf,
    #[structopt(parse(from_os_str), help = "source text")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "target text")]
    pub trg: PathBuf,
    #[structopt(parse(from_os_str), help = "destination tsv file")]
    pub dst: PathBuf,
    #[structopt(long = "keep-empty", help = "keep rows with an empty side")]
    pub keep_empty: bool,
}

#[derive(Debug, StructOpt)]
pub struct Split {
    #[structopt(help = "population size")]
    pub size: usize,
    #[structopt(help = "split size: a count, or a fraction when it has a decimal point")]
    pub split_size: String,
    #[structopt(
        parse(from_os_str),
        long = "used",
        help = "file of already used indices, one per line"
    )]
    pub used: Option<PathBuf>,
    #[structopt(long = "seed", default_value = "111")]
    pub seed: u64,
}

#[derive(Debug, StructOpt)]
pub struct Metrics {
    #[structopt(
        parse(from_os_str),
        help = "directory holding refs.txt and alignments.*.txt"
    )]
    pub root_dir: PathBuf,
    #[structopt(long = "books", help = "books to evaluate on (e.g. NT,GEN)")]
    pub books: Option<String>,
    #[structopt(long = "test-size", help = "number of sampled verses")]
    pub test_size: Option<usize>,
    #[structopt(long = "seed", default_value = "111")]
    pub seed: u64,
    #[structopt(parse(from_os_str), long = "csv", help = "write the metrics to a csv file")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct Lexicon {
    #[structopt(help = "aligner id (fast_align, ibm1, ibm2, hmm, ibm3, ibm4, pt)")]
    pub aligner: String,
    #[structopt(
        parse(from_os_str),
        help = "model directory (contains lexicon.direct.txt)"
    )]
    pub model_dir: PathBuf,
    #[structopt(parse(from_os_str), help = "destination lexicon")]
    pub dst: PathBuf,
    #[structopt(long = "include-special-tokens")]
    pub include_special_tokens: bool,
}

#[derive(Debug, StructOpt)]
pub struct BulkSync {
    #[structopt(parse(from_os_str), help = "source text")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "directory of target texts")]
    pub trg_dir: PathBuf,
    #[structopt(parse(from_os_str), help = "destination directory")]
    pub out_dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "vref",
        help = "verse reference file. Default is vref.txt next to the source."
    )]
    pub vref: Option<PathBuf>,
}
