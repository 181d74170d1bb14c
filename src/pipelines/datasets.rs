/*! Aggregated datasets

- [TrainSet] concatenates training rows, or merges them by (target project, row) when sources are mixed,
- [EvalSets] holds one [EvalSet] per language pair, with one reference column per target project.

Evaluation rows coming from several projects of the same language pair are merged on their [RowIndex]:
values already present win, and missing references are left empty.
!*/
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use glob::glob;
use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng};

use crate::corpus::{ParallelCorpus, RowIndex};
use crate::error::Error;
use crate::io::write_corpus;
use crate::verse_ref::VerseRef;

/// (source iso, target iso)
pub type IsoPair = (String, String);

/// Prefix a sentence with a `<2iso>` target language tag.
pub fn insert_trg_tag(trg_iso: &str, sentence: &str) -> String {
    format!("<2{}> {}", trg_iso, sentence)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalRow {
    pub vref: VerseRef,
    pub source: String,
    /// Reference per target project.
    pub targets: BTreeMap<String, String>,
}

/// Evaluation rows of a language pair.
#[derive(Debug, Clone, Default)]
pub struct EvalSet {
    rows: BTreeMap<RowIndex, EvalRow>,
    projects: BTreeSet<String>,
}

impl EvalSet {
    fn add(&mut self, trg_project: &str, corpus: ParallelCorpus, trg_tag: Option<&str>) {
        self.projects.insert(trg_project.to_string());
        for row in corpus {
            let source = match trg_tag {
                Some(iso) => insert_trg_tag(iso, &row.source),
                None => row.source,
            };
            let entry = self.rows.entry(row.index).or_insert_with(|| EvalRow {
                vref: row.vref,
                source,
                targets: BTreeMap::new(),
            });
            entry
                .targets
                .entry(trg_project.to_string())
                .or_insert(row.target);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Target projects, in reference column order.
    pub fn projects(&self) -> &BTreeSet<String> {
        &self.projects
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowIndex, &EvalRow)> {
        self.rows.iter()
    }

    pub fn indices(&self) -> BTreeSet<RowIndex> {
        self.rows.keys().copied().collect()
    }

    /// References of a row, one per project, empty when missing.
    pub fn references<'a>(&'a self, row: &'a EvalRow) -> impl Iterator<Item = &'a str> + 'a {
        self.projects
            .iter()
            .map(move |p| row.targets.get(p).map(String::as_str).unwrap_or(""))
    }
}

/// Evaluation sets keyed by language pair.
///
/// Also keeps the row indices of the first non-empty set added for each language pair,
/// so that later projects of the same pair reuse the same split.
#[derive(Debug, Clone, Default)]
pub struct EvalSets {
    sets: BTreeMap<IsoPair, EvalSet>,
    pair_indices: BTreeMap<IsoPair, BTreeSet<RowIndex>>,
}

impl EvalSets {
    pub fn add(
        &mut self,
        iso_pair: &IsoPair,
        trg_project: &str,
        corpus: ParallelCorpus,
        trg_tag: Option<&str>,
    ) {
        if corpus.is_empty() {
            return;
        }
        self.pair_indices
            .entry(iso_pair.clone())
            .or_insert_with(|| corpus.indices());
        self.sets
            .entry(iso_pair.clone())
            .or_default()
            .add(trg_project, corpus, trg_tag);
    }

    /// Indices of the split already chosen for a language pair.
    pub fn pair_indices(&self, iso_pair: &IsoPair) -> Option<&BTreeSet<RowIndex>> {
        self.pair_indices.get(iso_pair)
    }

    pub fn get(&self, iso_pair: &IsoPair) -> Option<&EvalSet> {
        self.sets.get(iso_pair)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IsoPair, &EvalSet)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of rows over all language pairs.
    pub fn nb_rows(&self) -> usize {
        self.sets.values().map(EvalSet::len).sum()
    }
}

/// Training row merged over source projects.
#[derive(Debug, Clone, Default)]
pub struct MixedRow {
    /// Source per source project.
    pub sources: BTreeMap<String, String>,
    pub target: String,
}

/// Training rows.
#[derive(Debug, Clone)]
pub enum TrainSet {
    Concat(Vec<(String, String)>),
    /// Rows keyed by (target project, row index), with one source per source project.
    Mixed(BTreeMap<(String, RowIndex), MixedRow>),
}

impl TrainSet {
    pub fn new(mixed_src: bool) -> Self {
        if mixed_src {
            TrainSet::Mixed(BTreeMap::new())
        } else {
            TrainSet::Concat(Vec::new())
        }
    }

    /// Add (index, source, target) rows of a corpus pair.
    pub fn add<I>(&mut self, src_project: &str, trg_project: &str, rows: I)
    where
        I: IntoIterator<Item = (RowIndex, String, String)>,
    {
        match self {
            TrainSet::Concat(pairs) => {
                pairs.extend(rows.into_iter().map(|(_, src, trg)| (src, trg)));
            }
            TrainSet::Mixed(merged) => {
                for (index, src, trg) in rows {
                    let row = merged
                        .entry((trg_project.to_string(), index))
                        .or_insert_with(|| MixedRow {
                            sources: BTreeMap::new(),
                            target: trg,
                        });
                    row.sources.entry(src_project.to_string()).or_insert(src);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TrainSet::Concat(pairs) => pairs.len(),
            TrainSet::Mixed(merged) => merged.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Final (source, target) pairs.
    ///
    /// Mixed rows get one of their non-empty sources, drawn at random.
    pub fn into_pairs<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<(String, String)> {
        match self {
            TrainSet::Concat(pairs) => pairs,
            TrainSet::Mixed(merged) => merged
                .into_iter()
                .filter_map(|((project, index), row)| {
                    let sources: Vec<&String> =
                        row.sources.values().filter(|s| !s.is_empty()).collect();
                    match sources.choose(&mut *rng) {
                        Some(source) => Some((source.to_string(), row.target)),
                        None => {
                            warn!("no source for row {} of {}, skipping", index, project);
                            None
                        }
                    }
                })
                .collect(),
        }
    }
}

pub fn write_train<R: Rng + ?Sized>(exp_dir: &Path, train: TrainSet, rng: &mut R) -> Result<usize, Error> {
    let pairs = train.into_pairs(rng);
    info!("writing {} training rows", pairs.len());
    write_corpus(
        &exp_dir.join("train.src.txt"),
        pairs.iter().map(|(src, _)| src),
        false,
    )?;
    write_corpus(
        &exp_dir.join("train.trg.txt"),
        pairs.iter().map(|(_, trg)| trg),
        false,
    )?;
    Ok(pairs.len())
}

/// Write validation sources and references.
///
/// With `multi_ref_eval`, reference `i` of each row goes to `val.trg.txt.<i>`
/// (empty when a row has fewer references). Otherwise one non-empty reference
/// is drawn at random for each row and written to `val.trg.txt`.
pub fn write_val<R: Rng + ?Sized>(
    exp_dir: &Path,
    val: &EvalSets,
    multi_ref_eval: bool,
    rng: &mut R,
) -> Result<usize, Error> {
    info!("writing {} validation rows", val.nb_rows());
    let sources = val
        .iter()
        .flat_map(|(_, set)| set.rows().map(|(_, row)| row.source.as_str()));
    write_corpus(&exp_dir.join("val.src.txt"), sources, false)?;

    if multi_ref_eval {
        let nb_refs = val
            .iter()
            .map(|(_, set)| set.projects().len())
            .max()
            .unwrap_or(1);
        let mut refs: Vec<Vec<&str>> = vec![Vec::new(); nb_refs];
        for (_, set) in val.iter() {
            for (_, row) in set.rows() {
                let mut row_refs = set.references(row);
                for file_refs in refs.iter_mut() {
                    file_refs.push(row_refs.next().unwrap_or("").trim());
                }
            }
        }
        for (i, file_refs) in refs.into_iter().enumerate() {
            write_corpus(&exp_dir.join(format!("val.trg.txt.{}", i)), file_refs, false)?;
        }
    } else {
        let mut refs: Vec<&str> = Vec::with_capacity(val.nb_rows());
        for (_, set) in val.iter() {
            for (_, row) in set.rows() {
                let with_data: Vec<&str> = set
                    .references(row)
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .collect();
                refs.push(with_data.choose(&mut *rng).copied().unwrap_or(""));
            }
        }
        write_corpus(&exp_dir.join("val.trg.txt"), refs, false)?;
    }
    Ok(val.nb_rows())
}

/// Remove test files of a previous run.
fn remove_stale_tests(exp_dir: &Path) -> Result<(), Error> {
    let pattern = exp_dir.join("test.*.txt");
    for path in glob(&pattern.to_string_lossy())? {
        let path = path?;
        debug!("removing {:?}", path);
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Write test sets, one file set per language pair.
///
/// Files are prefixed with `test` when there is a single language pair,
/// `test.<src iso>.<trg iso>` otherwise.
/// References go to `<prefix>.trg.txt`, or `<prefix>.trg.<project>.txt` when there are several.
pub fn write_test(exp_dir: &Path, test: &EvalSets) -> Result<usize, Error> {
    remove_stale_tests(exp_dir)?;
    info!("writing {} test rows", test.nb_rows());
    for ((src_iso, trg_iso), set) in test.iter() {
        let prefix = if test.len() == 1 {
            "test".to_string()
        } else {
            format!("test.{}.{}", src_iso, trg_iso)
        };
        write_corpus(
            &exp_dir.join(format!("{}.vref.txt", prefix)),
            set.rows().map(|(_, row)| row.vref.to_string()),
            false,
        )?;
        write_corpus(
            &exp_dir.join(format!("{}.src.txt", prefix)),
            set.rows().map(|(_, row)| row.source.as_str()),
            false,
        )?;
        for project in set.projects() {
            let suffix = if set.projects().len() == 1 {
                String::new()
            } else {
                format!(".{}", project)
            };
            write_corpus(
                &exp_dir.join(format!("{}.trg{}.txt", prefix, suffix)),
                set.rows().map(|(_, row)| {
                    row.targets.get(project).map(String::as_str).unwrap_or("")
                }),
                false,
            )?;
        }
    }
    Ok(test.nb_rows())
}
