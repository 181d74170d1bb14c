/*! Paratext biblical term lists

A term list is spread over several line-aligned files:

- `<iso>-<project>-<list>-renderings.txt`: tab separated renderings of each term,
- `<list>-metadata.txt`: `id\tcategory\tdomain`,
- `<iso>-<list>-glosses.txt` (optional): tab separated glosses,
- `<list>-vrefs.txt` (optional): tab separated verse references where the term occurs.
!*/
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use itertools::{EitherOrBoth, Itertools};
use log::warn;

use crate::error::Error;
use crate::io::load_corpus;
use crate::verse_ref::VerseRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: String,
    pub cat: String,
    pub domain: String,
    pub glosses: Vec<String>,
    pub renderings: Vec<String>,
    pub vrefs: BTreeSet<VerseRef>,
}

/// A (source, target) entry of a terms corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermPair {
    pub source: String,
    pub target: String,
    /// Whether the term occurs in one of the dictionary books.
    pub dictionary: bool,
    /// Tab separated references of the source term.
    pub vrefs: String,
}

fn split_tabs(line: &str) -> Vec<String> {
    if line.is_empty() {
        Vec::new()
    } else {
        line.split('\t').map(String::from).collect()
    }
}

/// Read the lines of an optional file, an absent or missing file giving no lines.
fn optional_lines(path: Option<&Path>) -> Result<Vec<String>, Error> {
    match path {
        Some(path) if path.is_file() => load_corpus(path)?.collect(),
        _ => Ok(Vec::new()),
    }
}

/// Name of the term list of a renderings file.
///
/// `Project` lists are named after their project.
pub fn get_terms_list(renderings_path: &Path) -> Result<String, Error> {
    let stem = renderings_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Custom(format!("invalid renderings path {:?}", renderings_path)))?;
    let parts: Vec<&str> = stem.split('-').collect();
    match parts.as_slice() {
        [_, project, list_type, ..] => Ok(if *list_type == "Project" {
            project.to_string()
        } else {
            list_type.to_string()
        }),
        _ => Err(Error::Custom(format!(
            "renderings file {:?} is not named <iso>-<project>-<list>-renderings",
            renderings_path
        ))),
    }
}

/// Load a term list, keyed by term id.
pub fn get_terms(
    renderings_path: &Path,
    metadata_path: &Path,
    glosses_path: Option<&Path>,
    vrefs_path: Option<&Path>,
) -> Result<HashMap<String, Term>, Error> {
    let glosses = optional_lines(glosses_path)?;
    let vrefs = optional_lines(vrefs_path)?;
    let metadata = load_corpus(metadata_path)?;
    let renderings = load_corpus(renderings_path)?;

    let mut terms = HashMap::new();
    for (i, pair) in metadata.zip_longest(renderings).enumerate() {
        let (metadata_line, renderings_line) = match pair {
            EitherOrBoth::Both(m, r) => (m?, r?),
            EitherOrBoth::Left(m) => (m?, String::new()),
            EitherOrBoth::Right(_) => {
                warn!(
                    "{:?} has more lines than {:?}, ignoring the rest",
                    renderings_path, metadata_path
                );
                break;
            }
        };

        let mut fields = metadata_line.splitn(3, '\t');
        let (id, cat, domain) = match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(cat), Some(domain)) => (id, cat, domain),
            _ => {
                return Err(Error::Custom(format!(
                    "invalid metadata line {} in {:?}",
                    i + 1,
                    metadata_path
                )))
            }
        };

        let term_vrefs = match vrefs.get(i) {
            Some(line) => split_tabs(line)
                .iter()
                .map(|vref| VerseRef::from_string(vref))
                .collect::<Result<BTreeSet<_>, _>>()?,
            None => BTreeSet::new(),
        };

        terms.insert(
            id.to_string(),
            Term {
                id: id.to_string(),
                cat: cat.to_string(),
                domain: domain.to_string(),
                glosses: glosses.get(i).map(|l| split_tabs(l)).unwrap_or_default(),
                renderings: split_tabs(&renderings_line),
                vrefs: term_vrefs,
            },
        );
    }
    Ok(terms)
}

fn keep_term(term: &Term, cats: Option<&BTreeSet<String>>) -> bool {
    cats.map_or(true, |cats| cats.contains(&term.cat))
}

fn in_dictionary(term: &Term, dictionary_books: Option<&BTreeSet<usize>>) -> bool {
    dictionary_books.map_or(true, |books| {
        term.vrefs.iter().any(|vref| books.contains(&vref.book_num()))
    })
}

fn joined_vrefs(term: &Term) -> String {
    term.vrefs.iter().map(ToString::to_string).join("\t")
}

/// Pair the renderings of terms present in both lists.
///
/// `cats` restricts source terms to some categories; a term is flagged as a dictionary
/// entry when it occurs in one of `dictionary_books` (always when no books are given).
pub fn get_terms_corpus(
    src_terms: &HashMap<String, Term>,
    trg_terms: &HashMap<String, Term>,
    cats: Option<&BTreeSet<String>>,
    dictionary_books: Option<&BTreeSet<usize>>,
) -> BTreeSet<TermPair> {
    let mut data = BTreeSet::new();
    for src_term in src_terms.values().filter(|t| keep_term(t, cats)) {
        let trg_term = match trg_terms.get(&src_term.id) {
            Some(t) => t,
            None => continue,
        };
        let dictionary = in_dictionary(src_term, dictionary_books);
        let vrefs = joined_vrefs(src_term);
        for (src, trg) in src_term
            .renderings
            .iter()
            .cartesian_product(trg_term.renderings.iter())
        {
            data.insert(TermPair {
                source: src.clone(),
                target: trg.clone(),
                dictionary,
                vrefs: vrefs.clone(),
            });
        }
    }
    data
}

/// Pair each rendering of a list with the term's glosses.
pub fn get_terms_glosses(
    terms: &HashMap<String, Term>,
    cats: Option<&BTreeSet<String>>,
    dictionary_books: Option<&BTreeSet<usize>>,
) -> BTreeSet<TermPair> {
    let mut data = BTreeSet::new();
    for term in terms.values().filter(|t| keep_term(t, cats)) {
        let dictionary = in_dictionary(term, dictionary_books);
        let vrefs = joined_vrefs(term);
        for (rendering, gloss) in term.renderings.iter().cartesian_product(term.glosses.iter()) {
            data.insert(TermPair {
                source: rendering.clone(),
                target: gloss.clone(),
                dictionary,
                vrefs: vrefs.clone(),
            });
        }
    }
    data
}
