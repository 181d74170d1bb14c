/*! Scripture corpora

- [parallel]: verse-aligned parallel corpus construction,
- [split]: evaluation partitions sampling,
- [filter]: alignment score filtering,
- [terms]: Paratext term lists.
!*/
pub mod filter;
pub mod parallel;
pub mod split;
pub mod terms;

pub use filter::filter_parallel_corpus;
pub use parallel::{ParallelCorpus, ParallelCorpusBuilder, Row, RowIndex, RANGE_MARKER, VREF_COUNT};
pub use split::{sample_indices, split_corpus, split_parallel_corpus, SplitSize};
pub use terms::{get_terms, get_terms_corpus, get_terms_glosses, get_terms_list, Term, TermPair};
