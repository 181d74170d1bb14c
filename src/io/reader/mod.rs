/*! Corpus reading utilities

Corpus files hold one sentence (or verse) per line, aligned positionally across files.
!*/
mod textreader;

pub use textreader::{count_lines, load_corpus, LineReader};
