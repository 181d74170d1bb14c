/*!
# Corpus writing

Corpora are written as plain text, one sentence per line.
!*/
mod textwriter;

pub use textwriter::write_corpus;
