/*!
# scripture-corpora

Verse-aligned parallel corpora built from Bible translations, and the datasets of
machine translation experiments built from them.

- [corpus]: parallel corpus construction, splitting and filtering,
- [config]: experiment configuration,
- [pipelines]: dataset preprocessing,
- [alignment]: word alignment evaluation and lexicons.
!*/
pub mod alignment;
pub mod canon;
pub mod config;
pub mod corpus;
pub mod error;
pub mod io;
pub mod pipelines;
pub mod verse_ref;
