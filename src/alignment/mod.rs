/*!
# Word alignment utilities

- [pharaoh]: alignment parsing,
- [metrics]: AER, precision, recall and F-score of aligner outputs against gold alignments,
- [aligner]: aligner identifiers and the lexicons of trained models,
- [lexicon]: translation tables,
- [bulk]: preparation of synchronised corpora for alignment scoring.
!*/
pub mod aligner;
pub mod bulk;
pub mod lexicon;
pub mod metrics;
pub mod pharaoh;

pub use aligner::{AlignerKind, AlignerModel};
pub use bulk::{bulk_sync, sync_corpus, target_paths, SyncReport};
pub use lexicon::Lexicon;
pub use metrics::{
    compute_aer, compute_f_score, compute_metrics, get_alignment_counts, write_metrics,
    AlignerMetrics, AlignmentCounts,
};
pub use pharaoh::{load_alignments, Alignment, WordPair};
