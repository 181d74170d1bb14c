/*!
# IO utilities

Line-based loading and saving of corpus files.
!*/
pub mod reader;
pub mod writer;

pub use reader::{count_lines, load_corpus, LineReader};
pub use writer::write_corpus;
