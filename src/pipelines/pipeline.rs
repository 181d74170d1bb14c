//! Pipeline trait.
use crate::error::Error;

/// Implemented by each pipeline.
///
/// Generic over the return type, so that a pipeline can report
/// what it produced.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
