//! Line-oriented corpus writing.
use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::error::Error;

/// Write `sentences` to `dst`, one per line (`\n` terminated).
///
/// The file is truncated unless `append` is set.
pub fn write_corpus<I, S>(dst: &Path, sentences: I, append: bool) -> Result<(), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    debug!("writing {:?} (append: {})", dst, append);
    let mut writer = BufWriter::new(options.open(dst)?);
    for sentence in sentences {
        writer.write_all(sentence.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
