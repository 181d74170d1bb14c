/*! Line reading

[LineReader] yields one trimmed line at a time, so that several corpus files
can be walked in lockstep without loading them in memory.

A leading UTF-8 byte order mark is dropped from the first line.
!*/
use std::{
    fs::File,
    io::{BufRead, BufReader, Lines, Read},
    path::Path,
};

use crate::error::Error;

const BOM: char = '\u{feff}';

/// Reader that yields trimmed lines.
#[derive(Debug)]
pub struct LineReader<T> {
    lines: Lines<BufReader<T>>,
    first: bool,
}

impl LineReader<File> {
    pub fn new(src: &Path) -> Result<Self, Error> {
        let handle = File::open(src)?;
        Ok(Self::from_reader(handle))
    }
}

impl<T: Read> LineReader<T> {
    pub fn from_reader(reader: T) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            first: true,
        }
    }
}

impl<T: Read> Iterator for LineReader<T> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let first = std::mem::replace(&mut self.first, false);
        Some(
            line.map(|line| {
                let line = if first {
                    line.trim_start_matches(BOM)
                } else {
                    line.as_str()
                };
                line.trim().to_string()
            })
            .map_err(Error::Io),
        )
    }
}

/// Open a corpus file for line by line reading.
pub fn load_corpus(src: &Path) -> Result<LineReader<File>, Error> {
    LineReader::new(src)
}

/// Count the lines of a file that match `filter`.
pub fn count_lines<F>(src: &Path, filter: F) -> Result<usize, Error>
where
    F: Fn(&str) -> bool,
{
    let mut count = 0;
    for line in load_corpus(src)? {
        if filter(&line?) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_iter() {
        let text = Cursor::new("\u{feff}aaa\n  bbb \n\nccc\r\n");
        let lr = LineReader::from_reader(text);
        let lines: Vec<String> = lr.map(Result::unwrap).collect();
        assert_eq!(lines, vec!["aaa", "bbb", "", "ccc"]);
    }

    #[test]
    fn bom_only_stripped_first() {
        let text = Cursor::new("a\n\u{feff}b");
        let lr = LineReader::from_reader(text);
        let lines: Vec<String> = lr.map(Result::unwrap).collect();
        // trim() does not remove U+FEFF
        assert_eq!(lines, vec!["a".to_string(), "\u{feff}b".to_string()]);
    }

    #[test]
    fn test_count_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en-test.txt");
        std::fs::write(&path, "one\n\nthree\n").unwrap();
        assert_eq!(count_lines(&path, |_| true).unwrap(), 3);
        assert_eq!(count_lines(&path, |l| !l.is_empty()).unwrap(), 2);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load_corpus(Path::new("does/not/exist.txt")),
            Err(Error::Io(_))
        ));
    }
}
