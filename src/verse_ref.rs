//! Verse references.
//!
//! A [VerseRef] addresses a verse (or a merged range of verses) of a book,
//! and orders references by book number, chapter, then verse.
//!
//! References are built either from their textual form (`GEN 1:1`, `GEN 1:1-3`, `PSA 3:2a`)
//! or from the fixed-width numeric encoding `BBBCCCVVV`.
use std::{fmt, str::FromStr};

use crate::canon::{book_id_to_number, book_number_to_id};
use crate::error::Error;

/// A verse number with an optional textual segment (`3`, `3a`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Verse {
    number: u32,
    segment: Option<String>,
}

impl Verse {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            segment: None,
        }
    }

    pub fn with_segment(number: u32, segment: &str) -> Self {
        Self {
            number,
            segment: Some(segment.to_string()),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }
}

impl FromStr for Verse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, segment) = s.split_at(split);
        let number = digits
            .parse::<u32>()
            .map_err(|_| Error::InvalidVerseRef(s.to_string()))?;
        if !segment.chars().all(char::is_alphabetic) {
            return Err(Error::InvalidVerseRef(s.to_string()));
        }
        Ok(Self {
            number,
            segment: (!segment.is_empty()).then(|| segment.to_string()),
        })
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        if let Some(segment) = &self.segment {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A scripture reference.
///
/// `end_verse` is only set when the reference covers a merged range of verses.
/// The derived ordering compares book number first, which is the canon order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseRef {
    book: usize,
    chapter: u32,
    verse: Verse,
    end_verse: Option<Verse>,
}

impl VerseRef {
    /// Create a single-verse reference, checking the book number.
    pub fn new(book: usize, chapter: u32, verse: Verse) -> Result<Self, Error> {
        book_number_to_id(book)?;
        if chapter == 0 {
            return Err(Error::InvalidVerseRef(format!(
                "{} {}:{}",
                book, chapter, verse
            )));
        }
        Ok(Self {
            book,
            chapter,
            verse,
            end_verse: None,
        })
    }

    /// Parse a `BBBCCCVVV` integer (3 digits each for book, chapter and verse).
    pub fn from_bbbcccvvv(bbbcccvvv: u64) -> Result<Self, Error> {
        let book = (bbbcccvvv / 1_000_000) as usize;
        let chapter = ((bbbcccvvv / 1_000) % 1_000) as u32;
        let verse = (bbbcccvvv % 1_000) as u32;
        Self::new(book, chapter, Verse::new(verse))
    }

    /// Parse the textual form, `BBB C:V` or `BBB C:V-W`.
    pub fn from_string(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidVerseRef(s.to_string());
        let (book_id, location) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let (chapter, verses) = location.trim().split_once(':').ok_or_else(invalid)?;

        let book = book_id_to_number(book_id)?;
        let chapter = chapter.parse::<u32>().map_err(|_| invalid())?;
        let mut vref = match verses.split_once('-') {
            Some((start, end)) => {
                let mut vref = Self::new(book, chapter, start.parse()?)?;
                vref.end_verse = Some(end.parse()?);
                vref
            }
            None => Self::new(book, chapter, verses.parse()?)?,
        };
        if vref.end_verse.as_ref() == Some(&vref.verse) {
            vref.end_verse = None;
        }
        Ok(vref)
    }

    pub fn book_num(&self) -> usize {
        self.book
    }

    pub fn book(&self) -> &'static str {
        // book numbers are checked at construction
        book_number_to_id(self.book).unwrap_or("???")
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn end_verse(&self) -> Option<&Verse> {
        self.end_verse.as_ref()
    }

    pub fn is_range(&self) -> bool {
        self.end_verse.is_some()
    }

    /// Encode as `BBBCCCVVV`, using the first verse of a range.
    pub fn bbbcccvvv(&self) -> u64 {
        self.book as u64 * 1_000_000 + u64::from(self.chapter) * 1_000 + u64::from(self.verse.number)
    }

    /// Extend this reference so that it covers `other`.
    ///
    /// Merging only happens within the same book and chapter; otherwise `self` is left untouched
    /// and `false` is returned.
    pub fn merge_range(&mut self, other: &VerseRef) -> bool {
        if self.book != other.book || self.chapter != other.chapter {
            return false;
        }
        let end = other.end_verse.as_ref().unwrap_or(&other.verse);
        if end > &self.verse {
            self.end_verse = Some(end.clone());
        }
        true
    }
}

impl FromStr for VerseRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book(), self.chapter, self.verse)?;
        if let Some(end) = &self.end_verse {
            write!(f, "-{}", end)?;
        }
        Ok(())
    }
}
