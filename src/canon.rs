//! Scripture canon.
//!
//! This module holds the table of book ids, in canonical order,
//! and conversions between 1-based book numbers and 3-letter ids.
//!
use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;

use crate::error::Error;

/// Every known book id, in canonical order.
/// The book number of an id is its position in this table, starting at 1.
pub const ALL_BOOK_IDS: [&str; 123] = [
    "GEN", "EXO", "LEV", "NUM", "DEU", "JOS", "JDG", "RUT", "1SA", "2SA", // 10
    "1KI", "2KI", "1CH", "2CH", "EZR", "NEH", "EST", "JOB", "PSA", "PRO", // 20
    "ECC", "SNG", "ISA", "JER", "LAM", "EZK", "DAN", "HOS", "JOL", "AMO", // 30
    "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL", "MAT", // 40
    "MRK", "LUK", "JHN", "ACT", "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", // 50
    "COL", "1TH", "2TH", "1TI", "2TI", "TIT", "PHM", "HEB", "JAS", "1PE", // 60
    "2PE", "1JN", "2JN", "3JN", "JUD", "REV", "TOB", "JDT", "ESG", "WIS", // 70
    "SIR", "BAR", "LJE", "S3Y", "SUS", "BEL", "1MA", "2MA", "3MA", "4MA", // 80
    "1ES", "2ES", "MAN", "PS2", "ODA", "PSS", "JSA", "JDB", "TBS", "SST", // 90
    "DNT", "BLT", "XXA", "XXB", "XXC", "XXD", "XXE", "XXF", "XXG", "FRT", // 100
    "BAK", "OTH", "3ES", "EZA", "5EZ", "6EZ", "INT", "CNC", "GLO", "TDX", // 110
    "NDX", "DAG", "PS3", "2BA", "LBA", "JUB", "ENO", "1MQ", "2MQ", "3MQ", // 120
    "REP", "4BA", "LAO",
];

/// Old Testament books: GEN..=MAL
pub const OT_BOOKS: std::ops::RangeInclusive<usize> = 1..=39;
/// New Testament books: MAT..=REV
pub const NT_BOOKS: std::ops::RangeInclusive<usize> = 40..=66;

lazy_static! {
    /// Reverse lookup of [ALL_BOOK_IDS].
    static ref BOOK_NUMBERS: HashMap<&'static str, usize> = ALL_BOOK_IDS
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i + 1))
        .collect();
}

/// Get the book id of a 1-based book number.
///
/// Every entry of [ALL_BOOK_IDS] is reachable, `LAO` included.
pub fn book_number_to_id(number: usize) -> Result<&'static str, Error> {
    if number < 1 || number > ALL_BOOK_IDS.len() {
        return Err(Error::InvalidBookNumber(number));
    }
    Ok(ALL_BOOK_IDS[number - 1])
}

/// Get the 1-based book number of a book id (case insensitive).
pub fn book_id_to_number(id: &str) -> Result<usize, Error> {
    BOOK_NUMBERS
        .get(id.to_uppercase().as_str())
        .copied()
        .ok_or_else(|| Error::InvalidBookId(id.to_string()))
}

/// Parse a book selection into a set of book numbers.
///
/// Each comma-separated item is either `OT`, `NT` or a book id.
/// An empty selection yields an empty set.
pub fn get_books<S: AsRef<str>>(books: &[S]) -> Result<BTreeSet<usize>, Error> {
    let mut book_set = BTreeSet::new();
    for item in books {
        for book_id in item.as_ref().split(',') {
            let book_id = book_id.trim().to_uppercase();
            match book_id.as_str() {
                "" => continue,
                "NT" => book_set.extend(NT_BOOKS),
                "OT" => book_set.extend(OT_BOOKS),
                id => {
                    book_set.insert(book_id_to_number(id)?);
                }
            }
        }
    }
    Ok(book_set)
}
