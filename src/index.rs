//! Index numbers for book/section/chapter/verse addresses.
//!
//! An index is the decimal concatenation of the book number (1-3 digits, unpadded)
//! and the section, chapter and verse numbers (3 digits each, zero padded):
//!
//! ```text
//! (1, 1, 19, 6)    -> 1_001_019_006
//! (66, 1, 22, 21)  -> 66_001_022_021
//! (999, 999, 999, 999) -> 999_999_999_999
//! ```
//!
//! Numeric order of indexes is the reading order of the addresses they encode, so
//! a range of verses can be stored as two integers and queried with `BETWEEN`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};

pub type Index = u64;

pub const MIN_FIELD: u16 = 1;
pub const MAX_FIELD: u16 = 999;

pub const MIN_INDEX: Index = 1_001_001_001;
pub const MAX_INDEX: Index = 999_999_999_999;

const BOOK_FACTOR: Index = 1_000_000_000;
const SECTION_FACTOR: Index = 1_000_000;
const CHAPTER_FACTOR: Index = 1_000;

/// A `(book, section, chapter, verse)` address.
///
/// Sections are reserved for multi-part works; ordinary references always use
/// section 1, and a whole-book span ends at section 999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quadruple {
    pub book: u16,
    pub section: u16,
    pub chapter: u16,
    pub verse: u16,
}

impl Quadruple {
    pub const fn new(book: u16, section: u16, chapter: u16, verse: u16) -> Self {
        Quadruple { book, section, chapter, verse }
    }

    /// First verse of a book.
    pub const fn book_start(book: u16) -> Self {
        Quadruple::new(book, 1, 1, 1)
    }

    /// Last addressable position of a book.
    pub const fn book_end(book: u16) -> Self {
        Quadruple::new(book, MAX_FIELD, MAX_FIELD, MAX_FIELD)
    }

    /// Build from a slice of exactly four numbers, each 1-999.
    pub fn from_slice(values: &[i64]) -> Result<Self> {
        if values.len() != 4 {
            return Err(ReferenceError::InvalidQuadruple(format!(
                "expected 4 fields, got {}: {:?}",
                values.len(),
                values
            )));
        }

        let mut fields = [0u16; 4];
        for (field, value) in fields.iter_mut().zip(values) {
            if *value < MIN_FIELD as i64 || *value > MAX_FIELD as i64 {
                return Err(ReferenceError::InvalidQuadruple(format!("{:?}", values)));
            }
            *field = *value as u16;
        }

        Ok(Quadruple::new(fields[0], fields[1], fields[2], fields[3]))
    }

    pub fn fields(&self) -> [u16; 4] {
        [self.book, self.section, self.chapter, self.verse]
    }

    pub fn is_valid(&self) -> bool {
        self.fields()
            .iter()
            .all(|f| (MIN_FIELD..=MAX_FIELD).contains(f))
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ReferenceError::InvalidQuadruple(self.to_string()))
        }
    }

    pub fn to_index(&self) -> Result<Index> {
        quadruple_to_index(self)
    }

    pub fn from_index(index: Index) -> Result<Self> {
        index_to_quadruple(index)
    }

    /// Structural adjacency: the next verse in the same chapter, or verse 1 of the
    /// next chapter after verse 999. Real verse counts are not considered.
    pub fn is_followed_by(&self, next: &Quadruple) -> bool {
        if self.book != next.book || self.section != next.section {
            return false;
        }
        let verses_adjacent = self.chapter == next.chapter && self.verse + 1 == next.verse;
        let chapters_adjacent = self.chapter + 1 == next.chapter
            && self.verse == MAX_FIELD
            && next.verse == MIN_FIELD;
        verses_adjacent || chapters_adjacent
    }

    /// Both quadruples lie in the same book, section and chapter.
    pub fn same_chapter(&self, other: &Quadruple) -> bool {
        self.book == other.book && self.section == other.section && self.chapter == other.chapter
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.book, self.section, self.chapter, self.verse)
    }
}

impl TryFrom<[i64; 4]> for Quadruple {
    type Error = ReferenceError;

    fn try_from(values: [i64; 4]) -> Result<Self> {
        Quadruple::from_slice(&values)
    }
}

pub fn quadruple_to_index(q: &Quadruple) -> Result<Index> {
    q.validate()?;
    Ok(compose(q))
}

pub fn index_to_quadruple(index: Index) -> Result<Quadruple> {
    let digits = digit_count(index);
    if !(10..=12).contains(&digits) {
        return Err(ReferenceError::MalformedIndex(format!(
            "{} has {} digits",
            index, digits
        )));
    }
    let q = split(index);
    if !q.is_valid() {
        return Err(ReferenceError::MalformedIndex(format!("{} decodes to {}", index, q)));
    }
    Ok(q)
}

pub fn is_valid_index(index: Index) -> bool {
    index_to_quadruple(index).is_ok()
}

/// Whether `second` directly follows `first`. Both must be valid indexes.
pub fn indexes_are_adjacent(first: Index, second: Index) -> Result<bool> {
    let a = index_to_quadruple(first)?;
    let b = index_to_quadruple(second)?;
    Ok(a.is_followed_by(&b))
}

pub(crate) fn compose(q: &Quadruple) -> Index {
    q.book as Index * BOOK_FACTOR
        + q.section as Index * SECTION_FACTOR
        + q.chapter as Index * CHAPTER_FACTOR
        + q.verse as Index
}

// Arithmetic split only; callers must know the index is well formed.
pub(crate) fn split(index: Index) -> Quadruple {
    let rest = index % BOOK_FACTOR;
    Quadruple {
        book: (index / BOOK_FACTOR) as u16,
        section: (rest / SECTION_FACTOR) as u16,
        chapter: ((rest / CHAPTER_FACTOR) % 1_000) as u16,
        verse: (rest % 1_000) as u16,
    }
}

fn digit_count(mut n: Index) -> u32 {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
