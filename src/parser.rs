//! Query parser: normalized citation strings to quadruple ranges.
//!
//! Grammar, after [`filter_query`](crate::normalize::filter_query):
//!
//! ```text
//! query    = clause (";" clause)*
//! clause   = book | book "-" book | book "+" numbers | numbers
//! numbers  = part ("," part)*
//! part     = c "." v "-" c "." v      (depth 2)
//!          | c "." v ["-" v]          (depth 2)
//!          | n ["-" n]
//! ```
//!
//! A bare `numbers` clause continues the book of the previous clause. Once a chapter is
//! given with a `.`, following bare numbers are verses in that chapter, so in
//! `big+2-3,5,7.4-9,12` the final `12` is verse 12 of chapter 7; `2-3` and `5` are
//! whole chapters.

use crate::catalog::{BookCatalog, BookId, Depth};
use crate::error::{ParseFailure, ReferenceError, Result};
use crate::index::{Quadruple, MAX_FIELD, MIN_FIELD};
use crate::normalize::is_range_number_string;
use crate::range_set::{QuadrupleRange, RangeSet};

/// State carried from one clause to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClauseState {
    pub current_book: Option<BookId>,
}

/// State carried from one comma-separated part to the next, within one clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartState {
    pub current_chapter: Option<u16>,
    pub verse_explicit: bool,
}

pub struct QueryParser<'a, C: BookCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: BookCatalog + ?Sized> QueryParser<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        QueryParser { catalog }
    }

    /// Parse a normalized query, failing on the first error.
    ///
    /// e.g. with Matthew as book #1, `matt+5.6-7,9-10` gives
    /// `[[1,1,5,6]-[1,1,5,7], [1,1,5,9]-[1,1,5,10]]`.
    pub fn parse(&self, query: &str) -> Result<Vec<QuadrupleRange>> {
        let mut state = ClauseState::default();
        let mut quadruple_ranges = Vec::new();

        let clauses = query
            .split(';')
            .filter(|c| !c.trim_matches(|ch: char| ch == '+' || ch.is_whitespace()).is_empty());

        for clause in clauses {
            let (ranges, next_state) = self.parse_clause(clause, state)?;
            quadruple_ranges.extend(ranges);
            state = next_state;
        }

        if state.current_book.is_none() {
            return Err(ReferenceError::parse(query, ParseFailure::MissingBook));
        }

        Ok(quadruple_ranges)
    }

    /// Parse a normalized query, returning `None` instead of an error.
    pub fn parse_lenient(&self, query: &str) -> Option<Vec<QuadrupleRange>> {
        self.parse(query).ok()
    }

    /// Parse straight into a merged [`RangeSet`].
    pub fn parse_reference(&self, query: &str) -> Result<RangeSet> {
        RangeSet::from_quadruple_ranges(&self.parse(query)?)
    }

    pub fn parse_reference_lenient(&self, query: &str) -> Option<RangeSet> {
        self.parse_reference(query).ok()
    }

    pub fn parse_clause(&self, clause: &str, state: ClauseState) -> Result<(Vec<QuadrupleRange>, ClauseState)> {
        let parts: Vec<&str> = clause.split('+').collect();

        match parts.as_slice() {
            [numbers] if is_range_number_string(numbers) => {
                // RangeNumbers, continuing the last book
                let book = state
                    .current_book
                    .ok_or_else(|| ReferenceError::parse(*numbers, ParseFailure::MissingBook))?;
                let ranges = self.range_numbers(book, numbers)?;
                Ok((ranges, state))
            }
            [names] => {
                // BookName or BookName-BookName
                let (first, last) = match names.split('-').collect::<Vec<_>>().as_slice() {
                    [name] => {
                        let b = self.match_book_name(name)?;
                        (b, b)
                    }
                    [name1, name2] => (self.match_book_name(name1)?, self.match_book_name(name2)?),
                    _ => return Err(ReferenceError::parse(*names, ParseFailure::Grammar)),
                };
                if first > last {
                    return Err(ReferenceError::parse(*names, ParseFailure::Reversed));
                }
                let range = (Quadruple::book_start(first), Quadruple::book_end(last));
                Ok((vec![range], ClauseState { current_book: Some(first) }))
            }
            [name, numbers] => {
                let book = self.match_book_name(name)?;
                let ranges = self.range_numbers(book, numbers)?;
                Ok((ranges, ClauseState { current_book: Some(book) }))
            }
            _ => Err(ReferenceError::parse(clause, ParseFailure::Grammar)),
        }
    }

    /// Quadruple ranges for a range-number string within one book.
    pub fn range_numbers(&self, book: BookId, numbers: &str) -> Result<Vec<QuadrupleRange>> {
        if !is_range_number_string(numbers) {
            return Err(ReferenceError::parse(numbers, ParseFailure::MalformedRangeNumbers));
        }
        let depth = self.catalog.depth(book)?;

        let mut state = PartState::default();
        let mut quadruple_ranges = Vec::new();
        for part in numbers.split(',') {
            let (range, next_state) = parse_part(book, depth, part, state)?;
            quadruple_ranges.push(range);
            state = next_state;
        }
        Ok(quadruple_ranges)
    }

    fn match_book_name(&self, name: &str) -> Result<BookId> {
        self.catalog
            .resolve(name)
            .map_err(|_| ReferenceError::parse(name, ParseFailure::UnknownBook))
    }
}

/// One comma-separated part of a range-number string.
pub fn parse_part(book: BookId, depth: Depth, part: &str, state: PartState) -> Result<(QuadrupleRange, PartState)> {
    let at = |c: u16, v: u16| Quadruple::new(book, 1, c, v);
    let depth_mismatch = || ReferenceError::parse(part, ParseFailure::DepthMismatch(depth.as_u8()));

    match part.matches('.').count() {
        2 => {
            // c.v-c.v
            if depth != Depth::ChapterVerse {
                return Err(depth_mismatch());
            }
            let (cv1, cv2) = split_pair(part)?;
            let (c1, v1) = chapter_and_verse(cv1, part)?;
            let (c2, v2) = chapter_and_verse(cv2, part)?;
            let range = ordered(at(c1, v1), at(c2, v2), part)?;
            Ok((range, PartState { current_chapter: None, verse_explicit: true }))
        }
        1 => {
            // c.v or c.v-v
            if depth != Depth::ChapterVerse {
                return Err(depth_mismatch());
            }
            let (c, verses) = part
                .split_once('.')
                .ok_or_else(|| ReferenceError::parse(part, ParseFailure::Grammar))?;
            let c = number(c, part)?;
            let (v1, v2) = numbers_or_single(verses, part)?;
            let range = ordered(at(c, v1), at(c, v2), part)?;
            Ok((range, PartState { current_chapter: Some(c), verse_explicit: true }))
        }
        0 => {
            let (n1, n2) = numbers_or_single(part, part)?;
            match (state.current_chapter, state.verse_explicit, depth) {
                (Some(c), true, _) => {
                    // v or v-v within the running chapter
                    let range = ordered(at(c, n1), at(c, n2), part)?;
                    Ok((range, PartState { current_chapter: Some(c), verse_explicit: true }))
                }
                (_, _, Depth::Verse) => {
                    let range = ordered(at(1, n1), at(1, n2), part)?;
                    Ok((range, state))
                }
                (_, _, Depth::ChapterVerse) => {
                    // c or c-c, whole chapters
                    let range = ordered(at(n1, MIN_FIELD), at(n2, MAX_FIELD), part)?;
                    Ok((range, PartState { current_chapter: state.current_chapter, verse_explicit: false }))
                }
            }
        }
        _ => Err(ReferenceError::parse(part, ParseFailure::DelimiterCount)),
    }
}

fn number(token: &str, part: &str) -> Result<u16> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReferenceError::parse(part, ParseFailure::MalformedRangeNumbers));
    }
    // a long run of digits is out of range, not malformed
    let digits = token.trim_start_matches('0');
    if digits.len() > 3 {
        return Err(ReferenceError::parse(part, ParseFailure::OutOfBounds));
    }
    let n: u16 = digits.parse().unwrap_or(0);
    if !(MIN_FIELD..=MAX_FIELD).contains(&n) {
        return Err(ReferenceError::parse(part, ParseFailure::OutOfBounds));
    }
    Ok(n)
}

fn split_pair(part: &str) -> Result<(&str, &str)> {
    match part.split('-').collect::<Vec<_>>().as_slice() {
        [first, second] => Ok((*first, *second)),
        _ => Err(ReferenceError::parse(part, ParseFailure::Grammar)),
    }
}

// "n" or "n-n"
fn numbers_or_single(token: &str, part: &str) -> Result<(u16, u16)> {
    match token.split('-').collect::<Vec<_>>().as_slice() {
        [n] => {
            let n = number(n, part)?;
            Ok((n, n))
        }
        [n1, n2] => Ok((number(n1, part)?, number(n2, part)?)),
        _ => Err(ReferenceError::parse(part, ParseFailure::Grammar)),
    }
}

fn chapter_and_verse(token: &str, part: &str) -> Result<(u16, u16)> {
    match token.split_once('.') {
        Some((c, v)) if !v.contains('.') => Ok((number(c, part)?, number(v, part)?)),
        _ => Err(ReferenceError::parse(part, ParseFailure::Grammar)),
    }
}

fn ordered(start: Quadruple, end: Quadruple, part: &str) -> Result<QuadrupleRange> {
    if start > end {
        return Err(ReferenceError::parse(part, ParseFailure::Reversed));
    }
    Ok((start, end))
}
