//! A DB-friendly list of verse ranges.
//!
//! Matthew 19:1-6,10-14 with Matthew as book #1 is stored as
//!
//! ```text
//! [ (1_001_019_001, 1_001_019_006),
//!   (1_001_019_010, 1_001_019_014) ]
//! ```
//!
//! Whole blocks end at 999, so `Matt 19` is `(1_001_019_001, 1_001_019_999)` and
//! the whole of Matthew is `(1_001_001_001, 1_999_999_999)`. Ranges are kept sorted,
//! and overlapping or adjacent ranges are merged after every change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};
use crate::index::{self, Index, Quadruple, MAX_FIELD, MAX_INDEX, MIN_INDEX};

/// A pair of quadruples, as produced by the query parser.
pub type QuadrupleRange = (Quadruple, Quadruple);

/// An inclusive `(start, end)` pair of valid indexes with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(Index, Index)", into = "(Index, Index)")]
pub struct Range {
    start: Index,
    end: Index,
}

impl Range {
    pub fn new(start: Index, end: Index) -> Result<Self> {
        for endpoint in [start, end] {
            if !(MIN_INDEX..=MAX_INDEX).contains(&endpoint) || !index::is_valid_index(endpoint) {
                return Err(ReferenceError::InvalidRange(format!(
                    "[{}, {}]: {} is not an index",
                    start, end, endpoint
                )));
            }
        }
        if start > end {
            return Err(ReferenceError::InvalidRange(format!(
                "[{}, {}]: start is after end",
                start, end
            )));
        }
        Ok(Range { start, end })
    }

    /// Build a range from two addresses, reporting which level is out of order.
    pub fn from_quadruples(start: &Quadruple, end: &Quadruple) -> Result<Self> {
        start.validate()?;
        end.validate()?;

        let levels = [
            ("book", start.book, end.book),
            ("section", start.section, end.section),
            ("chapter", start.chapter, end.chapter),
            ("verse", start.verse, end.verse),
        ];
        for (level, first, second) in levels {
            if first > second {
                return Err(ReferenceError::InvalidRange(format!(
                    "Bad {} range: {} > {}",
                    level, first, second
                )));
            }
            if first < second {
                break;
            }
        }

        Range::new(index::compose(start), index::compose(end))
    }

    pub fn start(&self) -> Index {
        self.start
    }

    pub fn end(&self) -> Index {
        self.end
    }

    pub fn start_quadruple(&self) -> Quadruple {
        index::split(self.start)
    }

    pub fn end_quadruple(&self) -> Quadruple {
        index::split(self.end)
    }

    pub fn quadruples(&self) -> QuadrupleRange {
        (self.start_quadruple(), self.end_quadruple())
    }

    /// Starts and ends in the same book and chapter.
    pub fn is_single_chapter(&self) -> bool {
        let (start, end) = self.quadruples();
        start.same_chapter(&end)
    }

    /// Covers a whole book, from its first verse to its last addressable position.
    pub fn is_whole_book(&self) -> bool {
        let (start, end) = self.quadruples();
        start.book == end.book
            && start == Quadruple::book_start(start.book)
            && end == Quadruple::book_end(end.book)
    }

    fn overlaps_or_touches(&self, next: &Range) -> bool {
        self.end >= next.start || self.end_quadruple().is_followed_by(&next.start_quadruple())
    }
}

impl TryFrom<(Index, Index)> for Range {
    type Error = ReferenceError;

    fn try_from((start, end): (Index, Index)) -> Result<Self> {
        Range::new(start, end)
    }
}

impl From<Range> for (Index, Index) {
    fn from(range: Range) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// A sorted, merged set of ranges: the stored form of a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Range>", into = "Vec<Range>")]
pub struct RangeSet {
    ranges: Vec<Range>,
}

impl RangeSet {
    pub fn new() -> Self {
        RangeSet::default()
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = Range>) -> Self {
        let mut set = RangeSet::new();
        set.add_ranges(ranges);
        set
    }

    pub fn from_index_pairs(pairs: &[(Index, Index)]) -> Result<Self> {
        let ranges = pairs
            .iter()
            .map(|&(start, end)| Range::new(start, end))
            .collect::<Result<Vec<_>>>()?;
        Ok(RangeSet::from_ranges(ranges))
    }

    pub fn from_quadruple_ranges(quadruple_ranges: &[QuadrupleRange]) -> Result<Self> {
        let ranges = quadruple_ranges
            .iter()
            .map(|(start, end)| Range::from_quadruples(start, end))
            .collect::<Result<Vec<_>>>()?;
        Ok(RangeSet::from_ranges(ranges))
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn quadruple_ranges(&self) -> Vec<QuadrupleRange> {
        self.ranges.iter().map(Range::quadruples).collect()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn first_quadruple(&self) -> Option<Quadruple> {
        self.ranges.first().map(Range::start_quadruple)
    }

    /// Add ranges, then re-sort and merge.
    pub fn add_ranges(&mut self, ranges: impl IntoIterator<Item = Range>) {
        self.ranges.extend(ranges);
        self.ranges.sort();
        self.simplify();
    }

    pub fn add_range(&mut self, range: Range) {
        self.add_ranges([range]);
    }

    /// Replace all ranges.
    pub fn set_ranges(&mut self, ranges: impl IntoIterator<Item = Range>) {
        self.ranges.clear();
        self.add_ranges(ranges);
    }

    /// A new set holding this set's ranges plus `ranges`; `self` is untouched.
    pub fn with_ranges(&self, ranges: impl IntoIterator<Item = Range>) -> Self {
        let mut set = self.clone();
        set.add_ranges(ranges);
        set
    }

    pub fn add_range_by_quadruples(&mut self, start: &Quadruple, end: &Quadruple) -> Result<()> {
        let range = Range::from_quadruples(start, end)?;
        self.add_range(range);
        Ok(())
    }

    pub fn add_book(&mut self, book: u16) -> Result<()> {
        self.add_range_by_quadruples(&Quadruple::book_start(book), &Quadruple::book_end(book))
    }

    pub fn add_book_and_chapter(&mut self, book: u16, chapter: u16) -> Result<()> {
        self.add_range_by_quadruples(
            &Quadruple::new(book, 1, chapter, 1),
            &Quadruple::new(book, 1, chapter, MAX_FIELD),
        )
    }

    pub fn add_book_chapter_and_verse(&mut self, book: u16, chapter: u16, verse: u16) -> Result<()> {
        let q = Quadruple::new(book, 1, chapter, verse);
        self.add_range_by_quadruples(&q, &q)
    }

    pub fn add_book_chapter_and_verse_range(
        &mut self,
        book: u16,
        chapter: u16,
        first_verse: u16,
        last_verse: u16,
    ) -> Result<()> {
        self.add_range_by_quadruples(
            &Quadruple::new(book, 1, chapter, first_verse),
            &Quadruple::new(book, 1, chapter, last_verse),
        )
    }

    pub fn add_multi_chapter_range(
        &mut self,
        book: u16,
        first_chapter: u16,
        first_verse: u16,
        last_chapter: u16,
        last_verse: u16,
    ) -> Result<()> {
        self.add_range_by_quadruples(
            &Quadruple::new(book, 1, first_chapter, first_verse),
            &Quadruple::new(book, 1, last_chapter, last_verse),
        )
    }

    /// `self` contains `other` if merging `other` into `self` changes nothing.
    pub fn contains(&self, other: &RangeSet) -> bool {
        self.with_ranges(other.ranges.iter().copied()) == *self
    }

    /// Split into formatting groups.
    ///
    /// A group is either a run of single-chapter ranges in the same book and chapter,
    /// or any one range of a different kind. A range that spans chapters or books
    /// never takes a successor into its group.
    pub fn group_ranges(&self) -> Vec<&[Range]> {
        let mut groups = Vec::new();
        let mut group_start = 0;

        for i in 1..self.ranges.len() {
            let last = &self.ranges[i - 1];
            let range = &self.ranges[i];

            let same_chapter = last.end_quadruple().same_chapter(&range.start_quadruple());

            if !(same_chapter && last.is_single_chapter() && range.is_single_chapter()) {
                groups.push(&self.ranges[group_start..i]);
                group_start = i;
            }
        }

        if !self.ranges.is_empty() {
            groups.push(&self.ranges[group_start..]);
        }
        groups
    }

    /// A WHERE clause selecting rows whose `column` index falls inside this set.
    pub fn sql_clause(&self, column: &str) -> String {
        self.join_clauses(|r| format!("{} BETWEEN {} AND {}", column, r.start, r.end))
    }

    /// A WHERE clause selecting rows whose own `[begin_column, end_column]` range lies
    /// inside one of this set's ranges.
    pub fn sql_range_clause(&self, begin_column: &str, end_column: &str) -> String {
        self.join_clauses(|r| {
            format!("{} >= {} AND {} <= {}", begin_column, r.start, end_column, r.end)
        })
    }

    fn join_clauses(&self, clause: impl Fn(&Range) -> String) -> String {
        if self.ranges.is_empty() {
            return "(1 = 0)".to_string();
        }
        let clauses: Vec<String> = self.ranges.iter().map(clause).collect();
        format!("({})", clauses.join(") OR ("))
    }

    // Like uniq, this expects sorted input.
    fn simplify(&mut self) {
        let mut merged: Vec<Range> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            if let Some(current) = merged.last_mut()
                && current.overlaps_or_touches(&range)
            {
                current.end = current.end.max(range.end);
                continue;
            }
            merged.push(range);
        }
        self.ranges = merged;
    }
}

impl From<Vec<Range>> for RangeSet {
    fn from(ranges: Vec<Range>) -> Self {
        RangeSet::from_ranges(ranges)
    }
}

impl From<RangeSet> for Vec<Range> {
    fn from(set: RangeSet) -> Self {
        set.ranges
    }
}

impl FromIterator<Range> for RangeSet {
    fn from_iter<T: IntoIterator<Item = Range>>(iter: T) -> Self {
        RangeSet::from_ranges(iter)
    }
}
