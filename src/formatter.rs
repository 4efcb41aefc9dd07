//! Render a [`RangeSet`] as a canonical citation string.
//!
//! Output in the Handle style parses back to the same set, and so does Title output after
//! [`filter_query`](crate::normalize::filter_query).

use crate::catalog::{BookCatalog, BookId, Depth, LabelStyle};
use crate::error::Result;
use crate::index::{Quadruple, MAX_FIELD, MIN_FIELD};
use crate::range_set::{Range, RangeSet};

pub struct Formatter<'a, C: BookCatalog + ?Sized> {
    catalog: &'a C,
    style: LabelStyle,
}

impl<'a, C: BookCatalog + ?Sized> Formatter<'a, C> {
    pub fn new(catalog: &'a C, style: LabelStyle) -> Self {
        Formatter { catalog, style }
    }

    /// Groups are joined with `;`. The book label is written only when it changes, and
    /// after a cross-book range the running book is its first book, as the parser reads it.
    pub fn format(&self, reference: &RangeSet) -> Result<String> {
        let mut current_book: Option<BookId> = None;
        let mut parts = Vec::new();

        for group in reference.group_ranges() {
            let (text, book) = match group {
                [range] => self.format_range(range, current_book)?,
                _ => self.format_group(group, current_book)?,
            };
            parts.push(text);
            current_book = Some(book);
        }

        Ok(parts.join(";"))
    }

    // Returns the text and the book that is current afterwards.
    fn format_range(&self, range: &Range, current_book: Option<BookId>) -> Result<(String, BookId)> {
        let (start, end) = range.quadruples();

        if start.book != end.book {
            return Ok((self.format_cross_book(&start, &end)?, start.book));
        }

        let book = start.book;
        let mut text = String::new();
        if current_book != Some(book) {
            text.push_str(self.catalog.label(book, self.style)?);
            if range.is_whole_book() {
                return Ok((text, book));
            }
            text.push_str(self.style.spacer());
        } else if range.is_whole_book() {
            return Ok((text, book));
        }

        let delimiter = self.style.delimiter();
        let numbers = match self.catalog.depth(book)? {
            Depth::Verse => verse_span(start.verse, end.verse),
            Depth::ChapterVerse if start.chapter == end.chapter => {
                if start.verse == end.verse {
                    format!("{}{}{}", start.chapter, delimiter, start.verse)
                } else if is_whole_chapter_span(&start, &end) {
                    start.chapter.to_string()
                } else {
                    format!("{}{}{}-{}", start.chapter, delimiter, start.verse, end.verse)
                }
            }
            Depth::ChapterVerse => {
                if is_whole_chapter_span(&start, &end) {
                    format!("{}-{}", start.chapter, end.chapter)
                } else {
                    format!(
                        "{}{}{}-{}{}{}",
                        start.chapter, delimiter, start.verse, end.chapter, delimiter, end.verse
                    )
                }
            }
        };
        text.push_str(&numbers);

        Ok((text, book))
    }

    fn format_cross_book(&self, start: &Quadruple, end: &Quadruple) -> Result<String> {
        let spacer = self.style.spacer();
        let first = self.catalog.label(start.book, self.style)?;
        let last = self.catalog.label(end.book, self.style)?;

        if is_whole_chapter_span(start, end) {
            // a verse-only book has no chapter number to show
            let first = if start.chapter == MIN_FIELD || self.catalog.depth(start.book)? == Depth::Verse {
                first.to_string()
            } else {
                format!("{}{}{}", first, spacer, start.chapter)
            };
            let last = if end.chapter == MAX_FIELD || self.catalog.depth(end.book)? == Depth::Verse {
                last.to_string()
            } else {
                format!("{}{}{}", last, spacer, end.chapter)
            };
            return Ok(format!("{}-{}", first, last));
        }

        Ok(format!(
            "{}{}{}-{}{}{}",
            first,
            spacer,
            self.position(start)?,
            last,
            spacer,
            self.position(end)?
        ))
    }

    // A run of single-chapter ranges in one chapter: "c.v1,v2-v3"
    fn format_group(&self, group: &[Range], current_book: Option<BookId>) -> Result<(String, BookId)> {
        let first = group[0].start_quadruple();
        let book = first.book;

        let mut text = String::new();
        if current_book != Some(book) {
            text.push_str(self.catalog.label(book, self.style)?);
            text.push_str(self.style.spacer());
        }
        if self.catalog.depth(book)? == Depth::ChapterVerse {
            text.push_str(&first.chapter.to_string());
            text.push_str(self.style.delimiter());
        }

        let verses: Vec<String> = group
            .iter()
            .map(|range| verse_span(range.start_quadruple().verse, range.end_quadruple().verse))
            .collect();
        text.push_str(&verses.join(","));

        Ok((text, book))
    }

    fn position(&self, q: &Quadruple) -> Result<String> {
        Ok(match self.catalog.depth(q.book)? {
            Depth::Verse => q.verse.to_string(),
            Depth::ChapterVerse => format!("{}{}{}", q.chapter, self.style.delimiter(), q.verse),
        })
    }
}

fn is_whole_chapter_span(start: &Quadruple, end: &Quadruple) -> bool {
    start.verse == MIN_FIELD && end.verse == MAX_FIELD
}

fn verse_span(first: u16, last: u16) -> String {
    if first == last {
        first.to_string()
    } else {
        format!("{}-{}", first, last)
    }
}

pub fn format_reference<C: BookCatalog + ?Sized>(catalog: &C, reference: &RangeSet, style: LabelStyle) -> Result<String> {
    Formatter::new(catalog, style).format(reference)
}

/// e.g. `big+2.5`
pub fn handle<C: BookCatalog + ?Sized>(catalog: &C, reference: &RangeSet) -> Result<String> {
    format_reference(catalog, reference, LabelStyle::Handle)
}

/// e.g. `Big Book 2:5`
pub fn title<C: BookCatalog + ?Sized>(catalog: &C, reference: &RangeSet) -> Result<String> {
    format_reference(catalog, reference, LabelStyle::Title)
}

/// e.g. `Big 2:5`
pub fn short_title<C: BookCatalog + ?Sized>(catalog: &C, reference: &RangeSet) -> Result<String> {
    format_reference(catalog, reference, LabelStyle::ShortTitle)
}
