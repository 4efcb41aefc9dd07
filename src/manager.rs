//! The entry point for applications: owns a [`Library`] and [`ReferenceSettings`] and
//! turns queries into references and references into strings, chapters and SQL.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::{BookCatalog, BookId, Depth, LabelStyle, Library};
use crate::error::{ReferenceError, Result};
use crate::formatter::format_reference;
use crate::index::{Index, Quadruple};
use crate::logger::debug;
use crate::normalize;
use crate::parser::QueryParser;
use crate::range_set::{QuadrupleRange, RangeSet};
use crate::settings::ReferenceSettings;

/// Books with at least this many chapters don't set the scale of a tag cloud.
const TAG_CLOUD_CHAPTER_CAP: u16 = 55;

/// One book in a navigation tag cloud, linking to its first chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCloudEntry {
    pub handle: String,
    pub title: String,
    /// 1 to `steps`, by chapter count
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct ReferenceManager {
    library: Library,
    settings: ReferenceSettings,
}

impl ReferenceManager {
    pub fn new(library: Library) -> Self {
        Self::with_settings(library, ReferenceSettings::default())
    }

    pub fn with_settings(library: Library, settings: ReferenceSettings) -> Self {
        ReferenceManager { library, settings }
    }

    /// Build from a JSON array of book descriptors, with default settings.
    pub fn from_json_str(books_json: &str) -> anyhow::Result<Self> {
        let library = Library::from_json_str(books_json).context("Failed to load reference manager")?;
        Ok(Self::new(library))
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn settings(&self) -> &ReferenceSettings {
        &self.settings
    }

    pub fn filter_query(&self, query: &str) -> String {
        normalize::filter_query(query)
    }

    /// Normalize and parse a query typed by a person.
    pub fn query_to_quadruple_ranges(&self, query: &str) -> Result<Vec<QuadrupleRange>> {
        QueryParser::new(&self.library).parse(&self.filter_query(query))
    }

    pub fn query_to_quadruple_ranges_lenient(&self, query: &str) -> Option<Vec<QuadrupleRange>> {
        match self.query_to_quadruple_ranges(query) {
            Ok(ranges) => Some(ranges),
            Err(e) => {
                debug(&format!("Ignoring query '{}': {}", query, e));
                None
            }
        }
    }

    pub fn create_reference_from_query(&self, query: &str) -> Result<RangeSet> {
        RangeSet::from_quadruple_ranges(&self.query_to_quadruple_ranges(query)?)
    }

    pub fn create_reference_from_query_lenient(&self, query: &str) -> Option<RangeSet> {
        match self.create_reference_from_query(query) {
            Ok(reference) => Some(reference),
            Err(e) => {
                debug(&format!("Ignoring query '{}': {}", query, e));
                None
            }
        }
    }

    pub fn create_reference_from_ranges(&self, ranges: &[(Index, Index)]) -> Result<RangeSet> {
        RangeSet::from_index_pairs(ranges)
    }

    pub fn create_reference_from_quadruple_ranges(&self, quadruple_ranges: &[QuadrupleRange]) -> Result<RangeSet> {
        RangeSet::from_quadruple_ranges(quadruple_ranges)
    }

    pub fn create_reference_from_book_and_chapter(&self, book: BookId, chapter: u16) -> Result<RangeSet> {
        self.library.book(book)?;
        let mut reference = RangeSet::new();
        reference.add_book_and_chapter(book, chapter)?;
        Ok(reference)
    }

    pub fn create_reference_from_book_chapter_and_verse(&self, book: BookId, chapter: u16, verse: u16) -> Result<RangeSet> {
        self.library.book(book)?;
        let mut reference = RangeSet::new();
        reference.add_book_chapter_and_verse(book, chapter, verse)?;
        Ok(reference)
    }

    pub fn format(&self, reference: &RangeSet, style: LabelStyle) -> Result<String> {
        format_reference(&self.library, reference, style)
    }

    pub fn handle(&self, reference: &RangeSet) -> Result<String> {
        self.format(reference, LabelStyle::Handle)
    }

    pub fn title(&self, reference: &RangeSet) -> Result<String> {
        self.format(reference, LabelStyle::Title)
    }

    pub fn short_title(&self, reference: &RangeSet) -> Result<String> {
        self.format(reference, LabelStyle::ShortTitle)
    }

    /// The whole chapter holding the start of `reference`.
    ///
    /// A book without chapters is its own single chapter, so this is the whole book.
    pub fn chapter_reference(&self, reference: &RangeSet) -> Result<RangeSet> {
        let (book, chapter) = self.chapter_position(reference)?;
        self.book_chapter(book, chapter)
    }

    /// The chapter before the one holding the start of `reference`.
    ///
    /// From the first chapter of a book this is the last chapter of the previous book in
    /// the same library. From the first book it wraps to the last book, or gives `None`
    /// when navigation does not wrap.
    pub fn previous_chapter_reference(&self, reference: &RangeSet) -> Result<Option<RangeSet>> {
        let (book, chapter) = self.chapter_position(reference)?;
        if chapter > 1 {
            return self.book_chapter(book, chapter - 1).map(Some);
        }

        let books = self.library.library_books(self.library.library_of(book)?)?;
        let pos = books.iter().position(|&b| b == book).unwrap_or(0);
        let previous = match pos.checked_sub(1) {
            Some(p) => books[p],
            None if self.settings.wrap_navigation => books[books.len() - 1],
            None => return Ok(None),
        };

        let last_chapter = self.library.chapter_count(previous)?.max(1);
        self.book_chapter(previous, last_chapter).map(Some)
    }

    /// The chapter after the one holding the start of `reference`, moving on to the next
    /// book of the library after the last chapter.
    pub fn next_chapter_reference(&self, reference: &RangeSet) -> Result<Option<RangeSet>> {
        let (book, chapter) = self.chapter_position(reference)?;
        if chapter < self.library.chapter_count(book)? {
            return self.book_chapter(book, chapter + 1).map(Some);
        }

        let books = self.library.library_books(self.library.library_of(book)?)?;
        let pos = books.iter().position(|&b| b == book).unwrap_or(0);
        let next = match books.get(pos + 1) {
            Some(&b) => b,
            None if self.settings.wrap_navigation => books[0],
            None => return Ok(None),
        };

        self.book_chapter(next, 1).map(Some)
    }

    /// Handles of every chapter in the book holding the start of `reference`, in rows
    /// of `width` (the configured grid width when `None`).
    pub fn chapter_handle_grid(&self, reference: &RangeSet, width: Option<usize>) -> Result<Vec<Vec<String>>> {
        let (book, _) = self.chapter_position(reference)?;
        let width = width.unwrap_or(self.settings.chapter_grid_width).max(1);
        let chapters = self.library.chapter_count(book)?.max(1);

        let handles = (1..=chapters)
            .map(|c| self.handle(&self.book_chapter(book, c)?))
            .collect::<Result<Vec<String>>>()?;

        Ok(handles.chunks(width).map(|row| row.to_vec()).collect())
    }

    /// Per library, an entry for each book in load order, weighted by its chapter count
    /// relative to the longest book under 55 chapters.
    pub fn tag_cloud_for_navigation(&self, steps: u32) -> Result<BTreeMap<String, Vec<TagCloudEntry>>> {
        let steps = steps.max(1);
        let mut tag_cloud = BTreeMap::new();

        for library_name in self.library.library_names() {
            let books = self.library.library_books(library_name)?;

            let mut max_chapters: u32 = 1;
            for &book in books {
                let chapters = self.library.chapter_count(book)?;
                if chapters < TAG_CLOUD_CHAPTER_CAP {
                    max_chapters = max_chapters.max(chapters as u32);
                }
            }

            let mut entries = Vec::with_capacity(books.len());
            for &book in books {
                let chapters = self.library.chapter_count(book)? as u32;
                // ceil(chapters / (max_chapters / steps))
                let weight = (chapters * steps).div_ceil(max_chapters).min(steps);
                entries.push(TagCloudEntry {
                    handle: self.handle(&self.book_chapter(book, 1)?)?,
                    title: self.library.label(book, LabelStyle::ShortTitle)?.to_string(),
                    weight,
                });
            }
            tag_cloud.insert(library_name.to_string(), entries);
        }

        Ok(tag_cloud)
    }

    /// WHERE clause on the configured index column.
    pub fn sql_clause(&self, reference: &RangeSet) -> String {
        reference.sql_clause(&self.settings.index_column)
    }

    /// WHERE clause on the configured range columns.
    pub fn sql_range_clause(&self, reference: &RangeSet) -> String {
        reference.sql_range_clause(&self.settings.range_begins_column, &self.settings.range_ends_column)
    }

    fn chapter_position(&self, reference: &RangeSet) -> Result<(BookId, u16)> {
        let Quadruple { book, chapter, .. } = reference
            .first_quadruple()
            .ok_or_else(|| ReferenceError::InvalidRange("empty reference has no chapter".to_string()))?;
        match self.library.depth(book)? {
            Depth::Verse => Ok((book, 1)),
            Depth::ChapterVerse => Ok((book, chapter)),
        }
    }

    fn book_chapter(&self, book: BookId, chapter: u16) -> Result<RangeSet> {
        let mut reference = RangeSet::new();
        match self.library.depth(book)? {
            Depth::Verse => reference.add_book(book)?,
            Depth::ChapterVerse => reference.add_book_and_chapter(book, chapter)?,
        }
        Ok(reference)
    }
}
