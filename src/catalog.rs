//! Book metadata consulted by the parser and formatter.
//!
//! The [`BookCatalog`] trait is the whole contract the citation engine needs. [`Library`]
//! is an in-memory implementation built from descriptors that have already been loaded
//! from wherever a corpus keeps them.

use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};
use crate::logger::info;
use crate::normalize::filter_query;

pub type BookId = u16;

/// Addressing granularity of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Depth {
    /// Verse numbers only, e.g. a one-chapter letter: `3jn+4`
    Verse = 1,
    /// Chapter and verse: `jn+3.16`
    ChapterVerse = 2,
}

impl Depth {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Depth {
    type Error = ReferenceError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Depth::Verse),
            2 => Ok(Depth::ChapterVerse),
            _ => Err(ReferenceError::Catalog(format!("unsupported reference depth {}", value))),
        }
    }
}

impl From<Depth> for u8 {
    fn from(depth: Depth) -> Self {
        depth.as_u8()
    }
}

/// Which book label a formatted reference uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelStyle {
    /// `1cor+7.4`
    #[serde(rename = "handle")]
    Handle,
    /// `1 Corinthians 7:4`
    #[serde(rename = "title")]
    Title,
    /// `1 Cor 7:4`
    #[serde(rename = "short_title")]
    ShortTitle,
}

impl LabelStyle {
    /// Separator between the book label and the numbers.
    pub fn spacer(self) -> &'static str {
        match self {
            LabelStyle::Handle => "+",
            LabelStyle::Title | LabelStyle::ShortTitle => " ",
        }
    }

    /// Separator between chapter and verse.
    pub fn delimiter(self) -> &'static str {
        match self {
            LabelStyle::Handle => ".",
            LabelStyle::Title | LabelStyle::ShortTitle => ":",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDescriptor {
    pub id: BookId,
    /// Name of the library (corpus) the book belongs to, e.g. "nt".
    pub library: String,
    pub name: String,
    pub short_name: String,
    pub abbreviation: String,
    pub depth: Depth,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub chapters: u16,
}

/// Read-only book registry used by the query parser and formatter.
///
/// Names are matched exactly; callers normalize them first.
pub trait BookCatalog {
    fn resolve(&self, name: &str) -> Result<BookId>;

    fn depth(&self, id: BookId) -> Result<Depth>;

    fn chapter_count(&self, id: BookId) -> Result<u16>;

    fn label(&self, id: BookId, style: LabelStyle) -> Result<&str>;
}

/// An in-memory catalog of one or more libraries.
#[derive(Debug, Clone, Default)]
pub struct Library {
    books: BTreeMap<BookId, BookDescriptor>,
    by_abbreviation: HashMap<String, BookId>,
    by_alias: HashMap<String, BookId>,
    aliases: HashMap<BookId, Vec<String>>,
    libraries: BTreeMap<String, Vec<BookId>>,
}

impl Library {
    pub fn new(books: impl IntoIterator<Item = BookDescriptor>) -> Result<Self> {
        let mut library = Library::default();
        for book in books {
            library.add_book(book)?;
        }
        info(&format!(
            "Loaded {} books in {} libraries",
            library.books.len(),
            library.libraries.len()
        ));
        Ok(library)
    }

    /// Build from a JSON array of book descriptors.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let books: Vec<BookDescriptor> =
            serde_json::from_str(json).context("Failed to parse book descriptors")?;
        let library = Library::new(books).context("Failed to build library")?;
        Ok(library)
    }

    fn add_book(&mut self, book: BookDescriptor) -> Result<()> {
        let id = book.id;
        if id == 0 || id > 999 {
            return Err(ReferenceError::Catalog(format!("book id {} is outside 1-999", id)));
        }
        if self.books.contains_key(&id) {
            return Err(ReferenceError::Catalog(format!("book id #{} is used twice", id)));
        }
        if let Some(old_id) = self.by_abbreviation.get(&book.abbreviation) {
            return Err(ReferenceError::Catalog(format!(
                "abbreviation '{}' is already set for #{}",
                book.abbreviation, old_id
            )));
        }
        self.by_abbreviation.insert(book.abbreviation.clone(), id);

        let joined_name = book.name.to_lowercase().replace(' ', "");
        self.add_alias(&joined_name, id, true)?;
        self.add_alias(&filter_query(&book.name), id, false)?;
        self.add_alias(&filter_query(&book.short_name), id, false)?;

        for alias in &book.aliases {
            let alias = alias.trim();
            if alias.is_empty() {
                continue;
            }
            let filtered = filter_query(alias);
            if filtered != alias {
                return Err(ReferenceError::Catalog(format!(
                    "bad alias name '{}' (try '{}')",
                    alias, filtered
                )));
            }
            self.add_alias(alias, id, true)?;
        }

        self.libraries.entry(book.library.clone()).or_default().push(id);
        self.books.insert(id, book);
        Ok(())
    }

    // A strict alias may not already point at another book.
    fn add_alias(&mut self, alias: &str, id: BookId, strict: bool) -> Result<()> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(());
        }
        match self.by_alias.get(alias) {
            Some(&old_id) if old_id == id => Ok(()),
            Some(&old_id) if strict => Err(ReferenceError::Catalog(format!(
                "alias '{}' is already set for #{}",
                alias, old_id
            ))),
            Some(_) => Ok(()),
            None => {
                self.by_alias.insert(alias.to_string(), id);
                self.aliases.entry(id).or_default().push(alias.to_string());
                Ok(())
            }
        }
    }

    pub fn book(&self, id: BookId) -> Result<&BookDescriptor> {
        self.books.get(&id).ok_or_else(|| ReferenceError::book_not_found(id))
    }

    pub fn books(&self) -> impl Iterator<Item = &BookDescriptor> {
        self.books.values()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn library_of(&self, id: BookId) -> Result<&str> {
        Ok(self.book(id)?.library.as_str())
    }

    /// Book ids of a library, in load order.
    pub fn library_books(&self, name: &str) -> Result<&[BookId]> {
        self.libraries
            .get(name.trim())
            .map(Vec::as_slice)
            .ok_or_else(|| ReferenceError::Lookup(format!("no library named '{}'", name)))
    }

    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    /// Every lookup name registered for a book, besides its abbreviation.
    pub fn aliases(&self, id: BookId) -> Result<&[String]> {
        self.book(id)?;
        Ok(self.aliases.get(&id).map(Vec::as_slice).unwrap_or(&[]))
    }
}

impl BookCatalog for Library {
    fn resolve(&self, name: &str) -> Result<BookId> {
        let name = name.trim();
        self.by_abbreviation
            .get(name)
            .or_else(|| self.by_alias.get(name))
            .copied()
            .ok_or_else(|| ReferenceError::Lookup(format!("book ID not found for '{}'", name)))
    }

    fn depth(&self, id: BookId) -> Result<Depth> {
        Ok(self.book(id)?.depth)
    }

    fn chapter_count(&self, id: BookId) -> Result<u16> {
        Ok(self.book(id)?.chapters)
    }

    fn label(&self, id: BookId, style: LabelStyle) -> Result<&str> {
        let book = self.book(id)?;
        Ok(match style {
            LabelStyle::Handle => &book.abbreviation,
            LabelStyle::Title => &book.name,
            LabelStyle::ShortTitle => &book.short_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: BookId, name: &str, short: &str, abbrev: &str, depth: Depth, aliases: &[&str], chapters: u16) -> BookDescriptor {
        BookDescriptor {
            id,
            library: "LIB".to_string(),
            name: name.to_string(),
            short_name: short.to_string(),
            abbreviation: abbrev.to_string(),
            depth,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            chapters,
        }
    }

    fn library() -> Library {
        Library::new([
            descriptor(1, "Big Book", "Big", "big", Depth::ChapterVerse, &["bg", "bbk", "bb"], 21),
            descriptor(2, "Small Book", "Small", "small", Depth::Verse, &["sm"], 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_initialisation() {
        let lib = library();

        assert_eq!(lib.resolve("big").unwrap(), 1);
        assert_eq!(lib.resolve("bg").unwrap(), 1);
        assert_eq!(lib.resolve("bbk").unwrap(), 1);
        assert_eq!(lib.resolve("bb").unwrap(), 1);
        assert_eq!(lib.resolve("bigbook").unwrap(), 1);
        assert_eq!(lib.resolve("big_book").unwrap(), 1);
        assert_eq!(lib.resolve("small").unwrap(), 2);
        assert_eq!(lib.resolve("sm").unwrap(), 2);
        assert!(matches!(lib.resolve("huge"), Err(ReferenceError::Lookup(_))));

        assert_eq!(lib.label(1, LabelStyle::Title).unwrap(), "Big Book");
        assert_eq!(lib.label(1, LabelStyle::ShortTitle).unwrap(), "Big");
        assert_eq!(lib.label(2, LabelStyle::Handle).unwrap(), "small");

        assert_eq!(lib.library_of(1).unwrap(), "LIB");
        assert_eq!(lib.library_books("LIB").unwrap(), &[1, 2]);
        assert_eq!(lib.depth(1).unwrap(), Depth::ChapterVerse);
        assert_eq!(lib.depth(2).unwrap(), Depth::Verse);
        assert_eq!(lib.chapter_count(1).unwrap(), 21);
        assert_eq!(lib.chapter_count(2).unwrap(), 1);
        assert!(lib.depth(3).is_err());
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let result = Library::new([
            descriptor(1, "Big Book", "Big", "big", Depth::ChapterVerse, &["bb"], 21),
            descriptor(2, "Small Book", "Small", "small", Depth::Verse, &["bb"], 1),
        ]);
        assert!(matches!(result, Err(ReferenceError::Catalog(_))));
    }

    #[test]
    fn test_unfiltered_alias_is_rejected() {
        let result = Library::new([descriptor(
            1, "Big Book", "Big", "big", Depth::ChapterVerse, &["Big Book"], 21,
        )]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("big_book"), "{}", err);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"id": 1, "library": "nt", "name": "Matthew", "short_name": "Matt",
             "abbreviation": "matt", "depth": 2, "aliases": ["mt"], "chapters": 28},
            {"id": 25, "library": "nt", "name": "3 John", "short_name": "3 Jn",
             "abbreviation": "3jn", "depth": 1, "chapters": 1}
        ]"#;
        let lib = Library::from_json_str(json).unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.resolve("mt").unwrap(), 1);
        assert_eq!(lib.resolve("3john").unwrap(), 25);
        assert_eq!(lib.resolve("3jn").unwrap(), 25);
        assert_eq!(lib.depth(25).unwrap(), Depth::Verse);

        assert!(Library::from_json_str(r#"[{"id": 1}]"#).is_err());
        let bad_depth = json.replace("\"depth\": 2", "\"depth\": 3");
        assert!(Library::from_json_str(&bad_depth).is_err());
    }
}
