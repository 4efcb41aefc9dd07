use dotenvy::dotenv;

use koinos_reference::{BookDescriptor, BookId, Depth, Library, RangeSet, ReferenceManager, ReferenceSettings};

pub fn test_setup() {
    dotenv().ok();
}

#[allow(dead_code)]
pub fn descriptor(
    id: BookId,
    library: &str,
    name: &str,
    short_name: &str,
    abbreviation: &str,
    depth: Depth,
    aliases: &[&str],
    chapters: u16,
) -> BookDescriptor {
    BookDescriptor {
        id,
        library: library.to_string(),
        name: name.to_string(),
        short_name: short_name.to_string(),
        abbreviation: abbreviation.to_string(),
        depth,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        chapters,
    }
}

/// Two books in one library: "Big Book" with chapters, "Small Book" with verses only.
#[allow(dead_code)]
pub fn big_small_library() -> Library {
    Library::new([
        descriptor(1, "LIB", "Big Book", "Big", "big", Depth::ChapterVerse, &["bg", "bbk", "bb"], 21),
        descriptor(2, "LIB", "Small Book", "Small", "small", Depth::Verse, &["sm"], 1),
    ])
    .unwrap()
}

#[allow(dead_code)]
pub fn big_small_manager() -> ReferenceManager {
    ReferenceManager::new(big_small_library())
}

#[allow(dead_code)]
pub fn big_small_manager_with(settings: ReferenceSettings) -> ReferenceManager {
    ReferenceManager::with_settings(big_small_library(), settings)
}

/// A few New Testament books, plus one book in a second library.
#[allow(dead_code)]
pub fn nt_manager() -> ReferenceManager {
    let library = Library::new([
        descriptor(1, "nt", "Matthew", "Matt", "matt", Depth::ChapterVerse, &["mt"], 28),
        descriptor(6, "nt", "Romans", "Rom", "rom", Depth::ChapterVerse, &[], 16),
        descriptor(7, "nt", "1 Corinthians", "1 Cor", "1cor", Depth::ChapterVerse, &[], 16),
        descriptor(9, "nt", "Galatians", "Gal", "gal", Depth::ChapterVerse, &[], 6),
        descriptor(18, "nt", "Philemon", "Phlm", "phm", Depth::Verse, &["phlm"], 1),
        descriptor(24, "nt", "2 John", "2 Jn", "2jn", Depth::Verse, &[], 1),
        descriptor(25, "nt", "3 John", "3 Jn", "3jn", Depth::Verse, &[], 1),
        descriptor(27, "nt", "Revelation", "Rev", "rev", Depth::ChapterVerse, &["apocalypse"], 22),
        descriptor(122, "lxx", "Canticum", "Cant", "cant", Depth::ChapterVerse, &["songofsolomon", "song"], 8),
    ])
    .unwrap();
    ReferenceManager::new(library)
}

#[allow(dead_code)]
pub fn reference(manager: &ReferenceManager, query: &str) -> RangeSet {
    match manager.create_reference_from_query(query) {
        Ok(r) => r,
        Err(e) => panic!("query {:?}: {}", query, e),
    }
}
