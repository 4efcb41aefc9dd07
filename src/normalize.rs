//! Pre-filter for query parsing: reduce free text to a URL-friendly handle.
//!
//! After filtering, the delimiters are:
//!
//! - `;` separates queries
//! - `_` joins the words of a book name
//! - `+` separates a book name from its range numbers
//! - `.` separates chapter and verse
//! - `-` marks a range (`c.v-c.v`, `v-v`, `book-book`)

use lazy_static::lazy_static;
use regex::Regex;

const ALLOWED_CHARS: &str = "-, +;:.1234567890abcdefghijklmnopqrstuvwxyz";

lazy_static! {
    static ref RE_SPACING: Regex = Regex::new(r"[ +]+").unwrap();
    static ref RE_NUMBER_BEFORE_WORD: Regex = Regex::new(r"([0-9])[ +]+([a-z])").unwrap();
    static ref RE_WORD_BEFORE_WORD: Regex = Regex::new(r"([a-z])[ +]+([a-z])").unwrap();
    static ref RE_WORD_BEFORE_NUMBER: Regex = Regex::new(r"([a-z])([0-9])").unwrap();
    static ref RE_NON_WORD_BEFORE_NUMBER: Regex = Regex::new(r"([^a-z])[ +]+([0-9])").unwrap();
}

/// Normalize a citation typed by a person into the parser's input form.
///
/// `"Big Book 2:5, 7"` becomes `"big_book+2.5,7"`.
pub fn filter_query(query: &str) -> String {
    let lowercase = query.to_lowercase();

    let whitelisted: String = lowercase
        .chars()
        .filter(|c| ALLOWED_CHARS.contains(*c))
        .collect();

    let s = whitelisted.trim();
    let s = RE_SPACING.replace_all(s, " ");
    let s = RE_NUMBER_BEFORE_WORD.replace_all(&s, "${1}${2}");
    let s = RE_WORD_BEFORE_WORD.replace_all(&s, "${1}_${2}");
    let s = RE_WORD_BEFORE_NUMBER.replace_all(&s, "${1} ${2}");
    let s = RE_NON_WORD_BEFORE_NUMBER.replace_all(&s, "${1}${2}");

    s.chars()
        .map(|c| match c {
            ':' => '.',
            ' ' => '+',
            other => other,
        })
        .collect()
}

/// A range number string holds only digits and `-`, `.`, `,`.
pub fn is_range_number_string(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ','))
}
