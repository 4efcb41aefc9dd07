use thiserror::Error;

use crate::catalog::BookId;

pub type Result<T> = std::result::Result<T, ReferenceError>;

/// Why a citation string was rejected by the query parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("book not recognized")]
    UnknownBook,

    #[error("malformed range numbers")]
    MalformedRangeNumbers,

    #[error("number outside 1-999")]
    OutOfBounds,

    #[error("range end comes before its start")]
    Reversed,

    #[error("malformed verse numbers")]
    DelimiterCount,

    #[error("a book with reference depth {0} cannot have this reference")]
    DepthMismatch(u8),

    #[error("no book given")]
    MissingBook,

    #[error("could not understand")]
    Grammar,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid quadruple: {0}")]
    InvalidQuadruple(String),

    #[error("Bad index number: {0}")]
    MalformedIndex(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Could not parse '{token}': {reason}")]
    Parse { token: String, reason: ParseFailure },

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Bad catalog data: {0}")]
    Catalog(String),
}

impl ReferenceError {
    pub fn parse(token: impl Into<String>, reason: ParseFailure) -> Self {
        ReferenceError::Parse {
            token: token.into(),
            reason,
        }
    }

    pub fn book_not_found(id: BookId) -> Self {
        ReferenceError::Lookup(format!("no book with id #{}", id))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, ReferenceError::Parse { .. })
    }
}
