pub mod error;
pub mod logger;
pub mod settings;

pub mod index;
pub mod range_set;
pub mod catalog;
pub mod normalize;
pub mod parser;
pub mod formatter;
pub mod manager;

pub use catalog::{BookCatalog, BookDescriptor, BookId, Depth, LabelStyle, Library};
pub use error::{ParseFailure, ReferenceError, Result};
pub use index::{Index, Quadruple, index_to_quadruple, quadruple_to_index};
pub use manager::{ReferenceManager, TagCloudEntry};
pub use normalize::filter_query;
pub use range_set::{QuadrupleRange, Range, RangeSet};
pub use settings::ReferenceSettings;
