pub mod extractor;
pub mod headers;

pub use extractor::{extract_explicit, IdentifierExtractor};
pub use headers::is_section_header;
