//! Structured answer decoding
//!
//! Answers from the legal assistant are either plain text or a run of titled
//! segments separated by a line of box-drawing characters. This module turns
//! the raw string into typed sections the projection can render as cards.

mod category;
mod classifier;
mod decoder;


pub use category::SectionCategory;
pub use classifier::{CategoryRule, Classifier, DEFAULT_CATEGORY_RULES, STRUCTURED_MARKERS};
pub use decoder::{
    DecodedAnswer, Section, SectionDecoder, CONCLUSION_MARKER, DEFAULT_SEPARATOR_WIDTH,
    SEPARATOR_CHAR,
};
