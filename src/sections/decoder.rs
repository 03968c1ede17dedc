//! Section decoder

use super::{Classifier, SectionCategory};
use serde::Serialize;

/// Box-drawing character the answer formatter repeats between segments
pub const SEPARATOR_CHAR: char = '═';

/// Number of repetitions forming one separator
pub const DEFAULT_SEPARATOR_WIDTH: usize = 60;

/// Literal word marking a concluding section
pub const CONCLUSION_MARKER: &str = "Conclusion";

/// One decoded segment of a structured answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: String,
    /// `None` for conclusion sections, which get their own treatment
    pub category: Option<SectionCategory>,
    pub is_conclusion: bool,
}

impl Section {
    /// Category display title, shown beside the raw title. `None` for
    /// conclusions.
    pub fn label(&self) -> Option<&'static str> {
        self.category.map(SectionCategory::display_title)
    }
}

/// An answer classified for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedAnswer {
    Plain { text: String },
    Structured { sections: Vec<Section> },
}

/// Splits answers on the separator and categorizes each segment
#[derive(Debug, Clone)]
pub struct SectionDecoder {
    separator: String,
    classifier: Classifier,
}

impl Default for SectionDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR_WIDTH, Classifier::default())
    }
}

impl SectionDecoder {
    pub fn new(separator_width: usize, classifier: Classifier) -> Self {
        // A zero-width separator would split between every character
        let width = separator_width.max(1);
        Self {
            separator: SEPARATOR_CHAR.to_string().repeat(width),
            classifier,
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Decode a raw answer into ordered sections.
    ///
    /// Never fails. Without a separator the whole trimmed string becomes one
    /// section; blank input yields no sections.
    pub fn decode(&self, raw: &str) -> Vec<Section> {
        raw.split(self.separator.as_str())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.decode_segment(segment))
            .collect()
    }

    /// Plain or structured, using the classifier's marker test
    pub fn decode_answer(&self, raw: &str) -> DecodedAnswer {
        if self.classifier.is_structured(raw) {
            DecodedAnswer::Structured {
                sections: self.decode(raw),
            }
        } else {
            DecodedAnswer::Plain {
                text: raw.to_string(),
            }
        }
    }

    fn decode_segment(&self, segment: &str) -> Section {
        let (title, body) = segment
            .split_once('\n')
            .unwrap_or((segment, ""));
        let is_conclusion = title.contains(CONCLUSION_MARKER);
        let category = if is_conclusion {
            None
        } else {
            Some(self.classifier.categorize(title))
        };

        Section {
            title: title.to_string(),
            body: body.to_string(),
            category,
            is_conclusion,
        }
    }
}
