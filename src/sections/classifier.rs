//! Response classification
//!
//! Both questions answered here are substring heuristics over the raw text:
//! whether an answer is structured, and which category a section title
//! belongs to. The rules are data so the taxonomy can change without
//! touching control flow.

use super::SectionCategory;

/// Headers whose presence marks an answer as structured legal analysis
pub const STRUCTURED_MARKERS: [&str; 3] = ["Legal Section", "Legal Analysis", "Legal Implications"];

/// A single `pattern -> category` rule. Matching is case-sensitive containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub pattern: &'static str,
    pub category: SectionCategory,
}

const fn rule(pattern: &'static str, category: SectionCategory) -> CategoryRule {
    CategoryRule { pattern, category }
}

/// Built-in rules in priority order. First match wins.
///
/// `Legal Section` leads so statute headings that mention a court or a
/// ruling ("Legal Section 5, Court Fees Act") stay references. Patterns cover
/// the headings the answer formatter emits, including the decorated variants
/// ("Legal Overview", "Key Legal Points", "Case Analysis").
pub const DEFAULT_CATEGORY_RULES: &[CategoryRule] = &[
    rule("Legal Section", SectionCategory::LegalReference),
    rule("Error", SectionCategory::Error),
    rule("Summary", SectionCategory::Summary),
    rule("Case Ruling", SectionCategory::CaseRuling),
    rule("Case Analysis", SectionCategory::CaseRuling),
    rule("Ruling", SectionCategory::CaseRuling),
    rule("Judgment", SectionCategory::CaseRuling),
    rule("Court", SectionCategory::CourtComposition),
    rule("Bench", SectionCategory::CourtComposition),
    rule("Legal Details", SectionCategory::CourtComposition),
    rule("Comparison", SectionCategory::Comparison),
    rule("Definition", SectionCategory::Definition),
    rule("Legal Context", SectionCategory::Definition),
    rule("Reference", SectionCategory::LegalReference),
    rule("Interpretation", SectionCategory::LegalReference),
    rule("Overview", SectionCategory::List),
    rule("Points", SectionCategory::List),
    rule("List", SectionCategory::List),
    rule("Explanation", SectionCategory::Explanation),
    rule("Analysis", SectionCategory::Explanation),
    rule("Implications", SectionCategory::Explanation),
    rule("Description", SectionCategory::Explanation),
];

/// Ordered rule table plus the structured-answer markers
#[derive(Debug, Clone)]
pub struct Classifier {
    markers: Vec<&'static str>,
    rules: Vec<CategoryRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            markers: STRUCTURED_MARKERS.to_vec(),
            rules: DEFAULT_CATEGORY_RULES.to_vec(),
        }
    }
}

impl Classifier {
    pub fn new(
        markers: impl IntoIterator<Item = &'static str>,
        rules: impl IntoIterator<Item = CategoryRule>,
    ) -> Self {
        Self {
            markers: markers.into_iter().collect(),
            rules: rules.into_iter().collect(),
        }
    }

    /// True iff the answer contains any structured marker.
    ///
    /// A plain answer that happens to quote a marker is misclassified; the
    /// decoder still produces a sensible single section for it.
    pub fn is_structured(&self, answer: &str) -> bool {
        self.markers.iter().any(|marker| answer.contains(marker))
    }

    /// Category for a section title. Total: unmatched titles are `general`.
    pub fn categorize(&self, title: &str) -> SectionCategory {
        self.rules
            .iter()
            .find(|r| title.contains(r.pattern))
            .map_or(SectionCategory::General, |r| r.category)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}
