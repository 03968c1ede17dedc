//! Section category taxonomy

use serde::{Deserialize, Serialize};

/// Closed set of section categories.
///
/// Conclusions are not a category; they are flagged on [`super::Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Summary,
    List,
    Comparison,
    Explanation,
    Definition,
    CaseRuling,
    LegalReference,
    CourtComposition,
    General,
    Error,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 10] = [
        SectionCategory::Summary,
        SectionCategory::List,
        SectionCategory::Comparison,
        SectionCategory::Explanation,
        SectionCategory::Definition,
        SectionCategory::CaseRuling,
        SectionCategory::LegalReference,
        SectionCategory::CourtComposition,
        SectionCategory::General,
        SectionCategory::Error,
    ];

    /// Wire / serde name
    pub fn as_str(self) -> &'static str {
        match self {
            SectionCategory::Summary => "summary",
            SectionCategory::List => "list",
            SectionCategory::Comparison => "comparison",
            SectionCategory::Explanation => "explanation",
            SectionCategory::Definition => "definition",
            SectionCategory::CaseRuling => "case_ruling",
            SectionCategory::LegalReference => "legal_reference",
            SectionCategory::CourtComposition => "court_composition",
            SectionCategory::General => "general",
            SectionCategory::Error => "error",
        }
    }

    /// Heading shown on the section card
    pub fn display_title(self) -> &'static str {
        match self {
            SectionCategory::Summary => "Summary",
            SectionCategory::List => "List",
            SectionCategory::Comparison => "Comparison",
            SectionCategory::Explanation => "Explanation",
            SectionCategory::Definition => "Definition",
            SectionCategory::CaseRuling => "Case Ruling",
            SectionCategory::LegalReference => "Legal Reference",
            SectionCategory::CourtComposition => "Court Information",
            SectionCategory::General => "Information",
            SectionCategory::Error => "Error",
        }
    }

    /// Icon identifier the projection resolves to artwork.
    ///
    /// `definition` and `legal_reference` share the book icon; `general` and
    /// `error` share the info icon.
    pub fn icon(self) -> &'static str {
        match self {
            SectionCategory::Summary => "description",
            SectionCategory::List => "list",
            SectionCategory::Comparison => "compare",
            SectionCategory::Explanation => "help",
            SectionCategory::Definition | SectionCategory::LegalReference => "book",
            SectionCategory::CaseRuling => "gavel",
            SectionCategory::CourtComposition => "account_balance",
            SectionCategory::General | SectionCategory::Error => "info",
        }
    }

    /// Parse a wire name; anything unrecognised is `general`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or(SectionCategory::General)
    }
}

impl std::fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
