//! Ordered status classification for portal responses.
//!
//! The portal reports login outcomes as literal substrings in the page
//! body. Classification is an explicit ordered rule list with
//! first-match-wins semantics; when no rule matches the category is
//! [`StatusCategory::Unknown`]. Rule order is part of the contract and is
//! covered by tests.

use serde::{Deserialize, Serialize};

/// Outcome category for a single roll number check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCategory {
    /// The roll number is not yet in the convocation system.
    NotFound,
    /// The roll number's convocation record is available.
    Found,
    /// The portal rejected the credentials.
    InvalidCredentials,
    /// The portal responded but none of the known markers matched.
    Unknown,
    /// The check itself failed before a status could be read.
    Error,
}

impl StatusCategory {
    /// Operator-facing label used in report blocks.
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::NotFound => "❌ Roll No Not Found",
            StatusCategory::Found => "✅ ROLL NUMBER FOUND!",
            StatusCategory::InvalidCredentials => "⚠️ Invalid Credentials",
            StatusCategory::Unknown => "❔ Status Unknown",
            StatusCategory::Error => "❌ Error",
        }
    }

    /// Fixed detail text for page-derived categories.
    pub fn detail(&self) -> &'static str {
        match self {
            StatusCategory::NotFound => {
                "Your roll number is not yet in the convocation system."
            }
            StatusCategory::Found => {
                "Your convocation details are available! Check the portal immediately."
            }
            StatusCategory::InvalidCredentials => {
                "The credentials might be incorrect or there's an issue with this roll number format."
            }
            StatusCategory::Unknown => "The portal responded but the status is unclear.",
            StatusCategory::Error => "An error occurred while checking.",
        }
    }
}

/// One classification rule: a content predicate and the category it yields.
struct Rule {
    category: StatusCategory,
    matches: fn(&str) -> bool,
}

fn matches_not_found(content: &str) -> bool {
    content.contains("Roll No Not Found")
}

fn matches_found(content: &str) -> bool {
    content.contains("Roll No Found") || content.to_lowercase().contains("successfully")
}

fn matches_invalid(content: &str) -> bool {
    content.contains("Invalid") || content.to_lowercase().contains("incorrect")
}

/// Evaluated top to bottom; the first matching rule wins.
const RULES: &[Rule] = &[
    Rule {
        category: StatusCategory::NotFound,
        matches: matches_not_found,
    },
    Rule {
        category: StatusCategory::Found,
        matches: matches_found,
    },
    Rule {
        category: StatusCategory::InvalidCredentials,
        matches: matches_invalid,
    },
];

/// Classify rendered page content into a status category.
pub fn classify(content: &str) -> StatusCategory {
    RULES
        .iter()
        .find(|rule| (rule.matches)(content))
        .map_or(StatusCategory::Unknown, |rule| rule.category)
}
