//! Identifier and tag types shared across the engine.
//!
//! Kept separate from `question` so that `error` and `output` can name ids
//! without pulling in the full question model.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// The id of the single entry point of every question graph.
pub const ROOT_ID: &str = "root";

/// Identifier of a question in the store or catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a question id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        QuestionId(id.into())
    }

    /// The distinguished `"root"` id.
    pub fn root() -> Self {
        QuestionId(ROOT_ID.to_string())
    }

    /// Whether this is the root id.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        QuestionId::new(value)
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        QuestionId(value)
    }
}

/// Identifier of an answer, unique within its owning question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub u32);

impl AnswerId {
    /// Create a new answer ID.
    pub fn new(id: u32) -> Self {
        AnswerId(id)
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Question type tag.
///
/// The declared type is the author's last explicit choice; the effective type
/// is recomputed from content by [`crate::infer::resolve_effective_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    WrittenAnswer,
    DecisionTree,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::WrittenAnswer => "written-answer",
            QuestionType::DecisionTree => "decision-tree",
        }
    }

    /// Human-readable name for menus.
    pub fn display_name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::WrittenAnswer => "Written Answer",
            QuestionType::DecisionTree => "Decision Tree",
        }
    }

    /// Parse a kebab-case type tag.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "multiple-choice" => Some(QuestionType::MultipleChoice),
            "written-answer" => Some(QuestionType::WrittenAnswer),
            "decision-tree" => Some(QuestionType::DecisionTree),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted format for written answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrittenAnswerFormat {
    FreeForm,
    SpecificFormat,
}

impl WrittenAnswerFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "free-form" => Some(WrittenAnswerFormat::FreeForm),
            "specific-format" => Some(WrittenAnswerFormat::SpecificFormat),
            _ => None,
        }
    }
}

/// Tri-state correctness judgment of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Correctness {
    Correct,
    Incorrect,
    #[default]
    Unset,
}

impl Correctness {
    pub fn is_unset(self) -> bool {
        self == Correctness::Unset
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "correct" | "true" => Some(Correctness::Correct),
            "incorrect" | "false" => Some(Correctness::Incorrect),
            "unset" | "none" => Some(Correctness::Unset),
            _ => None,
        }
    }
}

impl From<bool> for Correctness {
    fn from(value: bool) -> Self {
        if value {
            Correctness::Correct
        } else {
            Correctness::Incorrect
        }
    }
}

/// Where a question in the store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Authored in this session.
    #[default]
    Authored,
    /// Materialized copy of a catalog entry.
    Catalog,
}

// ============================================================================
// Tests
// ============================================================================
