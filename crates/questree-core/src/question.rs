//! The question graph model: questions (nodes) and answers (leaf judgments
//! or edges to child questions).
//!
//! Edges are plain target ids on [`Answer::branch_target`]. The target's text
//! is cached on the edge only to render a dangling edge after its target was
//! deleted; live lookups always go through the store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::text::MultilingualText;
use crate::types::{AnswerId, Correctness, Origin, QuestionId, QuestionType, WrittenAnswerFormat};

// ============================================================================
// Branch Target
// ============================================================================

/// Edge from an answer to a child question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTarget {
    /// Canonical reference into the store (or catalog).
    pub id: QuestionId,
    /// Target text as last seen when the edge was written.
    #[serde(default)]
    pub cached_text: MultilingualText,
}

impl BranchTarget {
    pub fn new(id: QuestionId, cached_text: MultilingualText) -> Self {
        BranchTarget { id, cached_text }
    }

    /// Edge pointing at `question`, caching its current text.
    pub fn to_question(question: &Question) -> Self {
        BranchTarget {
            id: question.id.clone(),
            cached_text: question.text.clone(),
        }
    }
}

// ============================================================================
// Answer
// ============================================================================

/// An answer attached to a question.
///
/// Holds either a correctness judgment or a branch target, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    #[serde(default)]
    pub text: MultilingualText,
    #[serde(default)]
    pub explanation: MultilingualText,
    /// Display order among siblings; need not be contiguous.
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub correctness: Correctness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_target: Option<BranchTarget>,
}

impl Answer {
    /// A blank answer with empty text in every language.
    pub fn new<S: AsRef<str>>(id: AnswerId, order: i64, languages: &[S]) -> Self {
        Answer {
            id,
            text: MultilingualText::blank(languages),
            explanation: MultilingualText::blank(languages),
            order,
            correctness: Correctness::Unset,
            branch_target: None,
        }
    }

    pub fn branch_id(&self) -> Option<&QuestionId> {
        self.branch_target.as_ref().map(|target| &target.id)
    }

    pub fn branches_to(&self, id: &QuestionId) -> bool {
        self.branch_id() == Some(id)
    }

    /// Point this answer at `target`, clearing any correctness judgment.
    pub fn set_branch(&mut self, target: BranchTarget) {
        self.branch_target = Some(target);
        self.correctness = Correctness::Unset;
    }

    /// Drop the branch target and reset correctness to unset.
    pub fn clear_branch(&mut self) {
        self.branch_target = None;
        self.correctness = Correctness::Unset;
    }

    /// Set a judgment, dropping any branch target when the judgment is set.
    pub fn mark(&mut self, correctness: Correctness) {
        if !correctness.is_unset() {
            self.branch_target = None;
        }
        self.correctness = correctness;
    }

    /// An answer with a branch target must have unset correctness.
    pub fn is_consistent(&self) -> bool {
        self.branch_target.is_none() || self.correctness.is_unset()
    }
}

// ============================================================================
// Question
// ============================================================================

/// A node of the authoring graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub declared_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_answer_format: Option<WrittenAnswerFormat>,
    #[serde(default)]
    pub text: MultilingualText,
    #[serde(default)]
    pub hint: MultilingualText,
    #[serde(default)]
    pub incorrect_feedback: MultilingualText,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// How this node was reached; used for labels only, never for traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<QuestionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_answer_id: Option<AnswerId>,
    #[serde(default)]
    pub origin: Origin,
}

fn default_category() -> String {
    "Other".to_string()
}

impl Question {
    /// A blank multiple-choice question with a single blank answer.
    pub fn blank<S: AsRef<str>>(id: QuestionId, languages: &[S]) -> Self {
        Question {
            id,
            declared_type: QuestionType::MultipleChoice,
            written_answer_format: None,
            text: MultilingualText::blank(languages),
            hint: MultilingualText::blank(languages),
            incorrect_feedback: MultilingualText::blank(languages),
            answers: vec![Answer::new(AnswerId::new(1), 1, languages)],
            category: default_category(),
            tags: BTreeSet::new(),
            parent_id: None,
            parent_answer_id: None,
            origin: Origin::Authored,
        }
    }

    /// Record the answer edge through which this node was reached.
    pub fn with_parent(mut self, parent: QuestionId, answer: AnswerId) -> Self {
        self.parent_id = Some(parent);
        self.parent_answer_id = Some(answer);
        self
    }

    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.id == id)
    }

    pub fn has_branches(&self) -> bool {
        self.answers.iter().any(|answer| answer.branch_target.is_some())
    }

    /// Number of answers that point at a child question.
    pub fn branch_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|answer| answer.branch_target.is_some())
            .count()
    }

    /// Outgoing edges in display order: `(answer, target id)`.
    pub fn branches(&self) -> impl Iterator<Item = (&Answer, &QuestionId)> {
        self.sorted_answers()
            .into_iter()
            .filter_map(|answer| answer.branch_id().map(|id| (answer, id)))
    }

    /// Answers sorted by `order`, ties kept in insertion order.
    pub fn sorted_answers(&self) -> Vec<&Answer> {
        let mut answers: Vec<&Answer> = self.answers.iter().collect();
        answers.sort_by_key(|answer| answer.order);
        answers
    }

    /// One past the highest answer id; `None` once ids are exhausted.
    pub fn next_answer_id(&self) -> Option<AnswerId> {
        let max = self.answers.iter().map(|answer| answer.id.0).max().unwrap_or(0);
        max.checked_add(1).map(AnswerId::new)
    }

    /// One past the highest order (at least 1); `None` on overflow.
    pub fn next_answer_order(&self) -> Option<i64> {
        self.answers
            .iter()
            .map(|answer| answer.order)
            .max()
            .unwrap_or(0)
            .max(0)
            .checked_add(1)
    }
}

/// Split a comma-separated tag list, trimming and dropping empties.
pub fn parse_tags(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Updates
// ============================================================================

/// Partial update over a [`Question`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    pub declared_type: Option<QuestionType>,
    pub written_answer_format: Option<Option<WrittenAnswerFormat>>,
    pub text: Option<MultilingualText>,
    pub hint: Option<MultilingualText>,
    pub incorrect_feedback: Option<MultilingualText>,
    pub answers: Option<Vec<Answer>>,
    pub category: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl QuestionPatch {
    pub fn new() -> Self {
        QuestionPatch::default()
    }

    pub fn with_declared_type(mut self, declared_type: QuestionType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    pub fn with_answers(mut self, answers: Vec<Answer>) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn with_text(mut self, text: MultilingualText) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == QuestionPatch::default()
    }

    /// Compose this patch over `question`, returning the merged question.
    pub fn compose(&self, question: &Question) -> Question {
        let mut merged = question.clone();
        if let Some(declared_type) = self.declared_type {
            merged.declared_type = declared_type;
        }
        if let Some(format) = self.written_answer_format {
            merged.written_answer_format = format;
        }
        if let Some(text) = &self.text {
            merged.text = text.clone();
        }
        if let Some(hint) = &self.hint {
            merged.hint = hint.clone();
        }
        if let Some(feedback) = &self.incorrect_feedback {
            merged.incorrect_feedback = feedback.clone();
        }
        if let Some(answers) = &self.answers {
            merged.answers = answers.clone();
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            merged.tags = tags.clone();
        }
        merged
    }
}

/// Question-level text fields editable in the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Question,
    Hint,
    IncorrectFeedback,
}

/// A single-field change to one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerUpdate {
    /// Answer text in the active language.
    Text(String),
    /// Explanation in the active language.
    Explanation(String),
    Order(i64),
    /// Raw correctness write; refused while the answer has a branch target.
    Correctness(Correctness),
}
