//! Type inference and the explicit type-change state machine.
//!
//! A question's effective type is derived from its content:
//!
//! 1. `written-answer` is sticky and always wins.
//! 2. Any answer with a branch target makes it a `decision-tree`.
//! 3. Otherwise it is `multiple-choice`.
//!
//! [`apply_question_update`] runs this on every write, so `declared_type`
//! auto-promotes and demotes between multiple-choice and decision-tree
//! without the caller having to know.
//!
//! Switching between multiple-choice and decision-tree explicitly goes
//! through [`TypeChangeState`], because collapsing a decision tree severs
//! every outgoing branch.

use tracing::debug;

use crate::question::{Question, QuestionPatch};
use crate::types::{QuestionId, QuestionType};

/// Classify `question` by its declared type and its answers' edges.
pub fn resolve_effective_type(question: &Question) -> QuestionType {
    if question.declared_type == QuestionType::WrittenAnswer {
        return QuestionType::WrittenAnswer;
    }
    if question.has_branches() {
        QuestionType::DecisionTree
    } else {
        QuestionType::MultipleChoice
    }
}

/// Compose `patch` over `question` and keep the declared type honest.
///
/// Unless the composed declared type is `written-answer`, it is overwritten
/// with the effective type of the composed question.
pub fn apply_question_update(question: &Question, patch: &QuestionPatch) -> Question {
    let mut updated = patch.compose(question);
    if updated.declared_type != QuestionType::WrittenAnswer {
        let effective = resolve_effective_type(&updated);
        if effective != updated.declared_type {
            debug!(
                question = %updated.id,
                from = %updated.declared_type,
                to = %effective,
                "reclassifying question from content"
            );
            updated.declared_type = effective;
        }
    }
    updated
}

/// Whether switching from `current` to `requested` must be confirmed first.
pub fn requires_confirmation(current: QuestionType, requested: QuestionType) -> bool {
    matches!(
        (current, requested),
        (QuestionType::DecisionTree, QuestionType::MultipleChoice)
            | (QuestionType::MultipleChoice, QuestionType::DecisionTree)
    )
}

/// The patch a confirmed change to `requested` applies to `question`.
///
/// Collapsing to multiple-choice clears every branch target and resets
/// correctness; child questions are left in the store.
pub fn confirmed_type_patch(question: &Question, requested: QuestionType) -> QuestionPatch {
    let patch = QuestionPatch::new().with_declared_type(requested);
    if requested != QuestionType::MultipleChoice {
        return patch;
    }
    let answers = question
        .answers
        .iter()
        .cloned()
        .map(|mut answer| {
            answer.clear_branch();
            answer
        })
        .collect();
    patch.with_answers(answers)
}

/// A type change waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTypeChange {
    /// The question the change was requested on.
    pub question: QuestionId,
    pub requested: QuestionType,
}

/// What a type-change request resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeChangeStep {
    /// Apply this patch now.
    Apply(QuestionPatch),
    /// The request is parked until confirmed or cancelled.
    AwaitConfirmation,
}

/// Two-state machine: idle, or awaiting confirmation of one change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeChangeState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingTypeChange),
}

impl TypeChangeState {
    /// Request `requested` on `question`.
    ///
    /// A multiple-choice ⇄ decision-tree switch parks the request (replacing
    /// any earlier pending one); anything else is applied immediately.
    pub fn request(&mut self, question: &Question, requested: QuestionType) -> TypeChangeStep {
        let current = resolve_effective_type(question);
        if requires_confirmation(current, requested) {
            *self = TypeChangeState::AwaitingConfirmation(PendingTypeChange {
                question: question.id.clone(),
                requested,
            });
            TypeChangeStep::AwaitConfirmation
        } else {
            *self = TypeChangeState::Idle;
            TypeChangeStep::Apply(QuestionPatch::new().with_declared_type(requested))
        }
    }

    pub fn pending(&self) -> Option<&PendingTypeChange> {
        match self {
            TypeChangeState::Idle => None,
            TypeChangeState::AwaitingConfirmation(pending) => Some(pending),
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.pending().is_some()
    }

    /// Leave the awaiting state, returning what was pending.
    pub fn take(&mut self) -> Option<PendingTypeChange> {
        match std::mem::take(self) {
            TypeChangeState::Idle => None,
            TypeChangeState::AwaitingConfirmation(pending) => Some(pending),
        }
    }
}
