//! The authoring session: one mutable [`Editor`] owning the question store,
//! the navigation path and the pending type change.
//!
//! Every write to a question goes through [`Editor::commit`], which runs
//! [`apply_question_update`] so the declared type always agrees with the
//! content. Operations validate before mutating: an `Err` leaves the
//! session exactly as it was.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::breadcrumb::{build_breadcrumbs, crumb_label, Breadcrumb};
use crate::catalog::QuestionCatalog;
use crate::config::Config;
use crate::error::{QuizError, QuizResult};
use crate::infer::{
    apply_question_update, confirmed_type_patch, PendingTypeChange, TypeChangeState,
    TypeChangeStep,
};
use crate::interaction::ConfirmPrompt;
use crate::navigation::{find_path, JumpOutcome, NavigationStack};
use crate::question::{
    parse_tags, Answer, AnswerUpdate, BranchTarget, Question, QuestionPatch, TextField,
};
use crate::store::{GraphView, QuestionStore};
use crate::text::MultilingualText;
use crate::tree::{build_tree, TreeNode};
use crate::types::{AnswerId, Correctness, QuestionId, QuestionType, WrittenAnswerFormat};
use crate::util::IdGenerator;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a deletion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum DeleteOutcome {
    /// The question was removed; `parent` is the question whose edges were cleared.
    Deleted {
        id: QuestionId,
        parent: Option<QuestionId>,
    },
    /// The prompt was declined; nothing changed.
    Declined { id: QuestionId },
}

/// Result of a type-change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "outcome")]
pub enum TypeChangeOutcome {
    /// The change was written; `declared_type` is the type after inference.
    Applied {
        question: QuestionId,
        declared_type: QuestionType,
    },
    /// Waiting for `confirm_type_change` or `cancel_type_change`.
    AwaitingConfirmation {
        question: QuestionId,
        requested: QuestionType,
    },
    /// The confirmation prompt was declined.
    Cancelled { question: QuestionId },
}

/// What an answer's branch target currently resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "state")]
pub enum BranchView<'a> {
    Live { question: &'a Question },
    /// The target resolves nowhere; `text` is what the edge last saw.
    Deleted {
        id: QuestionId,
        text: MultilingualText,
    },
}

// ============================================================================
// Editor
// ============================================================================

/// The authoring session.
pub struct Editor {
    store: QuestionStore,
    catalog: Box<dyn QuestionCatalog>,
    navigation: NavigationStack,
    type_change: TypeChangeState,
    prompt: Box<dyn ConfirmPrompt>,
    config: Config,
    language: String,
    ids: IdGenerator,
}

impl Editor {
    /// A fresh session holding only a blank root question.
    pub fn new(
        config: Config,
        language: impl Into<String>,
        catalog: Box<dyn QuestionCatalog>,
        prompt: Box<dyn ConfirmPrompt>,
    ) -> Self {
        let store = QuestionStore::new(&config.editor.languages);
        let ids = IdGenerator::new(config.editor.id_prefix.clone(), config.editor.id_strategy);
        Editor {
            store,
            catalog,
            navigation: NavigationStack::new(),
            type_change: TypeChangeState::Idle,
            prompt,
            config,
            language: language.into(),
            ids,
        }
    }

    /// Replace the store, returning to root with no pending type change.
    pub fn with_store(mut self, store: QuestionStore) -> Self {
        self.store = store;
        self.navigation.reset_to_root();
        self.type_change = TypeChangeState::Idle;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    pub fn catalog(&self) -> &dyn QuestionCatalog {
        &*self.catalog
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Active display language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switch the display language. Any code is accepted; missing entries
    /// read as empty text.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        debug!(language = %self.language, "display language changed");
    }

    /// Lookup chain over the store and the catalog.
    pub fn view(&self) -> GraphView<'_> {
        GraphView::new(&self.store, &*self.catalog)
    }

    pub fn current_id(&self) -> &QuestionId {
        self.navigation.current()
    }

    /// The question at the top of the navigation stack.
    pub fn current_question(&self) -> QuizResult<&Question> {
        let id = self.current_id();
        self.store.get(id).ok_or_else(|| QuizError::not_found(id))
    }

    pub fn pending_type_change(&self) -> Option<&PendingTypeChange> {
        self.type_change.pending()
    }

    /// Catalog entries matching `text` in the active language.
    pub fn search_catalog(&self, text: &str) -> Vec<&Question> {
        self.catalog.search(text, &self.language)
    }

    // ------------------------------------------------------------------------
    // Question edits
    // ------------------------------------------------------------------------

    /// Apply a partial update to the current question.
    pub fn update_question(&mut self, patch: QuestionPatch) -> QuizResult<()> {
        if let Some(answers) = &patch.answers {
            validate_answers(answers)?;
        }
        let current = self.current_question()?.clone();
        let text_changed = patch.text.is_some();
        self.commit(&current, &patch);
        if text_changed {
            self.refresh_edge_caches(&current.id);
        }
        Ok(())
    }

    /// Set one text field of the current question in the active language.
    pub fn set_text(&mut self, field: TextField, value: &str) -> QuizResult<()> {
        let current = self.current_question()?;
        let mut patch = QuestionPatch::new();
        match field {
            TextField::Question => {
                patch.text = Some(current.text.clone().with(self.language.clone(), value));
            }
            TextField::Hint => {
                patch.hint = Some(current.hint.clone().with(self.language.clone(), value));
            }
            TextField::IncorrectFeedback => {
                patch.incorrect_feedback = Some(
                    current
                        .incorrect_feedback
                        .clone()
                        .with(self.language.clone(), value),
                );
            }
        }
        self.update_question(patch)
    }

    pub fn set_category(&mut self, category: &str) -> QuizResult<()> {
        self.update_question(QuestionPatch::new().with_category(category.trim()))
    }

    /// Replace the current question's tags from a comma-separated list.
    pub fn set_tags_csv(&mut self, csv: &str) -> QuizResult<()> {
        self.update_question(QuestionPatch::new().with_tags(parse_tags(csv)))
    }

    /// Only meaningful on written-answer questions; stored regardless.
    pub fn set_written_format(&mut self, format: Option<WrittenAnswerFormat>) -> QuizResult<()> {
        let patch = QuestionPatch {
            written_answer_format: Some(format),
            ..QuestionPatch::default()
        };
        self.update_question(patch)
    }

    // ------------------------------------------------------------------------
    // Answer edits
    // ------------------------------------------------------------------------

    /// Append a blank answer to the current question.
    pub fn add_answer(&mut self) -> QuizResult<AnswerId> {
        let current = self.current_question()?.clone();
        let (Some(next_id), Some(next_order)) =
            (current.next_answer_id(), current.next_answer_order())
        else {
            warn!(question = %current.id, "answer id or order exhausted");
            return Err(QuizError::invalid_mutation(
                "no answer id or order left after the current maximum",
            ));
        };
        let answer = Answer::new(next_id, next_order, &self.config.editor.languages);
        let id = answer.id;
        let mut answers = current.answers.clone();
        answers.push(answer);
        self.commit(&current, &QuestionPatch::new().with_answers(answers));
        debug!(question = %current.id, answer = %id, "answer added");
        Ok(id)
    }

    /// Remove an answer. The last remaining answer cannot be removed.
    pub fn remove_answer(&mut self, answer_id: AnswerId) -> QuizResult<()> {
        let current = self.current_question()?.clone();
        require_answer(&current, answer_id)?;
        if current.answers.len() <= 1 {
            warn!(question = %current.id, answer = %answer_id, "refusing to remove last answer");
            return Err(QuizError::invalid_mutation(
                "a question must keep at least one answer",
            ));
        }
        let answers = current
            .answers
            .iter()
            .filter(|answer| answer.id != answer_id)
            .cloned()
            .collect();
        self.commit(&current, &QuestionPatch::new().with_answers(answers));
        debug!(question = %current.id, answer = %answer_id, "answer removed");
        Ok(())
    }

    /// Change one field of an answer on the current question.
    ///
    /// Setting correctness on an answer that branches is refused; use
    /// [`Editor::mark_answer`] or unlink first.
    pub fn update_answer(&mut self, answer_id: AnswerId, update: AnswerUpdate) -> QuizResult<()> {
        let current = self.current_question()?.clone();
        let answer = require_answer(&current, answer_id)?;
        if let AnswerUpdate::Correctness(correctness) = &update {
            if !correctness.is_unset() && answer.branch_target.is_some() {
                warn!(question = %current.id, answer = %answer_id, "refusing correctness on a branching answer");
                return Err(QuizError::invalid_mutation(format!(
                    "answer {} branches to another question; unlink it before marking it",
                    answer_id
                )));
            }
        }

        let language = self.language.clone();
        let answers = edit_answer(&current, answer_id, |answer| match update {
            AnswerUpdate::Text(text) => answer.text.set(language, text),
            AnswerUpdate::Explanation(text) => answer.explanation.set(language, text),
            AnswerUpdate::Order(order) => answer.order = order,
            AnswerUpdate::Correctness(correctness) => answer.mark(correctness),
        });
        self.commit(&current, &QuestionPatch::new().with_answers(answers));
        debug!(question = %current.id, answer = %answer_id, "answer updated");
        Ok(())
    }

    /// Mark an answer correct or incorrect, clearing its branch if it has one.
    pub fn mark_answer(&mut self, answer_id: AnswerId, correct: bool) -> QuizResult<()> {
        let current = self.current_question()?.clone();
        let answer = require_answer(&current, answer_id)?;
        if let Some(target) = answer.branch_id() {
            info!(question = %current.id, answer = %answer_id, target = %target, "marking answer clears its branch");
        }
        let answers = edit_answer(&current, answer_id, |answer| {
            answer.mark(Correctness::from(correct))
        });
        self.commit(&current, &QuestionPatch::new().with_answers(answers));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Branching
    // ------------------------------------------------------------------------

    /// Create a blank child question behind `answer_id` and navigate to it.
    ///
    /// An existing branch on the answer is replaced; its old target stays
    /// in the store.
    pub fn create_branch(&mut self, answer_id: AnswerId) -> QuizResult<QuestionId> {
        let current = self.current_question()?.clone();
        let answer = require_answer(&current, answer_id)?;
        if let Some(previous) = answer.branch_id() {
            debug!(question = %current.id, answer = %answer_id, previous = %previous, "replacing existing branch");
        }

        let child_id = self.ids.next_id(&self.store);
        let child = Question::blank(child_id.clone(), &self.config.editor.languages)
            .with_parent(current.id.clone(), answer_id);
        let target = BranchTarget::to_question(&child);
        self.store.put(child_id.clone(), child);

        let answers = edit_answer(&current, answer_id, |answer| answer.set_branch(target));
        self.commit(&current, &QuestionPatch::new().with_answers(answers));
        self.navigation.push(child_id.clone());
        self.drop_stale_type_change();

        info!(parent = %current.id, answer = %answer_id, child = %child_id, "branch created");
        Ok(child_id)
    }

    /// Point `answer_id` of the current question at an existing question.
    ///
    /// `target` may live in the store or the catalog; a catalog entry is
    /// copied into the store on first touch, and an existing store copy is
    /// kept as is. Linking back up the path is allowed and forms a cycle.
    pub fn link_existing(&mut self, answer_id: AnswerId, target: &QuestionId) -> QuizResult<()> {
        let current_id = self.current_id().clone();
        require_answer(self.current_question()?, answer_id)?;
        if self.view().resolve(target).is_none() {
            return Err(QuizError::not_found(target));
        }

        let needs_parent = match self.store.get(target) {
            Some(existing) => existing.parent_id.is_none() && !existing.id.is_root(),
            None => true,
        };
        self.materialize(target)?;
        if needs_parent {
            if let Some(linked) = self.store.get(target).cloned() {
                self.store.put(
                    target.clone(),
                    linked.with_parent(current_id.clone(), answer_id),
                );
            }
        }

        // Re-read: the target may be the current question itself.
        let current = self.current_question()?.clone();
        let edge = match self.store.get(target) {
            Some(linked) => BranchTarget::to_question(linked),
            None => return Err(QuizError::not_found(target)),
        };
        let answers = edit_answer(&current, answer_id, |answer| answer.set_branch(edge));
        self.commit(&current, &QuestionPatch::new().with_answers(answers));

        info!(parent = %current_id, answer = %answer_id, target = %target, "linked existing question");
        Ok(())
    }

    /// Detach one answer's branch without touching the child question.
    pub fn unlink(&mut self, question_id: &QuestionId, answer_id: AnswerId) -> QuizResult<()> {
        let question = self
            .store
            .get(question_id)
            .cloned()
            .ok_or_else(|| QuizError::not_found(question_id))?;
        let answer = require_answer(&question, answer_id)?;
        let Some(target) = answer.branch_id().cloned() else {
            debug!(question = %question_id, answer = %answer_id, "answer has no branch to unlink");
            return Ok(());
        };
        let answers = edit_answer(&question, answer_id, Answer::clear_branch);
        self.commit(&question, &QuestionPatch::new().with_answers(answers));
        info!(question = %question_id, answer = %answer_id, target = %target, "branch unlinked");
        Ok(())
    }

    /// Where `answer_id` of the current question leads, if anywhere.
    pub fn branch_question(&self, answer_id: AnswerId) -> QuizResult<Option<BranchView<'_>>> {
        let current = self.current_question()?;
        let answer = require_answer(current, answer_id)?;
        let Some(target) = &answer.branch_target else {
            return Ok(None);
        };
        let view = match self.view().resolve(&target.id) {
            Some(question) => BranchView::Live { question },
            None => BranchView::Deleted {
                id: target.id.clone(),
                text: target.cached_text.clone(),
            },
        };
        Ok(Some(view))
    }

    /// Number of branching answers on `id`.
    pub fn branch_count(&self, id: &QuestionId) -> QuizResult<usize> {
        self.view()
            .resolve(id)
            .map(Question::branch_count)
            .ok_or_else(|| QuizError::not_found(id))
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Descend into `id`, copying it from the catalog on first touch.
    pub fn push(&mut self, id: &QuestionId) -> QuizResult<()> {
        self.materialize(id)?;
        self.navigation.push(id.clone());
        self.drop_stale_type_change();
        debug!(id = %id, depth = self.navigation.len(), "navigated into question");
        Ok(())
    }

    /// Go up one level; no-op at the bottom of the stack.
    pub fn pop(&mut self) -> Option<QuestionId> {
        let popped = self.navigation.pop();
        self.drop_stale_type_change();
        debug!(popped = ?popped, "navigated up");
        popped
    }

    pub fn reset_to_root(&mut self) {
        self.navigation.reset_to_root();
        self.drop_stale_type_change();
        debug!("navigated to root");
    }

    /// Jump to any question, rebuilding the path from root when one exists.
    pub fn jump_to(&mut self, id: &QuestionId) -> QuizResult<JumpOutcome> {
        self.materialize(id)?;
        let outcome = match find_path(&self.view(), id) {
            Some(path) => {
                self.navigation.replace(path.clone());
                JumpOutcome::Path { path }
            }
            None => {
                debug!(id = %id, "no path from root; detaching navigation");
                self.navigation.replace(vec![id.clone()]);
                JumpOutcome::Detached { id: id.clone() }
            }
        };
        self.drop_stale_type_change();
        Ok(outcome)
    }

    /// Follow a breadcrumb: keep the path up to the first occurrence of `id`.
    pub fn truncate_to(&mut self, id: &QuestionId) -> QuizResult<()> {
        if self.navigation.truncate_to(id) {
            self.drop_stale_type_change();
            Ok(())
        } else {
            Err(QuizError::NotOnPath { id: id.clone() })
        }
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    /// Labelled navigation path in the active language.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        build_breadcrumbs(
            &self.view(),
            self.navigation.ids(),
            &self.language,
            &self.config.labels,
        )
    }

    /// Display tree from root.
    pub fn tree(&self) -> Option<TreeNode<'_>> {
        self.tree_from(&QuestionId::root())
    }

    /// Display tree from any question.
    pub fn tree_from(&self, id: &QuestionId) -> Option<TreeNode<'_>> {
        build_tree(&self.view(), id)
    }

    // ------------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------------

    /// Delete `id` after confirmation, clearing the edge from its recorded parent.
    ///
    /// Descendants are not deleted; they stay in the store unreachable.
    pub fn delete_question(&mut self, id: &QuestionId) -> QuizResult<DeleteOutcome> {
        let parent = self.deletable(id)?.parent_id.clone();
        if !self.confirm_delete(id)? {
            return Ok(DeleteOutcome::Declined { id: id.clone() });
        }
        Ok(self.remove_question(id, parent))
    }

    /// Delete the breadcrumb entry at `index`, clearing the edge from the
    /// entry before it.
    pub fn delete_breadcrumb(&mut self, index: usize) -> QuizResult<DeleteOutcome> {
        let ids = self.navigation.ids();
        let Some(id) = ids.get(index).cloned() else {
            return Err(QuizError::invalid_args(format!(
                "breadcrumb index {} out of range (path has {} entries)",
                index,
                ids.len()
            )));
        };
        let parent = index.checked_sub(1).and_then(|prev| ids.get(prev)).cloned();

        self.deletable(&id)?;
        if !self.confirm_delete(&id)? {
            return Ok(DeleteOutcome::Declined { id });
        }
        Ok(self.remove_question(&id, parent))
    }

    fn deletable(&self, id: &QuestionId) -> QuizResult<&Question> {
        if id.is_root() {
            return Err(QuizError::invalid_mutation("the root question cannot be deleted"));
        }
        self.store.get(id).ok_or_else(|| QuizError::not_found(id))
    }

    fn confirm_delete(&self, id: &QuestionId) -> QuizResult<bool> {
        let label = crumb_label(&self.view(), id, &self.language, &self.config.labels);
        let confirmed = self
            .prompt
            .confirm(&self.config.labels.delete_message(&label))?;
        if !confirmed {
            debug!(id = %id, "deletion declined");
        }
        Ok(confirmed)
    }

    fn remove_question(&mut self, id: &QuestionId, parent: Option<QuestionId>) -> DeleteOutcome {
        self.store.remove(id);

        if let Some(parent_question) = parent.as_ref().and_then(|p| self.store.get(p)).cloned() {
            let answers = parent_question
                .answers
                .iter()
                .cloned()
                .map(|mut answer| {
                    if answer.branches_to(id) {
                        answer.clear_branch();
                    }
                    answer
                })
                .collect();
            self.commit(&parent_question, &QuestionPatch::new().with_answers(answers));
        }

        if let Some(index) = self.navigation.position(id) {
            self.navigation.truncate_before(index);
        }
        self.drop_stale_type_change();

        info!(id = %id, parent = ?parent, "question deleted");
        DeleteOutcome::Deleted {
            id: id.clone(),
            parent,
        }
    }

    // ------------------------------------------------------------------------
    // Type change
    // ------------------------------------------------------------------------

    /// Request a declared type for the current question.
    ///
    /// Switching between multiple choice and decision tree waits for
    /// [`Editor::confirm_type_change`]; other changes apply at once.
    pub fn request_type_change(&mut self, requested: QuestionType) -> QuizResult<TypeChangeOutcome> {
        let current = self.current_question()?.clone();
        match self.type_change.request(&current, requested) {
            TypeChangeStep::Apply(patch) => {
                let declared_type = self.commit(&current, &patch);
                debug!(question = %current.id, declared = %declared_type, "type change applied");
                Ok(TypeChangeOutcome::Applied {
                    question: current.id,
                    declared_type,
                })
            }
            TypeChangeStep::AwaitConfirmation => {
                debug!(question = %current.id, requested = %requested, "type change awaiting confirmation");
                Ok(TypeChangeOutcome::AwaitingConfirmation {
                    question: current.id,
                    requested,
                })
            }
        }
    }

    /// Apply the pending type change. Collapsing to multiple choice severs
    /// every branch of that question.
    ///
    /// The pending change always targets the current question: leaving it
    /// discards the request.
    pub fn confirm_type_change(&mut self) -> QuizResult<TypeChangeOutcome> {
        self.drop_stale_type_change();
        let pending = self.type_change.take().ok_or(QuizError::NoPendingTypeChange)?;
        let question = self
            .store
            .get(&pending.question)
            .cloned()
            .ok_or_else(|| QuizError::not_found(&pending.question))?;

        let patch = confirmed_type_patch(&question, pending.requested);
        let severed = question.branch_count();
        let declared_type = self.commit(&question, &patch);
        if pending.requested == QuestionType::MultipleChoice && severed > 0 {
            info!(question = %question.id, severed, "collapsed decision tree; children left in store");
        }
        Ok(TypeChangeOutcome::Applied {
            question: pending.question,
            declared_type,
        })
    }

    /// Discard the pending type change.
    pub fn cancel_type_change(&mut self) -> QuizResult<TypeChangeOutcome> {
        let pending = self.type_change.take().ok_or(QuizError::NoPendingTypeChange)?;
        debug!(question = %pending.question, "type change cancelled");
        Ok(TypeChangeOutcome::Cancelled {
            question: pending.question,
        })
    }

    /// Request a type change and settle any confirmation through the prompt.
    pub fn change_type_interactive(
        &mut self,
        requested: QuestionType,
    ) -> QuizResult<TypeChangeOutcome> {
        let outcome = self.request_type_change(requested)?;
        if !matches!(outcome, TypeChangeOutcome::AwaitingConfirmation { .. }) {
            return Ok(outcome);
        }
        match self.prompt.confirm(&self.config.labels.collapse_prompt) {
            Ok(true) => self.confirm_type_change(),
            Ok(false) => self.cancel_type_change(),
            Err(err) => {
                self.type_change.take();
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Write `patch` over `base` through type inference. Returns the
    /// resulting declared type.
    fn commit(&mut self, base: &Question, patch: &QuestionPatch) -> QuestionType {
        let updated = apply_question_update(base, patch);
        let declared_type = updated.declared_type;
        self.store.put(base.id.clone(), updated);
        declared_type
    }

    /// Discard a pending type change whose question is no longer current.
    fn drop_stale_type_change(&mut self) {
        let current = self.navigation.current();
        if self
            .type_change
            .pending()
            .is_some_and(|pending| &pending.question != current)
        {
            if let Some(pending) = self.type_change.take() {
                debug!(question = %pending.question, "left question; pending type change discarded");
            }
        }
    }

    /// Ensure `id` is in the store, copying it from the catalog if needed.
    ///
    /// The copy is normalised on the way in: a branching answer loses any
    /// judgment and the declared type is re-inferred. Entries with no answers
    /// or repeated answer ids are refused.
    fn materialize(&mut self, id: &QuestionId) -> QuizResult<()> {
        if self.store.contains(id) {
            return Ok(());
        }
        let mut entry = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| QuizError::not_found(id))?;
        for answer in entry.answers.iter_mut().filter(|a| !a.is_consistent()) {
            debug!(id = %id, answer = %answer.id, "dropping judgment on branching catalog answer");
            answer.correctness = Correctness::Unset;
        }
        validate_answers(&entry.answers)?;
        let entry = apply_question_update(&entry, &QuestionPatch::new());
        self.store.put(id.clone(), entry);
        debug!(id = %id, "materialized catalog entry");
        Ok(())
    }

    /// Re-cache `id`'s text on every store edge pointing at it.
    fn refresh_edge_caches(&mut self, id: &QuestionId) {
        let Some(text) = self.store.get(id).map(|question| question.text.clone()) else {
            return;
        };
        let parents: Vec<QuestionId> = self.store.parents_of(id).into_iter().cloned().collect();
        for parent_id in parents {
            let Some(parent) = self.store.get(&parent_id).cloned() else {
                continue;
            };
            let answers = parent
                .answers
                .iter()
                .cloned()
                .map(|mut answer| {
                    if let Some(target) = answer.branch_target.as_mut() {
                        if &target.id == id {
                            target.cached_text = text.clone();
                        }
                    }
                    answer
                })
                .collect();
            self.commit(&parent, &QuestionPatch::new().with_answers(answers));
        }
    }
}

fn require_answer(question: &Question, answer_id: AnswerId) -> QuizResult<&Answer> {
    question
        .answer(answer_id)
        .ok_or_else(|| QuizError::answer_not_found(&question.id, answer_id))
}

/// Copy of `question`'s answers with `edit` applied to `answer_id`.
fn edit_answer(
    question: &Question,
    answer_id: AnswerId,
    edit: impl FnOnce(&mut Answer),
) -> Vec<Answer> {
    let mut answers = question.answers.clone();
    if let Some(answer) = answers.iter_mut().find(|answer| answer.id == answer_id) {
        edit(answer);
    }
    answers
}

fn validate_answers(answers: &[Answer]) -> QuizResult<()> {
    if answers.is_empty() {
        return Err(QuizError::invalid_mutation(
            "a question must keep at least one answer",
        ));
    }
    if let Some(answer) = answers.iter().find(|answer| !answer.is_consistent()) {
        return Err(QuizError::invalid_mutation(format!(
            "answer {} has both a branch target and a correctness judgment",
            answer.id
        )));
    }
    let mut seen = BTreeSet::new();
    if let Some(answer) = answers.iter().find(|answer| !seen.insert(answer.id)) {
        return Err(QuizError::invalid_mutation(format!(
            "answer id {} appears more than once",
            answer.id
        )));
    }
    Ok(())
}
