//! End-to-end behaviour of the authoring session.

use questree_core::catalog::InMemoryCatalog;
use questree_core::config::Config;
use questree_core::infer::resolve_effective_type;
use questree_core::interaction::{AutoConfirm, ScriptedPrompt};
use questree_core::navigation::{find_path, JumpOutcome};
use questree_core::question::{AnswerUpdate, QuestionPatch, TextField};
use questree_core::{
    AnswerId, Correctness, DeleteOutcome, Editor, QuestionId, QuestionType, TypeChangeOutcome,
};

fn editor() -> Editor {
    Editor::new(
        Config::default(),
        "en",
        Box::new(InMemoryCatalog::sample()),
        Box::new(AutoConfirm),
    )
}

fn first_answer(editor: &Editor) -> AnswerId {
    editor.current_question().unwrap().answers[0].id
}

/// Type consistency and answer mutual exclusion over the whole store.
fn assert_invariants(editor: &Editor) {
    for question in editor.store().iter() {
        if question.declared_type != QuestionType::WrittenAnswer {
            assert_eq!(
                resolve_effective_type(question),
                question.declared_type,
                "declared type out of sync on {}",
                question.id
            );
        }
        for answer in &question.answers {
            assert!(
                answer.branch_target.is_none() || answer.correctness.is_unset(),
                "answer {} on {} has both a branch and a judgment",
                answer.id,
                question.id
            );
        }
    }
}

#[test]
fn test_type_consistency_across_edits() {
    let mut editor = editor();
    let answer = first_answer(&editor);
    let second = editor.add_answer().unwrap();
    assert_invariants(&editor);

    editor.create_branch(answer).unwrap();
    assert_invariants(&editor);
    editor.pop();
    assert_eq!(
        editor.current_question().unwrap().declared_type,
        QuestionType::DecisionTree
    );

    editor.mark_answer(second, false).unwrap();
    editor.unlink(&QuestionId::root(), answer).unwrap();
    assert_invariants(&editor);
    assert_eq!(
        editor.current_question().unwrap().declared_type,
        QuestionType::MultipleChoice
    );

    // A declared decision tree without branches is reclassified.
    editor
        .update_question(QuestionPatch::new().with_declared_type(QuestionType::DecisionTree))
        .unwrap();
    assert_invariants(&editor);
}

#[test]
fn test_written_answer_is_sticky() {
    let mut editor = editor();
    editor
        .request_type_change(QuestionType::WrittenAnswer)
        .unwrap();
    let answer = first_answer(&editor);
    editor.create_branch(answer).unwrap();
    editor.pop();
    editor.add_answer().unwrap();
    editor.unlink(&QuestionId::root(), answer).unwrap();

    assert_eq!(
        editor.current_question().unwrap().declared_type,
        QuestionType::WrittenAnswer
    );
}

#[test]
fn test_branch_and_judgment_are_exclusive() {
    let mut editor = editor();
    let answer = first_answer(&editor);
    editor.mark_answer(answer, true).unwrap();
    editor.create_branch(answer).unwrap();
    editor.pop();

    let root = editor.current_question().unwrap();
    assert!(root.answers[0].branch_target.is_some());
    assert_eq!(root.answers[0].correctness, Correctness::Unset);

    assert!(editor
        .update_answer(answer, AnswerUpdate::Correctness(Correctness::Incorrect))
        .is_err());
    assert_invariants(&editor);
}

#[test]
fn test_find_path_matches_creation_path() {
    let mut editor = editor();
    let first = editor.create_branch(first_answer(&editor)).unwrap();
    let extra = editor.add_answer().unwrap();
    editor.create_branch(first_answer(&editor)).unwrap();
    editor.pop();
    let created = editor.create_branch(extra).unwrap();

    let path = editor.navigation().ids().to_vec();
    assert_eq!(
        path,
        vec![QuestionId::root(), first.clone(), created.clone()]
    );
    assert_eq!(find_path(&editor.view(), &created), Some(path.clone()));

    editor.reset_to_root();
    let outcome = editor.jump_to(&created).unwrap();
    assert_eq!(outcome, JumpOutcome::Path { path: path.clone() });
    assert_eq!(editor.navigation().ids(), path.as_slice());
}

#[test]
fn test_cycle_produces_finite_tree() {
    let mut editor = editor();
    let b = editor.create_branch(first_answer(&editor)).unwrap();
    editor
        .link_existing(first_answer(&editor), &QuestionId::root())
        .unwrap();

    let tree = editor.tree().unwrap();
    assert_eq!(tree.size(), 2);
    assert_eq!(tree.children[0].node.id, b);
    assert!(tree.children[0].node.children.is_empty());

    // Path finding terminates too.
    assert_eq!(
        find_path(&editor.view(), &b),
        Some(vec![QuestionId::root(), b.clone()])
    );
    assert!(find_path(&editor.view(), &QuestionId::new("nowhere")).is_none());
}

#[test]
fn test_deletion_severs_edges() {
    let mut editor = editor();
    let answer = first_answer(&editor);
    editor.mark_answer(answer, true).unwrap();
    let child = editor.create_branch(answer).unwrap();

    let outcome = editor.delete_question(&child).unwrap();
    assert_eq!(
        outcome,
        DeleteOutcome::Deleted {
            id: child.clone(),
            parent: Some(QuestionId::root()),
        }
    );
    assert!(editor.store().get(&child).is_none());
    let root = editor.store().root();
    assert!(root.answers[0].branch_target.is_none());
    assert_eq!(root.answers[0].correctness, Correctness::Unset);
    assert_eq!(root.declared_type, QuestionType::MultipleChoice);
}

#[test]
fn test_deletion_truncates_stack_and_keeps_descendants() {
    let mut editor = editor();
    let q1 = editor.create_branch(first_answer(&editor)).unwrap();
    let q2 = editor.create_branch(first_answer(&editor)).unwrap();
    let q3 = editor.create_branch(first_answer(&editor)).unwrap();
    let original = editor.navigation().ids().to_vec();
    assert_eq!(original.len(), 4);

    editor.delete_question(&q2).unwrap();
    assert_eq!(editor.navigation().ids(), &original[..2]);
    assert_eq!(editor.current_id(), &q1);

    // Deletion does not cascade.
    assert!(editor.store().contains(&q3));
    assert_eq!(editor.tree().unwrap().size(), 2);
}

#[test]
fn test_create_branch_from_blank_root() {
    let mut editor = Editor::new(
        Config::default(),
        "en",
        Box::new(InMemoryCatalog::new()),
        Box::new(AutoConfirm),
    );
    let root = editor.store().root();
    assert_eq!(root.text.get("en"), "");
    assert_eq!(root.answers.len(), 1);
    assert_eq!(root.answers[0].correctness, Correctness::Unset);

    let answer = first_answer(&editor);
    let q1 = editor.create_branch(answer).unwrap();

    let root = editor.store().root();
    assert_eq!(root.answers[0].branch_id(), Some(&q1));
    assert_eq!(resolve_effective_type(root), QuestionType::DecisionTree);
    assert_eq!(editor.navigation().ids(), &[QuestionId::root(), q1]);
}

#[test]
fn test_collapse_to_multiple_choice_orphans_child() {
    let mut editor = Editor::new(
        Config::default(),
        "en",
        Box::new(InMemoryCatalog::new()),
        Box::new(AutoConfirm),
    );
    let q1 = editor.create_branch(first_answer(&editor)).unwrap();
    editor.pop();

    let outcome = editor
        .request_type_change(QuestionType::MultipleChoice)
        .unwrap();
    assert_eq!(
        outcome,
        TypeChangeOutcome::AwaitingConfirmation {
            question: QuestionId::root(),
            requested: QuestionType::MultipleChoice,
        }
    );
    assert!(editor.pending_type_change().is_some());
    // Nothing changes while awaiting confirmation.
    assert!(editor.store().root().has_branches());

    editor.confirm_type_change().unwrap();
    let root = editor.store().root();
    assert!(root.answers[0].branch_target.is_none());
    assert_eq!(root.declared_type, QuestionType::MultipleChoice);
    assert!(editor.store().contains(&q1));
    assert!(editor.pending_type_change().is_none());
}

#[test]
fn test_cancelled_type_change_keeps_tree() {
    let mut editor = editor();
    editor.create_branch(first_answer(&editor)).unwrap();
    editor.pop();

    editor
        .request_type_change(QuestionType::MultipleChoice)
        .unwrap();
    editor.cancel_type_change().unwrap();
    assert!(editor.store().root().has_branches());
    assert_eq!(
        editor.store().root().declared_type,
        QuestionType::DecisionTree
    );
}

#[test]
fn test_interactive_collapse_asks_once() {
    let mut editor = Editor::new(
        Config::default(),
        "en",
        Box::new(InMemoryCatalog::new()),
        Box::new(ScriptedPrompt::new([true])),
    );
    editor.create_branch(first_answer(&editor)).unwrap();
    editor.pop();

    let outcome = editor
        .change_type_interactive(QuestionType::MultipleChoice)
        .unwrap();
    assert_eq!(
        outcome,
        TypeChangeOutcome::Applied {
            question: QuestionId::root(),
            declared_type: QuestionType::MultipleChoice,
        }
    );
    assert!(!editor.store().root().has_branches());
}

#[test]
fn test_link_catalog_entry_materializes_and_labels() {
    let mut editor = editor();
    let answer = first_answer(&editor);
    editor
        .update_answer(answer, AnswerUpdate::Text("About France".to_string()))
        .unwrap();

    let existing = QuestionId::new("existing-1");
    assert!(!editor.store().contains(&existing));
    editor.link_existing(answer, &existing).unwrap();

    let root = editor.store().root();
    assert_eq!(root.answers[0].branch_id(), Some(&existing));
    let copy = editor.store().get(&existing).unwrap();
    assert_eq!(copy.answers.len(), 2);
    assert_eq!(copy.parent_id, Some(QuestionId::root()));

    editor.push(&existing).unwrap();
    let crumbs = editor.breadcrumbs();
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[0].label, "Main Question");
    assert_eq!(crumbs[1].label, "About France");
    assert!(crumbs[1].is_last);
}

#[test]
fn test_store_copy_of_catalog_entry_keeps_local_edits() {
    let mut editor = editor();
    let existing = QuestionId::new("existing-1");
    editor.push(&existing).unwrap();
    editor
        .set_text(TextField::Question, "Edited locally")
        .unwrap();
    editor.reset_to_root();

    editor
        .link_existing(first_answer(&editor), &existing)
        .unwrap();
    assert_eq!(
        editor.store().get(&existing).unwrap().text.get("en"),
        "Edited locally"
    );
    // The catalog is never written.
    assert_eq!(
        editor.catalog().get(&existing).unwrap().text.get("en"),
        "What is the capital of France?"
    );
}

#[test]
fn test_breadcrumbs_follow_language() {
    let mut editor = editor();
    let answer = first_answer(&editor);
    editor
        .update_answer(answer, AnswerUpdate::Text("Yes".to_string()))
        .unwrap();
    editor.create_branch(answer).unwrap();
    editor.set_text(TextField::Question, "Why?").unwrap();

    editor.set_language("fr");
    let crumbs = editor.breadcrumbs();
    assert_eq!(crumbs[1].label, "Untitled Question");
    assert_eq!(crumbs[0].children[0].answer_label, "Empty Answer");

    editor.set_language("en");
    let crumbs = editor.breadcrumbs();
    assert_eq!(crumbs[1].label, "Yes");
    assert_eq!(crumbs[0].children[0].label, "Why?");
}

#[test]
fn test_failed_operations_leave_state_untouched() {
    let mut editor = editor();
    editor.create_branch(first_answer(&editor)).unwrap();
    let store = editor.store().clone();
    let path = editor.navigation().ids().to_vec();

    assert!(editor.jump_to(&QuestionId::new("missing")).is_err());
    assert!(editor
        .link_existing(AnswerId::new(1), &QuestionId::new("missing"))
        .is_err());
    assert!(editor.create_branch(AnswerId::new(42)).is_err());
    assert!(editor.truncate_to(&QuestionId::new("missing")).is_err());
    assert!(editor.delete_question(&QuestionId::new("missing")).is_err());

    assert_eq!(editor.store(), &store);
    assert_eq!(editor.navigation().ids(), path.as_slice());
}
