//! Breadcrumbs: human-readable labels for the navigation path, each with a
//! drill-down menu of its direct children.

use serde::Serialize;

use crate::config::LabelConfig;
use crate::store::GraphView;
use crate::types::QuestionId;

/// One child reachable from a breadcrumb by a single answer edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbChild {
    pub id: QuestionId,
    /// The child question's text.
    pub label: String,
    /// The text of the answer leading to it.
    pub answer_label: String,
}

/// A labelled entry of the navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub id: QuestionId,
    pub label: String,
    pub children: Vec<BreadcrumbChild>,
    /// Whether this is the current (last) entry.
    pub is_last: bool,
    /// Whether the id no longer resolves.
    pub deleted: bool,
}

/// Derive breadcrumbs for `path` in `language`.
pub fn build_breadcrumbs(
    view: &GraphView<'_>,
    path: &[QuestionId],
    language: &str,
    labels: &LabelConfig,
) -> Vec<Breadcrumb> {
    let last = path.len().saturating_sub(1);
    path.iter()
        .enumerate()
        .map(|(index, id)| {
            let is_last = index == last;
            if view.resolve(id).is_none() {
                return Breadcrumb {
                    id: id.clone(),
                    label: labels.deleted.clone(),
                    children: Vec::new(),
                    is_last,
                    deleted: true,
                };
            }
            Breadcrumb {
                id: id.clone(),
                label: crumb_label(view, id, language, labels),
                children: question_children(view, id, language, labels),
                is_last,
                deleted: false,
            }
        })
        .collect()
}

/// Label for a resolvable id.
///
/// Root gets the fixed root label. Other nodes prefer the text of the answer
/// that led to them, then their own text, then the untitled placeholder.
pub fn crumb_label(
    view: &GraphView<'_>,
    id: &QuestionId,
    language: &str,
    labels: &LabelConfig,
) -> String {
    if id.is_root() {
        return labels.root.clone();
    }
    let Some(question) = view.resolve(id) else {
        return labels.deleted.clone();
    };

    if let (Some(parent_id), Some(answer_id)) = (&question.parent_id, question.parent_answer_id) {
        let via_answer = view
            .resolve(parent_id)
            .and_then(|parent| parent.answer(answer_id))
            .and_then(|answer| answer.text.non_empty(language));
        if let Some(text) = via_answer {
            return text.to_string();
        }
    }

    question
        .text
        .non_empty(language)
        .map(str::to_string)
        .unwrap_or_else(|| labels.untitled.clone())
}

/// Direct children of `id`, one entry per branching answer.
///
/// A child that no longer resolves keeps the text its edge last saw, or the
/// deleted marker when that is empty too.
pub fn question_children(
    view: &GraphView<'_>,
    id: &QuestionId,
    language: &str,
    labels: &LabelConfig,
) -> Vec<BreadcrumbChild> {
    let Some(question) = view.resolve(id) else {
        return Vec::new();
    };
    question
        .branches()
        .map(|(answer, child_id)| {
            let label = match view.resolve(child_id) {
                Some(child) => child
                    .text
                    .non_empty(language)
                    .map(str::to_string)
                    .unwrap_or_else(|| labels.untitled.clone()),
                None => answer
                    .branch_target
                    .as_ref()
                    .and_then(|target| target.cached_text.non_empty(language))
                    .map(str::to_string)
                    .unwrap_or_else(|| labels.deleted.clone()),
            };
            BreadcrumbChild {
                id: child_id.clone(),
                label,
                answer_label: answer
                    .text
                    .non_empty(language)
                    .map(str::to_string)
                    .unwrap_or_else(|| labels.empty_answer.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::question::{BranchTarget, Question};
    use crate::store::QuestionStore;
    use crate::types::AnswerId;

    const LANGS: &[&str] = &["en", "fr"];

    fn id(value: &str) -> QuestionId {
        QuestionId::new(value)
    }

    /// root --(answer 1 "Yes")--> q-1
    fn store_with_child() -> QuestionStore {
        let mut store = QuestionStore::new(LANGS);
        let mut child = Question::blank(id("q-1"), LANGS).with_parent(QuestionId::root(), AnswerId::new(1));
        child.text.set("en", "Why yes?");
        let mut root = store.root().clone();
        root.answers[0].text.set("en", "Yes");
        root.answers[0].set_branch(BranchTarget::to_question(&child));
        store.put(QuestionId::root(), root);
        store.put(child.id.clone(), child);
        store
    }

    #[test]
    fn root_has_fixed_label() {
        let store = QuestionStore::new(LANGS);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let crumbs = build_breadcrumbs(&view, &[QuestionId::root()], "en", &LabelConfig::default());
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].label, "Main Question");
        assert!(crumbs[0].is_last);
        assert!(crumbs[0].children.is_empty());
    }

    #[test]
    fn child_label_prefers_leading_answer_text() {
        let store = store_with_child();
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let crumbs = build_breadcrumbs(
            &view,
            &[QuestionId::root(), id("q-1")],
            "en",
            &LabelConfig::default(),
        );
        assert_eq!(crumbs[1].label, "Yes");
        assert!(!crumbs[0].is_last);
        assert!(crumbs[1].is_last);
        assert_eq!(
            crumbs[0].children,
            vec![BreadcrumbChild {
                id: id("q-1"),
                label: "Why yes?".to_string(),
                answer_label: "Yes".to_string(),
            }]
        );
    }

    #[test]
    fn falls_back_to_own_text_then_placeholder() {
        let store = store_with_child();
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let labels = LabelConfig::default();

        // No French answer text: own French text is empty too.
        assert_eq!(crumb_label(&view, &id("q-1"), "fr", &labels), "Untitled Question");

        let mut store = store_with_child();
        let mut child = store.get(&id("q-1")).unwrap().clone();
        child.text.set("fr", "Pourquoi?");
        store.put(id("q-1"), child);
        let view = GraphView::new(&store, &catalog);
        assert_eq!(crumb_label(&view, &id("q-1"), "fr", &labels), "Pourquoi?");
    }

    #[test]
    fn unresolved_entry_is_marked_deleted() {
        let store = QuestionStore::new(LANGS);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let crumbs = build_breadcrumbs(
            &view,
            &[QuestionId::root(), id("gone")],
            "en",
            &LabelConfig::default(),
        );
        assert!(crumbs[1].deleted);
        assert_eq!(crumbs[1].label, "⚠️ Deleted Question");
    }

    #[test]
    fn dangling_child_keeps_cached_text() {
        let mut store = store_with_child();
        store.remove(&id("q-1"));
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let children = question_children(&view, &QuestionId::root(), "en", &LabelConfig::default());
        assert_eq!(children[0].id, id("q-1"));
        assert_eq!(children[0].label, "Why yes?");
        assert_eq!(children[0].answer_label, "Yes");
    }

    #[test]
    fn dangling_child_without_cached_text_gets_deleted_label() {
        let mut store = store_with_child();
        store.remove(&id("q-1"));
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        // Nothing was cached in French.
        let children = question_children(&view, &QuestionId::root(), "fr", &LabelConfig::default());
        assert_eq!(children[0].label, "⚠️ Deleted Question");
    }
}
