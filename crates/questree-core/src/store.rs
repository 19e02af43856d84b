//! Question store: the mutable, id-keyed table of every question known to
//! the session.
//!
//! The store is a plain map. It does no merging and no validation beyond
//! guaranteeing that `"root"` is always present; callers compose updates
//! before writing (see [`crate::infer::apply_question_update`]).
//!
//! [`GraphView`] layers the read-only catalog behind the store so traversal
//! code can resolve an id without caring where it lives.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::QuestionCatalog;
use crate::question::Question;
use crate::types::QuestionId;

/// Id-keyed question table. Always contains `"root"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuestionStore {
    questions: BTreeMap<QuestionId, Question>,
}

impl QuestionStore {
    /// A store seeded with a blank root question.
    pub fn new<S: AsRef<str>>(languages: &[S]) -> Self {
        QuestionStore::with_root(Question::blank(QuestionId::root(), languages))
    }

    /// A store seeded with the given root question.
    pub fn with_root(mut root: Question) -> Self {
        root.id = QuestionId::root();
        let mut questions = BTreeMap::new();
        questions.insert(QuestionId::root(), root);
        QuestionStore { questions }
    }

    /// Build a store from existing questions, seeding a blank root if absent.
    pub fn from_questions<S: AsRef<str>>(
        questions: impl IntoIterator<Item = Question>,
        languages: &[S],
    ) -> Self {
        let mut store = QuestionStore {
            questions: questions
                .into_iter()
                .map(|question| (question.id.clone(), question))
                .collect(),
        };
        if !store.contains(&QuestionId::root()) {
            store.put(
                QuestionId::root(),
                Question::blank(QuestionId::root(), languages),
            );
        }
        store
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.contains_key(id)
    }

    /// The root question.
    pub fn root(&self) -> &Question {
        // Every constructor seeds root and `remove` refuses it.
        match self.questions.get(&QuestionId::root()) {
            Some(root) => root,
            None => unreachable!("question store lost its root"),
        }
    }

    /// Full replace of the entry at `id`. The question's own id is set to `id`.
    pub fn put(&mut self, id: QuestionId, mut question: Question) {
        question.id = id.clone();
        self.questions.insert(id, question);
    }

    /// Remove the entry at `id`. The root entry is never removed.
    pub fn remove(&mut self, id: &QuestionId) -> Option<Question> {
        if id.is_root() {
            return None;
        }
        self.questions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    /// Questions whose answers point at `id`, in id order.
    pub fn parents_of(&self, id: &QuestionId) -> Vec<&QuestionId> {
        self.questions
            .iter()
            .filter(|(_, question)| question.answers.iter().any(|a| a.branches_to(id)))
            .map(|(parent, _)| parent)
            .collect()
    }
}

impl<'de> Deserialize<'de> for QuestionStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let questions = BTreeMap::<QuestionId, Question>::deserialize(deserializer)?;
        let no_languages: &[&str] = &[];
        let mut store = QuestionStore::from_questions(std::iter::empty::<Question>(), no_languages);
        for (id, question) in questions {
            store.put(id, question);
        }
        Ok(store)
    }
}

/// Read-only lookup chain: store first, then catalog.
#[derive(Clone, Copy)]
pub struct GraphView<'a> {
    store: &'a QuestionStore,
    catalog: &'a dyn QuestionCatalog,
}

impl<'a> GraphView<'a> {
    pub fn new(store: &'a QuestionStore, catalog: &'a dyn QuestionCatalog) -> Self {
        GraphView { store, catalog }
    }

    /// Resolve `id` in the store, falling back to the catalog.
    pub fn resolve(&self, id: &QuestionId) -> Option<&'a Question> {
        self.store.get(id).or_else(|| self.catalog.get(id))
    }

    pub fn store(&self) -> &'a QuestionStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::question::BranchTarget;

    const LANGS: &[&str] = &["en"];

    #[test]
    fn new_store_contains_root() {
        let store = QuestionStore::new(LANGS);
        assert!(store.contains(&QuestionId::root()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.root().id, QuestionId::root());
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut store = QuestionStore::new(LANGS);
        assert!(store.remove(&QuestionId::root()).is_none());
        assert!(store.contains(&QuestionId::root()));
    }

    #[test]
    fn put_is_full_replace_and_normalizes_id() {
        let mut store = QuestionStore::new(LANGS);
        let mut q = Question::blank(QuestionId::new("wrong"), LANGS);
        q.category = "Science".to_string();
        store.put(QuestionId::new("q-1"), q);

        let stored = store.get(&QuestionId::new("q-1")).unwrap();
        assert_eq!(stored.id, QuestionId::new("q-1"));
        assert_eq!(stored.category, "Science");
        assert!(store.get(&QuestionId::new("wrong")).is_none());

        store.put(QuestionId::new("q-1"), Question::blank(QuestionId::new("q-1"), LANGS));
        assert_eq!(store.get(&QuestionId::new("q-1")).unwrap().category, "Other");
    }

    #[test]
    fn from_questions_seeds_missing_root() {
        let store = QuestionStore::from_questions(
            vec![Question::blank(QuestionId::new("q-1"), LANGS)],
            LANGS,
        );
        assert_eq!(store.len(), 2);
        assert!(store.contains(&QuestionId::root()));
    }

    #[test]
    fn deserialized_store_keys_by_map_key_and_keeps_root() {
        let json = r#"{"q-7": {"id": "ignored", "answers": []}}"#;
        let store: QuestionStore = serde_json::from_str(json).unwrap();
        assert!(store.contains(&QuestionId::root()));
        assert_eq!(store.get(&QuestionId::new("q-7")).unwrap().id, QuestionId::new("q-7"));
    }

    #[test]
    fn parents_of_follows_forward_edges() {
        let mut store = QuestionStore::new(LANGS);
        let child = Question::blank(QuestionId::new("q-1"), LANGS);
        let mut root = store.root().clone();
        root.answers[0].set_branch(BranchTarget::to_question(&child));
        store.put(QuestionId::root(), root);
        store.put(child.id.clone(), child);

        assert_eq!(store.parents_of(&QuestionId::new("q-1")), vec![&QuestionId::root()]);
        assert!(store.parents_of(&QuestionId::root()).is_empty());
    }

    #[test]
    fn graph_view_falls_back_to_catalog() {
        let store = QuestionStore::new(LANGS);
        let catalog = InMemoryCatalog::sample();
        let view = GraphView::new(&store, &catalog);

        assert!(view.resolve(&QuestionId::root()).is_some());
        assert!(view.resolve(&QuestionId::new("existing-1")).is_some());
        assert!(view.resolve(&QuestionId::new("missing")).is_none());
    }
}
