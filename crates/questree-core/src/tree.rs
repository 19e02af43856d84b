//! Display tree: a cycle-safe unrolling of the question graph from a root.
//!
//! Shared nodes appear once per distinct path. A node already on the current
//! path is cut off, so linked cycles produce a finite tree.

use std::collections::HashSet;

use serde::Serialize;

use crate::question::{Answer, Question};
use crate::store::GraphView;
use crate::types::QuestionId;

/// A node of the display tree, borrowing from the store/catalog.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<'a> {
    pub id: QuestionId,
    pub question: &'a Question,
    pub children: Vec<TreeChild<'a>>,
}

/// An answer edge and the subtree it leads to.
#[derive(Debug, Clone, Serialize)]
pub struct TreeChild<'a> {
    pub answer: &'a Answer,
    pub node: TreeNode<'a>,
}

impl TreeNode<'_> {
    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|child| child.node.size()).sum::<usize>()
    }

    /// Longest root-to-leaf path length in nodes.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.node.depth())
            .max()
            .unwrap_or(0)
    }
}

/// Build the display tree rooted at `id`.
///
/// Returns `None` if `id` does not resolve.
pub fn build_tree<'a>(view: &GraphView<'a>, id: &QuestionId) -> Option<TreeNode<'a>> {
    build_node(view, id, &HashSet::new())
}

/// `visited` holds the ids on the path to this node. Each child gets its own
/// copy so siblings never suppress each other.
fn build_node<'a>(
    view: &GraphView<'a>,
    id: &QuestionId,
    visited: &HashSet<QuestionId>,
) -> Option<TreeNode<'a>> {
    if visited.contains(id) {
        return None;
    }
    let question = view.resolve(id)?;

    let mut on_path = visited.clone();
    on_path.insert(id.clone());

    let children = question
        .branches()
        .filter_map(|(answer, child_id)| {
            let node = build_node(view, child_id, &on_path)?;
            Some(TreeChild { answer, node })
        })
        .collect();

    Some(TreeNode {
        id: id.clone(),
        question,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::question::BranchTarget;
    use crate::store::QuestionStore;
    use crate::types::AnswerId;

    const LANGS: &[&str] = &["en"];

    fn id(value: &str) -> QuestionId {
        QuestionId::new(value)
    }

    fn link(store: &mut QuestionStore, from: &str, to: &[&str]) {
        let mut question = store
            .get(&id(from))
            .cloned()
            .unwrap_or_else(|| Question::blank(id(from), LANGS));
        question.answers.clear();
        for (index, target) in to.iter().enumerate() {
            let mut answer = Answer::new(AnswerId::new(index as u32 + 1), index as i64, LANGS);
            answer.set_branch(BranchTarget::new(id(target), Default::default()));
            question.answers.push(answer);
        }
        store.put(id(from), question);
        for target in to {
            if !store.contains(&id(target)) {
                store.put(id(target), Question::blank(id(target), LANGS));
            }
        }
    }

    #[test]
    fn unresolved_root_yields_none() {
        let store = QuestionStore::new(LANGS);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        assert!(build_tree(&view, &id("nope")).is_none());
    }

    #[test]
    fn single_root_tree() {
        let store = QuestionStore::new(LANGS);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        assert_eq!(tree.size(), 1);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn cycle_is_cut_off() {
        let mut store = QuestionStore::new(LANGS);
        link(&mut store, "root", &["b"]);
        link(&mut store, "b", &["root"]);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);

        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        assert_eq!(tree.size(), 2);
        assert_eq!(tree.children[0].node.id, id("b"));
        assert!(tree.children[0].node.children.is_empty());
    }

    #[test]
    fn shared_node_appears_once_per_path() {
        // root -> a -> shared, root -> b -> shared
        let mut store = QuestionStore::new(LANGS);
        link(&mut store, "root", &["a", "b"]);
        link(&mut store, "a", &["shared"]);
        link(&mut store, "b", &["shared"]);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);

        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let mut store = QuestionStore::new(LANGS);
        link(&mut store, "root", &["a", "gone"]);
        store.remove(&id("gone"));
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);

        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].answer.id, AnswerId::new(1));
    }

    #[test]
    fn children_follow_answer_order() {
        let mut store = QuestionStore::new(LANGS);
        link(&mut store, "root", &["a", "b"]);
        let mut root = store.root().clone();
        root.answers[0].order = 10;
        store.put(QuestionId::root(), root);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);

        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        let ids: Vec<&str> = tree.children.iter().map(|c| c.node.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn tree_serializes() {
        let mut store = QuestionStore::new(LANGS);
        link(&mut store, "root", &["a"]);
        let catalog = InMemoryCatalog::new();
        let view = GraphView::new(&store, &catalog);
        let tree = build_tree(&view, &QuestionId::root()).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["id"], "root");
        assert_eq!(json["children"][0]["node"]["id"], "a");
    }
}
