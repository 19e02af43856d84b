//! Navigation: the author's drill-down path from root, and path
//! reconstruction over forward answer edges.
//!
//! The stack holds question ids starting at `"root"`, each consecutive pair
//! joined by a parent→child answer edge. The one exception is a jump to a
//! node unreachable from root, which leaves the single-element path `[id]`.
//!
//! The stack itself does no store lookups; [`crate::session::Editor`]
//! validates ids before moving it.

use std::collections::HashSet;

use serde::Serialize;

use crate::store::GraphView;
use crate::types::QuestionId;

/// Non-empty sequence of question ids; the last one is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationStack {
    ids: Vec<QuestionId>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        NavigationStack::new()
    }
}

impl NavigationStack {
    /// A stack at root.
    pub fn new() -> Self {
        NavigationStack {
            ids: vec![QuestionId::root()],
        }
    }

    /// The current (top) id.
    pub fn current(&self) -> &QuestionId {
        match self.ids.last() {
            Some(id) => id,
            None => unreachable!("navigation stack is never empty"),
        }
    }

    pub fn ids(&self) -> &[QuestionId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.ids.contains(id)
    }

    /// Index of the first occurrence of `id`.
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.ids.iter().position(|entry| entry == id)
    }

    pub fn push(&mut self, id: QuestionId) {
        self.ids.push(id);
    }

    /// Drop the current id; no-op at the bottom of the stack.
    pub fn pop(&mut self) -> Option<QuestionId> {
        if self.ids.len() > 1 {
            self.ids.pop()
        } else {
            None
        }
    }

    pub fn reset_to_root(&mut self) {
        self.ids = vec![QuestionId::root()];
    }

    /// Replace the whole path. An empty path resets to root.
    pub fn replace(&mut self, path: Vec<QuestionId>) {
        if path.is_empty() {
            self.reset_to_root();
        } else {
            self.ids = path;
        }
    }

    /// Keep the prefix ending at the first occurrence of `id`.
    ///
    /// Returns `false` (stack unchanged) when `id` is not on the stack.
    pub fn truncate_to(&mut self, id: &QuestionId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.truncate(index + 1);
                true
            }
            None => false,
        }
    }

    /// Keep the prefix strictly before index `index`.
    ///
    /// Truncating to nothing falls back to `["root"]`.
    pub fn truncate_before(&mut self, index: usize) {
        if index == 0 {
            self.reset_to_root();
        } else {
            self.ids.truncate(index);
        }
    }
}

/// Result of a jump to an arbitrary node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum JumpOutcome {
    /// A path from root was found; the stack is now that path.
    Path { path: Vec<QuestionId> },
    /// No path from root; the stack is now `[id]`.
    Detached { id: QuestionId },
}

/// Depth-first search from root to `target` over forward answer edges.
///
/// Returns the first discovered path (root first, target last). The visited
/// set lives for this call only, so cycles terminate.
pub fn find_path(view: &GraphView<'_>, target: &QuestionId) -> Option<Vec<QuestionId>> {
    let root = QuestionId::root();
    let mut visited = HashSet::new();
    let mut path = vec![root.clone()];
    if search(view, &root, target, &mut visited, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn search(
    view: &GraphView<'_>,
    current: &QuestionId,
    target: &QuestionId,
    visited: &mut HashSet<QuestionId>,
    path: &mut Vec<QuestionId>,
) -> bool {
    if current == target {
        return true;
    }
    if !visited.insert(current.clone()) {
        return false;
    }
    let Some(question) = view.resolve(current) else {
        return false;
    };
    for (_, child) in question.branches() {
        path.push(child.clone());
        if search(view, child, target, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}
