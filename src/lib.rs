//! questree: authoring engine for branching quizzes.
//!
//! Questions form a graph: each answer either carries a correctness
//! judgment or points at a child question. The engine keeps question types
//! consistent with content, tracks the author's navigation path, and
//! projects the graph into breadcrumbs and a cycle-safe display tree.

// Core engine - re-exported from questree-core
pub use questree_core::breadcrumb;
pub use questree_core::catalog;
pub use questree_core::config;
pub use questree_core::error;
pub use questree_core::infer;
pub use questree_core::interaction;
pub use questree_core::navigation;
pub use questree_core::output;
pub use questree_core::question;
pub use questree_core::session;
pub use questree_core::store;
pub use questree_core::text;
pub use questree_core::tree;
pub use questree_core::types;
pub use questree_core::util;

// Front door
pub mod cli;
