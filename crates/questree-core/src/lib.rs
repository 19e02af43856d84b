//! Core engine for questree.
//!
//! This crate provides the authoring model for branching quizzes:
//! - Question graph model and the id-keyed question store
//! - Type inference (multiple choice, written answer, decision tree)
//! - Navigation stack, path finding, breadcrumbs and the display tree
//! - Deletion and unlinking of branches
//! - The `Editor` session tying it all together
//! - Configuration, error codes and JSON output types

pub mod breadcrumb;
pub mod catalog;
pub mod config;
pub mod error;
pub mod infer;
pub mod interaction;
pub mod navigation;
pub mod output;
pub mod question;
pub mod session;
pub mod store;
pub mod text;
pub mod tree;
pub mod types;
pub mod util;

pub use error::{ErrorCode, QuizError, QuizResult};
pub use session::{BranchView, DeleteOutcome, Editor, TypeChangeOutcome};
pub use types::{AnswerId, Correctness, QuestionId, QuestionType};
