//! Error types and error code constants for questree.
//!
//! `QuizError` is the single error type crossing the engine boundary. Every
//! variant is recoverable: an operation that returns an error has left the
//! session exactly as it found it.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from the caller)
//! - `3`: Not found (question, answer, or breadcrumb does not resolve)
//! - `4`: Invalid mutation (the change would break a model invariant)
//! - `5`: Interaction failure (confirmation prompt could not be answered)
//! - `10`: Internal errors (IO, configuration)

use std::fmt;

use thiserror::Error;

use crate::interaction::InteractionError;
use crate::types::{AnswerId, QuestionId};

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Invalid arguments from caller (bad input, malformed command).
    InvalidArguments = 2,
    /// A referenced question or answer does not resolve.
    NotFound = 3,
    /// The mutation was refused to keep the model consistent.
    InvalidMutation = 4,
    /// The confirmation prompt failed.
    Interaction = 5,
    /// Internal errors (IO, configuration).
    Internal = 10,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Short machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArguments => "invalid-arguments",
            ErrorCode::NotFound => "not-found",
            ErrorCode::InvalidMutation => "invalid-mutation",
            ErrorCode::Interaction => "interaction",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for engine and CLI.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The question id resolves in neither the store nor the catalog.
    #[error("question not found: {id}")]
    NotFound { id: QuestionId },

    /// The answer id does not exist on the question.
    #[error("answer {answer} not found on question {question}")]
    AnswerNotFound {
        question: QuestionId,
        answer: AnswerId,
    },

    /// The mutation would violate a model invariant.
    #[error("invalid mutation: {message}")]
    InvalidMutation { message: String },

    /// A breadcrumb target is not on the navigation stack.
    #[error("question {id} is not on the navigation path")]
    NotOnPath { id: QuestionId },

    /// `confirm`/`cancel` without a pending type change.
    #[error("no type change is awaiting confirmation")]
    NoPendingTypeChange,

    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The confirmation prompt failed.
    #[error("interaction failed: {0}")]
    Interaction(#[from] InteractionError),

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error (config/catalog loading, CLI streams).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type QuizResult<T> = Result<T, QuizError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&QuizError> for ErrorCode {
    fn from(err: &QuizError) -> Self {
        match err {
            QuizError::NotFound { .. } => ErrorCode::NotFound,
            QuizError::AnswerNotFound { .. } => ErrorCode::NotFound,
            QuizError::NotOnPath { .. } => ErrorCode::NotFound,
            QuizError::InvalidMutation { .. } => ErrorCode::InvalidMutation,
            QuizError::NoPendingTypeChange => ErrorCode::InvalidMutation,
            QuizError::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            QuizError::Interaction(_) => ErrorCode::Interaction,
            QuizError::Config { .. } => ErrorCode::Internal,
            QuizError::Io(_) => ErrorCode::Internal,
        }
    }
}

impl From<QuizError> for ErrorCode {
    fn from(err: QuizError) -> Self {
        ErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl QuizError {
    pub fn not_found(id: &QuestionId) -> Self {
        QuizError::NotFound { id: id.clone() }
    }

    pub fn answer_not_found(question: &QuestionId, answer: AnswerId) -> Self {
        QuizError::AnswerNotFound {
            question: question.clone(),
            answer,
        }
    }

    pub fn invalid_mutation(message: impl Into<String>) -> Self {
        QuizError::InvalidMutation {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        QuizError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        QuizError::Config {
            message: message.into(),
        }
    }

    /// The stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }
}
