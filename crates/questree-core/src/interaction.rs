//! Confirmation prompt capability for destructive changes.
//!
//! The engine never talks to a terminal or a dialog directly. Before a
//! destructive change (collapsing a decision tree, deleting a question) it
//! asks an injected [`ConfirmPrompt`] and only proceeds on `Ok(true)`.
//!
//! Implementations:
//!
//! - [`AutoConfirm`]: always says yes (tests, `--yes` on the CLI)
//! - [`AlwaysDecline`]: always says no (non-interactive safety default)
//! - [`ScriptedPrompt`]: replays a queue of answers and records the messages
//! - any `Fn(&str) -> bool` closure
//!
//! The terminal prompt lives in the CLI crate.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

/// Error type for interaction operations
#[derive(Error, Debug)]
pub enum InteractionError {
    /// User cancelled the operation (e.g., end of input)
    #[error("operation cancelled by user")]
    Cancelled,

    /// Standard input is not a TTY (e.g., running in CI or piped input)
    #[error("stdin is not a TTY - interactive input unavailable")]
    NonTty,

    /// IO error during interaction
    #[error("IO error: {0}")]
    Io(String),

    /// Other interaction error
    #[error("{0}")]
    Other(String),
}

impl InteractionError {
    /// Create a new IO error
    pub fn io(err: impl fmt::Display) -> Self {
        Self::Io(err.to_string())
    }

    /// Create a new other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<std::io::Error> for InteractionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for interaction operations
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Synchronous yes/no confirmation capability.
///
/// The trait is object-safe, allowing it to be used as `Box<dyn ConfirmPrompt>`.
pub trait ConfirmPrompt: Send + Sync {
    /// Ask the user to confirm `message`.
    ///
    /// # Returns
    /// `true` to proceed, `false` to abandon the change
    ///
    /// # Errors
    /// Returns `InteractionError::Cancelled` if the user cancels, `NonTty` if not interactive
    fn confirm(&self, message: &str) -> InteractionResult<bool>;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> InteractionResult<bool> {
        Ok(self(message))
    }
}

/// Confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _message: &str) -> InteractionResult<bool> {
        Ok(true)
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

impl ConfirmPrompt for AlwaysDecline {
    fn confirm(&self, _message: &str) -> InteractionResult<bool> {
        Ok(false)
    }
}

/// Replays queued answers in order and records every message it was asked.
///
/// Once the queue is exhausted it returns `InteractionError::Cancelled`.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedPrompt {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Messages asked so far, oldest first.
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str) -> InteractionResult<bool> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|_| InteractionError::other("prompt state poisoned"))?;
        answers.pop_front().ok_or(InteractionError::Cancelled)
    }
}
