//! Line-oriented command language driving an [`Editor`].
//!
//! One command per line, one JSON response per command on the output
//! stream. Blank lines and lines starting with `#` are skipped. Arguments
//! are split on whitespace; single or double quotes group words.
//!
//! ```text
//! text "Is it raining?"
//! answer-text 1 Yes
//! branch 1
//! text Do you have an umbrella?
//! back
//! breadcrumbs
//! ```
//!
//! ## Error Handling
//!
//! A failing command emits an error response and leaves the session as it
//! was. Scripts stop at the first failure unless `keep_going` is set; the
//! REPL always keeps going.

use std::io::{self, BufRead, IsTerminal, Write};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use questree_core::error::{ErrorCode, QuizError, QuizResult};
use questree_core::infer::resolve_effective_type;
use questree_core::interaction::{ConfirmPrompt, InteractionError, InteractionResult};
use questree_core::output::{emit_response, emit_response_compact, CommandResponse, ErrorResponse};
use questree_core::question::{AnswerUpdate, TextField};
use questree_core::session::Editor;
use questree_core::types::{AnswerId, Correctness, QuestionId, QuestionType, WrittenAnswerFormat};

// ============================================================================
// Terminal Prompt
// ============================================================================

/// Asks `[y/N]` on stderr and reads the reply from stdin.
///
/// Refuses with `NonTty` when stdin is not a terminal; pass `--yes` to run
/// destructive commands non-interactively.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> InteractionResult<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(InteractionError::NonTty);
        }
        let mut stderr = io::stderr();
        write!(stderr, "{} [y/N] ", message)?;
        stderr.flush()?;

        let mut reply = String::new();
        if stdin.read_line(&mut reply)? == 0 {
            return Err(InteractionError::Cancelled);
        }
        Ok(matches!(
            reply.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

// ============================================================================
// Command Language
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ScriptLine {
    #[command(subcommand)]
    command: ScriptCommand,
}

/// One editor command.
#[derive(Subcommand, Debug)]
enum ScriptCommand {
    /// Print the current question.
    Show,
    /// Set the question text in the active language.
    Text {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Set the hint in the active language.
    Hint {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Set the incorrect-answer feedback in the active language.
    Feedback {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    Category {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },
    /// Replace tags from a comma-separated list.
    Tags {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },
    /// Written-answer format: free-form, specific-format or none.
    Format { format: String },
    /// Switch the display language.
    Lang { code: String },
    AddAnswer,
    RemoveAnswer { answer: u32 },
    AnswerText {
        answer: u32,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    Explain {
        answer: u32,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    Order {
        answer: u32,
        #[arg(allow_hyphen_values = true)]
        order: i64,
    },
    /// Raw correctness write: correct, incorrect or unset.
    Correctness { answer: u32, value: String },
    /// Mark correct/incorrect, clearing any branch.
    Mark { answer: u32, verdict: String },
    /// Create a child question behind an answer and enter it.
    Branch { answer: u32 },
    /// Point an answer at an existing question (store or catalog).
    Link { answer: u32, question: String },
    Unlink { question: String, answer: u32 },
    /// Show where an answer leads.
    Follow { answer: u32 },
    Push { question: String },
    Back,
    Home,
    Jump { question: String },
    /// Follow a breadcrumb back to a question on the path.
    Crumb { question: String },
    Breadcrumbs,
    Tree { question: Option<String> },
    Delete { question: String },
    DeleteCrumb { index: usize },
    /// Request a type change (may await confirm/cancel).
    Type { kind: String },
    /// Change type, asking the prompt when confirmation is needed.
    Retype { kind: String },
    Confirm,
    Cancel,
    Search {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },
    /// Dump the whole question store.
    Export,
}

/// What one input line produced.
#[derive(Debug)]
pub enum LineOutcome {
    /// Blank line or comment.
    Skipped,
    Done(CommandResponse),
    Failed(ErrorResponse, ErrorCode),
}

/// Run one line against the editor.
pub fn process_line(editor: &mut Editor, line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return LineOutcome::Skipped;
    }

    let result = split_line(trimmed).and_then(|tokens| {
        let name = tokens.first().cloned().unwrap_or_default();
        let command = parse_command(&tokens)?;
        debug!(command = %name, "executing");
        let data = execute(editor, command)?;
        Ok(CommandResponse::new(
            name,
            editor.navigation().ids().to_vec(),
            data,
        ))
    });

    match result {
        Ok(response) => LineOutcome::Done(response),
        Err(err) => {
            let name = trimmed.split_whitespace().next().map(str::to_string);
            warn!(command = ?name, error = %err, "command failed");
            let code = ErrorCode::from(&err);
            LineOutcome::Failed(ErrorResponse::new(name, &err), code)
        }
    }
}

fn parse_command(tokens: &[String]) -> QuizResult<ScriptCommand> {
    ScriptLine::try_parse_from(tokens)
        .map(|line| line.command)
        .map_err(|err| {
            let rendered = err.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            QuizError::invalid_args(first.trim_start_matches("error: ").to_string())
        })
}

fn execute(editor: &mut Editor, command: ScriptCommand) -> QuizResult<Option<Value>> {
    let data = match command {
        ScriptCommand::Show => Some(show(editor)?),
        ScriptCommand::Text { words } => {
            editor.set_text(TextField::Question, &words.join(" "))?;
            None
        }
        ScriptCommand::Hint { words } => {
            editor.set_text(TextField::Hint, &words.join(" "))?;
            None
        }
        ScriptCommand::Feedback { words } => {
            editor.set_text(TextField::IncorrectFeedback, &words.join(" "))?;
            None
        }
        ScriptCommand::Category { words } => {
            editor.set_category(&words.join(" "))?;
            None
        }
        ScriptCommand::Tags { words } => {
            editor.set_tags_csv(&words.join(" "))?;
            None
        }
        ScriptCommand::Format { format } => {
            let format = match format.as_str() {
                "none" => None,
                other => Some(WrittenAnswerFormat::parse(other).ok_or_else(|| {
                    QuizError::invalid_args(format!("unknown written-answer format '{}'", other))
                })?),
            };
            editor.set_written_format(format)?;
            None
        }
        ScriptCommand::Lang { code } => {
            editor.set_language(code);
            None
        }
        ScriptCommand::AddAnswer => {
            let id = editor.add_answer()?;
            Some(json!({ "answer": id }))
        }
        ScriptCommand::RemoveAnswer { answer } => {
            editor.remove_answer(AnswerId::new(answer))?;
            None
        }
        ScriptCommand::AnswerText { answer, words } => {
            editor.update_answer(AnswerId::new(answer), AnswerUpdate::Text(words.join(" ")))?;
            None
        }
        ScriptCommand::Explain { answer, words } => {
            editor.update_answer(
                AnswerId::new(answer),
                AnswerUpdate::Explanation(words.join(" ")),
            )?;
            None
        }
        ScriptCommand::Order { answer, order } => {
            editor.update_answer(AnswerId::new(answer), AnswerUpdate::Order(order))?;
            None
        }
        ScriptCommand::Correctness { answer, value } => {
            let correctness = Correctness::parse(&value).ok_or_else(|| {
                QuizError::invalid_args(format!("unknown correctness '{}'", value))
            })?;
            editor.update_answer(AnswerId::new(answer), AnswerUpdate::Correctness(correctness))?;
            None
        }
        ScriptCommand::Mark { answer, verdict } => {
            let correct = match Correctness::parse(&verdict) {
                Some(Correctness::Correct) => true,
                Some(Correctness::Incorrect) => false,
                _ => {
                    return Err(QuizError::invalid_args(format!(
                        "mark expects correct or incorrect, got '{}'",
                        verdict
                    )))
                }
            };
            editor.mark_answer(AnswerId::new(answer), correct)?;
            None
        }
        ScriptCommand::Branch { answer } => {
            let id = editor.create_branch(AnswerId::new(answer))?;
            Some(json!({ "question": id }))
        }
        ScriptCommand::Link { answer, question } => {
            editor.link_existing(AnswerId::new(answer), &QuestionId::new(question))?;
            None
        }
        ScriptCommand::Unlink { question, answer } => {
            editor.unlink(&QuestionId::new(question), AnswerId::new(answer))?;
            None
        }
        ScriptCommand::Follow { answer } => {
            let view = editor.branch_question(AnswerId::new(answer))?;
            Some(to_data(&view)?)
        }
        ScriptCommand::Push { question } => {
            editor.push(&QuestionId::new(question))?;
            None
        }
        ScriptCommand::Back => {
            editor.pop();
            None
        }
        ScriptCommand::Home => {
            editor.reset_to_root();
            None
        }
        ScriptCommand::Jump { question } => {
            let outcome = editor.jump_to(&QuestionId::new(question))?;
            Some(to_data(&outcome)?)
        }
        ScriptCommand::Crumb { question } => {
            editor.truncate_to(&QuestionId::new(question))?;
            None
        }
        ScriptCommand::Breadcrumbs => Some(to_data(&editor.breadcrumbs())?),
        ScriptCommand::Tree { question } => {
            let root = question.map(QuestionId::new).unwrap_or_else(QuestionId::root);
            Some(to_data(&editor.tree_from(&root))?)
        }
        ScriptCommand::Delete { question } => {
            let outcome = editor.delete_question(&QuestionId::new(question))?;
            Some(to_data(&outcome)?)
        }
        ScriptCommand::DeleteCrumb { index } => {
            let outcome = editor.delete_breadcrumb(index)?;
            Some(to_data(&outcome)?)
        }
        ScriptCommand::Type { kind } => {
            let outcome = editor.request_type_change(parse_type(&kind)?)?;
            Some(to_data(&outcome)?)
        }
        ScriptCommand::Retype { kind } => {
            let outcome = editor.change_type_interactive(parse_type(&kind)?)?;
            Some(to_data(&outcome)?)
        }
        ScriptCommand::Confirm => Some(to_data(&editor.confirm_type_change()?)?),
        ScriptCommand::Cancel => Some(to_data(&editor.cancel_type_change()?)?),
        ScriptCommand::Search { words } => {
            let hits: Vec<Value> = editor
                .search_catalog(&words.join(" "))
                .into_iter()
                .map(|question| search_hit(question, editor.language()))
                .collect();
            Some(Value::Array(hits))
        }
        ScriptCommand::Export => Some(to_data(editor.store())?),
    };
    Ok(data)
}

fn show(editor: &Editor) -> QuizResult<Value> {
    let question = editor.current_question()?;
    let pending = editor.pending_type_change().map(|pending| {
        json!({ "question": pending.question, "requested": pending.requested })
    });
    Ok(json!({
        "question": question,
        "effective_type": resolve_effective_type(question),
        "branch_count": question.branch_count(),
        "language": editor.language(),
        "pending_type_change": pending,
    }))
}

/// Compact catalog search result.
pub fn search_hit(question: &questree_core::question::Question, language: &str) -> Value {
    json!({
        "id": question.id,
        "text": question.text.get(language),
        "category": question.category,
        "tags": question.tags,
    })
}

fn parse_type(kind: &str) -> QuizResult<QuestionType> {
    let parsed = match kind {
        "mc" => Some(QuestionType::MultipleChoice),
        "wa" => Some(QuestionType::WrittenAnswer),
        "dt" => Some(QuestionType::DecisionTree),
        other => QuestionType::parse(other),
    };
    parsed.ok_or_else(|| QuizError::invalid_args(format!("unknown question type '{}'", kind)))
}

fn to_data<T: Serialize + ?Sized>(value: &T) -> QuizResult<Value> {
    serde_json::to_value(value).map_err(|err| QuizError::Io(io::Error::from(err)))
}

/// Split a command line into words, honouring single and double quotes.
///
/// Inside double quotes `\"` and `\\` are escapes.
pub fn split_line(line: &str) -> QuizResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('"'), '\\') => match chars.next() {
                Some(escaped @ ('"' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(QuizError::invalid_args("unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

// ============================================================================
// Runners
// ============================================================================

/// Output and failure policy for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Pretty-print each response instead of one line per response.
    pub pretty: bool,
    /// Continue after a failing command.
    pub keep_going: bool,
}

/// Totals for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub failed: usize,
    /// Code of the most recent failure.
    pub last_error: Option<ErrorCode>,
}

/// Run every line of `input`, writing one response per command to `out`.
pub fn run_script<R: BufRead, W: Write>(
    editor: &mut Editor,
    input: R,
    out: &mut W,
    options: RunOptions,
) -> QuizResult<RunSummary> {
    let mut summary = RunSummary::default();
    for line in input.lines() {
        let line = line?;
        if !write_outcome(process_line(editor, &line), out, options, &mut summary)?
            && !options.keep_going
        {
            break;
        }
    }
    Ok(summary)
}

/// Interactive loop over stdin. `quit` or end of input stops it.
///
/// Reads one line at a time without holding the stdin lock, so a
/// [`TerminalPrompt`] can read its reply in between.
pub fn run_repl<W: Write>(editor: &mut Editor, out: &mut W, options: RunOptions) -> QuizResult<RunSummary> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut summary = RunSummary::default();
    loop {
        if interactive {
            let mut stderr = io::stderr();
            write!(stderr, "questree> ")?;
            stderr.flush()?;
        }
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        write_outcome(process_line(editor, &line), out, options, &mut summary)?;
    }
    Ok(summary)
}

/// Emit one outcome. Returns `false` if the command failed.
fn write_outcome<W: Write>(
    outcome: LineOutcome,
    out: &mut W,
    options: RunOptions,
    summary: &mut RunSummary,
) -> QuizResult<bool> {
    let ok = match &outcome {
        LineOutcome::Skipped => return Ok(true),
        LineOutcome::Done(response) => {
            emit(response, out, options.pretty)?;
            true
        }
        LineOutcome::Failed(response, code) => {
            emit(response, out, options.pretty)?;
            summary.failed += 1;
            summary.last_error = Some(*code);
            false
        }
    };
    summary.executed += 1;
    out.flush()?;
    Ok(ok)
}

fn emit<T: Serialize, W: Write>(response: &T, out: &mut W, pretty: bool) -> io::Result<()> {
    if pretty {
        emit_response(response, out)
    } else {
        emit_response_compact(response, out)
    }
}
