//! Binary entry point for the questree CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Run an authoring script, one JSON response per command
//! questree run build-quiz.qt
//!
//! # Interactive session
//! questree repl --language fr
//!
//! # Search the existing-questions catalog
//! questree --catalog questions.json catalog search capital
//!
//! # Show resolved configuration
//! questree config
//! ```

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use questree::cli::{run_repl, run_script, search_hit, RunOptions, RunSummary, TerminalPrompt};
use questree_core::catalog::{InMemoryCatalog, QuestionCatalog};
use questree_core::config::{CliOverrides, ResolvedConfig, CONFIG_FILE_NAME, LANGUAGE_ENV_VAR};
use questree_core::error::{ErrorCode, QuizError, QuizResult};
use questree_core::interaction::{AutoConfirm, ConfirmPrompt};
use questree_core::output::{emit_response, CommandResponse, ErrorResponse};
use questree_core::session::Editor;

// ============================================================================
// CLI Structure
// ============================================================================

/// Author branching quizzes from the command line.
///
/// All output on stdout is JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "questree", version, about = "Question-graph authoring engine")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Config file (default: questree/config.toml in the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Display language (overrides QUESTREE_LANGUAGE and the config file).
    #[arg(long, global = true)]
    language: Option<String>,

    /// Existing-questions catalog as a JSON object of id -> question.
    ///
    /// Without it a one-entry sample catalog (`existing-1`) is used.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Confirm every destructive change without asking.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Pretty-print JSON responses.
    #[arg(long, global = true)]
    pretty: bool,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a script of editor commands.
    Run {
        /// Script file; `-` reads stdin.
        script: PathBuf,
        /// Continue after a failing command.
        #[arg(long)]
        keep_going: bool,
    },
    /// Interactive editor session on stdin.
    Repl,
    /// Query the existing-questions catalog.
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Print the resolved configuration.
    Config,
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    /// Case-insensitive search over text, category and tags.
    Search {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(summary) => match summary.last_error {
            Some(code) => ExitCode::from(code.code()),
            None => ExitCode::SUCCESS,
        },
        Err(err) => {
            let error_code = ErrorCode::from(&err);
            let response = ErrorResponse::new(None, &err);

            // Errors go to stdout as JSON like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> QuizResult<RunSummary> {
    let resolved = resolve_config(&cli.global)?;
    tracing::debug!(
        config = ?resolved.config_path,
        language = %resolved.language.value,
        source = ?resolved.language.source,
        "configuration resolved"
    );

    match cli.command {
        Command::Run { script, keep_going } => {
            let mut editor = open_editor(&cli.global, resolved)?;
            let options = RunOptions {
                pretty: cli.global.pretty,
                keep_going,
            };
            let mut stdout = io::stdout();
            if script.as_os_str() == "-" {
                run_script(&mut editor, io::stdin().lock(), &mut stdout, options)
            } else {
                let file = File::open(&script).map_err(|e| {
                    QuizError::invalid_args(format!("cannot open script {}: {}", script.display(), e))
                })?;
                run_script(&mut editor, BufReader::new(file), &mut stdout, options)
            }
        }
        Command::Repl => {
            let mut editor = open_editor(&cli.global, resolved)?;
            let options = RunOptions {
                pretty: cli.global.pretty,
                keep_going: true,
            };
            // The REPL reports failures inline; only IO errors end it.
            run_repl(&mut editor, &mut io::stdout(), options)?;
            Ok(RunSummary::default())
        }
        Command::Catalog {
            action: CatalogAction::Search { words },
        } => {
            let catalog = load_catalog(&cli.global)?;
            let language = resolved.language.value;
            let hits: Vec<_> = catalog
                .search(&words.join(" "), &language)
                .into_iter()
                .map(|question| search_hit(question, &language))
                .collect();
            let response = CommandResponse::new("catalog search", Vec::new(), Some(json!(hits)));
            emit(&response, cli.global.pretty)?;
            Ok(RunSummary::default())
        }
        Command::Config => {
            let data = json!({
                "config": resolved.config,
                "config_path": resolved.config_path,
                "language": resolved.language,
            });
            let response = CommandResponse::new("config", Vec::new(), Some(data));
            emit(&response, cli.global.pretty)?;
            Ok(RunSummary::default())
        }
    }
}

fn resolve_config(global: &GlobalArgs) -> QuizResult<ResolvedConfig> {
    let overrides = CliOverrides {
        config_path: global.config.clone(),
        language: global.language.clone(),
    };
    let default_path = dirs::config_dir().map(|dir| dir.join("questree").join(CONFIG_FILE_NAME));
    ResolvedConfig::resolve(
        &overrides,
        default_path.as_deref(),
        std::env::var(LANGUAGE_ENV_VAR).ok(),
    )
}

fn load_catalog(global: &GlobalArgs) -> QuizResult<InMemoryCatalog> {
    match &global.catalog {
        Some(path) => InMemoryCatalog::from_json_file(path),
        None => Ok(InMemoryCatalog::sample()),
    }
}

fn open_editor(global: &GlobalArgs, resolved: ResolvedConfig) -> QuizResult<Editor> {
    let catalog = load_catalog(global)?;
    let prompt: Box<dyn ConfirmPrompt> = if global.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalPrompt)
    };
    Ok(Editor::new(
        resolved.config,
        resolved.language.value,
        Box::new(catalog),
        prompt,
    ))
}

fn emit(response: &CommandResponse, pretty: bool) -> QuizResult<()> {
    let mut stdout = io::stdout();
    if pretty {
        emit_response(response, &mut stdout)?;
    } else {
        questree_core::output::emit_response_compact(response, &mut stdout)?;
    }
    Ok(())
}
