//! Command-line front end for the todo core.
//!
//! # Responsibility
//! - Parse commands and settings, open the configured store, call `TodoApi`.
//! - Print response projections as JSON on stdout.
//! - Map `TransportStatus` to process exit codes.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use todo_core::{
    default_log_level, ApiError, ApiResult, DbLocation, SqliteTodoRepository, TodoApi, TodoConfig,
    TodoId, TodoRequest, TodoService, TransportStatus,
};

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage todo items stored in SQLite")]
struct Cli {
    /// SQLite database file, or `:memory:` for a throwaway store.
    /// Defaults to `todo.sqlite3` in the system temp directory.
    #[arg(long, env = ENV_DB_PATH, global = true)]
    db: Option<String>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = ENV_LOG_LEVEL, global = true, default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, env = ENV_LOG_DIR, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List todos.
    List {
        #[arg(long, value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },
    /// Create a todo.
    Add { title: String },
    /// Replace a todo's title.
    Update { id: i64, title: String },
    /// Flip a todo's completion flag.
    Toggle { id: i64 },
    /// Delete a todo.
    Delete { id: i64 },
    /// Show one todo.
    Get { id: i64 },
    /// List todos by completion flag, in store order.
    Status {
        #[arg(action = clap::ArgAction::Set)]
        completed: bool,
    },
    /// Case-insensitive title search.
    Search { query: String },
    /// Print core linkage information.
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListFilter {
    All,
    /// Incomplete, newest created first.
    Incomplete,
    /// Completed, most recently updated first.
    Completed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Ping = cli.command {
        println!("todo_core ping={}", todo_core::ping());
        println!("todo_core version={}", todo_core::core_version());
        return ExitCode::SUCCESS;
    }

    let config = TodoConfig {
        db: db_location(cli.db.as_deref()),
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    };
    if let Err(err) = config.init_logging() {
        eprintln!("error_code=logging_init_failed message={err}");
        return ExitCode::from(1);
    }

    let conn = match config.open_db() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error_code={} message={err}", err.error_code());
            return ExitCode::from(1);
        }
    };
    let repo = match SqliteTodoRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error_code=db_open_failed message={err}");
            return ExitCode::from(1);
        }
    };
    let api = TodoApi::new(TodoService::new(repo));

    match run(&api, cli.command) {
        Ok(output) => {
            if let Some(json) = output {
                println!("{json}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err));
            ExitCode::from(exit_code(err.status()))
        }
    }
}

fn run(
    api: &TodoApi<SqliteTodoRepository<'_>>,
    command: Command,
) -> ApiResult<Option<String>> {
    let json = match command {
        Command::List { filter } => to_json(&match filter {
            ListFilter::All => api.list_all()?,
            ListFilter::Incomplete => api.list_incomplete()?,
            ListFilter::Completed => api.list_completed()?,
        })?,
        Command::Add { title } => to_json(&api.create(TodoRequest::new(title))?)?,
        Command::Update { id, title } => {
            to_json(&api.update(TodoId(id), TodoRequest::new(title))?)?
        }
        Command::Toggle { id } => to_json(&api.toggle(TodoId(id))?)?,
        Command::Delete { id } => {
            api.delete(TodoId(id))?;
            return Ok(None);
        }
        Command::Get { id } => to_json(&api.get(TodoId(id))?)?,
        Command::Status { completed } => to_json(&api.list_by_status(completed)?)?,
        Command::Search { query } => to_json(&api.search(&query)?)?,
        Command::Ping => return Ok(None),
    };
    Ok(Some(json))
}

/// Blank or missing settings fall back to the default file store.
fn db_location(setting: Option<&str>) -> DbLocation {
    setting
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(DbLocation::from_setting)
        .unwrap_or_default()
}

/// Pretty JSON in declaration order of the response fields.
fn to_json(value: &impl serde::Serialize) -> ApiResult<String> {
    serde_json::to_string_pretty(value).map_err(|err| ApiError::Internal(err.to_string()))
}

/// The single stderr line printed for a failed command.
fn failure_line(err: &ApiError) -> String {
    format!("error_code={} message={err}", err.error_code())
}

fn exit_code(status: TransportStatus) -> u8 {
    match status {
        TransportStatus::Ok => 0,
        TransportStatus::InternalError => 1,
        TransportStatus::BadRequest => 2,
        TransportStatus::NotFound => 3,
    }
}
