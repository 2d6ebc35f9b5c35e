mod cli;

use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;

use cli::{AiArgs, Cli, Command};
use zenkanban::board::{self, Board, Outcome, Step};
use zenkanban::db::SqliteStore;
use zenkanban::filter::{self, BoardView};
use zenkanban::generation::{self, Settlement};
use zenkanban::model::{now_millis, NewTask, Priority, Status};
use zenkanban::persist::{self, PersistObserver};
use zenkanban::suggest::{GeminiClient, GeminiConfig, TaskSuggester};
use zenkanban::{logging, output, paths, tui};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// `fallback_key` is the value of `API_KEY`, used when `GEMINI_API_KEY` and
/// `--api-key` are both absent.
fn gemini_config(ai: AiArgs, fallback_key: Option<String>) -> GeminiConfig {
    let api_key = ai.api_key.or(fallback_key).unwrap_or_default();
    GeminiConfig {
        api_key,
        model: ai.model,
        endpoint: ai.endpoint,
    }
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{what} must not be empty");
    }
    Ok(())
}

/// Turn a non-applied outcome into the error the user sees.
fn check_outcome(outcome: Outcome, id: &str) -> Result<()> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::NotFound => bail!("task '{id}' not found"),
        Outcome::AtEdge => bail!("task '{id}' cannot move further in that direction"),
    }
}

fn step(board: &mut Board, query: &str, step: Step) -> Result<()> {
    let id = board::resolve_id(board.state(), query)?.to_string();
    check_outcome(board.step_task(&id, step)?, &id)?;
    if let Some(task) = board.state().get(&id) {
        eprintln!("Moved '{}' to {}", task.title, task.status);
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let db_path = paths::db_path(cli.db)?;
    paths::ensure_parent_dir(&db_path)?;
    logging::init(
        cli.log_file.as_deref(),
        matches!(cli.command, Command::Ui { .. }),
    )?;

    let store = Rc::new(SqliteStore::open(&db_path)?);
    let state = persist::load_or_default(&*store, now_millis())?;
    let mut board = Board::new(state);
    board.subscribe(Box::new(PersistObserver::new(Rc::clone(&store))));

    match cli.command {
        Command::Add {
            title,
            desc,
            priority,
            status,
            json,
        } => {
            require_text(&title, "task title")?;
            let draft = NewTask {
                title,
                description: desc,
                priority: Priority::parse(&priority)?,
                status: Status::parse(&status)?,
            };
            let id = board.add_task(draft)?;
            let task = board
                .state()
                .get(&id)
                .context("added task missing from board")?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                println!("{id}");
            }
            eprintln!("Added '{}' to {}", task.title, task.status);
        }

        Command::Move { id, status } => {
            let status = Status::parse(&status)?;
            let id = board::resolve_id(board.state(), &id)?.to_string();
            check_outcome(board.move_task(&id, status)?, &id)?;
            eprintln!("Moved '{id}' to {status}");
        }

        Command::Forward { id } => step(&mut board, &id, Step::Forward)?,

        Command::Back { id } => step(&mut board, &id, Step::Back)?,

        Command::Rm { id } => {
            let id = board::resolve_id(board.state(), &id)?.to_string();
            check_outcome(board.delete_task(&id)?, &id)?;
            eprintln!("Removed task '{id}'");
        }

        Command::Show { id, json } => {
            let id = board::resolve_id(board.state(), &id)?;
            let task = board
                .state()
                .get(id)
                .with_context(|| format!("task '{id}' not found"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                print!("{}", output::format_task_detail(task));
            }
        }

        Command::List {
            search,
            status,
            json,
        } => {
            let status = status.map(|s| Status::parse(&s)).transpose()?;
            let query = search.unwrap_or_default();
            let mut tasks = filter::filter_tasks(&board.state().tasks, &query);
            if let Some(status) = status {
                tasks.retain(|t| t.status == status);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print!("{}", output::format_task_list(&tasks));
            }
        }

        Command::Board { search } => {
            let query = search.unwrap_or_default();
            let view = BoardView::build(board.state(), &query);
            print!(
                "{}",
                output::format_board(&view, &board.state().project_name)
            );
        }

        Command::Suggest { description, ai } => {
            let description =
                description.unwrap_or_else(|| board.state().project_name.clone());
            require_text(&description, "project description")?;
            let client = GeminiClient::new(gemini_config(ai, std::env::var("API_KEY").ok()))?;
            eprintln!("Generating tasks for '{description}'...");
            match generation::run_blocking(&mut board, &client, &description)? {
                Settlement::Added(ids) => {
                    for id in &ids {
                        if let Some(task) = board.state().get(id) {
                            println!("{}  {}", output::short_id(id), task.title);
                        }
                    }
                    eprintln!("Added {} tasks to Backlog", ids.len());
                }
                Settlement::Failed(notice) => {
                    eprintln!("{notice}");
                    std::process::exit(1);
                }
            }
        }

        Command::Ui { ai } => {
            let suggester: Option<Arc<dyn TaskSuggester>> =
                match GeminiClient::new(gemini_config(ai, std::env::var("API_KEY").ok())) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        warn!("AI helper disabled: {e:#}");
                        None
                    }
                };
            tui::run(&db_path, store, board, suggester)?;
        }
    }

    Ok(())
}
