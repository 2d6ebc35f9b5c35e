use clap::{Args, Parser, Subcommand};
use zenkanban::suggest::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "zenkanban", about = "Kanban board for the terminal")]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.zenkanban/zenkanban.db]
    #[arg(long, env = "ZENKANBAN_DB", global = true)]
    pub db: Option<String>,

    /// Append logs to this file
    #[arg(long, env = "ZENKANBAN_LOG", global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings for the Gemini task helper.
#[derive(Args)]
pub struct AiArgs {
    /// Gemini API key (falls back to API_KEY)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Gemini model name
    #[arg(long, env = "ZENKANBAN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Gemini API base URL
    #[arg(long, env = "ZENKANBAN_GEMINI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long, default_value = "")]
        desc: String,
        /// Priority (Low, Medium, High, Urgent)
        #[arg(short, long, default_value = "Medium")]
        priority: String,
        /// Column (Backlog, To Do, In Progress, Review, Done)
        #[arg(short, long, default_value = "To Do")]
        status: String,
        /// Print the created task as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a task to a column
    Move {
        /// Task id or unique id prefix
        id: String,
        /// Target column
        status: String,
    },

    /// Move a task one column to the right
    Forward {
        /// Task id or unique id prefix
        id: String,
    },

    /// Move a task one column to the left
    Back {
        /// Task id or unique id prefix
        id: String,
    },

    /// Remove a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Show task details
    Show {
        /// Task id or unique id prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks
    List {
        /// Only tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
        /// Only tasks in this column
        #[arg(long)]
        status: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the board column by column
    Board {
        /// Only tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Add AI-suggested tasks to the Backlog
    Suggest {
        /// Project or goal description [default: the project name]
        description: Option<String>,
        #[command(flatten)]
        ai: AiArgs,
    },

    /// Launch the interactive board
    Ui {
        #[command(flatten)]
        ai: AiArgs,
    },
}
