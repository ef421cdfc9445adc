use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "guichet")]
#[command(version = "0.1.0")]
#[command(about = "Multilingual assistant for public-administration procedures", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Interface language (fr, ar, am, en)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Reopen an existing conversation by id
    #[arg(long)]
    pub conversation: Option<String>,

    /// Non-interactive prompt to send
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Sign in and store the session token
    Login {
        /// Account email
        #[arg(long, conflicts_with = "demo")]
        email: Option<String>,
        /// Account password
        #[arg(long, env = "GUICHET_PASSWORD", hide_env_values = true, conflicts_with = "demo")]
        password: Option<String>,
        /// Use the guest account from the [demo] config section
        #[arg(long)]
        demo: bool,
    },
    /// Create an account and store its session token
    Register {
        /// Account email
        #[arg(long)]
        email: String,
        /// Public user name
        #[arg(long)]
        username: String,
        /// Account password
        #[arg(long, env = "GUICHET_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Preferred language (fr, ar, am, en); defaults to the configured one
        #[arg(long)]
        preferred_language: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List saved conversations
    Conversations,
    /// Print the history of one conversation
    Show {
        /// Conversation id
        id: String,
    },
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check server and configuration status
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
