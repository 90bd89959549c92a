// ABOUTME: CLI command definitions using clap
// ABOUTME: Defines account commands and the notes subcommands

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod auth;
pub mod notes;

#[derive(Parser, Debug)]
#[command(name = "notes", about = "Command-line client for the notes service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Auth service base URL (e.g., http://localhost:8082/api)
    #[arg(long, global = true, env = "NOTES_AUTH_API_URL")]
    pub auth_url: Option<String>,

    /// Notes service base URL (e.g., http://localhost:8081/api)
    #[arg(long, global = true, env = "NOTES_API_URL")]
    pub notes_url: Option<String>,

    /// Session file (defaults to ~/.config/notes/session.json)
    #[arg(long, global = true, env = "NOTES_SESSION_FILE")]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        username: String,

        email: String,

        /// Prompted for when omitted
        #[arg(long, env = "NOTES_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and store the session
    Login {
        username: String,

        /// Prompted for when omitted
        #[arg(long, env = "NOTES_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Ask for a password reset email
    ForgotPassword { email: String },

    /// Set a new password with a reset token
    ResetPassword {
        token: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Manage notes
    #[command(subcommand)]
    Notes(NotesCommand),
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List all your notes
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one note
    Get {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Create a note
    Create {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        json: bool,
    },

    /// Change the title and/or description of a note
    Update {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    #[command(alias = "delete")]
    Rm { id: i64 },

    /// Search titles and descriptions; an empty query lists everything
    Search {
        #[arg(default_value = "")]
        query: String,

        #[arg(long)]
        json: bool,
    },
}
