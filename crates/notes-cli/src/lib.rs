// ABOUTME: Library side of the notes CLI: config resolution and command dispatch
// ABOUTME: Builds one SessionContext per invocation over the persisted session

use std::sync::Arc;

use anyhow::Result;
use notes_session::config::{self, FileConfig, Overrides};
use notes_session::{SessionConfig, SessionContext};

pub mod commands;
pub mod navigator;

use commands::{Cli, Command};
use navigator::CliNavigator;

/// Resolve configuration (arg > env > config file > default).
pub fn load_config(overrides: Overrides) -> Result<SessionConfig> {
    let file = match SessionConfig::config_path() {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    Ok(config::resolve(overrides, file)?)
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let Cli {
        command,
        auth_url,
        notes_url,
        store,
        ..
    } = cli;

    let config = load_config(Overrides {
        auth_url,
        notes_url,
        store_path: store,
    })?;
    tracing::debug!(store = ?config.store_path, "using session store");

    let store = SessionContext::open_store(&config);
    let ctx = SessionContext::new(&config, store, Arc::new(CliNavigator))?;

    match command {
        Command::Register {
            username,
            email,
            password,
        } => commands::auth::register(&ctx.auth, &username, &email, password).await,
        Command::Login { username, password } => {
            commands::auth::login(&ctx.auth, &username, password).await
        }
        Command::Logout => commands::auth::logout(&ctx.auth),
        Command::Whoami => {
            commands::auth::whoami(&ctx.auth);
            Ok(())
        }
        Command::ForgotPassword { email } => {
            commands::auth::forgot_password(&ctx.auth, &email).await
        }
        Command::ResetPassword { token, password } => {
            commands::auth::reset_password(&ctx.auth, &token, password).await
        }
        Command::Notes(cmd) => commands::notes::run(&ctx.notes, cmd).await,
    }
}
