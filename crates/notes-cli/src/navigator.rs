// ABOUTME: Login redirect for the terminal: tells the user to log in again
// ABOUTME: Installed as the session layer's navigator by the notes CLI

use colored::Colorize;
use notes_session::Navigator;

#[derive(Debug, Default, Clone, Copy)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        tracing::debug!("redirecting to login");
        eprintln!(
            "{} session expired, run `{}`",
            "!".yellow().bold(),
            "notes login".bold()
        );
    }
}
