// ABOUTME: Implementation of the account commands: register, login, logout, whoami
// ABOUTME: Also covers the forgot-password and reset-password flows

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Password;

use notes_session::{AuthClient, Profile};

pub async fn register(
    auth: &AuthClient,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password, true)?;
    let msg = auth.register(username, email, &password).await?;
    println!("{} {}", "✓".green(), msg);
    Ok(())
}

pub async fn login(auth: &AuthClient, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password, false)?;
    let session = auth.login(username, &password).await?;
    println!(
        "{} Logged in as {}",
        "✓".green(),
        session.profile.username.bold()
    );
    Ok(())
}

pub fn logout(auth: &AuthClient) -> Result<()> {
    auth.logout()?;
    println!("{}", "Logged out".dimmed());
    Ok(())
}

pub async fn forgot_password(auth: &AuthClient, email: &str) -> Result<()> {
    let msg = auth.forgot_password(email).await?;
    println!("{} {}", "✓".green(), msg);
    Ok(())
}

pub async fn reset_password(auth: &AuthClient, token: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password, true)?;
    let msg = auth.reset_password(token, &password).await?;
    println!("{} {}", "✓".green(), msg);
    Ok(())
}

pub fn whoami(auth: &AuthClient) {
    let Some(profile) = auth.current_profile().filter(|_| auth.is_authenticated()) else {
        println!("{}", "Not logged in".dimmed());
        return;
    };

    println!("{}", "Account".bold());
    println!("  {}: {}", "Username".dimmed(), profile.username);
    println!("  {}:    {}", "Email".dimmed(), profile.email);
    println!("  {}:    {}", "Roles".dimmed(), format_roles(&profile));
}

fn format_roles(profile: &Profile) -> String {
    if profile.roles.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        profile.roles.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn password_or_prompt(given: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().context("failed to read password")
}
