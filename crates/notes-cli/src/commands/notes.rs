// ABOUTME: Implementation of 'notes notes' commands
// ABOUTME: Lists, shows, creates, updates, deletes and searches notes

use anyhow::{bail, Result};
use colored::Colorize;

use notes_session::{Note, NoteDraft, NotesClient};

use super::NotesCommand;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const PREVIEW_WIDTH: usize = 60;

pub async fn run(client: &NotesClient, cmd: NotesCommand) -> Result<()> {
    match cmd {
        NotesCommand::List { json } => {
            let notes = client.list().await?;
            print_notes(&notes, json, "No notes yet")
        }
        NotesCommand::Get { id, json } => {
            let note = client.get(id).await?;
            print_note(&note, json)
        }
        NotesCommand::Create {
            title,
            description,
            json,
        } => {
            let note = client.create(&NoteDraft::new(title, description)).await?;
            if !json {
                println!("{} Created note {}", "✓".green(), note.id);
            }
            print_note(&note, json)
        }
        NotesCommand::Update {
            id,
            title,
            description,
            json,
        } => update(client, id, title, description, json).await,
        NotesCommand::Rm { id } => {
            client.remove(id).await?;
            println!("{} Deleted note {}", "✓".green(), id);
            Ok(())
        }
        NotesCommand::Search { query, json } => {
            let notes = client.search(&query).await?;
            print_notes(&notes, json, "No matching notes")
        }
    }
}

async fn update(
    client: &NotesClient,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    json: bool,
) -> Result<()> {
    if title.is_none() && description.is_none() {
        bail!("Nothing to update. Pass --title and/or --description.");
    }

    let current = client.get(id).await?;
    let mut draft = NoteDraft::from(&current);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(description) = description {
        draft.description = description;
    }

    let note = client.update(id, &draft).await?;
    if !json {
        println!("{} Updated note {}", "✓".green(), note.id);
    }
    print_note(&note, json)
}

fn print_notes(notes: &[Note], json: bool, empty: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{}", empty.dimmed());
        return Ok(());
    }

    println!("{}", format!("Notes ({})", notes.len()).bold());
    println!();
    for note in notes {
        println!(
            "{} {} {}",
            "●".cyan(),
            format!("#{}", note.id).dimmed(),
            note.title.bold()
        );
        if !note.description.is_empty() {
            println!("    {}", preview(&note.description, PREVIEW_WIDTH));
        }
        if let Some(modified) = note.last_modified() {
            println!("    {}", modified.format(TIME_FORMAT).to_string().dimmed());
        }
    }

    Ok(())
}

fn print_note(note: &Note, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
        return Ok(());
    }

    println!("{}", note.title.bold());
    println!("  {}:      {}", "ID".dimmed(), note.id);
    if let Some(created) = note.created_at {
        println!("  {}: {}", "Created".dimmed(), created.format(TIME_FORMAT));
    }
    if let Some(updated) = note.updated_at {
        println!("  {}: {}", "Updated".dimmed(), updated.format(TIME_FORMAT));
    }
    if !note.description.is_empty() {
        println!();
        println!("{}", note.description);
    }

    Ok(())
}

/// First line of `text`, cut to `width` characters.
fn preview(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    let more = line.chars().count() > width || text.lines().nth(1).is_some();

    let mut out: String = line.chars().take(width).collect();
    if more {
        out.push('…');
    }
    out
}
