use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{resolve_data_dir, PostitConfig};
use crate::controller::{AutoConfirm, ConfirmPrompt, StdinConfirm, StoreController, TerminalConfirm};
use crate::entity::{Note, NoteColor, NoteList};
use crate::error::{PostitError, Result};
use crate::protocol::{Inbound, Outbound};
use crate::storage::{JsonFileStore, KeyValueStore, NoteStore};
use crate::theme::{ThemeKind, ThemeSource};

type FileController<C> = StoreController<JsonFileStore, C, ThemeKind>;

fn open_controller<C: ConfirmPrompt>(data_dir: Option<PathBuf>, confirm: C) -> Result<FileController<C>> {
    let dir = resolve_data_dir(data_dir);
    let config = PostitConfig::load(&dir)?;
    let store = JsonFileStore::open(&dir)?;
    Ok(StoreController::new(
        NoteStore::with_key(store, config.storage_key),
        confirm,
        config.theme,
    ))
}

fn parse_color(color: &str) -> Result<NoteColor> {
    color.parse().map_err(|_| PostitError::InvalidColor(color.to_string()))
}

fn check_index(notes: &NoteList, index: usize) -> Result<()> {
    if index < notes.len() {
        Ok(())
    } else {
        Err(PostitError::NoteNotFound(index))
    }
}

/// First line of a note, marked when there is more.
fn preview(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("");
    if lines.next().is_some() {
        format!("{} …", first)
    } else {
        first.to_string()
    }
}

pub fn handle_list(data_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let controller = open_controller(data_dir, AutoConfirm(false))?;
    let notes = controller.notes();

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    for (idx, note) in notes.iter().enumerate() {
        println!("{:>3}  [{:<6}] {}", idx, note.color, preview(&note.text));
    }

    Ok(())
}

pub fn handle_add(data_dir: Option<PathBuf>, text: String, color: String, json: bool) -> Result<()> {
    let color = parse_color(&color)?;
    let mut controller = open_controller(data_dir, AutoConfirm(false))?;

    let reply = controller.handle(Inbound::Add {
        value: text,
        color: Some(color),
        token: None,
    })?;

    if let Some(Outbound::Added {
        index,
        value,
        color,
        ..
    }) = reply
    {
        if json {
            let note = Note::new(value, color);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "index": index, "note": note }))?
            );
        } else {
            println!("Added note {} [{}] - {}", index, color, preview(&value));
        }
    }

    Ok(())
}

pub fn handle_edit(
    data_dir: Option<PathBuf>,
    index: usize,
    text: String,
    color: Option<String>,
) -> Result<()> {
    let color = color.as_deref().map(parse_color).transpose()?;
    let mut controller = open_controller(data_dir, AutoConfirm(false))?;
    check_index(&controller.notes(), index)?;

    controller.handle(Inbound::Save {
        index: Some(index),
        value: text,
        color,
    })?;

    println!("Updated note {}", index);
    Ok(())
}

pub fn handle_color(data_dir: Option<PathBuf>, index: usize, color: String) -> Result<()> {
    let color = parse_color(&color)?;
    let mut controller = open_controller(data_dir, AutoConfirm(false))?;
    check_index(&controller.notes(), index)?;

    controller.handle(Inbound::ChangeColor {
        index: Some(index),
        color: Some(color.clone()),
    })?;

    println!("Note {} is now {}", index, color);
    Ok(())
}

pub fn handle_delete(data_dir: Option<PathBuf>, index: usize, force: bool) -> Result<()> {
    if force {
        let mut controller = open_controller(data_dir, AutoConfirm(true))?;
        check_index(&controller.notes(), index)?;
        controller.handle(Inbound::Delete { index: Some(index) })?;
        println!("Deleted note {}", index);
        return Ok(());
    }

    // Confirmation needs a terminal; scripts must opt in with --force
    if !atty::is(atty::Stream::Stdin) {
        return Err(PostitError::Storage(
            "Use --force to delete in non-interactive mode".to_string(),
        ));
    }

    let mut controller = open_controller(data_dir, StdinConfirm)?;
    let notes = controller.notes();
    check_index(&notes, index)?;
    eprintln!("Note {}: {}", index, preview(&notes[index].text));

    match controller.handle(Inbound::RequestDelete { index: Some(index) })? {
        Some(_) => println!("Deleted note {}", index),
        None => println!("Cancelled."),
    }
    Ok(())
}

pub fn handle_move(data_dir: Option<PathBuf>, from: usize, to: usize) -> Result<()> {
    let mut controller = open_controller(data_dir, AutoConfirm(false))?;
    let mut notes = controller.notes();
    check_index(&notes, from)?;
    check_index(&notes, to)?;

    let note = notes.remove(from);
    notes.insert(to, note);
    controller.handle(Inbound::Reorder { value: notes })?;

    println!("Moved note {} to {}", from, to);
    Ok(())
}

pub fn handle_serve(data_dir: Option<PathBuf>, yes: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    let result = if yes {
        let controller = open_controller(data_dir, AutoConfirm(true))?;
        runtime.block_on(serve_stdio(controller))
    } else {
        let controller = open_controller(data_dir, TerminalConfirm)?;
        runtime.block_on(serve_stdio(controller))
    };

    // A pending stdin read would otherwise keep the runtime alive
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Bridge stdin/stdout to the controller loop: each input line is one JSON
/// message, each reply is written as one JSON line.
async fn serve_stdio<S, C, T>(controller: StoreController<S, C, T>) -> Result<()>
where
    S: KeyValueStore,
    C: ConfirmPrompt,
    T: ThemeSource,
{
    let (in_tx, in_rx) = mpsc::unbounded_channel::<Value>();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(line) {
                        Ok(raw) => {
                            if in_tx.send(raw).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "skipping malformed input line"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = out_rx.recv().await {
            let mut line = serde_json::to_vec(&message)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<(), PostitError>(())
    });

    info!("serving notes on stdio");
    controller
        .run(in_rx, out_tx, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    reader.abort();
    writer
        .await
        .map_err(|e| PostitError::ChannelClosed(e.to_string()))??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_marks_multiline() {
        assert_eq!(preview("one"), "one");
        assert_eq!(preview("one\ntwo"), "one …");
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_parse_color_rejects_unknown() {
        assert_eq!(parse_color("Green").unwrap(), NoteColor::Green);
        assert!(matches!(parse_color("mauve"), Err(PostitError::InvalidColor(_))));
    }

    #[test]
    fn test_check_index() {
        let notes = vec![Note::new("a", NoteColor::Yellow)];
        assert!(check_index(&notes, 0).is_ok());
        assert!(matches!(check_index(&notes, 1), Err(PostitError::NoteNotFound(1))));
    }
}
