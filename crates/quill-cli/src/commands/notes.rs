//! Note command handlers

use anyhow::{bail, Context, Result};

use quill_core::{NoteDraft, NoteId, NoteStore};

use crate::output::Output;
use crate::prompt::confirm;

/// List all notes
pub async fn list(store: &NoteStore, output: &Output) -> Result<()> {
    let notes = store.list().await.context("Failed to load notes")?;
    output.print_notes(&notes);
    Ok(())
}

/// Show a single note
pub async fn show(store: &NoteStore, id: &str, output: &Output) -> Result<()> {
    let id = parse_note_id(id)?;
    let note = store
        .get(id)
        .await
        .context("Failed to load note")?
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?;

    output.print_note(&note);
    Ok(())
}

/// Create a note
pub async fn create(
    store: &NoteStore,
    title: String,
    content: String,
    color: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut draft = NoteDraft::new(title.trim(), content.trim());
    if let Some(color) = color {
        draft = draft.with_color(color);
    }
    if draft.is_blank() {
        bail!("Please add a title or content to your note");
    }

    let note = store
        .create(draft)
        .await
        .context("Failed to create note")?;

    match output.format {
        crate::output::OutputFormat::Human => {
            output.success(&format!("Created note {}: {}", note.id, note.title))
        }
        _ => output.print_note(&note),
    }
    Ok(())
}

/// Delete a note
pub async fn delete(store: &NoteStore, id: &str, output: &Output) -> Result<()> {
    let id = parse_note_id(id)?;
    let note = store
        .get(id)
        .await
        .context("Failed to load note")?
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?;

    if output.should_prompt() {
        println!("Delete note: {} - {}", note.id, note.title);
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    if !store.delete(id).await {
        bail!("Failed to delete note {}", id);
    }

    output.success(&format!("Deleted note: {}", id));
    Ok(())
}

/// Search notes by title or content
pub async fn search(store: &NoteStore, query: &str, output: &Output) -> Result<()> {
    let notes = store.search(query).await.context("Failed to search notes")?;
    output.print_notes(&notes);
    Ok(())
}

fn parse_note_id(id: &str) -> Result<NoteId> {
    id.parse()
        .with_context(|| format!("Invalid note ID: '{}'", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_parse_note_id() {
        assert_eq!(parse_note_id("42").unwrap(), NoteId(42));
        assert!(parse_note_id("abc").is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_note() {
        let store = NoteStore::in_memory();
        let result = create(&store, "  ".into(), "".into(), None, &quiet()).await;
        assert!(result.is_err());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_delete_without_prompt() {
        let store = NoteStore::in_memory();
        create(&store, "Title".into(), "Body".into(), None, &quiet())
            .await
            .unwrap();
        let note = store.list().await.unwrap().remove(0);

        delete(&store, &note.id.to_string(), &quiet()).await.unwrap();
        assert!(store.get(note.id).await.unwrap().is_none());
        assert!(delete(&store, &note.id.to_string(), &quiet()).await.is_err());
    }
}
