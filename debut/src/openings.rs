//! Catalog browsing and authoring subcommands.

use std::io::Write;

use trainer::openings::catalog;
use trainer::{OpeningDraft, OpeningStore, StoreError};

use crate::render::move_text;
use crate::CliError;

/// Print every opening, newest first, optionally filtered by name.
pub async fn list<S: OpeningStore>(
    store: &S,
    search: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let openings = catalog::sorted(store.list().await?);
    let shown = catalog::filter(&openings, search.unwrap_or(""));
    if shown.is_empty() {
        writeln!(out, "No openings found.")?;
        return Ok(());
    }

    let width = shown.iter().map(|o| o.id.len()).max().unwrap_or(0);
    for opening in shown {
        writeln!(
            out,
            "{:<width$}  {} ({} moves)",
            opening.id,
            opening.name,
            opening.target_sequence().len(),
            width = width
        )?;
    }
    Ok(())
}

pub async fn show<S: OpeningStore>(
    store: &S,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let opening = store
        .get(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let line = opening.target_sequence();

    writeln!(out, "{} ({})", opening.name, opening.id)?;
    writeln!(out, "Notation: {}", opening.notation)?;
    if line.is_empty() {
        writeln!(out, "Line: (no playable moves)")?;
    } else {
        writeln!(out, "Line: {} ({} moves)", move_text(&line), line.len())?;
    }
    Ok(())
}

pub async fn add<S: OpeningStore>(
    store: &S,
    name: String,
    notation: String,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let opening = store.create(OpeningDraft::new(name, notation)).await?;
    writeln!(out, "Created {} ({})", opening.name, opening.id)?;
    Ok(())
}

/// Update name and/or notation; omitted fields keep their stored value.
pub async fn edit<S: OpeningStore>(
    store: &S,
    id: &str,
    name: Option<String>,
    notation: Option<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if name.is_none() && notation.is_none() {
        return Err(CliError::InvalidInput(
            "nothing to change; pass --name and/or --pgn".to_string(),
        ));
    }
    let existing = store
        .get(id)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let draft = OpeningDraft::new(
        name.unwrap_or(existing.name),
        notation.unwrap_or(existing.notation),
    );
    let opening = store.update(id, draft).await?;
    writeln!(out, "Updated {} ({})", opening.name, opening.id)?;
    Ok(())
}

pub async fn delete<S: OpeningStore>(
    store: &S,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    store.delete(id).await?;
    writeln!(out, "Deleted {}", id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trainer::FileOpeningStore;

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let tmp = TempDir::new().unwrap();
        let store = FileOpeningStore::open(tmp.path()).unwrap();

        let mut buf = Vec::new();
        list(&store, None, &mut buf).await.unwrap();
        let text = output(buf);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Ruy Lopez (5 moves)"));

        let mut buf = Vec::new();
        list(&store, Some("sicil"), &mut buf).await.unwrap();
        assert_eq!(output(buf).trim(), "sicilian  Sicilian Defense (6 moves)");

        let mut buf = Vec::new();
        list(&store, Some("dutch"), &mut buf).await.unwrap();
        assert_eq!(output(buf).trim(), "No openings found.");
    }

    #[tokio::test]
    async fn test_add_edit_show_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileOpeningStore::open(tmp.path()).unwrap();

        let mut buf = Vec::new();
        add(
            &store,
            "Italian".to_string(),
            "1. e4 e5 2. Nf3 Nc6 3. Bc4".to_string(),
            &mut buf,
        )
        .await
        .unwrap();
        let created = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|o| o.name == "Italian")
            .unwrap();
        assert!(output(buf).starts_with("Created Italian"));

        let mut buf = Vec::new();
        edit(
            &store,
            &created.id,
            None,
            Some("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5".to_string()),
            &mut buf,
        )
        .await
        .unwrap();
        assert!(output(buf).starts_with("Updated Italian"));

        let mut buf = Vec::new();
        show(&store, &created.id, &mut buf).await.unwrap();
        let text = output(buf);
        assert!(text.starts_with("Italian ("));
        assert!(text.contains("Line: 1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 (6 moves)"));

        let mut buf = Vec::new();
        delete(&store, &created.id, &mut buf).await.unwrap();
        assert_eq!(output(buf).trim(), format!("Deleted {}", created.id));
        assert!(matches!(
            show(&store, &created.id, &mut Vec::<u8>::new()).await,
            Err(CliError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_edit_requires_a_change() {
        let tmp = TempDir::new().unwrap();
        let store = FileOpeningStore::open(tmp.path()).unwrap();
        assert!(matches!(
            edit(&store, "french", None, None, &mut Vec::<u8>::new()).await,
            Err(CliError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        let tmp = TempDir::new().unwrap();
        let store = FileOpeningStore::open(tmp.path()).unwrap();
        assert!(matches!(
            add(&store, " ".to_string(), "1. e4".to_string(), &mut Vec::<u8>::new()).await,
            Err(CliError::Store(StoreError::Validation(_)))
        ));
    }
}
