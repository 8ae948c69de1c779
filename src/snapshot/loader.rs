//! Snapshot loading and saving.
//!
//! A snapshot is either a single JSON file holding both collections, or a
//! directory laid out like the document store:
//!
//! ```text
//! snapshot/
//!   users/<id>.json
//!   boards/<id>.json
//! ```

use crate::error::SnapshotError;
use crate::models::{Board, Snapshot, User};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Load a snapshot from a JSON file or a collections directory.
pub async fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| SnapshotError::io(path, e))?;

    let snapshot = if metadata.is_dir() {
        load_collections(path).await?
    } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
        load_file(path).await?
    } else {
        return Err(SnapshotError::UnsupportedPath(path.to_path_buf()));
    };

    info!(
        "Loaded snapshot from {}: {} users, {} boards, {} cards",
        path.display(),
        snapshot.users.len(),
        snapshot.boards.len(),
        snapshot.card_count()
    );

    Ok(snapshot)
}

async fn load_file(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SnapshotError::io(path, e))?;

    serde_json::from_str(&content).map_err(|e| SnapshotError::parse(path, e))
}

async fn load_collections(root: &Path) -> Result<Snapshot, SnapshotError> {
    let mut users: Vec<User> = read_collection::<User>(&root.join("users"))
        .await?
        .into_iter()
        .map(|(stem, mut user): (String, User)| {
            if user.id.is_empty() {
                user.id = stem;
            }
            user
        })
        .collect();

    let mut boards: Vec<Board> = read_collection::<Board>(&root.join("boards"))
        .await?
        .into_iter()
        .map(|(stem, mut board): (String, Board)| {
            if board.id.is_empty() {
                board.id = stem;
            }
            board
        })
        .collect();

    users.sort_by(|a, b| a.id.cmp(&b.id));
    boards.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Snapshot { users, boards })
}

/// List the JSON documents directly inside a collection directory.
fn collection_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        debug!("Collection directory missing: {}", dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Cannot read entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect()
}

/// Read one document, returning it with its file stem.
async fn read_document<T: DeserializeOwned>(path: PathBuf) -> Result<(String, T), SnapshotError> {
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| SnapshotError::io(&path, e))?;
    let document = serde_json::from_str(&content).map_err(|e| SnapshotError::parse(&path, e))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok((stem, document))
}

async fn read_collection<T: DeserializeOwned>(
    dir: &Path,
) -> Result<Vec<(String, T)>, SnapshotError> {
    let files = collection_files(dir);
    debug!("Reading {} documents from {}", files.len(), dir.display());

    try_join_all(files.into_iter().map(read_document::<T>)).await
}

/// Write the whole snapshot as pretty JSON, replacing any existing file.
pub async fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(snapshot)?;

    fs::write(path, content)
        .await
        .map_err(|e| SnapshotError::io(path, e))?;

    info!("Snapshot written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Card;
    use tempfile::TempDir;

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("snapshot.json")
    }

    #[test]
    fn test_load_fixture_file() {
        let snapshot = tokio_test::block_on(load_snapshot(&fixture_path())).unwrap();

        assert_eq!(snapshot.users.len(), 4);
        assert_eq!(snapshot.boards.len(), 3);
        assert!(snapshot.board("green-hands").is_some());
        assert!(snapshot.card_count() > 0);
    }

    #[test]
    fn test_load_collections_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("users")).unwrap();
        std::fs::create_dir(dir.path().join("boards")).unwrap();

        std::fs::write(
            dir.path().join("users").join("zed.json"),
            r#"{"name": "Zed"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("users").join("amy.json"),
            r#"{"id": "a1", "name": "Amy"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("users").join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            dir.path().join("boards").join("b1.json"),
            r#"{"name": "Green", "assignedTo": ["zed"], "taskList": [{"cards": [{"name": "Sweep", "workHours": 3}]}]}"#,
        )
        .unwrap();

        let snapshot = tokio_test::block_on(load_snapshot(dir.path())).unwrap();

        let ids: Vec<_> = snapshot.users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "zed"]);
        assert_eq!(snapshot.boards[0].id, "b1");
        assert_eq!(snapshot.card_count(), 1);
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = tokio_test::block_on(load_snapshot(dir.path())).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = tokio_test::block_on(load_snapshot(&path)).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_unsupported_and_missing_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.yaml");
        std::fs::write(&path, "users: []").unwrap();

        let err = tokio_test::block_on(load_snapshot(&path)).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedPath(_)));

        let err = tokio_test::block_on(load_snapshot(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        let mut board = Board::new("b1", "Green", "u1");
        board.task_list.push(crate::models::TaskList::new("Todo", "u1"));
        board.task_list[0].cards.push(Card::new("Sweep", "u1"));
        let snapshot = Snapshot {
            users: vec![User {
                id: "u1".to_string(),
                name: "Ana".to_string(),
                ..User::default()
            }],
            boards: vec![board],
        };

        tokio_test::block_on(save_snapshot(&snapshot, &path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"documentId\": \"b1\""));
        assert!(written.contains("\"taskList\""));

        let loaded = tokio_test::block_on(load_snapshot(&path)).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
