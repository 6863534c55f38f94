/// Filesystem operations behind the `Storage` contract.
use crate::host::{StorageError, TrashEntry};
use crate::model::ROOT_PATH;
use crate::settings::DeletionDestination;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::walk::vault_path;

/// Name of the vault's own trash folder.
pub const HOST_TRASH_DIR: &str = ".trash";

fn io_error(path: &str, source: io::Error) -> StorageError {
    if source.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound {
            path: path.to_owned(),
        }
    } else {
        StorageError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// Absolute location of a vault path. Rejects the root and anything that
/// would escape it.
pub fn locate(root: &Path, path: &str) -> Result<PathBuf, StorageError> {
    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.is_empty() || path == ROOT_PATH || escapes {
        return Err(StorageError::Rejected {
            path: path.to_owned(),
            reason: "not a path inside the vault".into(),
        });
    }
    Ok(root.join(relative))
}

pub fn read_text(root: &Path, path: &str) -> Result<String, StorageError> {
    let absolute = locate(root, path)?;
    fs::read_to_string(absolute).map_err(|err| io_error(path, err))
}

/// First free name for `target`: `name.ext`, then `name 1.ext`, `name 2.ext`...
fn unique_destination(target: PathBuf) -> PathBuf {
    if !target.exists() {
        return target;
    }
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| target.with_file_name(format!("{stem} {n}{extension}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(target)
}

fn move_to_host_trash(root: &Path, path: &str, absolute: &Path) -> Result<(), StorageError> {
    let target = unique_destination(root.join(HOST_TRASH_DIR).join(path));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(path, err))?;
    }
    fs::rename(absolute, &target).map_err(|err| io_error(path, err))?;
    debug!(path, target = %target.display(), "moved to vault trash");
    Ok(())
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

pub fn delete(
    root: &Path,
    path: &str,
    destination: DeletionDestination,
) -> Result<(), StorageError> {
    let absolute = locate(root, path)?;
    let meta = fs::symlink_metadata(&absolute).map_err(|err| io_error(path, err))?;

    match destination {
        DeletionDestination::Permanent if meta.is_dir() => {
            fs::remove_dir(&absolute).map_err(|err| io_error(path, err))
        }
        DeletionDestination::Permanent => {
            fs::remove_file(&absolute).map_err(|err| io_error(path, err))
        }
        DeletionDestination::HostTrash => {
            if meta.is_dir() && is_empty_dir(&absolute).map_err(|err| io_error(path, err))? {
                return fs::remove_dir(&absolute).map_err(|err| io_error(path, err));
            }
            move_to_host_trash(root, path, &absolute)
        }
        DeletionDestination::SystemTrash => {
            trash::delete(&absolute).map_err(|err| StorageError::Rejected {
                path: path.to_owned(),
                reason: format!("system trash: {err}"),
            })
        }
    }
}

/// Files currently in `<root>/.trash`, with their modification times.
pub fn list_host_trash(root: &Path) -> Result<Vec<TrashEntry>, StorageError> {
    let trash_dir = root.join(HOST_TRASH_DIR);
    if !trash_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in jwalk::WalkDir::new(&trash_dir).skip_hidden(false).sort(true) {
        let entry = entry.map_err(|err| StorageError::Io {
            path: HOST_TRASH_DIR.to_owned(),
            source: err.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let absolute = entry.path();
        let Some(path) = vault_path(root, &absolute) else {
            continue;
        };
        let modified = fs::symlink_metadata(&absolute).ok().and_then(|m| m.modified().ok());
        entries.push(TrashEntry { path, modified });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault() -> TempDir {
        let tmp = TempDir::new().expect("temp dir");
        fs::create_dir_all(tmp.path().join("A/empty")).expect("mkdir");
        fs::write(tmp.path().join("A/img.png"), [1u8; 3]).expect("write");
        tmp
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let tmp = vault();
        for bad in ["../outside", "/", "", "A/../../x"] {
            assert!(
                matches!(locate(tmp.path(), bad), Err(StorageError::Rejected { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn permanent_delete_removes_files_and_empty_folders() {
        let tmp = vault();
        delete(tmp.path(), "A/img.png", DeletionDestination::Permanent).expect("file");
        delete(tmp.path(), "A/empty", DeletionDestination::Permanent).expect("folder");
        assert!(!tmp.path().join("A/img.png").exists());
        assert!(!tmp.path().join("A/empty").exists());
    }

    #[test]
    fn permanent_delete_refuses_non_empty_folders() {
        let tmp = vault();
        assert!(delete(tmp.path(), "A", DeletionDestination::Permanent).is_err());
        assert!(tmp.path().join("A/img.png").exists());
    }

    #[test]
    fn host_trash_keeps_structure_and_avoids_collisions() {
        let tmp = vault();
        delete(tmp.path(), "A/img.png", DeletionDestination::HostTrash).expect("first");
        fs::write(tmp.path().join("A/img.png"), [2u8; 3]).expect("rewrite");
        delete(tmp.path(), "A/img.png", DeletionDestination::HostTrash).expect("second");

        assert!(tmp.path().join(".trash/A/img.png").exists());
        assert!(tmp.path().join(".trash/A/img 1.png").exists());

        let listed: Vec<String> = list_host_trash(tmp.path())
            .expect("list")
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(listed, vec![".trash/A/img 1.png", ".trash/A/img.png"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = vault();
        assert!(matches!(
            delete(tmp.path(), "nope.png", DeletionDestination::Permanent),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(read_text(tmp.path(), "nope.md"), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn missing_host_trash_lists_nothing() {
        let tmp = vault();
        assert!(list_host_trash(tmp.path()).expect("list").is_empty());
    }
}
