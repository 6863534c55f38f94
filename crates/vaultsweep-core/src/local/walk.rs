/// Parallel directory walk that builds the vault tree, using `jwalk`.
///
/// Dot-entries (`.trash`, `.obsidian`, `.git`, the settings file) are not
/// part of the vault and are skipped along with everything beneath them.
use crate::host::HostError;
use crate::model::VaultTree;
use crate::scanner::ScanWarning;
use std::path::{Component, Path};
use std::time::Instant;
use tracing::{debug, warn};

/// Convert an absolute path under `root` into a vault path (`A/img.png`).
pub fn vault_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    (!segments.is_empty()).then(|| segments.join("/"))
}

/// Walk `root` and build a tree of every visible folder and file.
///
/// Unreadable entries are skipped and reported as warnings.
pub fn walk_vault(root: &Path) -> Result<(VaultTree, Vec<ScanWarning>), HostError> {
    let meta = std::fs::metadata(root).map_err(|source| HostError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(HostError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let start = Instant::now();
    let mut tree = VaultTree::with_capacity(1_024);
    let mut warnings = Vec::new();

    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(true)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .and_then(|p| vault_path(root, p))
                    .unwrap_or_else(|| root.display().to_string());
                warn!(path = %path, "skipping unreadable entry: {err}");
                warnings.push(ScanWarning::new(path, err));
                continue;
            }
        };

        let path = entry.path();
        let Some(relative) = vault_path(root, &path) else {
            continue;
        };

        if entry.file_type().is_dir() {
            tree.ensure_folder(&relative);
            continue;
        }

        // Stat outside the walker: size and mtime of the entry itself.
        match std::fs::symlink_metadata(&path) {
            Ok(meta) => {
                tree.insert_file(&relative, meta.len(), meta.modified().ok());
            }
            Err(err) => {
                warn!(path = %relative, "could not stat: {err}");
                warnings.push(ScanWarning::new(relative, err));
            }
        }
    }

    debug!(
        nodes = tree.len(),
        skipped = warnings.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "vault walk complete"
    );
    Ok((tree, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn vault_paths_are_forward_slash_and_relative() {
        let root = Path::new("/vault");
        assert_eq!(vault_path(root, &root.join("A").join("b.png")).as_deref(), Some("A/b.png"));
        assert_eq!(vault_path(root, root), None);
        assert_eq!(vault_path(root, Path::new("/elsewhere/x")), None);
    }

    #[test]
    fn walk_builds_tree_and_skips_dot_entries() {
        let tmp = TempDir::new().expect("temp dir");
        let root = tmp.path();
        fs::create_dir_all(root.join("A/empty")).expect("mkdir");
        fs::create_dir_all(root.join(".trash")).expect("mkdir");
        fs::write(root.join("A/img.png"), [0u8; 10]).expect("write");
        fs::write(root.join(".trash/old.png"), [0u8; 10]).expect("write");
        fs::write(root.join(".vaultsweep.toml"), "").expect("write");
        fs::write(root.join("note.md"), "hello").expect("write");

        let (tree, warnings) = walk_vault(root).expect("walk");
        assert!(warnings.is_empty());

        let img = tree.find("A/img.png").and_then(|i| tree.file(i)).expect("img");
        assert_eq!(img.size, 10);
        assert!(img.modified.is_some());
        assert!(tree.find("A/empty").and_then(|i| tree.folder(i)).is_some());
        assert!(tree.find("note.md").is_some());
        assert!(tree.find(".trash").is_none());
        assert!(tree.find(".trash/old.png").is_none());
        assert!(tree.find(".vaultsweep.toml").is_none());
    }

    #[test]
    fn file_root_is_rejected() {
        let tmp = TempDir::new().expect("temp dir");
        let file = tmp.path().join("file.md");
        fs::write(&file, "x").expect("write");
        assert!(matches!(walk_vault(&file), Err(HostError::NotADirectory { .. })));
    }
}
