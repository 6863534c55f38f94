/// Folder-level include/exclude rules.
use crate::model::FolderEntry;
use crate::settings::{CompiledSettings, FilterMode};

/// `true` if `path` matches any configured folder pattern.
fn matches_any(path: &str, settings: &CompiledSettings) -> bool {
    settings.folder_patterns.iter().any(|regex| regex.is_match(path))
}

/// Whether a folder takes part in the pass at all.
///
/// The root is always in scope. With no patterns configured every folder is
/// in scope, whichever the mode.
pub fn is_folder_in_scope(folder: &FolderEntry, settings: &CompiledSettings) -> bool {
    if folder.is_root() || settings.folder_patterns.is_empty() {
        return true;
    }
    let matched = matches_any(&folder.path, settings);
    match settings.raw.folder_filter {
        FilterMode::Exclude => !matched,
        FilterMode::Include => matched,
    }
}

/// Whether a folder may itself be scheduled for removal.
pub fn is_folder_removable(folder: &FolderEntry, settings: &CompiledSettings) -> bool {
    settings.raw.remove_folders && !folder.is_root() && is_folder_in_scope(folder, settings)
}
