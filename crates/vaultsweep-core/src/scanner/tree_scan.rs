/// Folder tally: which files go, and which folders end up with nothing left.
use crate::classify::Verdict;
use crate::folder_filter::{is_folder_in_scope, is_folder_removable};
use crate::model::{NodeIndex, VaultTree};
use crate::settings::CompiledSettings;
use std::collections::HashMap;

/// Output of one deepest-first pass over the folders.
#[derive(Debug, Default)]
pub struct FolderTally {
    /// Files to remove, grouped by folder, deepest folders first.
    pub files: Vec<NodeIndex>,
    /// Folders whose every direct file is going, deepest first. Not yet
    /// checked against their subfolders.
    pub candidates: Vec<NodeIndex>,
    /// Number of folders that were in scope.
    pub folders_in_scope: usize,
}

/// Direct file children of every in-scope folder: the classification work
/// list.
pub fn files_in_scope(tree: &VaultTree, settings: &CompiledSettings) -> Vec<NodeIndex> {
    tree.folders()
        .filter(|(_, folder)| is_folder_in_scope(folder, settings))
        .flat_map(|(idx, _)| tree.child_files(idx))
        .collect()
}

/// Walk folders deepest-first and tally each one's direct files against
/// their verdicts.
pub fn tally_folders(
    tree: &VaultTree,
    settings: &CompiledSettings,
    verdicts: &HashMap<NodeIndex, Verdict>,
) -> FolderTally {
    let mut tally = FolderTally::default();

    for folder_idx in tree.folders_deepest_first() {
        let Some(folder) = tree.folder(folder_idx) else {
            continue;
        };
        if !is_folder_in_scope(folder, settings) {
            continue;
        }
        tally.folders_in_scope += 1;

        let children = tree.child_files(folder_idx);
        let before = tally.files.len();
        tally.files.extend(
            children
                .iter()
                .copied()
                .filter(|child| verdicts.get(child).is_some_and(|v| v.is_delete())),
        );
        let remaining = children.len() - (tally.files.len() - before);

        if remaining == 0 && is_folder_removable(folder, settings) {
            tally.candidates.push(folder_idx);
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{DeleteReason, KeepReason};
    use crate::settings::{FilterMode, Settings};

    fn settings(remove_folders: bool, excluded: &[&str]) -> CompiledSettings {
        Settings {
            remove_folders,
            folder_filter: FilterMode::Exclude,
            folder_patterns: excluded.iter().map(|p| (*p).to_owned()).collect(),
            ..Settings::default()
        }
        .compile()
        .expect("valid settings")
    }

    fn paths(tree: &VaultTree, indices: &[NodeIndex]) -> Vec<String> {
        indices.iter().map(|idx| tree.node(*idx).path().to_owned()).collect()
    }

    #[test]
    fn folder_with_every_file_going_is_a_candidate() {
        let mut tree = VaultTree::default();
        let img = tree.insert_file("A/img.png", 10, None);
        let note = tree.insert_file("A/note.md", 0, None);
        let kept = tree.insert_file("B/kept.png", 10, None);
        let verdicts = HashMap::from([
            (img, Verdict::Delete(DeleteReason::UnusedAttachment)),
            (note, Verdict::Delete(DeleteReason::EmptyNote)),
            (kept, Verdict::Keep(KeepReason::InUse)),
        ]);

        let tally = tally_folders(&tree, &settings(true, &[]), &verdicts);
        assert_eq!(paths(&tree, &tally.files), vec!["A/img.png", "A/note.md"]);
        assert_eq!(paths(&tree, &tally.candidates), vec!["A"]);
    }

    #[test]
    fn empty_folders_qualify_only_with_the_setting() {
        let mut tree = VaultTree::default();
        tree.ensure_folder("empty");
        let verdicts = HashMap::new();

        assert!(tally_folders(&tree, &settings(false, &[]), &verdicts).candidates.is_empty());
        let tally = tally_folders(&tree, &settings(true, &[]), &verdicts);
        assert_eq!(paths(&tree, &tally.candidates), vec!["empty"]);
    }

    #[test]
    fn excluded_folders_are_skipped_entirely() {
        let mut tree = VaultTree::default();
        let img = tree.insert_file("Templates/img.png", 10, None);
        let settings = settings(true, &["Templates"]);
        let verdicts = HashMap::from([(img, Verdict::Delete(DeleteReason::UnusedAttachment))]);

        assert!(files_in_scope(&tree, &settings).is_empty());
        let tally = tally_folders(&tree, &settings, &verdicts);
        assert!(tally.files.is_empty());
        assert!(tally.candidates.is_empty());
        assert_eq!(tally.folders_in_scope, 1);
    }

    #[test]
    fn root_is_never_a_candidate() {
        let mut tree = VaultTree::default();
        let top = tree.insert_file("top.png", 1, None);
        let verdicts = HashMap::from([(top, Verdict::Delete(DeleteReason::UnusedAttachment))]);
        let tally = tally_folders(&tree, &settings(true, &[]), &verdicts);
        assert_eq!(tally.files, vec![top]);
        assert!(tally.candidates.is_empty());
    }
}
