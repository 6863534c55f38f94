/// Cascade correction.
///
/// A folder with no files left may still hold a subfolder that survives.
/// Removing the parent would take the survivor with it, so the parent is
/// dropped from the removal set, which may in turn drop its own parent.
use crate::model::{NodeIndex, VaultTree};
use std::collections::HashSet;

/// Settle `candidates` to a fixed point: repeatedly drop every folder with a
/// direct subfolder outside the removal set until nothing changes.
///
/// The result keeps the order of `candidates`.
pub fn settle(tree: &VaultTree, candidates: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut removal: HashSet<NodeIndex> = candidates.iter().copied().collect();

    loop {
        let blocked: Vec<NodeIndex> = removal
            .iter()
            .copied()
            .filter(|folder| {
                tree.child_folders(*folder)
                    .iter()
                    .any(|child| !removal.contains(child))
            })
            .collect();
        if blocked.is_empty() {
            break;
        }
        for folder in blocked {
            removal.remove(&folder);
        }
    }

    candidates
        .iter()
        .copied()
        .filter(|folder| removal.contains(folder))
        .collect()
}
