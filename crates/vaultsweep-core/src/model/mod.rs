/// Data model for the vault tree.
///
/// Re-exports the arena-allocated tree structure and the node variants.
pub mod node;
pub mod vault_tree;

pub use node::{
    FileEntry, FolderEntry, Node, NodeIndex, BOARD_EXTENSION, NOTE_EXTENSION, ROOT_PATH,
};
pub use vault_tree::VaultTree;
