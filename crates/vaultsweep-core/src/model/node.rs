/// A single node in the arena-allocated vault tree.
///
/// Nodes are stored in a flat `Vec<Node>`. Parent-child relationships use
/// indices rather than pointers, so a scan can hand out `NodeIndex` values
/// freely across worker threads without borrowing the tree mutably.
use compact_str::CompactString;
use std::time::SystemTime;

/// Path of the vault root folder.
pub const ROOT_PATH: &str = "/";

/// Extension of note documents.
pub const NOTE_EXTENSION: &str = "md";

/// Extension of visual-board documents.
pub const BOARD_EXTENSION: &str = "canvas";

/// Lightweight index into the arena `Vec<Node>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`, panicking if it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A file in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Vault-relative path, forward-slash delimited (`A/img.png`).
    pub path: String,
    /// File name only.
    pub name: CompactString,
    /// Text after the last `.` of the name, without the dot. Empty if none.
    pub extension: CompactString,
    /// Size in bytes.
    pub size: u64,
    /// Last-modified timestamp. `None` when the host could not stat the file.
    pub modified: Option<SystemTime>,
    /// Containing folder.
    pub parent: NodeIndex,
}

impl FileEntry {
    /// Build a file entry from its vault path, deriving name and extension.
    pub fn new(path: impl Into<String>, size: u64, parent: NodeIndex) -> Self {
        let path = path.into();
        let name = CompactString::new(path.rsplit('/').next().unwrap_or(&path));
        let extension = match name.rfind('.') {
            Some(dot) if dot + 1 < name.len() => CompactString::new(&name[dot + 1..]),
            _ => CompactString::default(),
        };
        Self {
            path,
            name,
            extension,
            size,
            modified: None,
            parent,
        }
    }

    #[inline]
    pub fn is_note(&self) -> bool {
        self.extension == NOTE_EXTENSION
    }

    #[inline]
    pub fn is_board(&self) -> bool {
        self.extension == BOARD_EXTENSION
    }
}

/// A folder in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Vault-relative path. The root is [`ROOT_PATH`].
    pub path: String,
    /// Containing folder. `None` only for the root.
    pub parent: Option<NodeIndex>,
    /// Direct children in insertion order.
    pub children: Vec<NodeIndex>,
}

impl FolderEntry {
    /// `true` if this folder is the vault root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of path segments below the root. The root has depth 0.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.path.split('/').count()
        }
    }
}

/// A file or folder in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(FileEntry),
    Folder(FolderEntry),
}

impl Node {
    /// Vault-relative path of the node.
    pub fn path(&self) -> &str {
        match self {
            Node::File(file) => &file.path,
            Node::Folder(folder) => &folder.path,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderEntry> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_text_after_last_dot() {
        let file = FileEntry::new("B/drawing.excalidraw.md", 10, NodeIndex(0));
        assert_eq!(file.name, "drawing.excalidraw.md");
        assert_eq!(file.extension, "md");
    }

    #[test]
    fn files_without_extension_have_empty_extension() {
        assert_eq!(FileEntry::new("A/LICENSE", 0, NodeIndex(0)).extension, "");
        assert_eq!(FileEntry::new("A/trailing.", 0, NodeIndex(0)).extension, "");
    }

    #[test]
    fn folder_depth_counts_segments() {
        let root = FolderEntry {
            path: ROOT_PATH.into(),
            parent: None,
            children: Vec::new(),
        };
        let nested = FolderEntry {
            path: "a/b/c".into(),
            parent: Some(NodeIndex(0)),
            children: Vec::new(),
        };
        assert_eq!(root.depth(), 0);
        assert_eq!(nested.depth(), 3);
    }
}
