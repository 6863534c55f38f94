/// Arena-backed vault tree.
///
/// All nodes live in a single `Vec<Node>`. Relationships between nodes use
/// `NodeIndex` (a thin `u32` wrapper) rather than heap pointers. A path index
/// sits alongside the arena so hosts can look nodes up by vault path.
use super::node::{FileEntry, FolderEntry, Node, NodeIndex, NOTE_EXTENSION, ROOT_PATH};
use std::collections::HashMap;
use std::time::SystemTime;

/// A read-only snapshot of the vault's folders and files.
#[derive(Debug, Clone)]
pub struct VaultTree {
    /// Arena: every node in a flat vector. Index 0 is always the root.
    nodes: Vec<Node>,

    /// Vault path -> arena index.
    by_path: HashMap<String, NodeIndex>,

    /// File name -> files with that name, for shortest-path link resolution.
    by_name: HashMap<String, Vec<NodeIndex>>,
}

impl Default for VaultTree {
    fn default() -> Self {
        Self::with_capacity(1)
    }
}

impl VaultTree {
    /// Create a tree containing only the root folder, with room for
    /// `estimated_nodes` nodes.
    pub fn with_capacity(estimated_nodes: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(estimated_nodes.max(1)),
            by_path: HashMap::with_capacity(estimated_nodes.max(1)),
            by_name: HashMap::new(),
        };
        tree.push(Node::Folder(FolderEntry {
            path: ROOT_PATH.into(),
            parent: None,
            children: Vec::new(),
        }));
        tree
    }

    /// Index of the root folder.
    #[inline]
    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    fn push(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        self.by_path.insert(node.path().to_owned(), idx);
        self.nodes.push(node);
        idx
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex) {
        if let Node::Folder(folder) = &mut self.nodes[parent.idx()] {
            folder.children.push(child);
        }
    }

    /// Add a folder named by its full vault path under `parent`.
    ///
    /// Returns the existing index if the path is already present.
    pub fn add_folder(&mut self, parent: NodeIndex, path: impl Into<String>) -> NodeIndex {
        let path = path.into();
        if let Some(&existing) = self.by_path.get(&path) {
            return existing;
        }
        let idx = self.push(Node::Folder(FolderEntry {
            path,
            parent: Some(parent),
            children: Vec::new(),
        }));
        self.link(parent, idx);
        idx
    }

    /// Add a file under the folder named by `file.parent`.
    pub fn add_file(&mut self, file: FileEntry) -> NodeIndex {
        if let Some(&existing) = self.by_path.get(&file.path) {
            return existing;
        }
        let parent = file.parent;
        let name = file.name.to_string();
        let idx = self.push(Node::File(file));
        self.by_name.entry(name).or_default().push(idx);
        self.link(parent, idx);
        idx
    }

    /// Return the folder at `path`, creating it and any missing ancestors.
    pub fn ensure_folder(&mut self, path: &str) -> NodeIndex {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return self.root();
        }
        if let Some(&existing) = self.by_path.get(path) {
            return existing;
        }
        let parent = match path.rfind('/') {
            Some(slash) => self.ensure_folder(&path[..slash]),
            None => self.root(),
        };
        self.add_folder(parent, path)
    }

    /// Insert a file by path, creating parent folders as needed.
    pub fn insert_file(
        &mut self,
        path: &str,
        size: u64,
        modified: Option<SystemTime>,
    ) -> NodeIndex {
        let path = path.trim_matches('/');
        let parent = match path.rfind('/') {
            Some(slash) => self.ensure_folder(&path[..slash]),
            None => self.root(),
        };
        let mut file = FileEntry::new(path, size, parent);
        file.modified = modified;
        self.add_file(file)
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.idx()]
    }

    /// Look a node up by vault path.
    pub fn find(&self, path: &str) -> Option<NodeIndex> {
        self.by_path.get(path).copied()
    }

    pub fn file(&self, index: NodeIndex) -> Option<&FileEntry> {
        self.node(index).as_file()
    }

    pub fn folder(&self, index: NodeIndex) -> Option<&FolderEntry> {
        self.node(index).as_folder()
    }

    /// All files in arena order.
    pub fn files(&self) -> impl Iterator<Item = (NodeIndex, &FileEntry)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_file().map(|f| (NodeIndex::new(i), f)))
    }

    /// All folders (root included) in arena order.
    pub fn folders(&self) -> impl Iterator<Item = (NodeIndex, &FolderEntry)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_folder().map(|f| (NodeIndex::new(i), f)))
    }

    /// Direct file children of a folder.
    pub fn child_files(&self, folder: NodeIndex) -> Vec<NodeIndex> {
        self.children_matching(folder, |node| matches!(node, Node::File(_)))
    }

    /// Direct folder children of a folder.
    pub fn child_folders(&self, folder: NodeIndex) -> Vec<NodeIndex> {
        self.children_matching(folder, |node| matches!(node, Node::Folder(_)))
    }

    fn children_matching(&self, folder: NodeIndex, keep: impl Fn(&Node) -> bool) -> Vec<NodeIndex> {
        match self.node(folder) {
            Node::Folder(entry) => entry
                .children
                .iter()
                .copied()
                .filter(|child| keep(self.node(*child)))
                .collect(),
            Node::File(_) => Vec::new(),
        }
    }

    /// Folders sorted deepest-first. Ties keep arena order, so the result is
    /// deterministic for a given tree.
    pub fn folders_deepest_first(&self) -> Vec<NodeIndex> {
        let mut folders: Vec<(usize, NodeIndex)> = self
            .folders()
            .map(|(idx, folder)| (folder.depth(), idx))
            .collect();
        folders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        folders.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Resolve a link as written in the note at `source` to a file path.
    ///
    /// Tries, in order: the exact vault path, the path relative to the
    /// source's folder, both again with `.md` appended, and finally the
    /// shortest path among files whose name equals the link's last segment.
    pub fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        let link = link.trim().trim_start_matches('/');
        if link.is_empty() {
            return None;
        }
        let source_dir = source.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let relative = normalize_path(&format!("{source_dir}/{link}"));
        let absolute = normalize_path(link);

        let candidates = [
            absolute.clone(),
            relative.clone(),
            absolute.map(|p| format!("{p}.{NOTE_EXTENSION}")),
            relative.map(|p| format!("{p}.{NOTE_EXTENSION}")),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(idx) = self.by_path.get(&candidate) {
                if self.file(*idx).is_some() {
                    return Some(candidate);
                }
            }
        }

        let name = link.rsplit('/').next().unwrap_or(link);
        let suffix = format!("/{link}");
        [name.to_owned(), format!("{name}.{NOTE_EXTENSION}")]
            .iter()
            .filter_map(|n| self.by_name.get(n))
            .flatten()
            .filter_map(|idx| self.file(*idx))
            .filter(|file| !link.contains('/') || file.path.ends_with(&suffix))
            .min_by(|a, b| a.path.len().cmp(&b.path.len()).then(a.path.cmp(&b.path)))
            .map(|file| file.path.clone())
    }

    /// Total number of nodes in the tree, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds nothing but the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Collapse `.` and `..` segments. `None` if the path climbs above the root.
fn normalize_path(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    (!segments.is_empty()).then(|| segments.join("/"))
}
