/// Contracts the engine consumes from its host application.
///
/// The host owns storage and the link index. The engine only reads through
/// these traits and requests deletions; it never reaches for ambient state.
use crate::model::VaultTree;
use crate::settings::DeletionDestination;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// Source path -> (target path -> link count), as resolved by the host.
pub type ResolvedLinks = BTreeMap<String, BTreeMap<String, u32>>;

/// Ordered top-level frontmatter: key -> raw scalar text.
pub type Frontmatter = BTreeMap<String, String>;

/// Kind of a top-level section in a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Leading YAML frontmatter block.
    Yaml,
    /// Fenced code block, fences included.
    Code,
    /// Any other block (paragraph, heading, list, ...).
    Text,
}

/// A top-level section of a note with its byte range in the note's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub range: Range<usize>,
}

impl Section {
    /// Slice this section out of the note's text. Out-of-range or
    /// non-boundary offsets yield `None`.
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        text.get(self.range.clone())
    }
}

/// An entry in the host's own trash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    /// Vault-relative path, e.g. `.trash/old.png`.
    pub path: String,
    pub modified: Option<SystemTime>,
}

/// Failure reported by host storage for one path.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{path}: not found")]
    NotFound { path: String },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {reason}")]
    Rejected { path: String, reason: String },
}

/// Failure opening a host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("vault root {path} is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("failed to read vault {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only view of the host's metadata index.
pub trait MetadataProvider: Send + Sync {
    /// Every resolved link in the vault.
    fn resolved_links(&self) -> ResolvedLinks;

    /// Top-level sections of a note. Empty for unknown paths.
    fn sections(&self, path: &str) -> Vec<Section>;

    /// Frontmatter of a note, `None` if it has none.
    fn frontmatter(&self, path: &str) -> Option<Frontmatter>;

    /// Resolve a link as written in `source` to a vault path.
    fn resolve_link(&self, link: &str, source: &str) -> Option<String>;
}

/// Host storage operations.
pub trait Storage: Send + Sync {
    fn read_text(&self, path: &str) -> Result<String, StorageError>;

    /// Remove one file or (empty) folder.
    fn delete(&self, path: &str, destination: DeletionDestination) -> Result<(), StorageError>;

    /// Entries currently in the host trash.
    fn list_host_trash(&self) -> Result<Vec<TrashEntry>, StorageError>;
}

/// A host that owns its tree, metadata, and storage. Needed to move a scan
/// onto a background thread.
pub trait Vault: MetadataProvider + Storage {
    fn tree(&self) -> &VaultTree;

    /// `self` as its metadata half. Implementors return `self`.
    fn as_metadata(&self) -> &dyn MetadataProvider;

    /// `self` as its storage half. Implementors return `self`.
    fn as_storage(&self) -> &dyn Storage;
}

/// Everything a scan or cleanup needs, passed explicitly.
#[derive(Clone, Copy)]
pub struct VaultContext<'a> {
    pub tree: &'a VaultTree,
    pub metadata: &'a dyn MetadataProvider,
    pub storage: &'a dyn Storage,
}

impl<'a> VaultContext<'a> {
    pub fn from_vault<V: Vault + ?Sized>(vault: &'a V) -> Self {
        Self {
            tree: vault.tree(),
            metadata: vault.as_metadata(),
            storage: vault.as_storage(),
        }
    }
}
