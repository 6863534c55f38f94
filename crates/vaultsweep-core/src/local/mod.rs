/// A vault that lives in a directory on the local filesystem.
///
/// [`LocalVault::open`] walks the directory once and indexes every note.
/// The result is a snapshot: changes made on disk afterwards are not seen
/// until the vault is opened again.
pub mod index;
pub mod storage;
pub mod walk;

use crate::extract::embed::strip_link_suffixes;
use crate::host::{
    Frontmatter, HostError, MetadataProvider, ResolvedLinks, Section, Storage, StorageError,
    TrashEntry, Vault,
};
use crate::model::VaultTree;
use crate::scanner::ScanWarning;
use crate::settings::DeletionDestination;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub use index::{NoteIndex, NoteMeta};
pub use storage::HOST_TRASH_DIR;

#[derive(Debug)]
pub struct LocalVault {
    root: PathBuf,
    tree: VaultTree,
    index: NoteIndex,
    load_warnings: Vec<ScanWarning>,
}

impl LocalVault {
    /// Walk and index the vault at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, HostError> {
        let root = root.as_ref().to_path_buf();
        let start = Instant::now();

        let (tree, mut load_warnings) = walk::walk_vault(&root)?;
        let (index, index_warnings) = index::build_index(&root, &tree);
        load_warnings.extend(index_warnings);

        info!(
            root = %root.display(),
            nodes = tree.len(),
            notes = index.notes.len(),
            warnings = load_warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "vault opened"
        );

        Ok(Self {
            root,
            tree,
            index,
            load_warnings,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries that could not be walked or indexed while opening.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.load_warnings
    }
}

impl MetadataProvider for LocalVault {
    fn resolved_links(&self) -> ResolvedLinks {
        self.index.links.clone()
    }

    fn sections(&self, path: &str) -> Vec<Section> {
        self.index
            .notes
            .get(path)
            .map(|meta| meta.sections.clone())
            .unwrap_or_default()
    }

    fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        self.index.notes.get(path)?.frontmatter.clone()
    }

    fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        self.tree.resolve_link(strip_link_suffixes(link), source)
    }
}

impl Storage for LocalVault {
    fn read_text(&self, path: &str) -> Result<String, StorageError> {
        storage::read_text(&self.root, path)
    }

    fn delete(&self, path: &str, destination: DeletionDestination) -> Result<(), StorageError> {
        storage::delete(&self.root, path, destination)
    }

    fn list_host_trash(&self) -> Result<Vec<TrashEntry>, StorageError> {
        storage::list_host_trash(&self.root)
    }
}

impl Vault for LocalVault {
    fn tree(&self) -> &VaultTree {
        &self.tree
    }

    fn as_metadata(&self) -> &dyn MetadataProvider {
        self
    }

    fn as_storage(&self) -> &dyn Storage {
        self
    }
}
