/// In-memory host for unit tests.
use crate::host::{
    Frontmatter, MetadataProvider, ResolvedLinks, Section, Storage, StorageError, TrashEntry,
    Vault,
};
use crate::markdown::{parse_frontmatter, parse_sections};
use crate::model::VaultTree;
use crate::settings::DeletionDestination;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime};

pub const DAY: Duration = Duration::from_secs(24 * 3600);

pub fn days_ago(days: u64) -> SystemTime {
    SystemTime::now() - DAY * days as u32 - Duration::from_secs(1)
}

#[derive(Default)]
pub struct MemoryVault {
    tree: VaultTree,
    texts: HashMap<String, String>,
    links: ResolvedLinks,
    trash: Vec<TrashEntry>,
    failing: HashSet<String>,
    deleted: Mutex<Vec<(String, DeletionDestination)>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// A text document (note, board, ...). Size is the text length.
    pub fn note(self, path: &str, text: &str) -> Self {
        self.note_at(path, text, None)
    }

    pub fn note_at(mut self, path: &str, text: &str, modified: Option<SystemTime>) -> Self {
        self.tree.insert_file(path, text.len() as u64, modified);
        self.texts.insert(path.to_owned(), text.to_owned());
        self
    }

    /// A binary attachment with no readable text.
    pub fn file(self, path: &str, size: u64) -> Self {
        self.file_at(path, size, None)
    }

    pub fn file_at(mut self, path: &str, size: u64, modified: Option<SystemTime>) -> Self {
        self.tree.insert_file(path, size, modified);
        self
    }

    pub fn folder(mut self, path: &str) -> Self {
        self.tree.ensure_folder(path);
        self
    }

    /// Record a resolved link from `source` to `target`.
    pub fn link(mut self, source: &str, target: &str) -> Self {
        *self
            .links
            .entry(source.to_owned())
            .or_default()
            .entry(target.to_owned())
            .or_default() += 1;
        self
    }

    pub fn trashed(mut self, path: &str, modified: Option<SystemTime>) -> Self {
        self.trash.push(TrashEntry {
            path: path.to_owned(),
            modified,
        });
        self
    }

    /// Make every delete of `path` fail.
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_owned());
        self
    }

    /// Paths deleted so far, in request order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().iter().map(|(path, _)| path.clone()).collect()
    }

    pub fn deleted_with_destination(&self) -> Vec<(String, DeletionDestination)> {
        self.deleted.lock().clone()
    }
}

impl MetadataProvider for MemoryVault {
    fn resolved_links(&self) -> ResolvedLinks {
        self.links.clone()
    }

    fn sections(&self, path: &str) -> Vec<Section> {
        self.texts
            .get(path)
            .map(|text| parse_sections(text))
            .unwrap_or_default()
    }

    fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        self.texts.get(path).and_then(|text| parse_frontmatter(text))
    }

    fn resolve_link(&self, link: &str, source: &str) -> Option<String> {
        self.tree.resolve_link(link, source)
    }
}

impl Storage for MemoryVault {
    fn read_text(&self, path: &str) -> Result<String, StorageError> {
        if let Some(text) = self.texts.get(path) {
            return Ok(text.clone());
        }
        match self.tree.find(path) {
            Some(_) => Ok(String::new()),
            None => Err(StorageError::NotFound {
                path: path.to_owned(),
            }),
        }
    }

    fn delete(&self, path: &str, destination: DeletionDestination) -> Result<(), StorageError> {
        if self.failing.contains(path) {
            return Err(StorageError::Rejected {
                path: path.to_owned(),
                reason: "refused by test host".into(),
            });
        }
        let known = self.tree.find(path).is_some() || self.trash.iter().any(|e| e.path == path);
        if !known {
            return Err(StorageError::NotFound {
                path: path.to_owned(),
            });
        }
        self.deleted.lock().push((path.to_owned(), destination));
        Ok(())
    }

    fn list_host_trash(&self) -> Result<Vec<TrashEntry>, StorageError> {
        Ok(self.trash.clone())
    }
}

impl Vault for MemoryVault {
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
