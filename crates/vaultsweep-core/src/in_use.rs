/// The in-use set: every path some document references.
///
/// Built once per scan from the host's resolved-link index plus every
/// extractor's output, then only read.
use crate::extract::Extraction;
use crate::host::{MetadataProvider, ResolvedLinks};
use crate::model::NOTE_EXTENSION;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Backlink counts and attachment targets derived from the host's index.
#[derive(Debug, Default, Clone)]
pub struct LinkIndex {
    /// Non-note targets of any resolved link.
    attachment_targets: HashSet<String>,
    /// Target -> number of distinct other documents linking to it.
    backlinks: HashMap<String, usize>,
}

impl LinkIndex {
    pub fn from_resolved(links: &ResolvedLinks) -> Self {
        let note_suffix = format!(".{NOTE_EXTENSION}");
        let mut index = Self::default();

        for (source, targets) in links {
            for (target, count) in targets {
                if *count == 0 {
                    continue;
                }
                if target != source {
                    *index.backlinks.entry(target.clone()).or_default() += 1;
                }
                if !target.ends_with(&note_suffix) {
                    index.attachment_targets.insert(target.clone());
                }
            }
        }
        index
    }

    /// Number of distinct documents that link to `path`.
    pub fn backlinks(&self, path: &str) -> usize {
        self.backlinks.get(path).copied().unwrap_or(0)
    }

    pub fn has_backlinks(&self, path: &str) -> bool {
        self.backlinks(path) > 0
    }
}

/// Deduplicated set of referenced vault paths.
#[derive(Debug, Default, Clone)]
pub struct InUseSet {
    paths: HashSet<String>,
}

impl InUseSet {
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Union of the index's attachment targets and every resolvable extracted
/// token. Tokens that do not resolve are dropped.
pub fn build_in_use_set(
    links: &LinkIndex,
    extractions: &[Extraction],
    metadata: &dyn MetadataProvider,
) -> InUseSet {
    let mut paths = links.attachment_targets.clone();
    let mut unresolved = 0usize;

    for extraction in extractions {
        for token in &extraction.tokens {
            match metadata.resolve_link(token, &extraction.source) {
                Some(path) => {
                    paths.insert(path);
                }
                None => {
                    unresolved += 1;
                    debug!(
                        source = %extraction.source,
                        token = %token,
                        "dropping unresolved reference"
                    );
                }
            }
        }
    }

    debug!(referenced = paths.len(), unresolved, "in-use set built");
    InUseSet { paths }
}
