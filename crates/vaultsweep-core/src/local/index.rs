/// Note metadata for an on-disk vault: sections, frontmatter, and the
/// resolved link graph. Built once, in parallel, when the vault is opened.
use crate::extract::embed::{markdown_links, strip_link_suffixes, wiki_targets};
use crate::host::{Frontmatter, ResolvedLinks, Section, SectionKind};
use crate::markdown::{parse_frontmatter, parse_sections};
use crate::model::VaultTree;
use crate::scanner::ScanWarning;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

#[derive(Debug, Clone, Default)]
pub struct NoteMeta {
    pub sections: Vec<Section>,
    pub frontmatter: Option<Frontmatter>,
}

#[derive(Debug, Default)]
pub struct NoteIndex {
    pub notes: HashMap<String, NoteMeta>,
    pub links: ResolvedLinks,
}

/// Link targets written in `text`, skipping anything inside code blocks.
pub fn link_targets(text: &str, sections: &[Section]) -> Vec<String> {
    sections
        .iter()
        .filter(|section| section.kind != SectionKind::Code)
        .filter_map(|section| section.slice(text))
        .flat_map(|slice| {
            let mut targets = wiki_targets(slice);
            targets.extend(
                markdown_links(slice)
                    .into_iter()
                    .filter(|link| !is_external(&link.destination))
                    .map(|link| strip_link_suffixes(&link.destination).to_owned())
                    .filter(|target| !target.is_empty()),
            );
            targets
        })
        .collect()
}

struct IndexedNote {
    path: String,
    meta: NoteMeta,
    targets: Vec<String>,
}

/// Read and index every note in `tree`.
pub fn build_index(root: &Path, tree: &VaultTree) -> (NoteIndex, Vec<ScanWarning>) {
    let notes: Vec<&str> = tree
        .files()
        .filter(|(_, file)| file.is_note())
        .map(|(_, file)| file.path.as_str())
        .collect();

    let results: Vec<Result<IndexedNote, ScanWarning>> = notes
        .par_iter()
        .map(|path| {
            let text = std::fs::read_to_string(root.join(path)).map_err(|err| {
                warn!(path = %path, "could not index note: {err}");
                ScanWarning::new(*path, err)
            })?;
            let sections = parse_sections(&text);
            let targets = link_targets(&text, &sections);
            Ok(IndexedNote {
                path: (*path).to_owned(),
                meta: NoteMeta {
                    frontmatter: parse_frontmatter(&text),
                    sections,
                },
                targets,
            })
        })
        .collect();

    let mut index = NoteIndex::default();
    let mut warnings = Vec::new();
    let mut unresolved = 0usize;

    for result in results {
        let note = match result {
            Ok(note) => note,
            Err(warning) => {
                warnings.push(warning);
                continue;
            }
        };
        for target in &note.targets {
            match tree.resolve_link(target, &note.path) {
                Some(resolved) => {
                    *index
                        .links
                        .entry(note.path.clone())
                        .or_default()
                        .entry(resolved)
                        .or_default() += 1;
                }
                None => unresolved += 1,
            }
        }
        index.notes.insert(note.path, note.meta);
    }

    debug!(
        notes = index.notes.len(),
        sources = index.links.len(),
        unresolved,
        "note index built"
    );
    (index, warnings)
}
