/// Reference extractors, one per content format.
///
/// Each extractor turns a document into candidate path tokens. Tokens are
/// resolved against the source note by the in-use set builder, not here.
///
/// - [`canvas`]: visual boards (file nodes and embeds in text cards).
/// - [`codeblock`]: embeds inside code blocks of user-chosen languages.
/// - [`admonition`]: embeds inside `ad-*` blocks.
/// - [`ink`]: the `filepath` of handwriting/drawing ink blocks.
/// - [`drawing`]: recognition and emptiness of Excalidraw drawing notes.
pub mod admonition;
pub mod canvas;
pub mod codeblock;
pub mod drawing;
pub mod embed;
pub mod ink;

use crate::host::{SectionKind, VaultContext};
use crate::model::FileEntry;
use crate::scanner::ScanWarning;
use crate::settings::CompiledSettings;
use thiserror::Error;
use tracing::warn;

/// Why a document yielded no references.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed {format} data: {source}")]
    Json {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not find the end of the embedded drawing scene")]
    UnterminatedScene,
    #[error("could not read file: {0}")]
    Read(#[from] crate::host::StorageError),
}

/// Candidate references found in one file.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Path of the file the tokens were found in.
    pub source: String,
    /// Unresolved path tokens, in extraction order.
    pub tokens: Vec<String>,
    pub warnings: Vec<ScanWarning>,
}

impl Extraction {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            ..Self::default()
        }
    }

    fn warn(&mut self, error: &ExtractError) {
        warn!(path = %self.source, "{error}");
        self.warnings.push(ScanWarning::new(&self.source, error));
    }

    fn absorb(&mut self, result: Result<Vec<String>, ExtractError>) {
        match result {
            Ok(tokens) => self.tokens.extend(tokens),
            Err(error) => self.warn(&error),
        }
    }
}

/// Run every extractor that applies to `file`.
///
/// Never fails: a malformed document contributes a warning and no tokens.
pub fn extract_references(
    ctx: &VaultContext<'_>,
    settings: &CompiledSettings,
    file: &FileEntry,
) -> Extraction {
    let mut extraction = Extraction::new(&file.path);

    if file.is_board() {
        if file.size == 0 {
            return extraction;
        }
        let result = ctx
            .storage
            .read_text(&file.path)
            .map_err(ExtractError::from)
            .and_then(|raw| canvas::board_references(&raw));
        extraction.absorb(result);
    } else if file.is_note() {
        let sections = ctx.metadata.sections(&file.path);
        if !sections.iter().any(|s| s.kind == SectionKind::Code) {
            return extraction;
        }
        let text = match ctx.storage.read_text(&file.path) {
            Ok(text) => text,
            Err(error) => {
                extraction.warn(&ExtractError::from(error));
                return extraction;
            }
        };
        let blocks = codeblock::code_blocks(&text, &sections);
        extraction
            .tokens
            .extend(codeblock::codeblock_references(&blocks, settings));
        extraction
            .tokens
            .extend(admonition::admonition_references(&blocks));
        for result in ink::ink_references(&blocks) {
            extraction.absorb(result.map(|path| vec![path]));
        }
    }

    extraction
}
