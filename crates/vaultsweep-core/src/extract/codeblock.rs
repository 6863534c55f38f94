/// Fenced code blocks: parsing and language-filtered reference extraction.
use super::embed::embed_targets;
use crate::host::{Section, SectionKind};
use crate::settings::CompiledSettings;

/// A fenced code block split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock<'t> {
    /// The whole block, fences included.
    pub raw: &'t str,
    /// Text after the opening fence on the first line, trimmed.
    pub language: &'t str,
    /// Lines between the fences.
    pub body: &'t str,
}

/// Parse a complete fenced block. Returns `None` if `raw` does not open with
/// three or more backticks or tildes.
pub fn parse_code_block(raw: &str) -> Option<CodeBlock<'_>> {
    let trimmed = raw.trim_start_matches(' ');
    let fence_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let fence_len = trimmed.chars().take_while(|c| *c == fence_char).count();
    if fence_len < 3 {
        return None;
    }

    let after_fence = &trimmed[fence_len..];
    let (first_line, rest) = after_fence.split_once('\n').unwrap_or((after_fence, ""));
    let language = first_line.trim();

    let rest = rest.trim_end();
    let body = match rest.rfind('\n') {
        Some(nl) if is_closing_fence(&rest[nl + 1..], fence_char, fence_len) => &rest[..nl],
        None if is_closing_fence(rest, fence_char, fence_len) => "",
        _ => rest,
    };

    Some(CodeBlock {
        raw,
        language,
        body: body.trim_end_matches('\r'),
    })
}

fn is_closing_fence(line: &str, fence_char: char, fence_len: usize) -> bool {
    let line = line.trim();
    let run = line.chars().take_while(|c| *c == fence_char).count();
    run >= fence_len && run == line.chars().count()
}

/// Every parseable code block of a note, given its sections.
pub fn code_blocks<'t>(text: &'t str, sections: &[Section]) -> Vec<CodeBlock<'t>> {
    sections
        .iter()
        .filter(|section| section.kind == SectionKind::Code)
        .filter_map(|section| section.slice(text))
        .filter_map(parse_code_block)
        .collect()
}

/// Embeds inside blocks whose language matches a configured pattern.
pub fn codeblock_references(blocks: &[CodeBlock<'_>], settings: &CompiledSettings) -> Vec<String> {
    if settings.codeblock_languages.is_empty() {
        return Vec::new();
    }
    blocks
        .iter()
        .filter(|block| settings.codeblock_language_matches(block.language))
        .flat_map(|block| embed_targets(block.body))
        .collect()
}
