/// Admonition blocks (```` ```ad-note ````, `~~~ad-warning`, ...).
///
/// Matches both attachment styles and always keeps only the path token:
/// `![](image.png)`, `![|100](image.png)`, `![[image.png]]`, `![[image.png|100]]`.
use super::codeblock::CodeBlock;
use super::embed::embed_targets;
use regex::Regex;
use std::sync::OnceLock;

fn admonition_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}[`~]{3,}ad-\w+").expect("admonition regex must compile"))
}

/// `true` if the raw block opens with an admonition fence.
pub fn is_admonition(raw_block: &str) -> bool {
    admonition_fence().is_match(raw_block)
}

/// Embeds inside a single raw block, or nothing if it is not an admonition.
pub fn parse_admonition(raw_block: &str) -> Vec<String> {
    if !is_admonition(raw_block) {
        return Vec::new();
    }
    embed_targets(raw_block)
}

/// Embeds across every admonition among `blocks`.
pub fn admonition_references(blocks: &[CodeBlock<'_>]) -> Vec<String> {
    blocks
        .iter()
        .flat_map(|block| parse_admonition(block.raw))
        .collect()
}
