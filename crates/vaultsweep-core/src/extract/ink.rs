/// Handwriting / drawing ink blocks. Each block body is JSON naming the
/// attachment that holds the strokes.
use super::codeblock::CodeBlock;
use super::ExtractError;
use serde::Deserialize;

/// Block languages written by the ink plugin.
pub const INK_LANGUAGES: [&str; 2] = ["handwritten-ink", "handdrawn-ink"];

#[derive(Debug, Deserialize)]
struct InkEmbed {
    filepath: String,
}

pub fn is_ink_block(block: &CodeBlock<'_>) -> bool {
    INK_LANGUAGES.contains(&block.language)
}

/// The attachment path of one ink block.
pub fn ink_reference(block: &CodeBlock<'_>) -> Result<String, ExtractError> {
    let embed: InkEmbed = serde_json::from_str(block.body).map_err(|source| ExtractError::Json {
        format: "ink",
        source,
    })?;
    Ok(embed.filepath)
}

/// Paths from every ink block, with one result per block so a malformed
/// block does not hide its siblings.
pub fn ink_references<'b>(
    blocks: &'b [CodeBlock<'_>],
) -> impl Iterator<Item = Result<String, ExtractError>> + 'b {
    blocks.iter().filter(|b| is_ink_block(b)).map(ink_reference)
}
