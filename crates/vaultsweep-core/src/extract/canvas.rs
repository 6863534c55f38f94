/// Visual-board (`.canvas`) documents: embedded references and emptiness.
use super::embed::embed_targets;
use super::ExtractError;
use crate::model::NOTE_EXTENSION;
use serde::Deserialize;

/// A board that has been emptied is 28 bytes (24 minified); a brand new one
/// is 2 bytes. Anything at or below this size holds no nodes.
pub const EMPTY_BOARD_MAX_BYTES: u64 = 28;

#[derive(Debug, Default, Deserialize)]
struct Board {
    #[serde(default)]
    nodes: Vec<BoardNode>,
    #[serde(default)]
    edges: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct BoardNode {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

fn parse_board(raw: &str) -> Result<Board, ExtractError> {
    serde_json::from_str(raw).map_err(|source| ExtractError::Json {
        format: "canvas",
        source,
    })
}

/// Paths referenced by a board: non-note `file` nodes, then embeds found in
/// `text` nodes.
///
/// An empty document has no references and is not an error.
pub fn board_references(raw: &str) -> Result<Vec<String>, ExtractError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let board = parse_board(raw)?;
    let note_suffix = format!(".{NOTE_EXTENSION}");

    let mut references: Vec<String> = board
        .nodes
        .iter()
        .filter(|node| node.kind == "file")
        .filter_map(|node| node.file.as_deref())
        .filter(|file| !file.ends_with(&note_suffix))
        .map(str::to_owned)
        .collect();

    references.extend(
        board
            .nodes
            .iter()
            .filter(|node| node.kind == "text")
            .filter_map(|node| node.text.as_deref())
            .flat_map(embed_targets),
    );
    Ok(references)
}

/// `true` if a board holds no nodes and no edges.
pub fn is_empty_board(raw: &str, size: u64) -> Result<bool, ExtractError> {
    if size <= EMPTY_BOARD_MAX_BYTES || raw.trim().is_empty() {
        return Ok(true);
    }
    let board = parse_board(raw)?;
    Ok(board.nodes.is_empty() && board.edges.is_empty())
}
