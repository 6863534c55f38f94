/// Third-party drawing notes (Excalidraw). These are notes with a marker in
/// their frontmatter and a JSON scene embedded in the body.
use super::ExtractError;
use crate::host::Frontmatter;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Frontmatter key that marks a drawing note.
pub const DRAWING_MARKER_KEY: &str = "excalidraw-plugin";
/// Alternative marker: this key set to [`DRAWING_PARSED_VALUE`].
pub const DRAWING_FIELD_KEY: &str = "excalidraw";
pub const DRAWING_PARSED_VALUE: &str = "parsed";

fn scene_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{[ \t\r\n]*"type":[ ]*"excalidraw""#)
            .expect("scene start regex must compile")
    })
}

fn scene_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```\r?\n?%%").expect("scene end regex must compile"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneElement {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    /// Required: a scene without the array is malformed, not empty.
    pub elements: Vec<SceneElement>,
}

impl Scene {
    /// `true` if the scene has no elements, or every element is flagged
    /// deleted (a drawing saved right after erasing its last stroke).
    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(|el| el.is_deleted)
    }
}

/// `true` if the note's frontmatter marks it as a drawing.
pub fn is_drawing(frontmatter: Option<&Frontmatter>) -> bool {
    frontmatter.is_some_and(|fm| {
        fm.contains_key(DRAWING_MARKER_KEY)
            || fm.get(DRAWING_FIELD_KEY).map(String::as_str) == Some(DRAWING_PARSED_VALUE)
    })
}

/// Locate and parse the embedded scene.
///
/// `Ok(None)` means there is no plain JSON scene to inspect (for example a
/// compressed one); callers treat that as not empty.
pub fn parse_scene(text: &str) -> Result<Option<Scene>, ExtractError> {
    let Some(start) = scene_start().find(text) else {
        return Ok(None);
    };
    let Some(end) = scene_end().find_at(text, start.start()) else {
        return Err(ExtractError::UnterminatedScene);
    };
    let raw = &text[start.start()..end.start()];
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| ExtractError::Json {
            format: "excalidraw",
            source,
        })
}
