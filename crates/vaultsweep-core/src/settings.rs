/// User settings and their compiled, validated form.
///
/// `Settings` is what gets persisted (TOML on disk). `CompiledSettings` is
/// what the scanner consumes: every user-supplied pattern is validated and
/// anchored once here, never per file.
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where removed files go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionDestination {
    /// Removed from disk immediately.
    Permanent,
    /// Moved to the operating system's trash.
    #[default]
    SystemTrash,
    /// Moved to the host application's own trash folder.
    HostTrash,
}

impl DeletionDestination {
    pub fn label(self) -> &'static str {
        match self {
            Self::Permanent => "permanently delete",
            Self::SystemTrash => "move to system trash",
            Self::HostTrash => "move to vault trash",
        }
    }
}

/// Whether a pattern list names what to skip or what to keep exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Exclude,
    Include,
}

/// Persisted settings. Defaults match a fresh install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub deletion_destination: DeletionDestination,
    /// Days an entry may sit in the vault trash before it is purged.
    /// `None` disables purging.
    pub host_trash_cleanup_age_days: Option<u32>,
    pub folder_filter: FilterMode,
    /// Regular expressions matched against folder paths from the start.
    pub folder_patterns: Vec<String>,
    pub attachment_filter: FilterMode,
    /// Extensions without the leading dot. `*` matches every extension.
    pub attachment_extensions: Vec<String>,
    pub deletion_confirmation: bool,
    pub remove_folders: bool,
    pub ignored_frontmatter: Vec<String>,
    pub ignore_all_frontmatter: bool,
    /// Regular expressions matched against whole code-block languages.
    pub codeblock_languages: Vec<String>,
    pub delete_empty_markdown: bool,
    pub delete_empty_markdown_with_backlinks: bool,
    /// Files modified more recently than this many days are never touched.
    pub file_age_threshold_days: u32,
    /// Treat unreferenced drawing notes as plain attachments.
    pub treat_drawings_as_attachments: bool,
    pub delete_empty_note_on_close: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deletion_destination: DeletionDestination::SystemTrash,
            host_trash_cleanup_age_days: None,
            folder_filter: FilterMode::Exclude,
            folder_patterns: Vec::new(),
            attachment_filter: FilterMode::Include,
            attachment_extensions: Vec::new(),
            deletion_confirmation: true,
            remove_folders: false,
            ignored_frontmatter: Vec::new(),
            ignore_all_frontmatter: false,
            codeblock_languages: Vec::new(),
            delete_empty_markdown: true,
            delete_empty_markdown_with_backlinks: false,
            file_age_threshold_days: 0,
            treat_drawings_as_attachments: false,
            delete_empty_note_on_close: false,
        }
    }
}

/// Which settings field a bad pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    Folder,
    Extension,
    CodeblockLanguage,
}

impl std::fmt::Display for PatternField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Folder => "folder_patterns",
            Self::Extension => "attachment_extensions",
            Self::CodeblockLanguage => "codeblock_languages",
        })
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid pattern {pattern:?} in {field}: {source}")]
    InvalidPattern {
        field: PatternField,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("host_trash_cleanup_age_days must be at least 1 day")]
    TrashAgeTooSmall,
}

/// Compiled matcher for attachment extensions.
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    matcher: Option<Regex>,
    wildcard: bool,
}

impl ExtensionSet {
    fn compile(extensions: &[String]) -> Result<Self, SettingsError> {
        let wildcard = extensions.iter().any(|ext| ext.trim() == "*");
        let literals: Vec<String> = extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty() && *ext != "*")
            .map(regex::escape)
            .collect();

        let matcher = if literals.is_empty() {
            None
        } else {
            let pattern = format!("^(?:{})$", literals.join("|"));
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| SettingsError::InvalidPattern {
                    field: PatternField::Extension,
                    pattern,
                    source,
                })?;
            Some(regex)
        };
        Ok(Self { matcher, wildcard })
    }

    /// `true` if `extension` (no leading dot) is in the configured set.
    pub fn matches(&self, extension: &str) -> bool {
        self.wildcard
            || self
                .matcher
                .as_ref()
                .is_some_and(|regex| regex.is_match(extension))
    }
}

/// Settings with every pattern validated and anchored.
#[derive(Debug, Clone)]
pub struct CompiledSettings {
    pub raw: Settings,
    pub folder_patterns: Vec<Regex>,
    pub extensions: ExtensionSet,
    pub codeblock_languages: Vec<Regex>,
}

fn compile_each(
    patterns: &[String],
    field: PatternField,
    anchor: impl Fn(&str) -> String,
) -> Result<Vec<Regex>, SettingsError> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            Regex::new(&anchor(p)).map_err(|source| SettingsError::InvalidPattern {
                field,
                pattern: p.to_owned(),
                source,
            })
        })
        .collect()
}

impl Settings {
    /// Validate and compile every user-supplied pattern.
    pub fn compile(&self) -> Result<CompiledSettings, SettingsError> {
        if self.host_trash_cleanup_age_days == Some(0) {
            return Err(SettingsError::TrashAgeTooSmall);
        }
        let folder_patterns =
            compile_each(&self.folder_patterns, PatternField::Folder, |p| format!("^(?:{p})"))?;
        let codeblock_languages = compile_each(
            &self.codeblock_languages,
            PatternField::CodeblockLanguage,
            |p| format!("^(?:{p})$"),
        )?;
        let extensions = ExtensionSet::compile(&self.attachment_extensions)?;

        Ok(CompiledSettings {
            raw: self.clone(),
            folder_patterns,
            extensions,
            codeblock_languages,
        })
    }
}

impl CompiledSettings {
    /// `true` if `language` matches any configured code-block pattern.
    pub fn codeblock_language_matches(&self, language: &str) -> bool {
        self.codeblock_languages
            .iter()
            .any(|regex| regex.is_match(language))
    }
}
