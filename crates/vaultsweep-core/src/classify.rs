/// Per-file keep/delete decisions.
///
/// The classifier is a pure function of the file, the settings, the in-use
/// set, and the host's view of the file. The only side effect is reading the
/// file's text through the host; read or parse failures keep the file and
/// come back as a warning.
use crate::age::is_younger_than;
use crate::extract::{canvas, drawing, ExtractError};
use crate::host::{SectionKind, VaultContext};
use crate::in_use::{InUseSet, LinkIndex};
use crate::model::FileEntry;
use crate::scanner::ScanWarning;
use crate::settings::{CompiledSettings, FilterMode};
use std::fmt;
use std::time::SystemTime;

/// Why a file was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    InUse,
    TooYoung,
    HasBacklinks,
    NotEmpty,
    /// The rule that could delete this file is switched off.
    RuleDisabled,
    /// The attachment filter does not select this extension.
    Filtered,
    /// The file could not be read or parsed.
    Unreadable,
}

/// Why a file may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    EmptyNote,
    FrontmatterOnly,
    UnusedDrawing,
    EmptyDrawing,
    EmptyBoard,
    UnusedAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep(KeepReason),
    Delete(DeleteReason),
}

impl Verdict {
    pub fn is_delete(self) -> bool {
        matches!(self, Verdict::Delete(_))
    }
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InUse => "referenced",
            Self::TooYoung => "modified recently",
            Self::HasBacklinks => "has backlinks",
            Self::NotEmpty => "not empty",
            Self::RuleDisabled => "rule disabled",
            Self::Filtered => "extension not selected",
            Self::Unreadable => "unreadable",
        })
    }
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyNote => "empty note",
            Self::FrontmatterOnly => "frontmatter only",
            Self::UnusedDrawing => "unreferenced drawing",
            Self::EmptyDrawing => "empty drawing",
            Self::EmptyBoard => "empty board",
            Self::UnusedAttachment => "unused attachment",
        })
    }
}

/// A verdict plus the warning that forced it, if any.
#[derive(Debug)]
pub struct Classification {
    pub verdict: Verdict,
    pub warning: Option<ScanWarning>,
}

impl From<Verdict> for Classification {
    fn from(verdict: Verdict) -> Self {
        Self {
            verdict,
            warning: None,
        }
    }
}

impl Classification {
    fn unreadable(file: &FileEntry, error: &ExtractError) -> Self {
        tracing::warn!(path = %file.path, "{error}");
        Self {
            verdict: Verdict::Keep(KeepReason::Unreadable),
            warning: Some(ScanWarning::new(&file.path, error)),
        }
    }
}

/// Everything a verdict depends on, bound once per scan.
pub struct Classifier<'a> {
    ctx: VaultContext<'a>,
    settings: &'a CompiledSettings,
    in_use: &'a InUseSet,
    links: &'a LinkIndex,
    now: SystemTime,
}

impl<'a> Classifier<'a> {
    pub fn new(
        ctx: VaultContext<'a>,
        settings: &'a CompiledSettings,
        in_use: &'a InUseSet,
        links: &'a LinkIndex,
        now: SystemTime,
    ) -> Self {
        Self {
            ctx,
            settings,
            in_use,
            links,
            now,
        }
    }

    /// Decide whether `file` is kept or deleted. First matching rule wins.
    pub fn classify(&self, file: &FileEntry) -> Classification {
        if self.in_use.contains(&file.path) {
            return Verdict::Keep(KeepReason::InUse).into();
        }
        if self.is_too_young(file) {
            return Verdict::Keep(KeepReason::TooYoung).into();
        }
        if file.is_note() {
            if drawing::is_drawing(self.ctx.metadata.frontmatter(&file.path).as_ref()) {
                return self.classify_drawing(file);
            }
            if !self.settings.raw.delete_empty_markdown {
                return Verdict::Keep(KeepReason::RuleDisabled).into();
            }
            return self.classify_note(file);
        }
        if file.is_board() {
            return self.classify_board(file);
        }
        self.classify_attachment(file).into()
    }

    /// The empty-note rule on its own, with the age check, for notes that
    /// were just closed. Ignores the `delete_empty_markdown` switch.
    pub fn classify_closed_note(&self, file: &FileEntry) -> Classification {
        if !file.is_note() {
            return Verdict::Keep(KeepReason::RuleDisabled).into();
        }
        if self.is_too_young(file) {
            return Verdict::Keep(KeepReason::TooYoung).into();
        }
        self.classify_note(file)
    }

    fn is_too_young(&self, file: &FileEntry) -> bool {
        is_younger_than(file.modified, self.now, self.settings.raw.file_age_threshold_days)
    }

    fn classify_drawing(&self, file: &FileEntry) -> Classification {
        if self.links.has_backlinks(&file.path) {
            return Verdict::Keep(KeepReason::HasBacklinks).into();
        }
        if self.settings.raw.treat_drawings_as_attachments {
            return Verdict::Delete(DeleteReason::UnusedDrawing).into();
        }
        let scene = self
            .ctx
            .storage
            .read_text(&file.path)
            .map_err(ExtractError::from)
            .and_then(|text| drawing::parse_scene(&text));
        match scene {
            Ok(Some(scene)) if scene.is_empty() => {
                Verdict::Delete(DeleteReason::EmptyDrawing).into()
            }
            Ok(_) => Verdict::Keep(KeepReason::NotEmpty).into(),
            Err(error) => Classification::unreadable(file, &error),
        }
    }

    fn classify_note(&self, file: &FileEntry) -> Classification {
        let settings = &self.settings.raw;
        if !settings.delete_empty_markdown_with_backlinks && self.links.has_backlinks(&file.path) {
            return Verdict::Keep(KeepReason::HasBacklinks).into();
        }
        if file.size == 0 {
            return Verdict::Delete(DeleteReason::EmptyNote).into();
        }
        let text = match self.ctx.storage.read_text(&file.path) {
            Ok(text) => text,
            Err(error) => return Classification::unreadable(file, &error.into()),
        };
        if text.trim().is_empty() {
            return Verdict::Delete(DeleteReason::EmptyNote).into();
        }

        let sections = self.ctx.metadata.sections(&file.path);
        let frontmatter_only =
            matches!(sections.as_slice(), [only] if only.kind == SectionKind::Yaml);
        if frontmatter_only && self.frontmatter_is_ignorable(file) {
            return Verdict::Delete(DeleteReason::FrontmatterOnly).into();
        }
        Verdict::Keep(KeepReason::NotEmpty).into()
    }

    fn frontmatter_is_ignorable(&self, file: &FileEntry) -> bool {
        let settings = &self.settings.raw;
        if settings.ignore_all_frontmatter {
            return true;
        }
        if settings.ignored_frontmatter.is_empty() {
            return false;
        }
        self.ctx
            .metadata
            .frontmatter(&file.path)
            .unwrap_or_default()
            .keys()
            .all(|key| settings.ignored_frontmatter.iter().any(|ignored| ignored == key))
    }

    fn classify_board(&self, file: &FileEntry) -> Classification {
        let empty = if file.size <= canvas::EMPTY_BOARD_MAX_BYTES {
            Ok(true)
        } else {
            self.ctx
                .storage
                .read_text(&file.path)
                .map_err(ExtractError::from)
                .and_then(|raw| canvas::is_empty_board(&raw, file.size))
        };
        match empty {
            Ok(true) => Verdict::Delete(DeleteReason::EmptyBoard).into(),
            Ok(false) => Verdict::Keep(KeepReason::NotEmpty).into(),
            Err(error) => Classification::unreadable(file, &error),
        }
    }

    fn classify_attachment(&self, file: &FileEntry) -> Verdict {
        let listed = self.settings.extensions.matches(&file.extension);
        let selected = match self.settings.raw.attachment_filter {
            FilterMode::Include => listed,
            FilterMode::Exclude => !listed,
        };
        if selected {
            Verdict::Delete(DeleteReason::UnusedAttachment)
        } else {
            Verdict::Keep(KeepReason::Filtered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extraction;
    use crate::host::{MetadataProvider, Vault, VaultContext};
    use crate::in_use::build_in_use_set;
    use crate::settings::Settings;
    use crate::test_support::{days_ago, MemoryVault};

    const EMPTY_DRAWING: &str =
        "---\nexcalidraw-plugin: parsed\n---\n\n%%\n# Drawing\n```json\n{\"type\":\"excalidraw\",\"elements\":[]}\n```\n%%\n";
    const ONE_ELEMENT_DRAWING: &str =
        "---\nexcalidraw-plugin: parsed\n---\n\n%%\n# Drawing\n```json\n{\"type\":\"excalidraw\",\"elements\":[{\"id\":\"a\"}]}\n```\n%%\n";

    fn png_settings() -> Settings {
        Settings {
            attachment_extensions: vec!["png".into()],
            ..Settings::default()
        }
    }

    fn verdict_with(
        vault: &MemoryVault,
        settings: Settings,
        path: &str,
        extractions: &[Extraction],
    ) -> Verdict {
        let compiled = settings.compile().expect("valid settings");
        let links = LinkIndex::from_resolved(&vault.resolved_links());
        let in_use = build_in_use_set(&links, extractions, vault);
        let ctx = VaultContext::from_vault(vault);
        let classifier = Classifier::new(ctx, &compiled, &in_use, &links, SystemTime::now());
        let idx = vault.tree().find(path).expect("file exists");
        let file = vault.tree().file(idx).expect("is a file");
        classifier.classify(file).verdict
    }

    fn verdict(vault: &MemoryVault, settings: Settings, path: &str) -> Verdict {
        verdict_with(vault, settings, path, &[])
    }

    #[test]
    fn whitespace_and_zero_byte_notes_are_deleted() {
        let vault = MemoryVault::new()
            .note("a.md", "")
            .note("b.md", "  \n\t\n ")
            .note("c.md", "text");
        assert_eq!(
            verdict(&vault, Settings::default(), "a.md"),
            Verdict::Delete(DeleteReason::EmptyNote)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "b.md"),
            Verdict::Delete(DeleteReason::EmptyNote)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "c.md"),
            Verdict::Keep(KeepReason::NotEmpty)
        );
    }

    #[test]
    fn empty_note_with_backlinks_needs_the_override() {
        let vault = MemoryVault::new()
            .note("empty.md", "")
            .note("src.md", "[[empty]]")
            .link("src.md", "empty.md");
        assert_eq!(
            verdict(&vault, Settings::default(), "empty.md"),
            Verdict::Keep(KeepReason::HasBacklinks)
        );
        let settings = Settings {
            delete_empty_markdown_with_backlinks: true,
            ..Settings::default()
        };
        assert_eq!(verdict(&vault, settings, "empty.md"), Verdict::Delete(DeleteReason::EmptyNote));
    }

    #[test]
    fn disabled_markdown_rule_keeps_empty_notes() {
        let vault = MemoryVault::new().note("a.md", "");
        let settings = Settings {
            delete_empty_markdown: false,
            ..Settings::default()
        };
        assert_eq!(verdict(&vault, settings, "a.md"), Verdict::Keep(KeepReason::RuleDisabled));
    }

    #[test]
    fn frontmatter_only_notes_follow_ignored_keys() {
        let vault = MemoryVault::new().note("fm.md", "---\ntags: x\naliases: y\n---\n");

        assert_eq!(
            verdict(&vault, Settings::default(), "fm.md"),
            Verdict::Keep(KeepReason::NotEmpty)
        );

        let subset = Settings {
            ignored_frontmatter: vec!["tags".into(), "aliases".into(), "cssclass".into()],
            ..Settings::default()
        };
        assert_eq!(
            verdict(&vault, subset, "fm.md"),
            Verdict::Delete(DeleteReason::FrontmatterOnly)
        );

        let partial = Settings {
            ignored_frontmatter: vec!["tags".into()],
            ..Settings::default()
        };
        assert_eq!(verdict(&vault, partial, "fm.md"), Verdict::Keep(KeepReason::NotEmpty));

        let all = Settings {
            ignore_all_frontmatter: true,
            ..Settings::default()
        };
        assert_eq!(verdict(&vault, all, "fm.md"), Verdict::Delete(DeleteReason::FrontmatterOnly));
    }

    #[test]
    fn frontmatter_with_body_is_kept() {
        let vault = MemoryVault::new().note("fm.md", "---\ntags: x\n---\nbody\n");
        let all = Settings {
            ignore_all_frontmatter: true,
            ..Settings::default()
        };
        assert_eq!(verdict(&vault, all, "fm.md"), Verdict::Keep(KeepReason::NotEmpty));
    }

    #[test]
    fn young_files_are_always_kept() {
        let vault = MemoryVault::new()
            .file_at("img.png", 10, Some(days_ago(5)))
            .note_at("empty.md", "", Some(days_ago(5)))
            .file_at("old.png", 10, Some(days_ago(45)));
        let settings = || Settings {
            file_age_threshold_days: 30,
            ..png_settings()
        };
        assert_eq!(verdict(&vault, settings(), "img.png"), Verdict::Keep(KeepReason::TooYoung));
        assert_eq!(verdict(&vault, settings(), "empty.md"), Verdict::Keep(KeepReason::TooYoung));
        assert_eq!(
            verdict(&vault, settings(), "old.png"),
            Verdict::Delete(DeleteReason::UnusedAttachment)
        );
    }

    #[test]
    fn attachment_filter_modes() {
        let vault = MemoryVault::new().file("a.png", 1).file("b.pdf", 1);
        assert_eq!(
            verdict(&vault, png_settings(), "a.png"),
            Verdict::Delete(DeleteReason::UnusedAttachment)
        );
        assert_eq!(verdict(&vault, png_settings(), "b.pdf"), Verdict::Keep(KeepReason::Filtered));

        let exclude = Settings {
            attachment_filter: FilterMode::Exclude,
            ..png_settings()
        };
        assert_eq!(verdict(&vault, exclude.clone(), "a.png"), Verdict::Keep(KeepReason::Filtered));
        assert_eq!(
            verdict(&vault, exclude, "b.pdf"),
            Verdict::Delete(DeleteReason::UnusedAttachment)
        );
    }

    #[test]
    fn referenced_attachments_are_kept_under_any_filter() {
        let vault = MemoryVault::new()
            .file("a.png", 1)
            .file("b.png", 1)
            .note("n.md", "![[a.png]]")
            .link("n.md", "a.png");
        let extraction = Extraction {
            source: "n.md".into(),
            tokens: vec!["b.png".into()],
            warnings: Vec::new(),
        };
        for filter in [FilterMode::Include, FilterMode::Exclude] {
            let settings = Settings {
                attachment_filter: filter,
                attachment_extensions: vec!["*".into()],
                ..Settings::default()
            };
            for path in ["a.png", "b.png"] {
                assert_eq!(
                    verdict_with(&vault, settings.clone(), path, std::slice::from_ref(&extraction)),
                    Verdict::Keep(KeepReason::InUse)
                );
            }
        }
    }

    #[test]
    fn empty_drawing_is_deleted_and_drawn_one_kept() {
        let vault = MemoryVault::new()
            .note("B/drawing.excalidraw.md", EMPTY_DRAWING)
            .note("B/full.excalidraw.md", ONE_ELEMENT_DRAWING);
        assert_eq!(
            verdict(&vault, Settings::default(), "B/drawing.excalidraw.md"),
            Verdict::Delete(DeleteReason::EmptyDrawing)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "B/full.excalidraw.md"),
            Verdict::Keep(KeepReason::NotEmpty)
        );
    }

    #[test]
    fn drawings_as_attachments_depend_only_on_backlinks() {
        let vault = MemoryVault::new()
            .note("lonely.excalidraw.md", ONE_ELEMENT_DRAWING)
            .note("linked.excalidraw.md", EMPTY_DRAWING)
            .note("n.md", "![[linked.excalidraw]]")
            .link("n.md", "linked.excalidraw.md");
        let settings = || Settings {
            treat_drawings_as_attachments: true,
            ..Settings::default()
        };
        assert_eq!(
            verdict(&vault, settings(), "lonely.excalidraw.md"),
            Verdict::Delete(DeleteReason::UnusedDrawing)
        );
        assert_eq!(
            verdict(&vault, settings(), "linked.excalidraw.md"),
            Verdict::Keep(KeepReason::HasBacklinks)
        );
    }

    #[test]
    fn unterminated_drawing_is_kept_with_a_warning() {
        let text =
            "---\nexcalidraw-plugin: parsed\n---\n```json\n{\"type\":\"excalidraw\",\"elements\":[]}\n";
        let vault = MemoryVault::new().note("d.md", text);
        let compiled = Settings::default().compile().expect("valid");
        let links = LinkIndex::default();
        let in_use = InUseSet::default();
        let classifier = Classifier::new(
            VaultContext::from_vault(&vault),
            &compiled,
            &in_use,
            &links,
            SystemTime::now(),
        );
        let file = vault.tree().file(vault.tree().find("d.md").expect("exists")).expect("file");
        let result = classifier.classify(file);
        assert_eq!(result.verdict, Verdict::Keep(KeepReason::Unreadable));
        assert_eq!(result.warning.map(|w| w.path), Some("d.md".to_owned()));
    }

    #[test]
    fn drawing_scene_without_elements_is_kept() {
        let text = "---\nexcalidraw-plugin: parsed\n---\n\n%%\n# Drawing\n```json\n{\"type\":\"excalidraw\",\"version\":2}\n```\n%%\n";
        let vault = MemoryVault::new().note("d.excalidraw.md", text);
        assert_eq!(
            verdict(&vault, Settings::default(), "d.excalidraw.md"),
            Verdict::Keep(KeepReason::Unreadable)
        );
    }

    #[test]
    fn board_emptiness() {
        let padded_empty = format!("{{\"nodes\":[],\"edges\":[]{}}}", " ".repeat(40));
        let one_node = r#"{"nodes":[{"id":"1","type":"text","text":"hello world"}],"edges":[]}"#;
        let vault = MemoryVault::new()
            .note("tiny.canvas", "{}")
            .note("empty.canvas", &padded_empty)
            .note("full.canvas", one_node)
            .note("broken.canvas", "{\"nodes\": [ this is not json at all ]}");
        assert_eq!(
            verdict(&vault, Settings::default(), "tiny.canvas"),
            Verdict::Delete(DeleteReason::EmptyBoard)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "empty.canvas"),
            Verdict::Delete(DeleteReason::EmptyBoard)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "full.canvas"),
            Verdict::Keep(KeepReason::NotEmpty)
        );
        assert_eq!(
            verdict(&vault, Settings::default(), "broken.canvas"),
            Verdict::Keep(KeepReason::Unreadable)
        );
    }

    #[test]
    fn closed_note_check_ignores_the_vault_wide_switch() {
        let vault = MemoryVault::new().note("a.md", "");
        let compiled = Settings {
            delete_empty_markdown: false,
            ..Settings::default()
        }
        .compile()
        .expect("valid");
        let links = LinkIndex::default();
        let in_use = InUseSet::default();
        let classifier = Classifier::new(
            VaultContext::from_vault(&vault),
            &compiled,
            &in_use,
            &links,
            SystemTime::now(),
        );
        let file = vault.tree().file(vault.tree().find("a.md").expect("exists")).expect("file");
        assert_eq!(
            classifier.classify_closed_note(file).verdict,
            Verdict::Delete(DeleteReason::EmptyNote)
        );
    }
}
