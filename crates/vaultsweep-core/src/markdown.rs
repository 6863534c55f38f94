/// Minimal note parsing: top-level sections and frontmatter keys.
///
/// Only what the engine needs to find code blocks and judge emptiness.
/// Rendering concerns (inline markup, nesting, lists) are ignored.
use crate::host::{Frontmatter, Section, SectionKind};

/// A fence opener: the fence character and how many times it repeats.
fn fence_of(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    (run >= 3).then_some((ch, run))
}

fn closes_fence(line: &str, fence: (char, usize)) -> bool {
    let trimmed = line.trim();
    let run = trimmed.chars().take_while(|c| *c == fence.0).count();
    run >= fence.1 && run == trimmed.chars().count()
}

/// Byte range of a leading `---` frontmatter block, closing line included
/// (without its trailing newline).
fn frontmatter_range(text: &str) -> Option<(usize, usize)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let mut offset = first.len();
    for line in lines {
        let content = line.trim_end();
        if content == "---" || content == "..." {
            let end = offset + line.trim_end_matches(['\n', '\r']).len();
            return Some((0, end));
        }
        offset += line.len();
    }
    None
}

/// Split a note into top-level sections with byte ranges.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut offset = 0;

    if let Some((start, end)) = frontmatter_range(text) {
        sections.push(Section {
            kind: SectionKind::Yaml,
            range: start..end,
        });
        offset = end;
    }

    let mut open: Option<(SectionKind, usize, Option<(char, usize)>)> = None;
    let mut last_end = offset;

    for line in text[offset..].split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let content_end = start + line.trim_end_matches(['\n', '\r']).len();

        match open {
            Some((SectionKind::Code, begin, Some(fence))) => {
                if closes_fence(line, fence) {
                    sections.push(Section {
                        kind: SectionKind::Code,
                        range: begin..content_end,
                    });
                    open = None;
                }
                last_end = content_end;
            }
            Some((kind, begin, _)) => {
                if line.trim().is_empty() {
                    sections.push(Section {
                        kind,
                        range: begin..last_end,
                    });
                    open = None;
                } else if let Some(fence) = fence_of(line) {
                    sections.push(Section {
                        kind,
                        range: begin..last_end,
                    });
                    open = Some((SectionKind::Code, start, Some(fence)));
                    last_end = content_end;
                } else {
                    last_end = content_end;
                }
            }
            None => {
                if line.trim().is_empty() {
                    continue;
                }
                open = Some(match fence_of(line) {
                    Some(fence) => (SectionKind::Code, start, Some(fence)),
                    None => (SectionKind::Text, start, None),
                });
                last_end = content_end;
            }
        }
    }

    if let Some((kind, begin, _)) = open {
        sections.push(Section {
            kind,
            range: begin..last_end,
        });
    }
    sections
}

/// Top-level `key: value` pairs of a leading frontmatter block.
///
/// Values are kept as raw scalar text with surrounding quotes removed.
/// Nested mappings and list items contribute only their parent key.
pub fn parse_frontmatter(text: &str) -> Option<Frontmatter> {
    let (_, end) = frontmatter_range(text)?;
    let block = &text[..end];
    let mut keys = Frontmatter::new();

    for line in block.lines().skip(1) {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            break;
        }
        if trimmed.is_empty() || line.starts_with([' ', '\t', '-', '#']) {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches(['"', '\'']);
        if key.is_empty() {
            continue;
        }
        let value = value.trim().trim_matches(['"', '\'']);
        keys.insert(key.to_owned(), value.to_owned());
    }
    Some(keys)
}
