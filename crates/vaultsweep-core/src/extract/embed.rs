/// Embed and link patterns shared by every extractor.
///
/// Two syntaxes are recognised:
/// - wiki style `![[target|label]]` or `[[target]]`
/// - markdown style `![label](target)`, with `%20` decoded to a space
use regex::Regex;
use std::sync::OnceLock;

fn wiki_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!?\[\[(.+?)\]\]").expect("wiki embed regex must compile"))
}

/// The `[label](` or `![label](` that opens a markdown link. The destination
/// is scanned by hand so it may hold balanced parentheses.
fn markdown_link_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"!?\[[^\]\n]*\]\(").expect("markdown link regex must compile")
    })
}

fn percent_space_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)%20").expect("percent regex must compile"))
}

/// Strip a `|label` or `|size` suffix and a `#heading` / `#^block` anchor.
pub(crate) fn strip_link_suffixes(raw: &str) -> &str {
    let without_label = raw.split('|').next().unwrap_or(raw);
    without_label
        .split('#')
        .next()
        .unwrap_or(without_label)
        .trim()
}

/// A markdown-style link `[label](destination)` or embed `![label](destination)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    pub embed: bool,
    /// Destination with angle brackets, title and `%20` decoded away.
    pub destination: String,
}

/// Byte offset of the `)` that closes a link whose destination starts at
/// the beginning of `rest`. `None` if the link runs past the end of the line.
fn closing_paren(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_angle = false;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\n' => return None,
            '<' if !in_angle && rest[..i].trim().is_empty() => in_angle = true,
            '>' if in_angle => in_angle = false,
            _ if in_angle => {}
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Drop a trailing `"title"` or `'title'` that follows the destination.
fn strip_title(inner: &str) -> &str {
    let Some(quote) = inner.chars().last().filter(|c| matches!(c, '"' | '\'')) else {
        return inner;
    };
    let body = &inner[..inner.len() - 1];
    match body.rfind(quote) {
        Some(start)
            if body[..start].ends_with(char::is_whitespace)
                && !body[..start].trim().is_empty() =>
        {
            &body[..start]
        }
        _ => inner,
    }
}

/// Decode everything between a link's parentheses into a destination.
fn decode_destination(inner: &str) -> String {
    let inner = inner.trim();
    let raw = match inner.strip_prefix('<') {
        Some(rest) => rest.find('>').map_or(rest, |end| &rest[..end]),
        None => strip_title(inner),
    };
    percent_space_regex().replace_all(raw.trim(), " ").into_owned()
}

/// Every markdown-style link and embed in `text`, in order of appearance.
pub fn markdown_links(text: &str) -> Vec<MarkdownLink> {
    let mut links = Vec::new();
    let mut pos = 0;
    while let Some(open) = markdown_link_open_regex().find_at(text, pos) {
        let rest = &text[open.end()..];
        let Some(close) = closing_paren(rest) else {
            pos = open.end();
            continue;
        };
        let destination = decode_destination(&rest[..close]);
        if !destination.is_empty() {
            links.push(MarkdownLink {
                embed: open.as_str().starts_with('!'),
                destination,
            });
        }
        pos = open.end() + close + 1;
    }
    links
}

/// Targets of wiki-style links and embeds.
pub fn wiki_targets(text: &str) -> Vec<String> {
    wiki_regex()
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| strip_link_suffixes(m.as_str()))
        .filter(|target| !target.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Targets of markdown-style embeds.
pub fn markdown_targets(text: &str) -> Vec<String> {
    markdown_links(text)
        .into_iter()
        .filter(|link| link.embed)
        .map(|link| strip_link_suffixes(&link.destination).to_owned())
        .filter(|target| !target.is_empty())
        .collect()
}

/// Wiki targets followed by markdown targets, in order of appearance within
/// each syntax.
pub fn embed_targets(text: &str) -> Vec<String> {
    let mut targets = wiki_targets(text);
    targets.extend(markdown_targets(text));
    targets
}
