//! Section heading detection
//!
//! A page's section label comes from the first heading pattern that matches
//! within the page's first 200 characters. Patterns are tried in priority
//! order; a page with no match gets an empty label.

use std::sync::LazyLock;

use regex::Regex;

/// Characters of page text inspected for a heading
pub const SECTION_SCAN_CHARS: usize = 200;

/// A heading pattern: group 1 is the number, optional group 2 the title
struct HeadingPattern {
    name: &'static str,
    regex: Regex,
}

static PATTERNS: LazyLock<Vec<HeadingPattern>> = LazyLock::new(|| {
    [
        ("chapter", r"(?:Chapter|CHAPTER)\s+(\d+|[IVX]+)(?:\s*[:.]\s*(.+))?"),
        ("section", r"(?:Section|SECTION)\s+(\d+\.\d+(?:\.\d+)*)(?:\s*[:.]\s*(.+))?"),
        ("dotted", r"^\s*(\d+\.\d+(?:\.\d+)*)\s+(.+)"),
        ("numbered", r"^\s*(\d+)\s+(.+)"),
    ]
    .into_iter()
    .map(|(name, pattern)| HeadingPattern {
        name,
        regex: Regex::new(pattern).expect("valid heading regex"),
    })
    .collect()
});

/// End of the first sentence inside a captured title
static TITLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](?:\s|$)").expect("valid title regex"));

/// Leading slice of `text` holding at most `max_chars` characters
fn head(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

fn clean_title(raw: &str) -> &str {
    let title = TITLE_END.find(raw).map_or(raw, |m| &raw[..m.start()]);
    title.trim()
}

/// Detect the section label of a page
///
/// Returns `"N: title"` when a title was captured, `"N"` when only a number
/// was, and an empty string when nothing matched.
pub fn detect_section(text: &str) -> String {
    let scan = head(text, SECTION_SCAN_CHARS);

    for pattern in PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(scan) else {
            continue;
        };
        let Some(number) = caps.get(1) else {
            continue;
        };

        tracing::trace!(pattern = pattern.name, "section heading matched");

        let title = caps.get(2).map(|m| clean_title(m.as_str())).unwrap_or_default();
        return if title.is_empty() {
            number.as_str().to_string()
        } else {
            format!("{}: {title}", number.as_str())
        };
    }

    String::new()
}
