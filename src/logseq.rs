//! Logseq block formatting.
//!
//! Turns Markdown into Logseq's outline format, where every block is a `- `
//! bullet and nesting is expressed with two-space indentation, and provides
//! the link, tag and filename helpers used when saving into a graph.

use chrono::{Datelike, NaiveDate};

use crate::capture::CapturePayload;
use crate::markdown;
use crate::patterns::{BULLET_LINE, HEADING_LINE, ORDERED_LINE, PAGE_FILENAME_RESERVED, QUOTE_PREFIX, RULE_LINE};

/// Convert Markdown to Logseq blocks nested `indent` levels deep.
///
/// Headings become bold blocks, quotes become `- > ` blocks, list items keep
/// their relative nesting (ordered items become bullets), and fenced code is
/// kept together as one block. Blank lines are dropped.
///
/// ```
/// use logseq_clipper::logseq::to_blocks;
///
/// let blocks = to_blocks("## Intro\n\nSome text\n\n- a\n  - b", 0);
/// assert_eq!(blocks, "- **Intro**\n- Some text\n- a\n  - b");
/// ```
#[must_use]
pub fn to_blocks(markdown: &str, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut out: Vec<String> = Vec::new();
    let mut code: Option<(String, Vec<String>)> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if let Some(fence) = trimmed.strip_prefix("```") {
            match code.take() {
                None => code = Some((fence.to_string(), Vec::new())),
                Some((language, body)) => {
                    out.push(format!("{pad}- ```{language}"));
                    out.extend(body);
                    out.push(format!("{pad}  ```"));
                }
            }
            continue;
        }
        if let Some((_, body)) = code.as_mut() {
            body.push(format!("{pad}  {line}"));
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = HEADING_LINE.captures(line) {
            out.push(format!("{pad}- **{}**", &caps[2]));
            continue;
        }

        if trimmed.starts_with('>') {
            let quote = QUOTE_PREFIX.replace(trimmed, "");
            out.push(format!("{pad}- > {}", quote.trim()));
            continue;
        }

        if let Some(caps) = BULLET_LINE.captures(line).or_else(|| ORDERED_LINE.captures(line)) {
            let nesting = "  ".repeat(caps[1].len() / 2);
            out.push(format!("{pad}{nesting}- {}", &caps[2]));
            continue;
        }

        if RULE_LINE.is_match(line) {
            out.push(format!("{pad}- ---"));
            continue;
        }

        out.push(format!("{pad}- {trimmed}"));
    }

    // an unterminated fence still keeps its code
    if let Some((language, body)) = code {
        out.push(format!("{pad}- ```{language}"));
        out.extend(body);
        out.push(format!("{pad}  ```"));
    }

    out.join("\n")
}

/// Convert an HTML fragment straight to Logseq blocks.
#[must_use]
pub fn html_to_blocks(html: &str, indent: usize) -> String {
    to_blocks(&markdown::html_to_markdown(html), indent)
}

/// Insert `key:: value` properties under the first block.
///
/// Properties with blank values are skipped. Content that does not start with
/// a bullet is returned unchanged.
#[must_use]
pub fn with_properties(content: &str, properties: &[(&str, &str)]) -> String {
    let props: Vec<String> = properties
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| format!("  {key}:: {value}"))
        .collect();
    if props.is_empty() {
        return content.to_string();
    }

    let mut lines = content.lines();
    match lines.next() {
        Some(first) if first.starts_with("- ") => std::iter::once(first.to_string())
            .chain(props)
            .chain(lines.map(str::to_string))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => content.to_string(),
    }
}

/// Escape page-reference and block-reference brackets.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace("[[", r"\[\[")
        .replace("]]", r"\]\]")
        .replace("((", r"\(\(")
        .replace("))", r"\)\)")
}

#[must_use]
pub fn page_link(page: &str) -> String {
    format!("[[{page}]]")
}

/// A tag; names with spaces use the bracketed form.
#[must_use]
pub fn tag(name: &str) -> String {
    let clean = name.trim().trim_start_matches('#').trim();
    if clean.contains(' ') {
        format!("#[[{clean}]]")
    } else {
        format!("#{clean}")
    }
}

/// Comma-separated tag list to space-separated Logseq tags.
#[must_use]
pub fn format_tags(csv: &str) -> String {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(tag)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a date with `yyyy`, `MM` and `dd` tokens.
#[must_use]
pub fn format_date(date: NaiveDate, format: &str) -> String {
    format
        .replacen("yyyy", &format!("{:04}", date.year()), 1)
        .replacen("MM", &format!("{:02}", date.month()), 1)
        .replacen("dd", &format!("{:02}", date.day()), 1)
}

/// Journal file for a date, e.g. `2024_03_09.md` for format `yyyy_MM_dd`.
#[must_use]
pub fn journal_filename(date: NaiveDate, format: &str) -> String {
    format!("{}.md", format_date(date, format))
}

/// Page file for a page name; characters a filename cannot hold become `___`.
#[must_use]
pub fn page_filename(page: &str) -> String {
    format!("{}.md", PAGE_FILENAME_RESERVED.replace_all(page, "___"))
}

/// Page name for a page file, the inverse of [`page_filename`] for namespaces.
#[must_use]
pub fn page_name(filename: &str) -> String {
    filename.strip_suffix(".md").unwrap_or(filename).replace("___", "/")
}

/// How a capture is rendered before saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain Markdown.
    Markdown,
    /// Logseq blocks, nested one level under the clip's title block.
    #[default]
    Logseq,
}

/// Render a capture payload's HTML in the requested format. Falls back to the
/// plain text when the HTML yields nothing.
#[must_use]
pub fn format_capture(payload: &CapturePayload, format: OutputFormat) -> String {
    let mut md = markdown::html_to_markdown(&payload.html);
    if md.is_empty() {
        md.clone_from(&payload.text);
    }
    match format {
        OutputFormat::Markdown => md,
        OutputFormat::Logseq => to_blocks(&md, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_from_mixed_markdown() {
        let md = "# Title\n\nPara one\n> quoted line\n1. first\n2. second\n   - nested\n\n---";
        let blocks = to_blocks(md, 0);
        assert_eq!(
            blocks,
            "- **Title**\n- Para one\n- > quoted line\n- first\n- second\n  - nested\n- ---"
        );
    }

    #[test]
    fn test_blocks_keep_code_together() {
        let md = "```rust\nfn main() {\n    go();\n}\n```\nafter";
        let blocks = to_blocks(md, 1);
        assert_eq!(
            blocks,
            "  - ```rust\n    fn main() {\n        go();\n    }\n    ```\n  - after"
        );
    }

    #[test]
    fn test_highlight_survives_conversion() {
        let html = r#"<p>a <mark class="lc-highlight" data-lc-color="Blue">key idea</mark></p>"#;
        assert_eq!(html_to_blocks(html, 0), "- a ==key idea== (Blue)");
    }

    #[test]
    fn test_with_properties() {
        let content = "- **Clip**\n  - body";
        let out = with_properties(content, &[("url", "https://x.dev"), ("tags", "  ")]);
        assert_eq!(out, "- **Clip**\n  url:: https://x.dev\n  - body");
        assert_eq!(with_properties("plain", &[("url", "x")]), "plain");
        assert_eq!(with_properties(content, &[]), content);
    }

    #[test]
    fn test_escape_references() {
        assert_eq!(escape("see [[Page]] and ((ref))"), r"see \[\[Page\]\] and \(\(ref\)\)");
    }

    #[test]
    fn test_tags() {
        assert_eq!(tag("#rust"), "#rust");
        assert_eq!(tag("web clipping"), "#[[web clipping]]");
        assert_eq!(format_tags("rust, web clipping, ,notes"), "#rust #[[web clipping]] #notes");
        assert_eq!(format_tags(""), "");
        assert_eq!(page_link("Reading List"), "[[Reading List]]");
    }

    #[test]
    fn test_filenames() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        assert_eq!(journal_filename(date, "yyyy-MM-dd"), "2024-03-09.md");
        assert_eq!(journal_filename(date, "yyyy_MM_dd"), "2024_03_09.md");
        assert_eq!(page_filename("Books/Rust: Intro?"), "Books___Rust___ Intro___.md");
        assert_eq!(page_name("Books___Rust.md"), "Books/Rust");
    }

    #[test]
    fn test_format_capture() {
        let payload = CapturePayload {
            html: "<h2>Heading</h2><p>Body text</p>".to_string(),
            text: "Heading\n\nBody text".to_string(),
            title: "T".to_string(),
            url: "https://x.dev".to_string(),
            element_count: 2,
            highlights: Vec::new(),
        };
        assert_eq!(format_capture(&payload, OutputFormat::Markdown), "## Heading\n\nBody text");
        assert_eq!(format_capture(&payload, OutputFormat::Logseq), "  - **Heading**\n  - Body text");
    }
}
