//! HTML to Markdown conversion for captured fragments.
//!
//! A small block/inline walker over `dom_query` nodes. Block elements become
//! blank-line separated Markdown blocks; inline formatting is carried over
//! where Markdown has an equivalent. Picker highlight markers become
//! `==text== (Colour)` so the colour survives into Logseq.

use crate::dom::{self, NodeRef};
use crate::highlight::range::COLOR_ATTR;
use crate::patterns::{BLOCK_TAGS, CODE_LANGUAGE_CLASS, HIDDEN_TAGS, WHITESPACE_NORMALIZE};

/// Characters that have special meaning in Markdown text.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '`'];

/// Escape Markdown special characters in literal text.
///
/// # Examples
///
/// ```
/// use logseq_clipper::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*"), r"\*not italic\*");
/// assert_eq!(escape_markdown("my_variable"), r"my\_variable");
/// ```
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Convert an HTML fragment to Markdown.
///
/// ```
/// use logseq_clipper::markdown::html_to_markdown;
///
/// let md = html_to_markdown("<h2>Title</h2><p>Some <strong>bold</strong> text</p>");
/// assert_eq!(md, "## Title\n\nSome **bold** text");
/// ```
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let doc = dom::parse(html);
    let Some(body) = dom::select_first(&doc, "body") else {
        return String::new();
    };
    node_to_markdown(&dom::node(&doc, body))
}

/// Convert the children of a node to Markdown.
#[must_use]
pub fn node_to_markdown(node: &NodeRef) -> String {
    blocks_of(node).join("\n\n")
}

fn is_block(node: &NodeRef) -> bool {
    dom::is_tag(node, BLOCK_TAGS) || dom::is_tag(node, &["video", "audio"])
}

/// Markdown blocks for a node's children.
fn blocks_of(node: &NodeRef) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut paragraph = String::new();
    for child in node.children() {
        if child.is_element() && is_block(&child) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.extend(block(&child));
        } else {
            paragraph.push_str(&inline(&child));
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(paragraph: &mut String, blocks: &mut Vec<String>) {
    let text = paragraph
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if !text.is_empty() {
        blocks.push(text.to_string());
    }
    paragraph.clear();
}

/// Markdown for one block-level element.
fn block(node: &NodeRef) -> Vec<String> {
    let tag = dom::tag_name(node).unwrap_or_default();
    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            let text = inline_children(node);
            let text = WHITESPACE_NORMALIZE.replace_all(text.trim(), " ");
            if text.is_empty() {
                Vec::new()
            } else {
                vec![format!("{} {text}", "#".repeat(level))]
            }
        }
        "pre" => vec![code_block(node)],
        "ul" | "ol" => {
            let list = list(node, tag == "ol");
            if list.is_empty() {
                Vec::new()
            } else {
                vec![list]
            }
        }
        "blockquote" => {
            let inner = node_to_markdown(node);
            if inner.is_empty() {
                return Vec::new();
            }
            let quoted = inner
                .lines()
                .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
                .collect::<Vec<_>>()
                .join("\n");
            vec![quoted]
        }
        "hr" => vec!["---".to_string()],
        "table" => {
            let table = table(node);
            if table.is_empty() {
                Vec::new()
            } else {
                vec![table]
            }
        }
        "video" | "audio" => media_source(node)
            .map(|src| vec![format!("[{tag}]({src})")])
            .unwrap_or_default(),
        _ => blocks_of(node),
    }
}

fn code_block(node: &NodeRef) -> String {
    let code_child = node
        .children()
        .into_iter()
        .find(|c| dom::is_tag(c, &["code"]));
    let language = [Some(*node), code_child]
        .into_iter()
        .flatten()
        .filter_map(|n| dom::attr(&n, "class"))
        .find_map(|class| CODE_LANGUAGE_CLASS.captures(&class).map(|c| c[1].to_string()))
        .unwrap_or_default();
    let code = node.text();
    format!("```{language}\n{}\n```", code.trim_end_matches('\n'))
}

fn list(node: &NodeRef, ordered: bool) -> String {
    let mut number = dom::attr(node, "start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let mut lines = Vec::new();
    for item in node.children().into_iter().filter(|c| dom::is_tag(c, &["li"])) {
        let marker = if ordered {
            format!("{number}. ")
        } else {
            "- ".to_string()
        };
        number += 1;

        let content = blocks_of(&item).join("\n");
        let mut item_lines = content.lines();
        let first = item_lines.next().unwrap_or_default();
        lines.push(format!("{marker}{first}").trim_end().to_string());
        for line in item_lines {
            lines.push(if line.is_empty() { String::new() } else { format!("  {line}") });
        }
    }
    lines.join("\n")
}

fn media_source(node: &NodeRef) -> Option<String> {
    dom::attr(node, "src").or_else(|| {
        node.children()
            .into_iter()
            .filter(|c| dom::is_tag(c, &["source"]))
            .find_map(|c| dom::attr(&c, "src"))
    })
}

fn inline_children(node: &NodeRef) -> String {
    node.children().iter().map(inline).collect()
}

/// Inline Markdown for a node.
fn inline(node: &NodeRef) -> String {
    if node.is_text() {
        let text = node.text();
        return escape_markdown(&WHITESPACE_NORMALIZE.replace_all(&text, " "));
    }
    let Some(tag) = dom::tag_name(node) else {
        return String::new();
    };
    if HIDDEN_TAGS.contains(&tag.as_str()) {
        return String::new();
    }

    let wrap = |marker: &str| {
        let inner = inline_children(node);
        let trimmed = inner.trim();
        if trimmed.is_empty() {
            return inner;
        }
        // keep surrounding spaces outside the markers
        let lead = if inner.starts_with(' ') { " " } else { "" };
        let trail = if inner.ends_with(' ') { " " } else { "" };
        format!("{lead}{marker}{trimmed}{marker}{trail}")
    };

    match tag.as_str() {
        "strong" | "b" => wrap("**"),
        "em" | "i" => wrap("*"),
        "del" | "s" | "strike" => wrap("~~"),
        "code" | "kbd" | "samp" => {
            let code = node.text();
            if code.is_empty() {
                String::new()
            } else {
                format!("`{code}`")
            }
        }
        "br" => "\n".to_string(),
        "a" => {
            let text = inline_children(node);
            let text = text.trim();
            match dom::attr(node, "href").filter(|h| !h.trim().is_empty()) {
                Some(href) if !text.is_empty() => format!("[{text}]({})", href.trim()),
                _ => text.to_string(),
            }
        }
        "img" => match dom::attr(node, "src") {
            Some(src) => format!("![{}]({src})", escape_markdown(&dom::attr(node, "alt").unwrap_or_default())),
            None => String::new(),
        },
        "mark" => {
            let marked = wrap("==");
            match dom::attr(node, COLOR_ATTR) {
                Some(color) if !marked.trim().is_empty() => {
                    let trail = if marked.ends_with(' ') { " " } else { "" };
                    format!("{} ({color}){trail}", marked.trim_end())
                }
                _ => marked,
            }
        }
        _ => inline_children(node),
    }
}

// === Tables ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn of(cell: &NodeRef) -> Self {
        match dom::attr(cell, "align").map(|a| a.to_ascii_lowercase()).as_deref() {
            Some("left") => Self::Left,
            Some("center") => Self::Center,
            Some("right") => Self::Right,
            _ => Self::None,
        }
    }

    fn separator(self, width: usize) -> String {
        let dashes = width.max(3);
        match self {
            Self::Left => format!(" :{} ", "-".repeat(dashes - 1)),
            Self::Center => format!(" :{}: ", "-".repeat(dashes - 2)),
            Self::Right => format!(" {}: ", "-".repeat(dashes - 1)),
            Self::None => format!(" {} ", "-".repeat(dashes)),
        }
    }
}

/// GitHub-flavoured table; the first row is the header.
fn table(node: &NodeRef) -> String {
    let rows: Vec<Vec<(String, Alignment)>> = dom::Selection::from(*node)
        .select("tr")
        .nodes()
        .iter()
        .map(|tr| {
            tr.children()
                .into_iter()
                .filter(|c| dom::is_tag(c, &["td", "th"]))
                .map(|cell| {
                    let raw = inline_children(&cell);
                    let text = WHITESPACE_NORMALIZE.replace_all(raw.trim(), " ");
                    (text.replace('|', "\\|"), Alignment::of(&cell))
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    let Some(header) = rows.first() else {
        return String::new();
    };
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![3; columns];
    for row in &rows {
        for (i, (text, _)) in row.iter().enumerate() {
            widths[i] = widths[i].max(text.chars().count());
        }
    }

    let render_row = |row: &[(String, Alignment)]| {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let text = row.get(i).map_or("", |(t, _)| t.as_str());
            let pad = width.saturating_sub(text.chars().count());
            line.push(' ');
            line.push_str(text);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = vec![render_row(header.as_slice())];
    let mut separator = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let align = header.get(i).map_or(Alignment::None, |(_, a)| *a);
        separator.push_str(&align.separator(*width));
        separator.push('|');
    }
    out.push(separator);
    out.extend(rows.iter().skip(1).map(|row| render_row(row.as_slice())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_markdown("[not a link]"), r"\[not a link\]");
        assert_eq!(escape_markdown(r"path\to"), r"path\\to");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown(""), "");
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let md = html_to_markdown("<h1>Top</h1><p>First   line</p><h3>Sub</h3>");
        assert_eq!(md, "# Top\n\nFirst line\n\n### Sub");
    }

    #[test]
    fn test_inline_formatting() {
        let md = html_to_markdown(
            r#"<p>An <em>emphasised</em> and <b>bold</b> <a href="https://x.dev">link</a> with <code>a_b</code></p>"#,
        );
        assert_eq!(md, "An *emphasised* and **bold** [link](https://x.dev) with `a_b`");
    }

    #[test]
    fn test_nested_lists() {
        let md = html_to_markdown("<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul><ol start=\"3\"><li>c</li><li>d</li></ol>");
        assert_eq!(md, "- one\n  - inner\n- two\n\n3. c\n4. d");
    }

    #[test]
    fn test_code_block_language() {
        let md = html_to_markdown("<pre><code class=\"language-rust\">fn main() {}\n</code></pre>");
        assert_eq!(md, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_blockquote() {
        let md = html_to_markdown("<blockquote><p>quoted</p><p>more</p></blockquote>");
        assert_eq!(md, "> quoted\n>\n> more");
    }

    #[test]
    fn test_highlight_markers() {
        let md = html_to_markdown(
            r#"<p>see <mark class="lc-highlight" data-lc-color="Green">hello world</mark> here</p><p><mark>plain</mark></p>"#,
        );
        assert_eq!(md, "see ==hello world== (Green) here\n\n==plain==");
    }

    #[test]
    fn test_images_and_breaks() {
        let md = html_to_markdown(r#"<p>line one<br>line two</p><figure><img src="a.png" alt="A"><figcaption>Cap</figcaption></figure>"#);
        assert_eq!(md, "line one\nline two\n\n![A](a.png)\n\nCap");
    }

    #[test]
    fn test_scripts_dropped() {
        let md = html_to_markdown("<p>kept</p><script>alert(1)</script><style>p{}</style>");
        assert_eq!(md, "kept");
    }

    #[test]
    fn test_simple_table() {
        let md = html_to_markdown(
            r#"<table><tr><th>A</th><th align="right">B</th></tr><tr><td>1</td><td>2</td></tr></table>"#,
        );
        assert_eq!(md, "| A   | B   |\n| --- | --: |\n| 1   | 2   |");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(html_to_markdown("<table></table>"), "");
    }
}
