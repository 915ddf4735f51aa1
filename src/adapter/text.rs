//! Text helpers shared by the extractors

use regex::Regex;
use std::sync::OnceLock;
use tree_sitter::Node;

/// Value of a tree-sitter-python `string` node, without prefix and quotes
pub fn python_string_value(node: Node<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    let start = children.iter().find(|c| c.kind() == "string_start");
    let end = children.iter().rev().find(|c| c.kind() == "string_end");

    match (start, end) {
        (Some(start), Some(end)) if start.end_byte() <= end.start_byte() => {
            source[start.end_byte()..end.start_byte()].to_string()
        }
        _ => strip_quotes(&source[node.byte_range()]),
    }
}

/// Value of a JavaScript string literal node
pub fn js_string_value(node: Node<'_>, source: &str) -> String {
    strip_quotes(&source[node.byte_range()])
}

/// Remove an optional string prefix (`r`, `b`, `f`, `u`) and matching quotes
pub fn strip_quotes(text: &str) -> String {
    let text = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if text.len() >= quote.len() * 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[quote.len()..text.len() - quote.len()].to_string();
        }
    }
    text.to_string()
}

/// Expand tabs to the next multiple of eight columns
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// `line` without its first `n` chars
fn skip_chars(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((at, _)) => &line[at..],
        None => "",
    }
}

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does.
/// Indentation is measured in chars, after tab expansion.
pub fn clean_docstring(raw: &str) -> String {
    let lines: Vec<String> = raw.lines().map(expand_tabs).collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start());
    for line in &lines[1..] {
        let cut = margin.min(indent_width(line));
        cleaned.push(skip_chars(line, cut).trim_end());
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

fn jsdoc_line_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^\s*\*\s?").expect("static pattern"))
}

/// Body of a `/** ... */` block comment, or `None` for other comments
pub fn clean_jsdoc(comment: &str) -> Option<String> {
    let inner = comment.strip_prefix("/**")?.strip_suffix("*/")?;
    let lines: Vec<String> = inner
        .lines()
        .map(|l| jsdoc_line_prefix().replace(l, "").trim_end().to_string())
        .collect();

    let first = lines.iter().position(|l| !l.trim().is_empty())?;
    let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[first..=last].join("\n").trim().to_string())
}

/// First named child that is not a comment
pub fn first_statement<'t>(block: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = block.walk();
    let found = block
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment");
    found
}

/// Named children that are not comments
pub fn named_children_skipping_comments<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// 1-indexed starting line of a node
pub fn line_of(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}
