//! HTML to markdown conversion
//!
//! Wraps `html2md` and normalizes its output so every heading is written in
//! ATX form (`# Title`) instead of setext underlines.

/// Convert an HTML document to markdown
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    let raw = html2md::parse_html(html);
    normalize_headings(&raw).trim().to_string()
}

/// Rewrite setext headings and strip closing `#` sequences
///
/// Lines inside fenced code blocks are copied unchanged.
#[must_use]
pub fn normalize_headings(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_fence(line) {
            in_fence = !in_fence;
            out.push(line.to_string());
            i += 1;
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        if let Some(next) = lines.get(i + 1) {
            if let Some(level) = setext_level(next) {
                let text = line.trim();
                if !text.is_empty() && !is_list_or_quote(text) {
                    out.push(format!("{} {text}", "#".repeat(level)));
                    i += 2;
                    continue;
                }
            }
        }

        out.push(strip_closing_hashes(line));
        i += 1;
    }

    out.join("\n")
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn setext_level(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    if trimmed.len() < 3 {
        return None;
    }
    if trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

fn is_list_or_quote(text: &str) -> bool {
    text.starts_with("* ") || text.starts_with("- ") || text.starts_with("> ")
}

fn strip_closing_hashes(line: &str) -> String {
    let trimmed = line.trim_end();
    if !trimmed.trim_start().starts_with('#') {
        return line.to_string();
    }
    match trimmed.trim_end_matches('#').strip_suffix(' ') {
        Some(body) if body.trim_start().contains(' ') => body.trim_end().to_string(),
        _ => line.to_string(),
    }
}
