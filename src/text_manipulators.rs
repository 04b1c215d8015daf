use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Text of a node with runs of whitespace (including non-breaking spaces)
/// collapsed to a single space.
pub fn extract_clean_text(node: ElementRef) -> String {
    collapse_whitespace(&extract_text(node))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Overview labels come as `Sponsor:`; we key on `sponsor`.
pub fn normalize_label(label: &str) -> String {
    collapse_whitespace(label)
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

/// Strips the GPO preamble and the `A BILL` / `AN ACT` heading from a plain
/// text bill, leaving the enacting clause onwards.
pub fn strip_bill_text_preamble(text: &str) -> String {
    let mut body = match text.split_once("<DOC>") {
        Some((_, after)) => after.trim(),
        None => text.trim(),
    };
    for heading in ["AN ACT\n", "A BILL\n"] {
        if let Some((_, after)) = body.split_once(heading) {
            body = after.trim();
        }
    }
    body.to_string()
}
