//! Text-level recovery heuristics: callable signatures are reconstructed from
//! raw source lines, docstrings are cleaned the way Python presents them.

/// Reconstruct a callable's signature by scanning raw source lines from the
/// declaration line forward until a line ending in a scope-opening colon,
/// bounded by the first body line. Matched lines are joined, trailing
/// same-line comments stripped, the colon removed. When the scan fails the
/// placeholder `def {name}(...)` is returned.
pub fn recover_signature(lines: &[&str], decl_row: usize, body_row: usize, name: &str) -> String {
    if decl_row >= lines.len() {
        return placeholder(name);
    }
    let end = body_row.min(lines.len().saturating_sub(1));

    for row in decl_row..=end {
        if !lines[row].trim_end().ends_with(':') {
            continue;
        }
        let joined = lines[decl_row..=row]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join(" ");
        let uncommented = joined.split('#').next().unwrap_or("").trim();
        let sig = uncommented.strip_suffix(':').unwrap_or(uncommented).trim();
        if sig.is_empty() {
            break;
        }
        return sig.to_string();
    }

    placeholder(name)
}

fn placeholder(name: &str) -> String {
    format!("def {}(...)", name)
}

/// Strip the quote delimiters (and any string prefix letters) from the source
/// text of a string literal.
pub fn strip_string_quotes(raw: &str) -> &str {
    let start = raw
        .char_indices()
        .find(|(_, c)| *c == '"' || *c == '\'')
        .map(|(i, _)| i)
        .unwrap_or(0);
    let body = &raw[start..];

    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return &body[quote.len()..body.len() - quote.len()];
        }
    }
    body
}

/// Normalize a docstring body: the first line loses its leading whitespace,
/// continuation lines lose their common indentation, and outer blank lines
/// are dropped.
pub fn clean_docstring(raw: &str) -> String {
    let body = strip_string_quotes(raw);
    let lines: Vec<&str> = body.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let indent = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        if line.len() >= indent {
            cleaned.push(line[indent..].trim_end().to_string());
        } else {
            cleaned.push(line.trim().to_string());
        }
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<&str> {
        source.lines().collect()
    }

    #[test]
    fn test_signature_single_line() {
        let src = lines("def add(a, b):\n    return a + b\n");
        assert_eq!(recover_signature(&src, 0, 1, "add"), "def add(a, b)");
    }

    #[test]
    fn test_signature_multi_line_params() {
        let src = lines("def add(\n    a,\n    b,\n):\n    return a + b\n");
        assert_eq!(recover_signature(&src, 0, 4, "add"), "def add( a, b, )");
    }

    #[test]
    fn test_signature_strips_comment_in_param_list() {
        let src = lines("def add(\n    a,  # left operand\n    b,\n):\n    pass\n");
        let sig = recover_signature(&src, 0, 4, "add");
        assert!(!sig.contains('#'));
        assert!(!sig.ends_with(':'));
        assert!(sig.starts_with("def add("));
    }

    #[test]
    fn test_signature_fallback_for_one_liner_body() {
        // The colon never terminates the line, so the heuristic gives up.
        let src = lines("def add(a, b): return a + b\n");
        assert_eq!(recover_signature(&src, 0, 0, "add"), "def add(...)");
    }

    #[test]
    fn test_signature_out_of_range_row() {
        let src = lines("x = 1\n");
        assert_eq!(recover_signature(&src, 40, 41, "ghost"), "def ghost(...)");
    }

    #[test]
    fn test_strip_triple_quotes() {
        assert_eq!(strip_string_quotes("\"\"\"doc\"\"\""), "doc");
        assert_eq!(strip_string_quotes("'''doc'''"), "doc");
    }

    #[test]
    fn test_strip_single_quotes_and_prefix() {
        assert_eq!(strip_string_quotes("'doc'"), "doc");
        assert_eq!(strip_string_quotes("r\"raw\""), "raw");
    }

    #[test]
    fn test_clean_docstring_multiline() {
        let raw = "\"\"\"Summary line.\n\n    Indented detail.\n    More detail.\n    \"\"\"";
        assert_eq!(
            clean_docstring(raw),
            "Summary line.\n\nIndented detail.\nMore detail."
        );
    }

    #[test]
    fn test_clean_docstring_single_line() {
        assert_eq!(clean_docstring("\"\"\"Does things.\"\"\""), "Does things.");
    }
}
