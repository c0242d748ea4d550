use tree_sitter::Tree;

use crate::error::{EngramError, Result};

/// A parsed source file: the syntax tree plus the text it was parsed from.
pub struct ParsedSource {
    tree: Tree,
    source: String,
}

impl ParsedSource {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node_text(&self, node: &tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// True when the grammar could not make sense of some part of the file.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

pub fn parse_python(source: &str) -> Result<ParsedSource> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| EngramError::Parse(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| EngramError::Parse("failed to parse source".to_string()))?;

    Ok(ParsedSource {
        tree,
        source: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_module() {
        let parsed = parse_python("def main():\n    pass\n").unwrap();
        assert_eq!(parsed.root_node().kind(), "module");
        assert!(!parsed.has_errors());
    }

    #[test]
    fn test_parse_empty_source() {
        let parsed = parse_python("").unwrap();
        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().named_child_count(), 0);
    }

    #[test]
    fn test_parse_flags_syntax_errors() {
        let parsed = parse_python("def broken(:\n").unwrap();
        assert!(parsed.has_errors());
    }

    #[test]
    fn test_node_text() {
        let parsed = parse_python("x = 1\n").unwrap();
        let root = parsed.root_node();
        assert_eq!(parsed.node_text(&root).trim_end(), "x = 1");
    }
}
