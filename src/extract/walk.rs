use tree_sitter::Node;

use super::parser::{parse_python, ParsedSource};
use super::text::{clean_docstring, recover_signature};
use crate::model::{Entity, EntityKind};

/// Kind of construct whose body is currently being walked. Threaded through
/// the traversal instead of mutating parent links onto tree nodes.
#[derive(Debug, Clone)]
enum Scope {
    Module,
    Type(String),
    Other,
}

pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every entity from one file's source. A file that fails to
    /// parse, or parses with syntax errors, yields an empty list — extraction
    /// failure is local to the file and never aborts a run.
    pub fn extract(&self, rel_path: &str, source: &str) -> Vec<Entity> {
        let parsed = match parse_python(source) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("parser unavailable for {}: {}", rel_path, e);
                return Vec::new();
            }
        };
        if parsed.has_errors() {
            tracing::debug!("syntax errors in {}, extracting nothing", rel_path);
            return Vec::new();
        }

        let lines: Vec<&str> = source.lines().collect();
        let mut walk = Walk {
            parsed: &parsed,
            rel_path,
            lines,
            entities: Vec::new(),
        };
        walk.walk_block(parsed.root_node(), &Scope::Module);
        walk.entities
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

struct Walk<'a> {
    parsed: &'a ParsedSource,
    rel_path: &'a str,
    lines: Vec<&'a str>,
    entities: Vec<Entity>,
}

impl<'a> Walk<'a> {
    fn walk_block(&mut self, block: Node<'a>, scope: &Scope) {
        let mut cursor = block.walk();
        for stmt in block.named_children(&mut cursor) {
            self.visit_statement(stmt, scope);
        }
    }

    fn visit_statement(&mut self, stmt: Node<'a>, scope: &Scope) {
        match stmt.kind() {
            "decorated_definition" => {
                if let Some(definition) = stmt.child_by_field_name("definition") {
                    self.visit_statement(definition, scope);
                }
            }
            "function_definition" => {
                self.on_callable(stmt, scope);
                if let Some(body) = stmt.child_by_field_name("body") {
                    self.walk_block(body, &Scope::Other);
                }
            }
            "class_definition" => {
                self.on_class(stmt, scope);
                let class_scope = stmt
                    .child_by_field_name("name")
                    .map(|name| Scope::Type(self.parsed.node_text(&name).to_string()))
                    .unwrap_or(Scope::Other);
                if let Some(body) = stmt.child_by_field_name("body") {
                    self.walk_block(body, &class_scope);
                }
            }
            "expression_statement" => {
                self.on_expression_statement(stmt, scope);
            }
            _ => self.descend(stmt),
        }
    }

    /// Generic descent for control-flow and other compound statements:
    /// anything directly inside them sits outside module and type scope.
    fn descend(&mut self, node: Node<'a>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "block" => self.walk_block(child, &Scope::Other),
                "function_definition"
                | "class_definition"
                | "decorated_definition"
                | "expression_statement" => self.visit_statement(child, &Scope::Other),
                _ => self.descend(child),
            }
        }
    }

    fn on_callable(&mut self, node: Node<'a>, scope: &Scope) {
        let (kind, parent_class) = match scope {
            Scope::Module => (EntityKind::Function, None),
            Scope::Type(name) => (EntityKind::Method, Some(name.clone())),
            Scope::Other => return,
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.parsed.node_text(&name_node).to_string();
        let body = node.child_by_field_name("body");

        let decl_row = node.start_position().row;
        let body_row = body.map(|b| b.start_position().row).unwrap_or(decl_row);
        let scan_end = if body_row > decl_row {
            body_row - 1
        } else {
            body_row
        };
        let signature = recover_signature(&self.lines, decl_row, scan_end, &name);

        self.entities.push(Entity {
            entity_type: kind,
            file_path: self.rel_path.to_string(),
            name,
            parent_class,
            signature: Some(signature),
            bases: None,
            value_repr: None,
            docstring: body.map(|b| self.body_docstring(b)).unwrap_or_default(),
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        });
    }

    fn on_class(&mut self, node: Node<'a>, scope: &Scope) {
        // Only module-level type declarations become entities.
        if !matches!(scope, Scope::Module) {
            return;
        }
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };

        let mut bases = Vec::new();
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                if base.kind() == "keyword_argument" || base.kind() == "comment" {
                    continue;
                }
                let text = self.parsed.node_text(&base).trim().to_string();
                bases.push(if text.is_empty() {
                    "<unknown>".to_string()
                } else {
                    text
                });
            }
        }

        self.entities.push(Entity {
            entity_type: EntityKind::Class,
            file_path: self.rel_path.to_string(),
            name: self.parsed.node_text(&name_node).to_string(),
            parent_class: None,
            signature: None,
            bases: Some(bases),
            value_repr: None,
            docstring: node
                .child_by_field_name("body")
                .map(|b| self.body_docstring(b))
                .unwrap_or_default(),
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
        });
    }

    fn on_expression_statement(&mut self, stmt: Node<'a>, scope: &Scope) {
        let parent_class = match scope {
            Scope::Module => None,
            Scope::Type(name) => Some(name.clone()),
            Scope::Other => return,
        };
        let Some(assign) = stmt.named_child(0).filter(|n| n.kind() == "assignment") else {
            return;
        };
        // Annotated assignments carry a type field and are not captured.
        if assign.child_by_field_name("type").is_some() {
            return;
        }
        let Some(left) = assign
            .child_by_field_name("left")
            .filter(|n| n.kind() == "identifier")
        else {
            return;
        };

        // Chained assignment: record the outermost target, render the
        // innermost value.
        let mut value = assign.child_by_field_name("right");
        while let Some(node) = value {
            if node.kind() != "assignment" {
                break;
            }
            value = node.child_by_field_name("right");
        }

        self.entities.push(Entity {
            entity_type: EntityKind::Variable,
            file_path: self.rel_path.to_string(),
            name: self.parsed.node_text(&left).to_string(),
            parent_class,
            signature: None,
            bases: None,
            value_repr: Some(
                value
                    .map(|node| self.render_value(node))
                    .unwrap_or_else(|| "<expr>".to_string()),
            ),
            docstring: String::new(),
            line_start: stmt.start_position().row + 1,
            line_end: stmt.end_position().row + 1,
        });
    }

    /// Best-effort textual snapshot of an assigned value: literal constants
    /// keep their source text, containers are elided, everything else is
    /// opaque. The value is never evaluated.
    fn render_value(&self, node: Node<'a>) -> String {
        match node.kind() {
            "string" | "concatenated_string" | "integer" | "float" | "true" | "false"
            | "none" => self.parsed.node_text(&node).to_string(),
            "list" => "[...]".to_string(),
            "dictionary" => "{...}".to_string(),
            _ => "<expr>".to_string(),
        }
    }

    /// Docstring of a class or callable body: the first statement, when it is
    /// a bare string literal. Absent docstrings are the empty string.
    fn body_docstring(&self, body: Node<'a>) -> String {
        let Some(first) = body.named_child(0).filter(|n| n.kind() == "expression_statement")
        else {
            return String::new();
        };
        let Some(string) = first.named_child(0).filter(|n| n.kind() == "string") else {
            return String::new();
        };
        clean_docstring(self.parsed.node_text(&string))
    }
}
