use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngramError;

/// The four structural entity kinds tracked by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Function,
    Method,
    Variable,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Class,
        EntityKind::Function,
        EntityKind::Method,
        EntityKind::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Variable => "variable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EngramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(EntityKind::Class),
            "function" => Ok(EntityKind::Function),
            "method" => Ok(EntityKind::Method),
            "variable" => Ok(EntityKind::Variable),
            other => Err(EngramError::UnknownEntityKind(other.to_string())),
        }
    }
}

/// One indexed structural unit: a class, function, method, or variable.
///
/// Identity is `(file_path, entity_type, name, parent_class)`; the composite
/// id rendered by [`Entity::id`] is what the store keys records by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityKind,
    pub file_path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_repr: Option<String>,
    #[serde(default)]
    pub docstring: String,
    pub line_start: usize,
    pub line_end: usize,
}

impl Entity {
    /// Composite id: `{file}:{name}` for top-level entities,
    /// `{file}:{parent}.{name}` for methods.
    pub fn id(&self) -> String {
        match (self.entity_type, self.parent_class.as_deref()) {
            (EntityKind::Method, Some(parent)) => {
                format!("{}:{}.{}", self.file_path, parent, self.name)
            }
            (EntityKind::Method, None) => format!("{}:unknown.{}", self.file_path, self.name),
            _ => format!("{}:{}", self.file_path, self.name),
        }
    }
}

/// Full-text snapshot of one indexed file, stored independently of the
/// entities extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
    pub size: usize,
    pub last_modified: i64,
}

/// Per-project summary record, created on first index and merged on every
/// subsequent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub path: String,
    pub last_indexed_at: String,
    pub last_indexed_timestamp: f64,
    pub version: String,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub total_entities: u64,
    #[serde(default)]
    pub updated_files: Vec<String>,
}

/// Live counts read from the store, one per entity collection plus the file
/// set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub class: u64,
    pub function: u64,
    pub method: u64,
    pub variable: u64,
    pub files: u64,
}

impl EntityCounts {
    pub fn total_entities(&self) -> u64 {
        self.class + self.function + self.method + self.variable
    }
}

/// Status summary for one project: metadata record (if any) plus live
/// collection counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub name: String,
    pub indexed: bool,
    pub metadata: Option<ProjectMetadata>,
    pub counts: EntityCounts,
}
