use crate::model::EntityKind;

/// Pattern matching every project's metadata record, used for project
/// discovery.
pub const ALL_METADATA_PATTERN: &str = "code:*:metadata";

/// The keyed namespace of one project. Every key the store ever writes for a
/// project is produced here, which is what makes full namespace deletion and
/// per-file invalidation complete.
///
/// | key | value |
/// |---|---|
/// | `code:{project}:files:{relPath}` | file record JSON |
/// | `code:{project}:file_index` | set of indexed relative paths |
/// | `code:{project}:{type}s` | hash of entity id to entity JSON |
/// | `code:{project}:search_index:{type}:{name}` | set of entity ids |
/// | `code:{project}:file_entities:{relPath}` | set of `{type}:{entity_id}` tags |
/// | `code:{project}:metadata` | project metadata JSON |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    project: String,
    prefix: String,
}

impl KeySpace {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            prefix: format!("code:{}", project),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn metadata(&self) -> String {
        format!("{}:metadata", self.prefix)
    }

    pub fn file_index(&self) -> String {
        format!("{}:file_index", self.prefix)
    }

    pub fn file(&self, rel_path: &str) -> String {
        format!("{}:files:{}", self.prefix, rel_path)
    }

    pub fn collection(&self, kind: EntityKind) -> String {
        format!("{}:{}s", self.prefix, kind)
    }

    pub fn search_index(&self, kind: EntityKind, name: &str) -> String {
        format!("{}:search_index:{}:{}", self.prefix, kind, name)
    }

    pub fn file_entities(&self, rel_path: &str) -> String {
        format!("{}:file_entities:{}", self.prefix, rel_path)
    }

    /// Glob matching every key in this project's namespace.
    pub fn namespace_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }
}

/// Tag stored in a file's entity set: `{type}:{entity_id}`.
pub fn encode_tag(kind: EntityKind, entity_id: &str) -> String {
    format!("{}:{}", kind, entity_id)
}

/// Split a tag back into its kind and entity id.
pub fn decode_tag(tag: &str) -> Option<(EntityKind, &str)> {
    let (kind, id) = tag.split_once(':')?;
    Some((kind.parse().ok()?, id))
}

/// Derive the name-index component from an entity id: the segment after the
/// final `:`, with any `parent.` method prefix stripped.
pub fn index_name_for_id(entity_id: &str) -> &str {
    let name = entity_id.rsplit(':').next().unwrap_or(entity_id);
    match name.rsplit_once('.') {
        Some((_, short)) => short,
        None => name,
    }
}

/// Project identifier embedded in a `code:{project}:metadata` key.
pub fn project_from_metadata_key(key: &str) -> Option<&str> {
    let rest = key.strip_prefix("code:")?;
    let project = rest.strip_suffix(":metadata")?;
    if project.is_empty() {
        None
    } else {
        Some(project)
    }
}
