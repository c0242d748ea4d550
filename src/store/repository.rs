use fred::prelude::*;

use crate::error::Result;
use crate::model::{Entity, EntityKind, FileRecord};
use crate::store::batch::WriteBatch;
use crate::store::keys::{decode_tag, encode_tag, index_name_for_id, KeySpace};
use crate::store::scan_keys;

/// Outcome of a per-file invalidation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearStats {
    /// Files that actually had tracked entities.
    pub files_with_entities: usize,
    /// Entity records deleted across all cleared files.
    pub entities_removed: usize,
}

/// Owns every mutation of one project's namespace. Entity writes are grouped
/// by type and applied one atomic batch per type; deletion applies one atomic
/// batch per file. Atomicity never spans types or files.
pub struct Repository {
    client: Client,
    keys: KeySpace,
}

impl Repository {
    pub fn new(client: Client, keys: KeySpace) -> Self {
        Self { client, keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Store a file's full-text snapshot and register it in the project file
    /// set.
    pub async fn write_file(&self, record: &FileRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let _: () = self
            .client
            .set(self.keys.file(&record.path), payload, None, None, false)
            .await?;
        let _: () = self
            .client
            .sadd(self.keys.file_index(), record.path.as_str())
            .await?;
        Ok(())
    }

    /// Write a batch of entities, grouped by type. Each type's records, its
    /// name-index additions, and its file-index tags apply as one atomic
    /// unit. A type batch that fails to apply is logged and skipped; the
    /// remaining types still go through.
    pub async fn write_entities(&self, entities: &[Entity]) -> Result<usize> {
        let mut stored = 0;

        for kind in EntityKind::ALL {
            let group: Vec<&Entity> = entities
                .iter()
                .filter(|e| e.entity_type == kind)
                .collect();
            if group.is_empty() {
                continue;
            }

            let mut batch = WriteBatch::new();
            for entity in &group {
                let id = entity.id();
                batch.hset(
                    self.keys.collection(kind),
                    id.clone(),
                    serde_json::to_string(entity)?,
                );
                batch.sadd(self.keys.search_index(kind, &entity.name), id.clone());
                batch.sadd(
                    self.keys.file_entities(&entity.file_path),
                    encode_tag(kind, &id),
                );
            }

            match batch.apply(&self.client).await {
                Ok(()) => stored += group.len(),
                Err(e) => {
                    tracing::error!(
                        "failed to store {} batch for {}: {}",
                        kind,
                        self.keys.project(),
                        e
                    );
                }
            }
        }

        Ok(stored)
    }

    /// Remove everything the namespace tracks for the given files: their
    /// entities, the name-index memberships, the per-file index sets, the
    /// content records, and their file-set membership. Returns how many of
    /// the files had tracked entities and how many entity records were
    /// dropped.
    pub async fn clear_files(&self, rel_paths: &[String]) -> Result<ClearStats> {
        let mut stats = ClearStats::default();

        for rel_path in rel_paths {
            let tags: Vec<String> = match self
                .client
                .smembers(self.keys.file_entities(rel_path))
                .await
            {
                Ok(tags) => tags,
                Err(e) => {
                    tracing::error!("failed to read entity set for {}: {}", rel_path, e);
                    continue;
                }
            };

            let mut batch = WriteBatch::new();
            let mut removed = 0;
            for tag in &tags {
                let Some((kind, id)) = decode_tag(tag) else {
                    continue;
                };
                batch.hdel(self.keys.collection(kind), id.to_string());
                batch.srem(
                    self.keys.search_index(kind, index_name_for_id(id)),
                    id.to_string(),
                );
                removed += 1;
            }
            batch.del(self.keys.file_entities(rel_path));
            batch.del(self.keys.file(rel_path));
            batch.srem(self.keys.file_index(), rel_path.clone());

            match batch.apply(&self.client).await {
                Ok(()) => {
                    if !tags.is_empty() {
                        stats.files_with_entities += 1;
                        stats.entities_removed += removed;
                    }
                }
                Err(e) => {
                    tracing::error!("failed to clear {}: {}", rel_path, e);
                }
            }
        }

        Ok(stats)
    }

    /// Delete every key under the project namespace. Returns the number of
    /// keys removed.
    pub async fn clear_project(&self) -> Result<usize> {
        let keys = scan_keys(&self.client, &self.keys.namespace_pattern()).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let count = keys.len();
        let _: () = self.client.del(keys).await?;
        Ok(count)
    }
}
