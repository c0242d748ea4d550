use std::collections::HashMap;

use fred::prelude::*;

use crate::error::Result;
use crate::model::{Entity, EntityCounts, EntityKind, ProjectMetadata, ProjectStatus};
use crate::store::keys::{project_from_metadata_key, KeySpace, ALL_METADATA_PATTERN};
use crate::store::scan_keys;

/// Read-only lookups over a project namespace. Queries never mutate the
/// store and are safe to run concurrently with each other.
pub struct QueryEngine {
    client: Client,
}

impl QueryEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Point lookup by `(type, name)`, or a full type listing when `name` is
    /// `None`. Unknown names and unindexed projects return an empty list.
    pub async fn find(
        &self,
        project: &str,
        kind: EntityKind,
        name: Option<&str>,
    ) -> Result<Vec<Entity>> {
        let keys = KeySpace::new(project);
        let mut results = Vec::new();

        match name {
            Some(name) => {
                let ids: Vec<String> = self
                    .client
                    .smembers(keys.search_index(kind, name))
                    .await?;
                if ids.is_empty() {
                    return Ok(results);
                }
                let rows: Vec<Option<String>> = self
                    .client
                    .hmget(keys.collection(kind), ids)
                    .await?;
                for row in rows.into_iter().flatten() {
                    if let Ok(entity) = serde_json::from_str(&row) {
                        results.push(entity);
                    }
                }
            }
            None => {
                let all: HashMap<String, String> =
                    self.client.hgetall(keys.collection(kind)).await?;
                for row in all.values() {
                    if let Ok(entity) = serde_json::from_str(row) {
                        results.push(entity);
                    }
                }
            }
        }

        Ok(results)
    }

    /// Metadata record for one project, absent when the project was never
    /// indexed (or was forgotten).
    pub async fn metadata(&self, project: &str) -> Result<Option<ProjectMetadata>> {
        let keys = KeySpace::new(project);
        let raw: Option<String> = self.client.get(keys.metadata()).await?;
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    /// Live collection sizes, read in one pipelined round trip.
    pub async fn counts(&self, project: &str) -> Result<EntityCounts> {
        let keys = KeySpace::new(project);
        let pipeline = self.client.pipeline();
        for kind in EntityKind::ALL {
            let _: () = pipeline.hlen(keys.collection(kind)).await?;
        }
        let _: () = pipeline.scard(keys.file_index()).await?;
        let sizes: Vec<u64> = pipeline.all().await?;

        Ok(EntityCounts {
            class: sizes.first().copied().unwrap_or(0),
            function: sizes.get(1).copied().unwrap_or(0),
            method: sizes.get(2).copied().unwrap_or(0),
            variable: sizes.get(3).copied().unwrap_or(0),
            files: sizes.get(4).copied().unwrap_or(0),
        })
    }

    /// Combined status for one project. A missing metadata record reports as
    /// unindexed rather than an error.
    pub async fn project_status(&self, project: &str) -> Result<ProjectStatus> {
        let metadata = self.metadata(project).await?;
        let counts = self.counts(project).await?;
        Ok(ProjectStatus {
            name: project.to_string(),
            indexed: metadata.is_some(),
            metadata,
            counts,
        })
    }

    /// Status for every indexed project, most recently indexed first.
    pub async fn all_statuses(&self) -> Result<Vec<ProjectStatus>> {
        let mut statuses = Vec::new();
        for key in scan_keys(&self.client, ALL_METADATA_PATTERN).await? {
            if let Some(project) = project_from_metadata_key(&key) {
                statuses.push(self.project_status(project).await?);
            }
        }
        statuses.sort_by(|a, b| {
            let ts = |s: &ProjectStatus| {
                s.metadata
                    .as_ref()
                    .map(|m| m.last_indexed_timestamp)
                    .unwrap_or(0.0)
            };
            ts(b).partial_cmp(&ts(a)).unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(statuses)
    }

    /// Name of the most recently indexed project, if any.
    pub async fn most_recent_project(&self) -> Result<Option<String>> {
        let mut best: Option<(String, f64)> = None;
        for key in scan_keys(&self.client, ALL_METADATA_PATTERN).await? {
            let Some(project) = project_from_metadata_key(&key) else {
                continue;
            };
            let Some(metadata) = self.metadata(project).await? else {
                continue;
            };
            let newer = best
                .as_ref()
                .map(|(_, ts)| metadata.last_indexed_timestamp > *ts)
                .unwrap_or(true);
            if newer {
                best = Some((project.to_string(), metadata.last_indexed_timestamp));
            }
        }
        Ok(best.map(|(name, _)| name))
    }
}
