use fred::prelude::*;

use crate::error::Result;
use crate::model::ProjectMetadata;
use crate::store::keys::KeySpace;

/// `updated_files` keeps this many most-recent distinct paths.
pub const UPDATED_FILES_CAP: usize = 20;

/// What one indexing run contributes to the project metadata record.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub project_name: String,
    pub project_path: String,
    pub files_processed: u64,
    pub entities_processed: u64,
    /// Relative paths written during this run, in processing order.
    pub touched_files: Vec<String>,
    /// Of the refresh batch, how many files the namespace already tracked.
    pub known_files: u64,
    /// Entity records deleted by the refresh's invalidation pass.
    pub entities_removed: u64,
    pub partial: bool,
}

/// Merge a run into the prior metadata record. Pure so the accounting rules
/// are testable without a store.
///
/// Full runs set absolute totals. Partial runs add the processed counts,
/// subtracting already-known files so repeated refreshes of the same file do
/// not inflate `total_files`, and subtracting the entity records removed by
/// invalidation so `total_entities` tracks the real collection size instead
/// of drifting upward when refreshed files shrink.
pub fn merge(
    prior: Option<ProjectMetadata>,
    run: &RunSummary,
    indexed_at: String,
    timestamp: f64,
) -> ProjectMetadata {
    let prior = prior.unwrap_or_default();

    let (total_files, total_entities) = if run.partial {
        (
            (prior.total_files + run.files_processed).saturating_sub(run.known_files),
            (prior.total_entities + run.entities_processed).saturating_sub(run.entities_removed),
        )
    } else {
        (run.files_processed, run.entities_processed)
    };

    let mut updated_files: Vec<String> = Vec::with_capacity(UPDATED_FILES_CAP);
    let prior_ring: &[String] = if run.partial { &prior.updated_files } else { &[] };
    let recent_first = run.touched_files.iter().rev().chain(prior_ring.iter());
    for path in recent_first {
        if updated_files.len() == UPDATED_FILES_CAP {
            break;
        }
        if !updated_files.contains(path) {
            updated_files.push(path.clone());
        }
    }

    ProjectMetadata {
        name: run.project_name.clone(),
        path: run.project_path.clone(),
        last_indexed_at: indexed_at,
        last_indexed_timestamp: timestamp,
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_files,
        total_entities,
        updated_files,
    }
}

/// Maintains the one metadata record per project: read, merge, write back.
pub struct MetadataTracker {
    client: Client,
    keys: KeySpace,
}

impl MetadataTracker {
    pub fn new(client: Client, keys: KeySpace) -> Self {
        Self { client, keys }
    }

    pub async fn record_run(&self, run: &RunSummary) -> Result<ProjectMetadata> {
        let prior: Option<ProjectMetadata> = self
            .client
            .get::<Option<String>, _>(self.keys.metadata())
            .await?
            .and_then(|json| serde_json::from_str(&json).ok());

        let now = chrono::Utc::now();
        let merged = merge(
            prior,
            run,
            now.to_rfc3339(),
            now.timestamp_millis() as f64 / 1000.0,
        );

        let _: () = self
            .client
            .set(
                self.keys.metadata(),
                serde_json::to_string(&merged)?,
                None,
                None,
                false,
            )
            .await?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_run(files: u64, entities: u64, touched: &[&str]) -> RunSummary {
        RunSummary {
            project_name: "proj".into(),
            project_path: "/work/proj".into(),
            files_processed: files,
            entities_processed: entities,
            touched_files: touched.iter().map(|s| s.to_string()).collect(),
            partial: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_run_sets_absolute_totals() {
        let prior = ProjectMetadata {
            total_files: 99,
            total_entities: 999,
            ..Default::default()
        };
        let merged = merge(Some(prior), &full_run(4, 31, &["a.py"]), "t".into(), 1.0);
        assert_eq!(merged.total_files, 4);
        assert_eq!(merged.total_entities, 31);
        assert_eq!(merged.name, "proj");
        assert_eq!(merged.last_indexed_timestamp, 1.0);
    }

    #[test]
    fn test_first_run_without_prior() {
        let merged = merge(None, &full_run(2, 7, &["a.py", "b.py"]), "t".into(), 1.0);
        assert_eq!(merged.total_files, 2);
        assert_eq!(merged.total_entities, 7);
        assert_eq!(merged.updated_files, vec!["b.py", "a.py"]);
    }

    #[test]
    fn test_partial_run_adds_only_new_files() {
        let prior = merge(None, &full_run(3, 10, &[]), "t".into(), 1.0);
        let refresh = RunSummary {
            project_name: "proj".into(),
            project_path: "/work/proj".into(),
            files_processed: 2,
            entities_processed: 6,
            touched_files: vec!["a.py".into(), "new.py".into()],
            known_files: 1,
            entities_removed: 4,
            partial: true,
        };
        let merged = merge(Some(prior), &refresh, "t2".into(), 2.0);
        // One of the two refreshed files was already counted.
        assert_eq!(merged.total_files, 4);
        // 10 prior + 6 written - 4 invalidated.
        assert_eq!(merged.total_entities, 12);
    }

    #[test]
    fn test_refreshing_same_file_twice_does_not_double_count() {
        let prior = merge(None, &full_run(3, 10, &[]), "t".into(), 1.0);
        let refresh = RunSummary {
            files_processed: 1,
            entities_processed: 5,
            touched_files: vec!["a.py".into()],
            known_files: 1,
            entities_removed: 5,
            partial: true,
            ..full_run(0, 0, &[])
        };
        let once = merge(Some(prior), &refresh, "t".into(), 2.0);
        let twice = merge(Some(once.clone()), &refresh, "t".into(), 3.0);
        assert_eq!(once.total_files, 3);
        assert_eq!(twice.total_files, 3);
        assert_eq!(twice.total_entities, once.total_entities);
    }

    #[test]
    fn test_shrunk_file_reduces_entity_total() {
        let prior = merge(None, &full_run(1, 8, &[]), "t".into(), 1.0);
        let refresh = RunSummary {
            files_processed: 1,
            entities_processed: 3,
            touched_files: vec!["a.py".into()],
            known_files: 1,
            entities_removed: 8,
            partial: true,
            ..full_run(0, 0, &[])
        };
        let merged = merge(Some(prior), &refresh, "t".into(), 2.0);
        assert_eq!(merged.total_entities, 3);
    }

    #[test]
    fn test_full_reindex_discards_partial_drift() {
        let drifted = ProjectMetadata {
            total_files: 7,
            total_entities: 120,
            updated_files: vec!["stale.py".into()],
            ..Default::default()
        };
        let merged = merge(Some(drifted), &full_run(5, 40, &["a.py"]), "t".into(), 9.0);
        assert_eq!(merged.total_files, 5);
        assert_eq!(merged.total_entities, 40);
        assert_eq!(merged.updated_files, vec!["a.py"]);
    }

    #[test]
    fn test_updated_files_ring_caps_at_twenty_distinct() {
        let mut metadata = merge(None, &full_run(0, 0, &[]), "t".into(), 1.0);
        for i in 0..30 {
            let refresh = RunSummary {
                files_processed: 1,
                entities_processed: 0,
                touched_files: vec![format!("f{}.py", i)],
                known_files: 0,
                entities_removed: 0,
                partial: true,
                ..full_run(0, 0, &[])
            };
            metadata = merge(Some(metadata), &refresh, "t".into(), i as f64);
        }
        assert_eq!(metadata.updated_files.len(), UPDATED_FILES_CAP);
        assert_eq!(metadata.updated_files[0], "f29.py");
        assert!(!metadata.updated_files.contains(&"f5.py".to_string()));
    }

    #[test]
    fn test_updated_files_dedups_repeated_refresh() {
        let first = merge(None, &full_run(2, 0, &["a.py", "b.py"]), "t".into(), 1.0);
        let refresh = RunSummary {
            files_processed: 1,
            touched_files: vec!["a.py".into()],
            known_files: 1,
            partial: true,
            ..full_run(0, 0, &[])
        };
        let merged = merge(Some(first), &refresh, "t".into(), 2.0);
        assert_eq!(merged.updated_files, vec!["a.py", "b.py"]);
    }
}
