use std::path::Path;
use std::time::UNIX_EPOCH;

use fred::prelude::*;
use rayon::prelude::*;

use crate::error::{EngramError, Result};
use crate::extract::EntityExtractor;
use crate::model::{Entity, FileRecord};
use crate::store::{ClearStats, KeySpace, MetadataTracker, Repository, RunSummary};
use crate::walker::{collect_source_files, SourceFile};

/// What one indexing run did, for caller reporting.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub project: String,
    pub files_processed: usize,
    pub entities_stored: usize,
    pub files_failed: usize,
    pub partial: bool,
}

struct ExtractedFile {
    record: FileRecord,
    entities: Vec<Entity>,
}

/// Stable short identifier for a project directory: its file name.
pub fn project_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Index a project directory. With `specific` absent this is a full reindex:
/// the namespace is cleared first and rebuilt from every discovered file.
/// With `specific` present it is a partial refresh: only the named files are
/// invalidated and rewritten, everything else is left untouched.
pub async fn index_project(
    client: &Client,
    dir: &Path,
    specific: Option<&[String]>,
) -> Result<IndexReport> {
    if !dir.is_dir() {
        return Err(EngramError::DirectoryNotFound(dir.display().to_string()));
    }
    let root = dir.canonicalize()?;
    let project = project_name(&root);
    let keys = KeySpace::new(&project);
    let repository = Repository::new(client.clone(), keys.clone());
    let partial = specific.is_some();

    if partial {
        tracing::info!("refreshing files in project {}", project);
    } else {
        tracing::info!("indexing project {}", project);
        let removed = repository.clear_project().await?;
        if removed > 0 {
            tracing::info!("cleared {} existing keys for {}", removed, project);
        }
    }

    let files = collect_source_files(&root, specific);
    if files.is_empty() {
        return Err(EngramError::NoSourceFiles(root.display().to_string()));
    }

    // Extraction has no cross-file dependencies; run it on the thread pool
    // before the first store round trip.
    let extracted: Vec<ExtractedFile> = files.par_iter().filter_map(read_and_extract).collect();
    let files_failed = files.len() - extracted.len();

    let cleared = if partial {
        let rel_paths: Vec<String> = extracted.iter().map(|f| f.record.path.clone()).collect();
        repository.clear_files(&rel_paths).await?
    } else {
        ClearStats::default()
    };

    let mut entities_stored = 0;
    for unit in &extracted {
        if let Err(e) = repository.write_file(&unit.record).await {
            tracing::error!("failed to store content of {}: {}", unit.record.path, e);
        }
        entities_stored += repository.write_entities(&unit.entities).await?;
    }

    let run = RunSummary {
        project_name: project.clone(),
        project_path: root.display().to_string(),
        files_processed: extracted.len() as u64,
        entities_processed: entities_stored as u64,
        touched_files: extracted.iter().map(|f| f.record.path.clone()).collect(),
        known_files: cleared.files_with_entities as u64,
        entities_removed: cleared.entities_removed as u64,
        partial,
    };
    MetadataTracker::new(client.clone(), keys)
        .record_run(&run)
        .await?;

    tracing::info!(
        "stored {} files and {} entities for {}",
        extracted.len(),
        entities_stored,
        project
    );

    Ok(IndexReport {
        project,
        files_processed: extracted.len(),
        entities_stored,
        files_failed,
        partial,
    })
}

/// Delete a project's entire namespace. Returns the number of keys removed.
pub async fn forget_project(client: &Client, dir: &Path) -> Result<usize> {
    let project = project_name(&dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()));
    let repository = Repository::new(client.clone(), KeySpace::new(&project));
    repository.clear_project().await
}

fn read_and_extract(file: &SourceFile) -> Option<ExtractedFile> {
    let bytes = match std::fs::read(&file.abs_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to read {}: {}", file.rel_path, e);
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes).into_owned();

    let last_modified = std::fs::metadata(&file.abs_path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0);

    let entities = EntityExtractor::new().extract(&file.rel_path, &content);

    Some(ExtractedFile {
        record: FileRecord {
            path: file.rel_path.clone(),
            size: content.len(),
            content,
            last_modified,
        },
        entities,
    })
}
