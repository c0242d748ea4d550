use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fred::prelude::*;

use engram::error::Result;
use engram::indexer::{self, project_name};
use engram::model::{Entity, EntityKind, ProjectStatus};
use engram::store::QueryEngine;

#[derive(Parser)]
#[command(name = "engram")]
#[command(about = "Indexes code structure into Redis for fast recall")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Index a project
    engram remember ~/my-project

    # Re-index files you just changed
    engram refresh app/models.py,app/views.py

    # Find a class by name (searches the most recent project)
    engram recall class UserModel

    # List every function in a specific project
    engram recall function --project ~/my-project

    # Check what is indexed
    engram status

    # Drop a project's index
    engram forget --project ~/my-project
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store endpoint; falls back to REDIS_URL, then ~/.engram/config.yaml
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a project directory from scratch
    Remember {
        /// Path to the project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Re-index specific files, leaving the rest of the project untouched
    Refresh {
        /// Comma-separated files, relative to the project root
        files: String,

        /// Project directory (default: current directory)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Look up indexed entities by type and optional name
    Recall {
        /// Entity type: class, function, method, or variable
        entity_type: String,

        /// Name to look up; omit to list the whole type
        name: Option<String>,

        /// Project directory (default: most recently indexed project)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Show indexing status for one or all projects
    Status {
        /// Project directory (default: all projects)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Delete everything indexed for a project
    Forget {
        /// Project directory
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
}

pub async fn remember(client: &Client, path: &Path) -> Result<bool> {
    let report = indexer::index_project(client, path, None).await?;
    println!(
        "Indexed {} files and {} entities for project {}",
        report.files_processed, report.entities_stored, report.project
    );
    if report.files_failed > 0 {
        println!("{} files could not be read", report.files_failed);
    }
    Ok(true)
}

pub async fn refresh(client: &Client, files: &str, project: Option<&Path>) -> Result<bool> {
    let dir = match project {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let list = parse_file_list(files);
    let report = indexer::index_project(client, &dir, Some(list.as_slice())).await?;
    println!(
        "Refreshed {} files ({} entities) in project {}",
        report.files_processed, report.entities_stored, report.project
    );
    Ok(true)
}

pub async fn recall(
    client: &Client,
    entity_type: &str,
    name: Option<&str>,
    project: Option<&Path>,
) -> Result<bool> {
    let kind: EntityKind = entity_type.parse()?;
    let queries = QueryEngine::new(client.clone());

    let project = match project {
        Some(dir) => resolved_project_name(dir),
        None => match queries.most_recent_project().await? {
            Some(project) => {
                tracing::info!("searching most recent project: {}", project);
                project
            }
            None => {
                println!("No indexed projects; run `engram remember` first.");
                return Ok(false);
            }
        },
    };

    let results = queries.find(&project, kind, name).await?;
    if results.is_empty() {
        match name {
            Some(name) => println!("No {} named '{}' in project {}", kind, name, project),
            None => println!("No {}s in project {}", kind, project),
        }
        return Ok(false);
    }

    println!("Found {} {}(s) in project {}", results.len(), kind, project);
    for entity in &results {
        print_entity(entity);
    }
    Ok(true)
}

pub async fn status(client: &Client, project: Option<&Path>) -> Result<bool> {
    let queries = QueryEngine::new(client.clone());
    let statuses = match project {
        Some(dir) => vec![queries.project_status(&resolved_project_name(dir)).await?],
        None => queries.all_statuses().await?,
    };

    if statuses.is_empty() {
        println!("No projects indexed.");
        return Ok(false);
    }
    for status in &statuses {
        print_status(status);
    }
    Ok(true)
}

pub async fn forget(client: &Client, project: &Path) -> Result<bool> {
    let name = resolved_project_name(project);
    let removed = indexer::forget_project(client, project).await?;
    if removed > 0 {
        println!("Forgot project {} ({} keys removed)", name, removed);
        Ok(true)
    } else {
        println!("Nothing indexed for project {}", name);
        Ok(false)
    }
}

fn resolved_project_name(dir: &Path) -> String {
    project_name(&dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()))
}

fn parse_file_list(files: &str) -> Vec<String> {
    files
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

fn print_entity(entity: &Entity) {
    println!();
    println!(
        "{}: {}",
        entity.entity_type.as_str().to_uppercase(),
        entity.name
    );
    println!(
        "  file: {} (lines {}-{})",
        entity.file_path, entity.line_start, entity.line_end
    );
    if let Some(signature) = &entity.signature {
        println!("  signature: {}", signature);
    }
    if let Some(parent) = &entity.parent_class {
        println!("  class: {}", parent);
    }
    if let Some(bases) = &entity.bases {
        if !bases.is_empty() {
            println!("  bases: {}", bases.join(", "));
        }
    }
    if let Some(value) = &entity.value_repr {
        println!("  value: {}", value);
    }
    if !entity.docstring.is_empty() {
        println!("  doc: {}", truncate(&entity.docstring, 200));
    }
}

fn print_status(status: &ProjectStatus) {
    println!();
    println!("Project: {}", status.name);
    match &status.metadata {
        Some(metadata) => {
            println!("  last indexed: {}", metadata.last_indexed_at);
            println!("  indexer version: {}", metadata.version);
            println!(
                "  totals on record: {} files, {} entities",
                metadata.total_files, metadata.total_entities
            );
        }
        None => println!("  not indexed"),
    }
    let counts = &status.counts;
    println!("  files: {}", counts.files);
    println!(
        "  classes: {}  functions: {}  methods: {}  variables: {}",
        counts.class, counts.function, counts.method, counts.variable
    );
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_list() {
        assert_eq!(
            parse_file_list("a.py, b.py ,,c.py"),
            vec!["a.py", "b.py", "c.py"]
        );
        assert!(parse_file_list("").is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
