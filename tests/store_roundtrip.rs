//! Round-trip tests against a live Redis. They index real temporary project
//! trees and are ignored by default; run them with a local server up:
//!
//! ```text
//! cargo test -- --ignored
//! ```

use std::fs;
use std::path::Path;

use engram::model::EntityKind;
use engram::store::{self, QueryEngine};
use engram::{forget_project, index_project};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string())
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

async fn cleanup(client: &fred::clients::Client, dir: &Path) {
    forget_project(client, dir).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn full_index_then_lookup() {
    let client = store::connect(&redis_url()).await.unwrap();
    let project = tempfile::tempdir().unwrap();
    write(
        project.path(),
        "widgets.py",
        "class Widget:\n    def run(self):\n        pass\n\ndef run():\n    pass\n",
    );
    write(project.path(), "consts.py", "LIMIT = 9\n");

    let report = index_project(&client, project.path(), None).await.unwrap();
    assert_eq!(report.files_processed, 2);
    assert_eq!(report.entities_stored, 4);

    let queries = QueryEngine::new(client.clone());
    let name = report.project.as_str();

    let classes = queries.find(name, EntityKind::Class, Some("Widget")).await.unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].file_path, "widgets.py");

    let methods = queries.find(name, EntityKind::Method, Some("run")).await.unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].parent_class.as_deref(), Some("Widget"));

    let functions = queries.find(name, EntityKind::Function, None).await.unwrap();
    assert_eq!(functions.len(), 1);

    let status = queries.project_status(name).await.unwrap();
    assert!(status.indexed);
    assert_eq!(status.counts.files, 2);
    assert_eq!(status.counts.total_entities(), 4);
    let metadata = status.metadata.unwrap();
    assert_eq!(metadata.total_files, 2);
    assert_eq!(metadata.total_entities, 4);

    cleanup(&client, project.path()).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn refresh_replaces_only_named_files() {
    let client = store::connect(&redis_url()).await.unwrap();
    let project = tempfile::tempdir().unwrap();
    write(project.path(), "f.py", "def foo():\n    pass\n");
    write(project.path(), "other.py", "def stable():\n    pass\n");

    let report = index_project(&client, project.path(), None).await.unwrap();
    let name = report.project.clone();
    let queries = QueryEngine::new(client.clone());

    // Rename foo to bar, refresh only f.py.
    write(project.path(), "f.py", "def bar():\n    pass\n");
    let refresh = index_project(&client, project.path(), Some(&["f.py".to_string()]))
        .await
        .unwrap();
    assert!(refresh.partial);

    let foo = queries.find(&name, EntityKind::Function, Some("foo")).await.unwrap();
    assert!(foo.is_empty(), "stale name must resolve to nothing");

    let bar = queries.find(&name, EntityKind::Function, Some("bar")).await.unwrap();
    assert_eq!(bar.len(), 1);
    assert_eq!(bar[0].file_path, "f.py");

    let stable = queries
        .find(&name, EntityKind::Function, Some("stable"))
        .await
        .unwrap();
    assert_eq!(stable.len(), 1, "untouched files keep their entities");

    // Rename did not change the real totals; the record must agree.
    let metadata = queries.metadata(&name).await.unwrap().unwrap();
    assert_eq!(metadata.total_files, 2);
    assert_eq!(metadata.total_entities, 2);

    cleanup(&client, project.path()).await;
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn forget_leaves_project_unindexed() {
    let client = store::connect(&redis_url()).await.unwrap();
    let project = tempfile::tempdir().unwrap();
    write(project.path(), "a.py", "X = 1\n");

    let report = index_project(&client, project.path(), None).await.unwrap();
    let removed = forget_project(&client, project.path()).await.unwrap();
    assert!(removed > 0);

    let queries = QueryEngine::new(client.clone());
    let status = queries.project_status(&report.project).await.unwrap();
    assert!(!status.indexed);
    assert_eq!(status.counts.files, 0);
    assert_eq!(status.counts.total_entities(), 0);

    let variables = queries
        .find(&report.project, EntityKind::Variable, None)
        .await
        .unwrap();
    assert!(variables.is_empty());
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn syntax_error_file_does_not_abort_the_run() {
    let client = store::connect(&redis_url()).await.unwrap();
    let project = tempfile::tempdir().unwrap();
    write(project.path(), "good.py", "def ok():\n    pass\n");
    write(project.path(), "bad.py", "def nope(:\n");

    let report = index_project(&client, project.path(), None).await.unwrap();
    assert_eq!(report.files_processed, 2, "both files stored as content");
    assert_eq!(report.entities_stored, 1, "only the parsable file yields entities");

    let queries = QueryEngine::new(client.clone());
    let status = queries.project_status(&report.project).await.unwrap();
    assert_eq!(status.counts.files, 2);
    assert_eq!(status.counts.function, 1);

    cleanup(&client, project.path()).await;
}
