use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};

/// Directories never worth indexing, on top of whatever `.gitignore` says.
const SKIP_DIRS: &[&str] = &[
    ".logs",
    ".venv",
    ".git",
    "__pycache__",
    "node_modules",
    "build",
    "dist",
];

/// One candidate source file: where it lives on disk and the relative path
/// it is indexed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub abs_path: PathBuf,
    pub rel_path: String,
}

/// Candidate files for a run. A full walk honors `.gitignore` and the
/// skip-directory list; an explicit file list (refresh) is resolved against
/// the project root, silently dropping entries that do not exist or are not
/// Python sources.
pub fn collect_source_files(root: &Path, specific: Option<&[String]>) -> Vec<SourceFile> {
    if let Some(files) = specific {
        return files
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .filter_map(|f| {
                let abs = root.join(f);
                if abs.is_file() && is_python(&abs) {
                    Some(SourceFile {
                        rel_path: normalize(f),
                        abs_path: abs,
                    })
                } else {
                    None
                }
            })
            .collect();
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|entry| !should_skip(entry))
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_python(path) {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            files.push(SourceFile {
                abs_path: path.to_path_buf(),
                rel_path: normalize(&rel),
            });
        }
    }
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    files
}

fn is_python(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "py" || ext == "pyi")
        .unwrap_or(false)
}

fn should_skip(entry: &DirEntry) -> bool {
    entry
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| SKIP_DIRS.contains(&name))
        .unwrap_or(false)
}

fn normalize(rel: &str) -> String {
    rel.replace('\\', "/")
}
