//! Writes project files to a real directory.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use codegen_studio::FileContents;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub written: usize,
    /// Paths that would escape the target directory.
    pub skipped: Vec<String>,
}

pub fn write_project(contents: &FileContents, dir: &Path) -> Result<Materialized> {
    let mut report = Materialized::default();
    for (path, content) in contents {
        let Some(relative) = contained_path(path) else {
            tracing::warn!(path = %path, "skipping path outside the output directory");
            report.skipped.push(path.clone());
            continue;
        };
        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
        report.written += 1;
    }
    Ok(report)
}

/// Relative path made only of normal components, or `None`.
fn contained_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files_and_skips_escaping_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut contents = FileContents::new();
        contents.insert("index.html".to_string(), "<p>x</p>".to_string());
        contents.insert("css/site/style.css".to_string(), "p {}".to_string());
        contents.insert("../escape.txt".to_string(), "nope".to_string());
        contents.insert("/etc/passwd".to_string(), "nope".to_string());

        let report = write_project(&contents, temp.path()).expect("write");

        assert_eq!(report.written, 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("css/site/style.css")).expect("read"),
            "p {}"
        );
        assert!(!temp.path().parent().expect("parent").join("escape.txt").exists());
    }
}
