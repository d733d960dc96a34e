//! File tree plus content store, kept in sync.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tree::{FileTree, NodeKind};

/// Snapshot taken when a generation finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub total_files: usize,
    pub total_lines: usize,
    /// Bytes of UTF-8 content.
    pub total_size: usize,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

/// Path-to-content mapping.
pub type FileContents = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    tree: FileTree,
    contents: FileContents,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tree from a content map, inserting paths in sorted order.
    pub fn from_contents(contents: FileContents) -> Self {
        let mut project = Self::new();
        for (path, content) in contents {
            if let Some(path) = project.create_file(&path) {
                project.contents.insert(path, content);
            }
        }
        project
    }

    /// Restores a saved tree and content map as they were persisted.
    pub fn from_parts(tree: FileTree, contents: FileContents) -> Self {
        Self { tree, contents }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn contents(&self) -> &FileContents {
        &self.contents
    }

    pub fn read(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.contents.is_empty()
    }

    pub fn has_content(&self) -> bool {
        !self.contents.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.contents.clear();
    }

    /// Declares a file and (re)sets its content to empty.
    ///
    /// Returns the normalized path, or `None` when the path is empty or names
    /// an existing folder.
    pub fn create_file(&mut self, path: &str) -> Option<String> {
        let path = self.tree.insert(path, NodeKind::File)?;
        match self.tree.find(&path) {
            Some(node) if !node.is_folder() => {
                self.contents.insert(path.clone(), String::new());
                Some(path)
            }
            _ => {
                tracing::warn!(%path, "cannot create file over an existing folder");
                None
            }
        }
    }

    pub fn create_folder(&mut self, path: &str) -> Option<String> {
        self.tree.insert(path, NodeKind::Folder)
    }

    /// Appends to a file's content; an unknown path starts from empty.
    pub fn append(&mut self, path: &str, fragment: &str) {
        let path = match self.tree.find(path) {
            Some(node) if !node.is_folder() => node.path.clone(),
            _ => match self.create_file(path) {
                Some(path) => {
                    tracing::debug!(%path, "append to undeclared file");
                    path
                }
                None => return,
            },
        };
        self.contents.entry(path).or_default().push_str(fragment);
    }

    /// Replaces a file's content, creating the file when needed.
    pub fn write(&mut self, path: &str, content: impl Into<String>) -> Option<String> {
        let path = match self.tree.find(path) {
            Some(node) if !node.is_folder() => node.path.clone(),
            _ => self.create_file(path)?,
        };
        self.contents.insert(path.clone(), content.into());
        Some(path)
    }

    /// Deletes a node; a folder takes every content entry under its prefix.
    ///
    /// Returns the content paths that were removed.
    pub fn delete(&mut self, path: &str) -> Option<Vec<String>> {
        let node = self.tree.remove(path)?;
        let removed: Vec<String> = match node.kind {
            NodeKind::File => self
                .contents
                .remove_entry(&node.path)
                .map(|(path, _)| path)
                .into_iter()
                .collect(),
            NodeKind::Folder => {
                let prefix = format!("{}/", node.path);
                let nested: Vec<String> = self
                    .contents
                    .keys()
                    .filter(|key| **key == node.path || key.starts_with(&prefix))
                    .cloned()
                    .collect();
                for key in &nested {
                    self.contents.remove(key);
                }
                nested
            }
        };
        Some(removed)
    }

    /// Line count is `split('\n')` segments per file; size is UTF-8 bytes.
    pub fn stats(&self, elapsed: Duration) -> GenerationStats {
        GenerationStats {
            total_files: self.contents.len(),
            total_lines: self
                .contents
                .values()
                .map(|content| content.split('\n').count())
                .sum(),
            total_size: self.contents.values().map(String::len).sum(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
