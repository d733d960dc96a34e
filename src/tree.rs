//! Virtual file tree.
//!
//! Invariants: a node's `path` is the `/`-joined names of its ancestors and
//! itself; paths are unique; each level keeps folders before files, then
//! orders by name.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<FileNode>,
}

impl FileNode {
    fn new(name: &str, path: String, kind: NodeKind) -> Self {
        Self {
            name: name.to_owned(),
            path,
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// Ordered forest of root-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<FileNode>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[FileNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    /// Inserts `path`, synthesizing missing parent folders.
    ///
    /// Existing nodes are kept as they are. A segment that resolves to an
    /// existing file stops the walk, so nothing is nested under a file.
    /// Returns the normalized path, or `None` when it has no segments.
    pub fn insert(&mut self, path: &str, kind: NodeKind) -> Option<String> {
        let segments = split_path(path);
        if segments.is_empty() {
            return None;
        }

        let mut level = &mut self.roots;
        for (index, segment) in segments.iter().enumerate() {
            let is_target = index + 1 == segments.len();
            let position = match level.iter().position(|node| node.name == *segment) {
                Some(position) => position,
                None => {
                    let node_kind = if is_target { kind } else { NodeKind::Folder };
                    let full_path = segments[..=index].join("/");
                    level.push(FileNode::new(segment, full_path, node_kind));
                    level.sort_by(compare_nodes);
                    level
                        .iter()
                        .position(|node| node.name == *segment)
                        .unwrap_or_default()
                }
            };

            if !level[position].is_folder() {
                break;
            }
            level = &mut level[position].children;
        }

        Some(segments.join("/"))
    }

    /// Removes the node at `path` with its whole subtree.
    pub fn remove(&mut self, path: &str) -> Option<FileNode> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;

        let mut level = &mut self.roots;
        for segment in parents {
            let node = level.iter_mut().find(|node| node.name == *segment)?;
            level = &mut node.children;
        }
        let position = level.iter().position(|node| node.name == *last)?;
        Some(level.remove(position))
    }

    pub fn find(&self, path: &str) -> Option<&FileNode> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;

        let mut level = &self.roots;
        for segment in parents {
            level = &level.iter().find(|node| node.name == *segment)?.children;
        }
        level.iter().find(|node| node.name == *last)
    }

    /// First file in depth-first tree order.
    pub fn first_file(&self) -> Option<&str> {
        fn walk(nodes: &[FileNode]) -> Option<&str> {
            nodes.iter().find_map(|node| match node.kind {
                NodeKind::File => Some(node.path.as_str()),
                NodeKind::Folder => walk(&node.children),
            })
        }
        walk(&self.roots)
    }

    /// Every file path in depth-first tree order.
    pub fn file_paths(&self) -> Vec<String> {
        fn walk(nodes: &[FileNode], out: &mut Vec<String>) {
            for node in nodes {
                match node.kind {
                    NodeKind::File => out.push(node.path.clone()),
                    NodeKind::Folder => walk(&node.children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    /// Indented listing, two spaces per level, folders suffixed with `/`.
    pub fn render(&self) -> String {
        fn walk(nodes: &[FileNode], depth: usize, out: &mut String) {
            for node in nodes {
                out.push_str(&"  ".repeat(depth));
                out.push_str(&node.name);
                if node.is_folder() {
                    out.push('/');
                }
                out.push('\n');
                walk(&node.children, depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(&self.roots, 0, &mut out);
        out
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Folders first, then case-insensitive name order with a case-sensitive tie-break.
fn compare_nodes(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Folder, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Folder) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::{FileTree, NodeKind};

    fn names(tree: &FileTree) -> Vec<&str> {
        tree.roots().iter().map(|node| node.name.as_str()).collect()
    }

    #[test]
    fn insert_synthesizes_parent_folders() {
        let mut tree = FileTree::new();
        tree.insert("src/components/Button.tsx", NodeKind::File);

        let button = tree.find("src/components/Button.tsx").expect("file node");
        assert_eq!(button.kind, NodeKind::File);
        assert_eq!(tree.find("src").expect("src").kind, NodeKind::Folder);
        assert_eq!(
            tree.find("src/components").expect("components").path,
            "src/components"
        );
    }

    #[test]
    fn folders_sort_before_files_then_by_name() {
        let mut tree = FileTree::new();
        for path in ["b.txt", "zeta/x", "A.txt", "alpha/y", "a.txt"] {
            tree.insert(path, NodeKind::File);
        }
        assert_eq!(names(&tree), vec!["alpha", "zeta", "A.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn inserting_twice_keeps_one_node() {
        let mut tree = FileTree::new();
        tree.insert("a/b.txt", NodeKind::File);
        tree.insert("a/b.txt", NodeKind::File);
        tree.insert("/a//b.txt", NodeKind::File);
        assert_eq!(tree.file_paths(), vec!["a/b.txt".to_owned()]);
    }

    #[test]
    fn empty_path_is_ignored() {
        let mut tree = FileTree::new();
        assert_eq!(tree.insert("//", NodeKind::File), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn remove_drops_subtree() {
        let mut tree = FileTree::new();
        tree.insert("a/b/c.txt", NodeKind::File);
        tree.insert("d.txt", NodeKind::File);
        let removed = tree.remove("a").expect("folder removed");
        assert_eq!(removed.children.len(), 1);
        assert_eq!(tree.file_paths(), vec!["d.txt".to_owned()]);
        assert!(tree.remove("missing").is_none());
    }

    #[test]
    fn first_file_is_depth_first() {
        let mut tree = FileTree::new();
        tree.insert("z.txt", NodeKind::File);
        tree.insert("src/main.rs", NodeKind::File);
        assert_eq!(tree.first_file(), Some("src/main.rs"));
    }

    #[test]
    fn render_indents_by_depth() {
        let mut tree = FileTree::new();
        tree.insert("src/lib.rs", NodeKind::File);
        tree.insert("README.md", NodeKind::File);
        assert_eq!(tree.render(), "src/\n  lib.rs\nREADME.md\n");
    }

    #[test]
    fn serializes_as_nested_node_list() {
        let mut tree = FileTree::new();
        tree.insert("css/style.css", NodeKind::File);

        let value = serde_json::to_value(&tree).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!([{
                "name": "css",
                "path": "css",
                "type": "folder",
                "children": [{
                    "name": "style.css",
                    "path": "css/style.css",
                    "type": "file",
                    "children": []
                }]
            }])
        );
        let back: FileTree = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, tree);
    }
}
