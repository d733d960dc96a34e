use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = "codegen-studio";
pub const PROJECTS_FILE_NAME: &str = "projects.json";

const ARCHIVE_NAME_CHARS: usize = 30;

/// Application directory under a platform config dir.
#[must_use]
pub fn store_root(config_dir: &Path) -> PathBuf {
    config_dir.join(STORE_DIR)
}

#[must_use]
pub fn projects_file(root: &Path) -> PathBuf {
    root.join(PROJECTS_FILE_NAME)
}

/// Export name: first 30 characters of the prompt (or `project`), with
/// whitespace and `/` replaced by `-`.
#[must_use]
pub fn archive_file_name(prompt: &str) -> String {
    let head: String = prompt.chars().take(ARCHIVE_NAME_CHARS).collect();
    let head = if head.is_empty() { "project".to_owned() } else { head };
    let stem: String = head
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '-' } else { c })
        .collect();
    format!("{stem}.zip")
}

#[cfg(test)]
mod tests {
    use super::archive_file_name;

    #[test]
    fn archive_name_truncates_and_replaces_separators() {
        assert_eq!(archive_file_name("todo app/with auth"), "todo-app-with-auth.zip");
        assert_eq!(archive_file_name(""), "project.zip");
        assert_eq!(
            archive_file_name("a very long prompt that goes on and on"),
            "a-very-long-prompt-that-goes-o.zip"
        );
    }
}
