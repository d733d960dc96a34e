use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProjectStoreError;
use crate::record::ProjectRecord;

/// Saved projects kept, most recent first.
pub const MAX_SAVED_PROJECTS: usize = 10;

/// JSON-file store of saved projects.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    path: PathBuf,
}

impl ProjectStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most-recent-first records; a missing file is an empty store.
    pub fn list(&self) -> Result<Vec<ProjectRecord>, ProjectStoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ProjectStoreError::io(
                    "reading project store",
                    &self.path,
                    source,
                ))
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| ProjectStoreError::json_parse(&self.path, source))
    }

    /// Upserts by id: an existing record is replaced in place, a new one is
    /// prepended. The list is then cut to [`MAX_SAVED_PROJECTS`].
    pub fn save(&self, record: ProjectRecord) -> Result<Vec<ProjectRecord>, ProjectStoreError> {
        let mut records = self.list()?;
        match records.iter().position(|existing| existing.id == record.id) {
            Some(index) => records[index] = record,
            None => records.insert(0, record),
        }
        if records.len() > MAX_SAVED_PROJECTS {
            let dropped = records.len() - MAX_SAVED_PROJECTS;
            records.truncate(MAX_SAVED_PROJECTS);
            tracing::debug!(dropped, "trimmed saved projects to capacity");
        }
        self.write_all(&records)?;
        Ok(records)
    }

    pub fn load(&self, id: &str) -> Result<ProjectRecord, ProjectStoreError> {
        self.list()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| ProjectStoreError::NotFound { id: id.to_owned() })
    }

    pub fn delete(&self, id: &str) -> Result<Vec<ProjectRecord>, ProjectStoreError> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(ProjectStoreError::NotFound { id: id.to_owned() });
        }
        self.write_all(&records)?;
        Ok(records)
    }

    fn write_all(&self, records: &[ProjectRecord]) -> Result<(), ProjectStoreError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                ProjectStoreError::io("creating project store directory", parent, source)
            })?;
        }

        let text = serde_json::to_string_pretty(records)
            .map_err(|source| ProjectStoreError::json_serialize(&self.path, source))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, text)
            .map_err(|source| ProjectStoreError::io("writing project store", &staging, source))?;
        fs::rename(&staging, &self.path)
            .map_err(|source| ProjectStoreError::io("replacing project store", &self.path, source))
    }
}
