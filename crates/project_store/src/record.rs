use codegen_studio::{
    FileContents, FileTree, GenerationSession, GenerationStats, ProjectMetadata, RestoredProject,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ProjectStoreError;

pub const UNTITLED_PROJECT: &str = "Untitled project";

const NAME_CHARS: usize = 50;

/// Persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub file_tree: FileTree,
    pub file_contents: FileContents,
    pub stats: Option<GenerationStats>,
    pub created_at: String,
}

impl ProjectRecord {
    /// Snapshot of the session's project.
    ///
    /// Reuses the session's id and creation time when it was saved or loaded
    /// before; otherwise mints both.
    pub fn from_session(session: &GenerationSession) -> Result<Self, ProjectStoreError> {
        let project = session.project();
        if project.tree().is_empty() {
            return Err(ProjectStoreError::EmptyProject);
        }

        let (id, created_at) = match session.metadata() {
            Some(metadata) => (metadata.id.clone(), metadata.created_at.clone()),
            None => (Uuid::new_v4().to_string(), now_rfc3339()?),
        };
        let name: String = session.prompt().chars().take(NAME_CHARS).collect();
        let name = if name.trim().is_empty() {
            UNTITLED_PROJECT.to_owned()
        } else {
            name
        };

        Ok(Self {
            id,
            name,
            prompt: session.prompt().to_owned(),
            file_tree: project.tree().clone(),
            file_contents: project.contents().clone(),
            stats: session.stats().copied(),
            created_at,
        })
    }

    pub fn metadata(&self) -> ProjectMetadata {
        ProjectMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
        }
    }

    pub fn into_restored(self) -> RestoredProject {
        RestoredProject {
            metadata: self.metadata(),
            prompt: self.prompt,
            tree: Some(self.file_tree),
            contents: self.file_contents,
            stats: self.stats,
        }
    }
}

pub fn now_rfc3339() -> Result<String, ProjectStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(ProjectStoreError::ClockFormat)
}
