//! ZIP export and import of a project's content map.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use codegen_studio::{FileContents, RestoredProject};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ProjectStoreError;
use crate::record::now_rfc3339;

/// One entry per path; directories are implied by the path separators.
pub fn export_zip(contents: &FileContents) -> Result<Vec<u8>, ProjectStoreError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in contents {
        writer.start_file(path.as_str(), options)?;
        writer
            .write_all(content.as_bytes())
            .map_err(|source| ProjectStoreError::zip_entry("writing", path.as_str(), source))?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Reads every file entry back into a content map; directory entries are skipped.
pub fn import_zip(bytes: &[u8]) -> Result<FileContents, ProjectStoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut contents = FileContents::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_owned();
        let mut raw = Vec::new();
        entry
            .read_to_end(&mut raw)
            .map_err(|source| ProjectStoreError::zip_entry("reading", name.as_str(), source))?;
        contents.insert(name, String::from_utf8_lossy(&raw).into_owned());
    }

    tracing::debug!(files = contents.len(), "imported archive");
    Ok(contents)
}

/// Imports an archive file as a finished project with a fresh id.
pub fn import_archive(path: &Path) -> Result<RestoredProject, ProjectStoreError> {
    let bytes = std::fs::read(path)
        .map_err(|source| ProjectStoreError::io("reading archive", path, source))?;
    let contents = import_zip(&bytes)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project.zip".to_owned());
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_owned());

    Ok(RestoredProject {
        metadata: codegen_studio::ProjectMetadata {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now_rfc3339()?,
        },
        prompt: format!("Project loaded from {file_name}"),
        tree: None,
        contents,
        stats: None,
    })
}
