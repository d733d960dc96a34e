mod archive;
mod error;
mod paths;
mod record;
mod store;

pub use archive::{export_zip, import_archive, import_zip};
pub use error::ProjectStoreError;
pub use paths::{archive_file_name, projects_file, store_root, PROJECTS_FILE_NAME};
pub use record::{now_rfc3339, ProjectRecord, UNTITLED_PROJECT};
pub use store::{ProjectStore, MAX_SAVED_PROJECTS};
