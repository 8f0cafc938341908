pub use document::BackupDocument;
pub use errors::BackupError;
pub use handlers::{export_backup, load_local_backup, restore_backup, save_local_backup};
pub use service::{BackupService, RestoreSummary, BACKUP_FILE_NAME};

pub mod document;
mod errors;
mod handlers;
pub mod service;
