//! State Management Module
//!
//! Provides key-value backends, typed persisted slots with date revival and
//! cross-handle sync, record migration, whole-dataset storage management and
//! the project store.

pub mod backend;
pub mod migration;
pub mod revive;
pub mod slot;
pub mod storage;
pub mod store;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use migration::{migrate_record, RecordOutcome, CURRENT_SCHEMA_VERSION};
pub use slot::Slot;
pub use storage::{
    format_bytes, ExportDocument, ImportOutcome, MigrationReport, StorageInfo, StorageManager,
    KNOWN_KEYS, PROJECTS_KEY, SELECTED_PROJECT_KEY,
};
pub use store::ProjectStore;
