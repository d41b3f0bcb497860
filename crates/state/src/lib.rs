//! Dataset-granular processing state and era completion tracking for the
//! era-parser pipeline, backed by an embedded redb store so a crashed or
//! restarted run can resume without reprocessing completed work.

mod db;
mod error;
mod types;

pub use db::{STATE_DB_FILE, StateStore};
pub use error::StoreError;
pub use types::{
    CompletionStatus, EraCompletionRow, EraProcessingStateRow, MigrationRow, ProcessingStatus,
    truncate_error,
};
