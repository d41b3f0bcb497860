use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Processing,
    Completed,
    Failed,
}

/// One append-only entry in the `era_processing_state` log. The row with
/// the greatest `created_at` for a given `(era_filename, dataset)` is the
/// current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraProcessingStateRow {
    pub era_filename: String,
    pub network: String,
    pub era_number: u64,
    pub dataset: String,
    pub status: ProcessingStatus,
    pub worker_id: String,
    pub attempt_count: u32,
    pub file_hash: String,
    pub error_message: Option<String>,
    pub rows_inserted: u64,
    pub processing_duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// One append-only entry in the `era_completion` log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraCompletionRow {
    pub network: String,
    pub era_number: u64,
    pub status: CompletionStatus,
    pub slot_start: u64,
    pub slot_end: u64,
    pub total_records: u64,
    pub datasets_processed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub retry_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRow {
    pub version: String,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub checksum: String,
}

/// Truncates an error message to the 500-character ceiling the state log
/// enforces, so one runaway stack trace can't blow out a log row.
pub fn truncate_error(message: &str) -> String {
    const MAX_LEN: usize = 500;
    if message.len() <= MAX_LEN {
        message.to_string()
    } else {
        let mut truncated = message.chars().take(MAX_LEN).collect::<String>();
        truncated.push_str("...[truncated]");
        truncated
    }
}
