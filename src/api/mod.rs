use std::sync::Arc;

/// Progress callback for front ends (CLI bars, embedding applications)
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress events emitted while a reconstruction runs
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    Started { task: String, total: u64 },
    Progress { task: String, current: u64, total: u64 },
    Message { task: String, message: String },
    Completed { task: String },
    Error { task: String, error: String },
}
