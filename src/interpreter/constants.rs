// Constants for the interpreter

/// First address handed out by a fresh heap; `0` is the null reference
pub const FIRST_HEAP_ADDRESS: u64 = 1;

/// Size of the worker pool that steps program states within a round
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// Width of the `-` rule closing every log record
pub const LOG_RULE_WIDTH: usize = 50;

/// Default memory budget for the round history kept for the viewer (256 MB)
pub const DEFAULT_SNAPSHOT_MEMORY_LIMIT: usize = 256 * 1024 * 1024;

/// Timestamp format of the log record header
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
