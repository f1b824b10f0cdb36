//! Shared constants for the opcal engine.

/// Default visible window: ± this many days around now.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Hard cap on recurrence expansion output, regardless of rule inputs.
pub const MAX_OCCURRENCES: usize = 365;

/// Concurrent requests per batch when submitting a recurring series.
pub const CREATE_BATCH_SIZE: usize = 8;

/// A reminder whose fire time passed less than this long ago still
/// fires immediately once (the entry was loaded just after the moment).
pub const REMINDER_GRACE_SECONDS: i64 = 30;

/// Notification records older than this are pruned regardless of read state.
pub const RETENTION_HOURS: i64 = 24;

/// Interval of the periodic prune tick in the watch loop.
pub const PRUNE_TICK_SECONDS: u64 = 60;

/// Fallback colors applied when a record's color is absent or malformed.
pub const DEFAULT_APPOINTMENT_COLOR: &str = "#3b82f6";
pub const DEFAULT_ACTIVATION_COLOR: &str = "#f59e0b";

/// Timeout for a single remote transport request.
pub const TRANSPORT_TIMEOUT_SECONDS: u64 = 10;
