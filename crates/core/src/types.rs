/// Jobs are keyed by random (v4) UUIDs so identifiers never collide,
/// including across restarts.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
