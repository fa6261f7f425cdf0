/// Job records are keyed by store-assigned UUIDs.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
