/// Photo identifiers are opaque strings (UUID v4 text in practice).
pub type PhotoId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
