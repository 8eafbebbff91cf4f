/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Caller id used when no authenticated identity is supplied.
///
/// Anonymous callers are accepted; identity verification itself is an
/// upstream concern.
pub const ANONYMOUS_USER_ID: DbId = 0;
