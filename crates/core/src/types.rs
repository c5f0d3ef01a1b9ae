/// Surrogate primary keys (users, money reports) are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (project start/end, funding application date).
pub type Date = chrono::NaiveDate;
