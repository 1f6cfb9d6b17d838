/// External identifiers (communities, principals, channels, roles) are
/// 64-bit integers, as are the bookkeeping table keys derived from them.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Sentinel for an optional external-resource id that has not been set.
pub const UNSET_ID: DbId = -1;
