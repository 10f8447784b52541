/// Every persisted record is keyed by an opaque string id.
///
/// Local records use [`crate::ids::local_id`]; remote rows use UUID v7.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (trip range, day-plan date) carry no time zone.
pub type Date = chrono::NaiveDate;
