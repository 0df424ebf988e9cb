//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and `MessageRecord`.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use missive_core::message::MessageRecord;
use missive_core::storage::RepositoryError;

/// Column values of a message row, ready to bind as statement parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub message_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub chat_id: String,
    pub text: String,
    pub sent_at: String,
    pub read_at: Option<String>,
    pub edited_at: Option<String>,
    pub version: i64,
}

/// Convert a record into bindable column values.
///
/// Fails with `InvalidData` when the version does not fit an SQLite integer.
pub fn record_to_row(record: &MessageRecord) -> Result<MessageRow, RepositoryError> {
    let version = i64::try_from(record.version).map_err(|_| {
        RepositoryError::InvalidData(format!("version {} is out of range", record.version))
    })?;

    Ok(MessageRow {
        message_id: record.message_id.to_string(),
        sender_id: record.sender_id.to_string(),
        recipient_id: record.recipient_id.to_string(),
        chat_id: record.chat_id.to_string(),
        text: record.text.clone(),
        sent_at: format_datetime(&record.sent_at),
        read_at: record.read_at.as_ref().map(format_datetime),
        edited_at: record.edited_at.as_ref().map(format_datetime),
        version,
    })
}

/// Convert a SQLite row to a MessageRecord.
///
/// Expected columns: message_id, sender_id, recipient_id, chat_id, text,
/// sent_at, read_at, edited_at, version
pub fn row_to_record(row: &Row) -> rusqlite::Result<MessageRecord> {
    let message_id: String = row.get(0)?;
    let sender_id: String = row.get(1)?;
    let recipient_id: String = row.get(2)?;
    let chat_id: String = row.get(3)?;
    let text: String = row.get(4)?;
    let sent_at: String = row.get(5)?;
    let read_at: Option<String> = row.get(6)?;
    let edited_at: Option<String> = row.get(7)?;
    let version: i64 = row.get(8)?;

    Ok(MessageRecord {
        message_id: parse_uuid(0, &message_id)?,
        sender_id: parse_uuid(1, &sender_id)?,
        recipient_id: parse_uuid(2, &recipient_id)?,
        chat_id: parse_uuid(3, &chat_id)?,
        text,
        sent_at: parse_datetime(5, &sent_at)?,
        read_at: read_at.map(|s| parse_datetime(6, &s)).transpose()?,
        edited_at: edited_at.map(|s| parse_datetime(7, &s)).transpose()?,
        version: u64::try_from(version)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Integer, Box::new(e)))?,
    })
}

fn parse_uuid(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Format a DateTime for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
