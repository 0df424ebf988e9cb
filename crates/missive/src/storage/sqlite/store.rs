//! SQLite message store.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use missive_core::message::MessageRecord;
use missive_core::storage::{MessageStore, RepositoryError, Result};

use super::conversions::{record_to_row, row_to_record};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based system of record.
///
/// Every statement runs in autocommit mode, so each trait call either
/// commits fully or leaves the table untouched.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a file-based database and ensures the schema exists.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a store with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn exists(&self, id: Uuid) -> Result<bool> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::MESSAGE_EXISTS, [&id_str], |row| row.get::<_, bool>(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }

    async fn insert(&self, record: &MessageRecord) -> Result<()> {
        let row = record_to_row(record)?;
        let message_id = row.message_id.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_MESSAGE,
                    rusqlite::params![
                        row.message_id,
                        row.sender_id,
                        row.recipient_id,
                        row.chat_id,
                        row.text,
                        row.sent_at,
                        row.read_at,
                        row.edited_at,
                        row.version
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, message_id))
    }

    async fn update(&self, record: &MessageRecord) -> Result<()> {
        let row = record_to_row(record)?;
        let message_id = row.message_id.clone();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_MESSAGE,
                        rusqlite::params![
                            row.message_id,
                            row.sender_id,
                            row.recipient_id,
                            row.chat_id,
                            row.text,
                            row.sent_at,
                            row.read_at,
                            row.edited_at,
                            row.version
                        ],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, message_id))
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_MESSAGE_BY_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_record) {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_MESSAGE, [&id_str])
                    .map_err(wrap_err)?;
                Ok(rows > 0)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, id.to_string()))
    }
}
