//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    sender_id TEXT NOT NULL,
    recipient_id TEXT NOT NULL,
    chat_id TEXT NOT NULL,
    text TEXT NOT NULL,
    sent_at TEXT NOT NULL,
    read_at TEXT,
    edited_at TEXT,
    version INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_chat_id ON messages(chat_id);
"#;

pub const MESSAGE_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM messages WHERE message_id = ?1)";

pub const SELECT_MESSAGE_BY_ID: &str = r#"
SELECT message_id, sender_id, recipient_id, chat_id, text, sent_at, read_at, edited_at, version
FROM messages
WHERE message_id = ?1
"#;

pub const INSERT_MESSAGE: &str = r#"
INSERT INTO messages (message_id, sender_id, recipient_id, chat_id, text, sent_at, read_at, edited_at, version)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const UPDATE_MESSAGE: &str = r#"
UPDATE messages
SET sender_id = ?2, recipient_id = ?3, chat_id = ?4, text = ?5,
    sent_at = ?6, read_at = ?7, edited_at = ?8, version = ?9
WHERE message_id = ?1
"#;

pub const DELETE_MESSAGE: &str = "DELETE FROM messages WHERE message_id = ?1";
