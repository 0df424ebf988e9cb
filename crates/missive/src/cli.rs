//! CLI command definitions.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Cache-coherent message store.
#[derive(Debug, Parser)]
#[command(name = "missive")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Distributed cache TTL in seconds (overrides CACHE_TTL_SECONDS).
    #[arg(long, global = true)]
    pub ttl: Option<u64>,

    /// SQLite database path (overrides SQLITE_PATH).
    #[arg(long, global = true)]
    pub sqlite_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a new message.
    Create {
        /// Sender user ID.
        #[arg(long)]
        sender: Uuid,
        /// Recipient user ID.
        #[arg(long)]
        recipient: Uuid,
        /// Chat ID.
        #[arg(long)]
        chat: Uuid,
        /// Message text.
        #[arg(long)]
        text: String,
        /// Message ID (generated if omitted).
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Get a message by ID.
    Get {
        /// Message ID.
        id: Uuid,
    },
    /// Replace the text of a message.
    Edit {
        /// Message ID.
        id: Uuid,
        /// New text.
        text: String,
    },
    /// Mark a message as read.
    Read {
        /// Message ID.
        id: Uuid,
    },
    /// Delete a message.
    Delete {
        /// Message ID.
        id: Uuid,
    },
    /// Run a create, read, edit and delete walkthrough against the configured backends.
    Demo,
}
