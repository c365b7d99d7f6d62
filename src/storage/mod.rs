use crate::error::{CodeexError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use uuid::Uuid;

pub mod types;
pub use types::{ChatMessage, StoredChat};

/// Alias for a loaded chat record: (title, messages).
type LoadedChat = (String, Vec<ChatMessage>);

/// Owner recorded on every chat; this client has a single local user.
const LOCAL_USER: &str = "local";

/// Storage backend for chat history
pub struct ChatStore {
    db_path: PathBuf,
}

impl ChatStore {
    /// Create a new chat store
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the history DB path via environment variable.
        // This makes it easy to point the binary at a test DB or alternate file
        // without changing the user's application data dir.
        if let Ok(override_path) = std::env::var("CODEEX_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "codeex", "codeex")
            .ok_or_else(|| CodeexError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        let db_path = data_dir.join("history.db");
        let store = Self { db_path };

        store.init()?;

        Ok(store)
    }

    /// Create a chat store that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application data
    /// directory is not desirable (for example, using a temporary directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use codeex::storage::ChatStore;
    ///
    /// let store = ChatStore::new_with_path("/tmp/test_history.db").unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| CodeexError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                messages JSON NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| CodeexError::Storage(e.to_string()))?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| CodeexError::Storage(e.to_string()).into())
    }

    /// Create a new chat seeded with the assistant greeting
    ///
    /// # Arguments
    ///
    /// * `greeting` - Assistant message seeded as the first entry
    ///
    /// # Returns
    ///
    /// Returns the id of the created chat
    pub fn create_chat(&self, greeting: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let messages = vec![ChatMessage::assistant(greeting)];
        self.save_chat(&id, "New Chat", &messages)?;
        Ok(id)
    }

    /// Save or update a chat
    ///
    /// Inserts a new row or updates an existing one, preserving the original
    /// created_at timestamp on update.
    pub fn save_chat(&self, id: &str, title: &str, messages: &[ChatMessage]) -> Result<()> {
        let mut conn = self.open()?;

        let messages_json = serde_json::to_string(messages)
            .context("Failed to serialize messages")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        let now = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        // Check if exists to preserve created_at
        let exists = tx
            .query_row("SELECT 1 FROM chats WHERE id = ?", params![id], |_| {
                Ok(true)
            })
            .optional()
            .context("Failed to query chat existence")
            .map_err(|e| CodeexError::Storage(e.to_string()))?
            .unwrap_or(false);

        if exists {
            tx.execute(
                "UPDATE chats SET
                    title = ?,
                    updated_at = ?,
                    messages = ?
                WHERE id = ?",
                params![title, now, messages_json, id],
            )
            .context("Failed to update chat")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;
        } else {
            tx.execute(
                "INSERT INTO chats (id, user_id, title, created_at, updated_at, messages)
                VALUES (?, ?, ?, ?, ?, ?)",
                params![id, LOCAL_USER, title, now, now, messages_json],
            )
            .context("Failed to insert chat")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Load a chat by ID (supports full UUID or 8-char prefix)
    pub fn load_chat(&self, id: &str) -> Result<Option<LoadedChat>> {
        let conn = self.open()?;

        // Support both full UUID and 8-char prefix matching
        let query = if id.len() == 36 {
            "SELECT title, messages FROM chats WHERE id = ?"
        } else {
            "SELECT title, messages FROM chats WHERE id LIKE ?"
        };

        let search_param = if id.len() == 36 {
            id.to_string()
        } else {
            format!("{}%", id)
        };

        let result = conn
            .query_row(query, params![search_param], |row| {
                let title: String = row.get(0)?;
                let messages_json: String = row.get(1)?;
                Ok((title, messages_json))
            })
            .optional()
            .context("Failed to query chat")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        match result {
            Some((title, messages_json)) => {
                let messages: Vec<ChatMessage> = serde_json::from_str(&messages_json)
                    .context("Failed to deserialize messages")
                    .map_err(|e| CodeexError::Storage(e.to_string()))?;
                Ok(Some((title, messages)))
            }
            None => Ok(None),
        }
    }

    /// List all stored chats, most recently updated first
    pub fn list_chats(&self) -> Result<Vec<StoredChat>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, title, created_at, updated_at, messages
                FROM chats
                ORDER BY updated_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        let chats_iter = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let user_id: String = row.get(1)?;
                let title: String = row.get(2)?;
                let created_at_str: String = row.get(3)?;
                let updated_at_str: String = row.get(4)?;
                let messages_json: String = row.get(5)?;

                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                let message_count =
                    if let Ok(val) = serde_json::from_str::<serde_json::Value>(&messages_json) {
                        val.as_array().map(|a| a.len()).unwrap_or(0)
                    } else {
                        0
                    };

                Ok(StoredChat {
                    id,
                    user_id,
                    title,
                    created_at,
                    updated_at,
                    message_count,
                })
            })
            .context("Failed to query chats")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        let mut chats = Vec::new();
        for c in chats_iter.flatten() {
            chats.push(c);
        }

        Ok(chats)
    }

    /// Delete a chat (supports full UUID or 8-char prefix)
    pub fn delete_chat(&self, id: &str) -> Result<()> {
        let conn = self.open()?;

        let (query, param) = if id.len() == 36 {
            ("DELETE FROM chats WHERE id = ?", id.to_string())
        } else {
            ("DELETE FROM chats WHERE id LIKE ?", format!("{}%", id))
        };

        conn.execute(query, params![param])
            .context("Failed to delete chat")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Delete all stored chats
    pub fn clear_all(&self) -> Result<usize> {
        let conn = self.open()?;

        let deleted = conn
            .execute("DELETE FROM chats", [])
            .context("Failed to clear chats")
            .map_err(|e| CodeexError::Storage(e.to_string()))?;

        Ok(deleted)
    }
}

/// Derive a chat title from its first user message
///
/// Falls back to "New Chat" while no user message exists. Titles are
/// truncated on a character boundary.
pub fn derive_title(messages: &[ChatMessage], max_len: usize) -> String {
    let first_user = messages
        .iter()
        .find(|m| m.role == crate::capabilities::Role::User);

    match first_user {
        Some(message) => {
            let text = message.content.trim();
            if text.chars().count() > max_len {
                let truncated: String = text.chars().take(max_len).collect();
                format!("{}...", truncated)
            } else if text.is_empty() {
                "New Chat".to_string()
            } else {
                text.to_string()
            }
        }
        None => "New Chat".to_string(),
    }
}
