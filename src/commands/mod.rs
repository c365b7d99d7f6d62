/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`    — Interactive chat session
- `ask`     — One-shot question
- `visual`  — Image equation solving and PDF analysis
- `history` — Saved chat management

These handlers are intentionally small and use the library components:
capabilities, router, and storage.
*/

pub mod ask;
pub mod chat;
pub mod history;
pub mod visual;

use crate::error::Result;
use crate::storage::ChatStore;
use std::path::PathBuf;

/// Open the chat store, honoring an explicit path override
pub(crate) fn open_store(storage_path: Option<&PathBuf>) -> Result<ChatStore> {
    match storage_path {
        Some(path) => ChatStore::new_with_path(path.clone()),
        None => ChatStore::new(),
    }
}
