//! Locally persisted AI chat sessions.
//!
//! All sessions live in one JSON array file, `ecodairy_chat_history.json`,
//! inside the client data directory. Writes replace the whole file through
//! a temp file and rename, so a crash leaves either the old or the new
//! array on disk.

use crate::types::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const HISTORY_FILE_NAME: &str = "ecodairy_chat_history.json";

/// Characters of the first prompt kept in a new session's title.
const TITLE_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Appends a message and bumps `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.updated_at = message.timestamp.max(self.updated_at);
        self.messages.push(message);
    }
}

/// Title for a session started by `first_prompt`: its first 30 characters
/// followed by `...`.
pub fn session_title(first_prompt: &str) -> String {
    let head: String = first_prompt.chars().take(TITLE_CHARS).collect();
    format!("{}...", head)
}

/// Replaces `path` with `contents` via a sibling temp file.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

pub struct ChatHistory {
    path: PathBuf,
}

impl ChatHistory {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored sessions in insertion order. A missing file is empty.
    pub fn get_sessions(&self) -> Result<Vec<ChatSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get_session(&self, id: &str) -> Result<Option<ChatSession>> {
        Ok(self.get_sessions()?.into_iter().find(|s| s.id == id))
    }

    /// Inserts or replaces the session with the same id.
    pub fn save_session(&self, session: &ChatSession) -> Result<()> {
        let mut sessions = self.get_sessions()?;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.write(&sessions)?;
        debug!(id = %session.id, "Chat session saved");
        Ok(())
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        let sessions: Vec<ChatSession> = self
            .get_sessions()?
            .into_iter()
            .filter(|s| s.id != id)
            .collect();
        self.write(&sessions)
    }

    /// Creates and immediately saves an empty session.
    pub fn create_new_session(&self, title: &str) -> Result<ChatSession> {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.save_session(&session)?;
        Ok(session)
    }

    fn write(&self, sessions: &[ChatSession]) -> Result<()> {
        write_atomically(&self.path, &serde_json::to_vec_pretty(sessions)?)
    }
}
