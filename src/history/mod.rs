//! Per-session conversation history.
//!
//! One JSON file per session id, holding an ordered array of
//! `{role, content}` records. The file is rewritten in full on every
//! append and keeps the whole history; only the generator input is
//! capped to the most recent turns. Concurrent appends for one session
//! id are not serialized here; the bot framework dispatches one update
//! at a time per chat, which is the only writer.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            Role::User => ChatMessage::user(self.content.clone()),
            Role::Assistant => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// File-backed session store, keyed by a stable session id.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// Full stored history. A missing file is an empty history; a
    /// corrupt file is logged and treated as empty.
    pub fn load(&self, session_id: &str) -> Vec<Turn> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Vec::new();
        }

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(turns) => turns,
                Err(err) => {
                    warn!("corrupt history file {}: {err}", path.display());
                    Vec::new()
                }
            },
            Err(err) => {
                warn!("unreadable history file {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    /// Append one turn and rewrite the session file in full.
    pub fn append(&self, session_id: &str, turn: Turn) -> Result<(), AppError> {
        let mut turns = self.load(session_id);
        turns.push(turn);

        let serialized = serde_json::to_string_pretty(&turns)
            .map_err(|err| AppError::Backend(format!("history serialization failed: {err}")))?;
        fs::write(self.session_path(session_id), serialized)?;
        Ok(())
    }

    /// Drop the session's history file.
    pub fn clear(&self, session_id: &str) -> Result<(), AppError> {
        let path = self.session_path(session_id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        info!("history cleared for session {session_id}");
        Ok(())
    }

    /// The most recent `limit` turns, in chronological order.
    pub fn recent(&self, session_id: &str, limit: usize) -> Vec<Turn> {
        let turns = self.load(session_id);
        let skip = turns.len().saturating_sub(limit);
        turns.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("chat_histories")).unwrap();
        (tmp, store)
    }

    #[test]
    fn append_and_load_roundtrip() {
        let (_tmp, store) = store();

        store.append("42", Turn::user("вопрос")).unwrap();
        store.append("42", Turn::assistant("ответ")).unwrap();

        let turns = store.load("42");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("вопрос"));
        assert_eq!(turns[1], Turn::assistant("ответ"));

        // Sessions do not bleed into each other.
        assert!(store.load("43").is_empty());
    }

    #[test]
    fn history_files_use_the_wire_roles() {
        let (_tmp, store) = store();
        store.append("7", Turn::user("в")).unwrap();

        let raw = fs::read_to_string(store.session_path("7")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["role"], "user");
        assert_eq!(parsed[0]["content"], "в");
    }

    #[test]
    fn recent_caps_to_the_newest_turns_in_order() {
        let (_tmp, store) = store();

        for i in 0..12 {
            store.append("1", Turn::user(format!("вопрос {i}"))).unwrap();
        }

        let recent = store.recent("1", 10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "вопрос 2");
        assert_eq!(recent[9].content, "вопрос 11");

        // The file itself still holds everything.
        assert_eq!(store.load("1").len(), 12);
    }

    #[test]
    fn clear_then_load_is_empty() {
        let (_tmp, store) = store();

        store.append("9", Turn::user("вопрос")).unwrap();
        store.clear("9").unwrap();

        assert!(store.load("9").is_empty());
        assert!(store.recent("9", 10).is_empty());

        // Clearing an absent session is not an error.
        store.clear("9").unwrap();
    }

    #[test]
    fn corrupt_history_is_treated_as_empty() {
        let (_tmp, store) = store();
        fs::write(store.session_path("5"), "не json").unwrap();
        assert!(store.load("5").is_empty());
    }
}
