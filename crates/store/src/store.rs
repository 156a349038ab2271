//! Gateway-owned chat store.
//!
//! Persists chats, messages, and artifacts in `chats.json` under the
//! configured state path. Mutations write through to disk before
//! returning; reads are served from the in-memory maps.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cf_domain::error::{Error, Result};

use crate::artifact::Artifact;
use crate::chat::{Chat, ChatMessage, MessageParts, MessageRole};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store data
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    chats: HashMap<Uuid, Chat>,
    #[serde(default)]
    messages: HashMap<Uuid, ChatMessage>,
    #[serde(default)]
    artifacts: HashMap<Uuid, Artifact>,
    /// Next message sequence number (creation order across the store).
    #[serde(default)]
    next_seq: u64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// JSON-file-backed store for Chat / Message / Artifact entities.
pub struct ChatStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl ChatStore {
    /// Load or create the store at `state_path/chats/chats.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("chats");
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;

        let path = dir.join("chats.json");
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(Error::Io)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            StoreData::default()
        };

        tracing::info!(
            chats = data.chats.len(),
            messages = data.messages.len(),
            path = %path.display(),
            "chat store loaded"
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    // ── Chats ─────────────────────────────────────────────────────────

    /// Resolve or create a chat with the given id. Returns `(chat, is_new)`.
    pub fn resolve_or_create_chat(&self, chat_id: Uuid) -> Result<(Chat, bool)> {
        {
            let data = self.data.read();
            if let Some(chat) = data.chats.get(&chat_id) {
                return Ok((chat.clone(), false));
            }
        }

        let now = Utc::now();
        let chat = Chat {
            id: chat_id,
            model: None,
            title: None,
            created_at: now,
            updated_at: now,
        };

        let mut data = self.data.write();
        data.chats.insert(chat_id, chat.clone());
        self.save(&data)?;
        Ok((chat, true))
    }

    /// Look up a chat by id.
    pub fn get_chat(&self, chat_id: Uuid) -> Option<Chat> {
        self.data.read().chats.get(&chat_id).cloned()
    }

    /// Reassign the chat's model spec.
    pub fn set_chat_model(&self, chat_id: Uuid, model: Option<String>) -> Result<()> {
        let mut data = self.data.write();
        let chat = data
            .chats
            .get_mut(&chat_id)
            .ok_or_else(|| Error::Store(format!("chat not found: {chat_id}")))?;
        chat.model = model;
        chat.updated_at = Utc::now();
        self.save(&data)
    }

    /// Set the chat title.
    pub fn set_chat_title(&self, chat_id: Uuid, title: impl Into<String>) -> Result<()> {
        let mut data = self.data.write();
        let chat = data
            .chats
            .get_mut(&chat_id)
            .ok_or_else(|| Error::Store(format!("chat not found: {chat_id}")))?;
        chat.title = Some(title.into());
        chat.updated_at = Utc::now();
        self.save(&data)
    }

    /// Touch the chat's updated_at marker.
    pub fn touch_chat(&self, chat_id: Uuid) -> Result<()> {
        let mut data = self.data.write();
        if let Some(chat) = data.chats.get_mut(&chat_id) {
            chat.updated_at = Utc::now();
        }
        self.save(&data)
    }

    // ── Messages ──────────────────────────────────────────────────────

    /// Append a message to a chat. The returned row is live immediately;
    /// an empty-text assistant row is the streaming placeholder.
    pub fn append_message(
        &self,
        chat_id: Uuid,
        role: MessageRole,
        text: impl Into<String>,
    ) -> Result<ChatMessage> {
        let now = Utc::now();
        let mut data = self.data.write();

        if !data.chats.contains_key(&chat_id) {
            return Err(Error::Store(format!("chat not found: {chat_id}")));
        }

        let seq = data.next_seq;
        data.next_seq += 1;

        let message = ChatMessage {
            id: Uuid::new_v4(),
            chat_id,
            role,
            parts: MessageParts::text(text),
            seq,
            created_at: now,
            updated_at: now,
        };
        data.messages.insert(message.id, message.clone());
        self.save(&data)?;
        Ok(message)
    }

    /// All messages of a chat, in creation order.
    pub fn messages(&self, chat_id: Uuid) -> Vec<ChatMessage> {
        let data = self.data.read();
        let mut messages: Vec<_> = data
            .messages
            .values()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.seq);
        messages
    }

    /// Look up a message by id.
    pub fn get_message(&self, message_id: Uuid) -> Option<ChatMessage> {
        self.data.read().messages.get(&message_id).cloned()
    }

    /// Replace a message's text payload.
    pub fn update_message_text(&self, message_id: Uuid, text: impl Into<String>) -> Result<()> {
        let mut data = self.data.write();
        let message = data
            .messages
            .get_mut(&message_id)
            .ok_or_else(|| Error::Store(format!("message not found: {message_id}")))?;
        message.parts.text = text.into();
        message.updated_at = Utc::now();
        self.save(&data)
    }

    /// Delete a message row. Missing ids are a no-op.
    pub fn delete_message(&self, message_id: Uuid) -> Result<()> {
        let mut data = self.data.write();
        data.messages.remove(&message_id);
        self.save(&data)
    }

    /// Number of messages in a chat.
    pub fn message_count(&self, chat_id: Uuid) -> usize {
        self.data
            .read()
            .messages
            .values()
            .filter(|m| m.chat_id == chat_id)
            .count()
    }

    // ── Artifacts ─────────────────────────────────────────────────────

    /// Insert a new artifact row.
    pub fn insert_artifact(&self, artifact: Artifact) -> Result<()> {
        let mut data = self.data.write();
        data.artifacts.insert(artifact.id, artifact);
        self.save(&data)
    }

    /// Look up an artifact by id.
    pub fn get_artifact(&self, artifact_id: Uuid) -> Option<Artifact> {
        self.data.read().artifacts.get(&artifact_id).cloned()
    }

    /// All artifacts attached to a message.
    pub fn artifacts_for_message(&self, message_id: Uuid) -> Vec<Artifact> {
        let data = self.data.read();
        let mut artifacts: Vec<_> = data
            .artifacts
            .values()
            .filter(|a| a.message_id == message_id)
            .cloned()
            .collect();
        artifacts.sort_by_key(|a| a.created_at);
        artifacts
    }

    /// Delete every artifact attached to a message. Returns how many rows
    /// were removed.
    pub fn delete_artifacts_for_message(&self, message_id: Uuid) -> Result<usize> {
        let mut data = self.data.write();
        let ids: Vec<Uuid> = data
            .artifacts
            .values()
            .filter(|a| a.message_id == message_id)
            .map(|a| a.id)
            .collect();
        for id in &ids {
            data.artifacts.remove(id);
        }
        self.save(&data)?;
        Ok(ids.len())
    }

    // ── Private helpers ───────────────────────────────────────────────

    fn save(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Store(format!("serializing chat store: {e}")))?;
        std::fs::write(&self.path, json).map_err(Error::Io)?;
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactType;

    fn store() -> (tempfile::TempDir, ChatStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ChatStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn resolve_or_create_is_idempotent() {
        let (_dir, store) = store();
        let id = Uuid::new_v4();

        let (_, is_new) = store.resolve_or_create_chat(id).unwrap();
        assert!(is_new);
        let (_, is_new) = store.resolve_or_create_chat(id).unwrap();
        assert!(!is_new);
    }

    #[test]
    fn messages_come_back_in_creation_order() {
        let (_dir, store) = store();
        let chat_id = Uuid::new_v4();
        store.resolve_or_create_chat(chat_id).unwrap();

        store.append_message(chat_id, MessageRole::User, "one").unwrap();
        store.append_message(chat_id, MessageRole::Assistant, "two").unwrap();
        store.append_message(chat_id, MessageRole::User, "three").unwrap();

        let texts: Vec<_> = store
            .messages(chat_id)
            .into_iter()
            .map(|m| m.parts.text)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(store.message_count(chat_id), 3);
    }

    #[test]
    fn placeholder_lifecycle_update_or_delete() {
        let (_dir, store) = store();
        let chat_id = Uuid::new_v4();
        store.resolve_or_create_chat(chat_id).unwrap();

        let placeholder = store
            .append_message(chat_id, MessageRole::Assistant, "")
            .unwrap();
        // Queryable immediately, empty text.
        let fetched = store.get_message(placeholder.id).unwrap();
        assert_eq!(fetched.parts.text, "");

        store.update_message_text(placeholder.id, "Hi there").unwrap();
        assert_eq!(store.get_message(placeholder.id).unwrap().parts.text, "Hi there");

        store.delete_message(placeholder.id).unwrap();
        assert!(store.get_message(placeholder.id).is_none());
        // Deleting again is a no-op.
        store.delete_message(placeholder.id).unwrap();
    }

    #[test]
    fn artifact_cascade_delete_by_message() {
        let (_dir, store) = store();
        let chat_id = Uuid::new_v4();
        store.resolve_or_create_chat(chat_id).unwrap();
        let message = store
            .append_message(chat_id, MessageRole::Assistant, "")
            .unwrap();

        for i in 0..2 {
            store
                .insert_artifact(Artifact {
                    id: Uuid::new_v4(),
                    message_id: message.id,
                    identifier: format!("art-{i}"),
                    kind: ArtifactType::Html,
                    title: format!("Artifact {i}"),
                    language: ArtifactType::Html.language().map(str::to_owned),
                    content: "<div/>".into(),
                    version: 1,
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        assert_eq!(store.artifacts_for_message(message.id).len(), 2);
        let removed = store.delete_artifacts_for_message(message.id).unwrap();
        assert_eq!(removed, 2);
        assert!(store.artifacts_for_message(message.id).is_empty());
    }

    #[test]
    fn store_reloads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let chat_id = Uuid::new_v4();

        {
            let store = ChatStore::new(dir.path()).unwrap();
            store.resolve_or_create_chat(chat_id).unwrap();
            store.append_message(chat_id, MessageRole::User, "persisted").unwrap();
            store.set_chat_title(chat_id, "My chat").unwrap();
        }

        let store = ChatStore::new(dir.path()).unwrap();
        let chat = store.get_chat(chat_id).unwrap();
        assert_eq!(chat.title.as_deref(), Some("My chat"));
        assert_eq!(store.messages(chat_id)[0].parts.text, "persisted");
    }
}
