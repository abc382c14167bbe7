use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::chat::ChatMessage;
use crate::models::geometry::{PanelGeometry, Position, Size, Viewport};
use crate::models::session::Session;

use super::kv::KeyValueStore;

pub const POSITION_KEY: &str = "chatbot_panel_position";
pub const SIZE_KEY: &str = "chatbot_panel_size";
pub const HISTORY_KEY_PREFIX: &str = "chatbot_panel_history_";
pub const GUEST_HISTORY_KEY: &str = "chatbot_panel_history_guest";

/// History key for a session: per user, or the shared guest key.
pub fn history_key(session: Option<&Session>) -> String {
    match session.and_then(Session::uid) {
        Some(uid) => format!("{HISTORY_KEY_PREFIX}{uid}"),
        None => GUEST_HISTORY_KEY.to_string(),
    }
}

/// Panel persistence on top of a key-value store.
///
/// Reads fall back to defaults on missing or malformed data. Writes are
/// best effort: failures are logged and swallowed.
#[derive(Clone)]
pub struct PanelStore {
    store: Arc<dyn KeyValueStore>,
    history_limit: usize,
}

impl PanelStore {
    pub fn new(store: Arc<dyn KeyValueStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Saved geometry, with each half falling back to the default independently.
    pub fn load_geometry(&self, viewport: Viewport) -> PanelGeometry {
        let defaults = PanelGeometry::default_for(viewport);
        PanelGeometry {
            position: self.read::<Position>(POSITION_KEY).unwrap_or(defaults.position),
            size: self.read::<Size>(SIZE_KEY).unwrap_or(defaults.size),
        }
    }

    pub fn save_geometry(&self, geometry: &PanelGeometry) {
        self.write(POSITION_KEY, &geometry.position);
        self.write(SIZE_KEY, &geometry.size);
    }

    /// Saved conversation, or `None` when absent, malformed or empty.
    pub fn load_history(&self, key: &str) -> Option<Vec<ChatMessage>> {
        self.read::<Vec<ChatMessage>>(key)
            .filter(|messages| !messages.is_empty())
    }

    /// Persist the most recent `history_limit` messages.
    pub fn save_history(&self, key: &str, messages: &[ChatMessage]) {
        let start = messages.len().saturating_sub(self.history_limit);
        self.write(key, &messages[start..]);
    }

    pub fn clear_history(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "failed to remove chat history");
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read panel state");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring malformed panel state");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_write(key, value) {
            tracing::warn!(key, error = %e, "failed to persist panel state");
        }
    }

    fn try_write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode {key}: {e}")))?;
        self.store.set(key, &json)
    }
}
