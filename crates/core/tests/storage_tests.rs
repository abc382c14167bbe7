// ═══════════════════════════════════════════════════════════════════
// Storage Tests: key-value stores, PanelStore persistence
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;

use market_master_core::errors::CoreError;
use market_master_core::models::chat::ChatMessage;
use market_master_core::models::geometry::{PanelGeometry, Position, Size, Viewport};
use market_master_core::models::session::Session;
use market_master_core::storage::kv::{JsonFileStore, KeyValueStore, MemoryStore};
use market_master_core::storage::manager::{
    history_key, PanelStore, GUEST_HISTORY_KEY, POSITION_KEY, SIZE_KEY,
};

/// A store whose writes always fail.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::Storage("quota exceeded".into()))
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Err(CoreError::Storage("quota exceeded".into()))
    }
    fn remove(&self, _key: &str) -> Result<(), CoreError> {
        Err(CoreError::Storage("quota exceeded".into()))
    }
}

const VIEW: Viewport = Viewport {
    width: 1280.0,
    height: 800.0,
};

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("k", "\"v\"").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("\"v\""));
        assert_eq!(store.len(), 1);
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn remove_missing_is_ok() {
        assert!(MemoryStore::new().remove("nope").is_ok());
    }
}

// ═══════════════════════════════════════════════════════════════════
// JsonFileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("a", "1").unwrap();
            store.set("b", "2").unwrap();
            store.remove("a").unwrap();
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn failed_write_leaves_values_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();

        // A directory in place of the file makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(store.set("a", "2"), Err(CoreError::Storage(_))));
        assert!(store.set("b", "3").is_err());
        assert!(store.remove("a").is_err());
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(CoreError::Deserialization(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// history_key
// ═══════════════════════════════════════════════════════════════════

mod keys {
    use super::*;

    #[test]
    fn user_scoped() {
        let s = Session::new("abc123", "a@b.c");
        assert_eq!(history_key(Some(&s)), "chatbot_panel_history_abc123");
    }

    #[test]
    fn guest_when_signed_out_or_no_uid() {
        assert_eq!(history_key(None), GUEST_HISTORY_KEY);
        let s = Session {
            user_id: None,
            email: "a@b.c".into(),
        };
        assert_eq!(history_key(Some(&s)), GUEST_HISTORY_KEY);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PanelStore
// ═══════════════════════════════════════════════════════════════════

mod panel_store {
    use super::*;

    fn panel_store(limit: usize) -> (Arc<MemoryStore>, PanelStore) {
        let kv = Arc::new(MemoryStore::new());
        let store = PanelStore::new(kv.clone(), limit);
        (kv, store)
    }

    #[test]
    fn geometry_defaults_when_absent() {
        let (_, store) = panel_store(30);
        assert_eq!(store.load_geometry(VIEW), PanelGeometry::default_for(VIEW));
    }

    #[test]
    fn geometry_round_trip() {
        let (kv, store) = panel_store(30);
        let g = PanelGeometry {
            position: Position::new(42.0, 84.0),
            size: Size::new(500.0, 600.0),
        };
        store.save_geometry(&g);
        assert!(kv.get(POSITION_KEY).unwrap().is_some());
        assert!(kv.get(SIZE_KEY).unwrap().is_some());
        assert_eq!(store.load_geometry(VIEW), g);
    }

    #[test]
    fn malformed_geometry_falls_back_per_key() {
        let (kv, store) = panel_store(30);
        kv.set(POSITION_KEY, "not json").unwrap();
        kv.set(SIZE_KEY, r#"{"width":300,"height":400}"#).unwrap();
        let g = store.load_geometry(VIEW);
        assert_eq!(g.position, PanelGeometry::default_for(VIEW).position);
        assert_eq!(g.size, Size::new(300.0, 400.0));
    }

    #[test]
    fn history_truncated_to_limit() {
        let (_, store) = panel_store(30);
        let messages: Vec<ChatMessage> =
            (0..45).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        store.save_history("h", &messages);
        let loaded = store.load_history("h").unwrap();
        assert_eq!(loaded.len(), 30);
        assert_eq!(loaded.first().unwrap().content, "m15");
        assert_eq!(loaded.last().unwrap().content, "m44");
    }

    #[test]
    fn empty_or_malformed_history_is_none() {
        let (kv, store) = panel_store(30);
        kv.set("h", "[]").unwrap();
        assert!(store.load_history("h").is_none());
        kv.set("h", "{\"x\":1}").unwrap();
        assert!(store.load_history("h").is_none());
        assert!(store.load_history("missing").is_none());
    }

    #[test]
    fn clear_history_removes_key() {
        let (kv, store) = panel_store(30);
        store.save_history("h", &[ChatMessage::user("hi")]);
        store.clear_history("h");
        assert_eq!(kv.get("h").unwrap(), None);
    }

    #[test]
    fn failures_are_swallowed() {
        let store = PanelStore::new(Arc::new(BrokenStore), 30);
        store.save_geometry(&PanelGeometry::default_for(VIEW));
        store.save_history("h", &[ChatMessage::user("hi")]);
        store.clear_history("h");
        assert_eq!(store.load_geometry(VIEW), PanelGeometry::default_for(VIEW));
        assert!(store.load_history("h").is_none());
    }
}
