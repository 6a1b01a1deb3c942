//! Offline sessions and session storage

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Access credentials for one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub shop: String,
    pub access_token: String,
    pub scope: String,
    pub is_online: bool,
}

impl Session {
    pub fn offline_id(shop: &str) -> String {
        format!("offline_{}", shop)
    }

    /// Build the offline session obtained from a completed install.
    pub fn offline(shop: &str, access_token: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            id: Self::offline_id(shop),
            shop: shop.to_string(),
            access_token: access_token.into(),
            scope: scope.into(),
            is_online: false,
        }
    }
}

pub trait SessionStore: Send + Sync {
    fn store(&self, session: Session);
    fn load(&self, id: &str) -> Option<Session>;
    /// Returns true when a session was removed
    fn delete(&self, id: &str) -> bool;
    fn find_by_shop(&self, shop: &str) -> Vec<Session>;

    /// Remove every session of a shop (uninstall). Returns the number removed.
    fn delete_by_shop(&self, shop: &str) -> usize {
        self.find_by_shop(shop)
            .iter()
            .filter(|s| self.delete(&s.id))
            .count()
    }
}

/// Process-local session store. Sessions are lost on restart and shops
/// re-authenticate through the install flow.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn store(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    fn load(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    fn delete(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn find_by_shop(&self, shop: &str) -> Vec<Session> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().shop == shop)
            .map(|entry| entry.value().clone())
            .collect()
    }
}
