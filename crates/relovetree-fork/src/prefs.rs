//! Persisted list view preferences

use crate::ForkError;
use relovetree_domain::traits::KeyValueStore;
use relovetree_domain::{ListViewState, UserId};
use std::sync::Arc;

/// Storage key prefix; the viewer id is appended
pub const PREFS_KEY_PREFIX: &str = "relovetree:list-prefs:";

/// Page, sort, size and filter remembered per viewer
pub struct ListPreferences {
    kv: Arc<dyn KeyValueStore>,
    viewer: UserId,
}

impl ListPreferences {
    /// Preferences for `viewer`
    pub fn new(kv: Arc<dyn KeyValueStore>, viewer: UserId) -> Self {
        Self { kv, viewer }
    }

    fn key(&self) -> String {
        format!("{}{}", PREFS_KEY_PREFIX, self.viewer)
    }

    /// Stored state, or defaults when nothing usable is stored
    pub fn load(&self) -> ListViewState {
        match self.kv.get(&self.key()) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(viewer = %self.viewer, "Ignoring corrupt list preferences: {}", e);
                ListViewState::default()
            }),
            Ok(None) => ListViewState::default(),
            Err(e) => {
                tracing::warn!(viewer = %self.viewer, "Could not read list preferences: {}", e);
                ListViewState::default()
            }
        }
    }

    /// Remember `state`
    pub fn save(&self, state: &ListViewState) -> Result<(), ForkError> {
        let json = serde_json::to_string(state).map_err(|e| ForkError::Cache(e.to_string()))?;
        self.kv.set(&self.key(), &json)?;
        Ok(())
    }

    /// State from a URL query string when it carries any parameter, else the stored one
    pub fn resolve(&self, url_query: Option<&str>) -> ListViewState {
        match url_query.map(|q| q.trim_start_matches('?')).filter(|q| !q.trim().is_empty()) {
            Some(query) => ListViewState::from_query_string(query),
            None => self.load(),
        }
    }

    /// Forget the stored state
    pub fn clear(&self) -> Result<(), ForkError> {
        self.kv.remove(&self.key())?;
        Ok(())
    }
}
