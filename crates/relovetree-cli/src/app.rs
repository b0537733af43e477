//! Shared state for command execution.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::interaction::TerminalInteraction;
use crate::output::Formatter;
use relovetree_domain::traits::TreeStore;
use relovetree_domain::{Tree, TreeId, UserId};
use relovetree_fork::{ListPreferences, NoRefresh, OwnerConsole};
use relovetree_store::{SqliteKvStore, SqliteTreeStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Open stores, the acting user and output settings.
pub struct App {
    /// Loaded configuration
    pub config: Config,

    /// Output formatter
    pub formatter: Formatter,

    /// User the commands act as
    pub viewer: UserId,

    /// Tree documents
    pub store: Arc<SqliteTreeStore>,

    /// Local state (status cache, list preferences)
    pub kv: Arc<SqliteKvStore>,
}

impl App {
    /// Open the database at `database`, creating it if needed.
    pub fn open(config: Config, formatter: Formatter, viewer: UserId, database: &Path) -> Result<Self> {
        if let Some(parent) = database.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Arc::new(SqliteTreeStore::open(database)?);
        let kv = Arc::new(SqliteKvStore::open(database)?);
        tracing::debug!(database = %database.display(), viewer = %viewer, "Opened database");

        Ok(Self {
            config,
            formatter,
            viewer,
            store,
            kv,
        })
    }

    /// Console for the acting user; `assume_yes` skips confirmations.
    pub fn console(&self, assume_yes: bool) -> Result<OwnerConsole<SqliteTreeStore>> {
        let console = OwnerConsole::new(
            Arc::clone(&self.store),
            self.kv.clone(),
            self.viewer.clone(),
            self.config.fork.clone(),
            Arc::new(self.interaction(assume_yes)),
            Arc::new(NoRefresh),
        )?;
        Ok(console)
    }

    /// Terminal toasts and prompts.
    pub fn interaction(&self, assume_yes: bool) -> TerminalInteraction {
        TerminalInteraction::new(self.formatter.clone(), assume_yes)
    }

    /// The acting user's list preferences.
    pub fn preferences(&self) -> ListPreferences {
        ListPreferences::new(self.kv.clone(), self.viewer.clone())
    }

    /// Load a tree or fail with [`CliError::NotFound`].
    pub async fn tree(&self, id: &str) -> Result<Tree> {
        self.store
            .get_tree(&TreeId::new(id))
            .await?
            .ok_or_else(|| CliError::NotFound(id.to_string()))
    }
}
