//! Relovetree Fork
//!
//! Tracks whether cloned trees have fallen behind the trees they were cloned
//! from, and brings them back in line on request.
//!
//! # Overview
//!
//! - **Staleness checks**: compare a clone's recorded source marker with the
//!   source's current `updated_at`
//! - **Status cache**: per-viewer, TTL-bounded, persisted check results
//! - **Batch scheduling**: debounced, deduplicated, concurrency-limited checks
//!   for the trees visible in a list
//! - **Sync**: confirmed, single-write overwrite of a clone with its source
//! - **Clone creation**: provenance captured from the same read as the content
//!
//! # Staleness Rule
//!
//! | Recorded marker | Current source marker | `has_update` |
//! |-----------------|-----------------------|--------------|
//! | any | empty | false |
//! | `m` | `m` | false |
//! | empty | `m` | true |
//! | `m1` | `m2` | true |
//!
//! # Usage
//!
//! ## Owner Console
//!
//! ```no_run
//! use relovetree_fork::{ForkConfig, NoRefresh, OwnerConsole};
//! use relovetree_domain::traits::{Interaction, Toast};
//! use relovetree_domain::{TreeId, UserId};
//! use relovetree_store::{SqliteKvStore, SqliteTreeStore};
//! use std::sync::Arc;
//!
//! struct Stdout;
//!
//! impl Interaction for Stdout {
//!     fn toast(&self, toast: Toast) {
//!         println!("{}", toast.message);
//!     }
//!     fn confirm(&self, _prompt: &str) -> bool {
//!         true
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteTreeStore::open("relovetree.db")?);
//! let kv = Arc::new(SqliteKvStore::open("relovetree.db")?);
//! let console = OwnerConsole::new(
//!     store,
//!     kv,
//!     UserId::new("me"),
//!     ForkConfig::default(),
//!     Arc::new(Stdout),
//!     Arc::new(NoRefresh),
//! )?;
//!
//! console.check(&TreeId::new("clone-1")).await?;
//! console.sync(&TreeId::new("clone-1")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use relovetree_fork::ForkConfig;
//!
//! // Default: 5 minute TTL, 250 ms debounce, 8 per batch, 3 at a time
//! let config = ForkConfig::default();
//!
//! // Eager: short TTL and debounce, larger batches
//! let config = ForkConfig::eager();
//!
//! // Relaxed: long TTL, small batches, gentle on the backend
//! let config = ForkConfig::relaxed();
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [fork]
//! status_ttl_secs = 300
//! debounce_ms = 250
//! max_batch_size = 8
//! max_concurrency = 3
//! check_timeout_secs = 10
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod metrics;
mod checker;
mod cache;
mod scheduler;
mod sync;
mod clone;
pub mod console;
mod prefs;

pub use error::ForkError;
pub use config::ForkConfig;
pub use metrics::ForkMetrics;
pub use checker::{CheckOutcome, SourceSummary, StalenessChecker};
pub use cache::{lock_cache, SharedStatusCache, StatusCache, STATUS_KEY_PREFIX};
pub use scheduler::{BatchReport, BatchScheduler, NoRefresh, ViewRefresh};
pub use sync::{SyncExecutor, SyncOutcome, CONFIRM_SYNC};
pub use clone::{CloneService, ProvenancePolicy};
pub use console::{Badge, OwnerConsole};
pub use prefs::{ListPreferences, PREFS_KEY_PREFIX};
