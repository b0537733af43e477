//! Sync command implementation.

use crate::app::App;
use crate::cli::SyncArgs;
use crate::error::{CliError, Result};
use relovetree_domain::TreeId;
use relovetree_fork::SyncOutcome;

/// Execute the sync command.
pub async fn execute_sync(args: SyncArgs, app: &App) -> Result<()> {
    let id = TreeId::new(args.id);
    let outcome = app.console(args.yes)?.sync(&id).await.map_err(CliError::Reported)?;

    if let SyncOutcome::Synced { marker } = outcome {
        if !app.formatter.is_table() {
            println!("{}", marker);
        }
    }

    Ok(())
}
