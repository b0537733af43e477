//! Clone command implementation.

use crate::app::App;
use crate::cli::CloneArgs;
use crate::error::Result;
use relovetree_domain::TreeId;
use relovetree_fork::CloneService;
use std::sync::Arc;

/// Execute the clone command.
pub async fn execute_clone(args: CloneArgs, app: &App) -> Result<()> {
    let service = CloneService::new(Arc::clone(&app.store));
    let clone = service.clone_tree(&TreeId::new(args.source_id), &app.viewer).await?;

    if app.formatter.is_table() {
        println!(
            "{}",
            app.formatter.success(&format!("Cloned '{}' as {}", clone.title, clone.id))
        );
    } else {
        println!("{}", clone.id);
    }

    Ok(())
}
