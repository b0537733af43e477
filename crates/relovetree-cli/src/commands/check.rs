//! Check and check-all command implementations.

use crate::app::App;
use crate::cli::{CheckAllArgs, CheckArgs};
use crate::error::{CliError, Result};
use relovetree_domain::TreeId;

/// Execute the check command.
pub async fn execute_check(args: CheckArgs, app: &App) -> Result<()> {
    let id = TreeId::new(args.id);
    let outcome = app.console(false)?.check(&id).await.map_err(CliError::Reported)?;
    println!("{}", app.formatter.format_check(&id, &outcome)?);
    Ok(())
}

/// Execute the check-all command.
///
/// With `--force` every clone is re-checked; otherwise clones with a fresh
/// cached status are skipped and the batch size cap applies.
pub async fn execute_check_all(args: CheckAllArgs, app: &App) -> Result<()> {
    let console = app.console(false)?;

    let result = if args.force {
        console.check_all().await
    } else {
        console.check_stale().await
    };
    let report = result.map_err(CliError::Reported)?;

    if !report.is_empty() || !app.formatter.is_table() {
        println!("{}", app.formatter.format_report(&report)?);
    }
    tracing::debug!("{}", console.metrics().summary());
    Ok(())
}
