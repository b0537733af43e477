//! Dump command implementation.

use crate::app::App;
use crate::cli::DumpArgs;
use crate::error::Result;

/// Execute the dump command.
pub async fn execute_dump(args: DumpArgs, app: &App) -> Result<()> {
    let tree = app.tree(&args.id).await?;
    println!("{}", app.formatter.format_dump(&tree)?);
    Ok(())
}
