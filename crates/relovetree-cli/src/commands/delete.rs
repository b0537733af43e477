//! Delete command implementation.

use crate::app::App;
use crate::cli::DeleteArgs;
use crate::error::{CliError, Result};
use relovetree_domain::traits::Interaction;
use relovetree_domain::TreeId;

/// Execute the delete command.
pub async fn execute_delete(args: DeleteArgs, app: &App) -> Result<()> {
    let tree = app.tree(&args.id).await?;

    let prompt = format!("'{}' 트리를 삭제합니다. 되돌릴 수 없습니다. 계속할까요?", tree.title);
    if !app.interaction(args.yes).confirm(&prompt) {
        println!("{}", app.formatter.info("Operation cancelled"));
        return Ok(());
    }

    app.console(true)?
        .delete(&TreeId::new(args.id))
        .await
        .map_err(CliError::Reported)?;
    Ok(())
}
