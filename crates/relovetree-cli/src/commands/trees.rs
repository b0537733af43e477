//! Trees command implementation.

use crate::app::App;
use crate::cli::TreesArgs;
use crate::error::Result;
use relovetree_domain::traits::{TreeQuery, TreeStore};
use relovetree_domain::UserId;

/// Execute the trees command.
pub async fn execute_trees(args: TreesArgs, app: &App) -> Result<()> {
    let query = TreeQuery {
        owner: args.owner.map(UserId::new),
        clones_only: args.clones,
        limit: args.limit,
    };

    let trees = app.store.query_trees(&query).await?;
    println!("{}", app.formatter.format_trees(&trees)?);
    Ok(())
}
