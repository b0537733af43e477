//! List command implementation.

use crate::app::App;
use crate::cli::ListArgs;
use crate::error::{CliError, Result};
use relovetree_domain::{ListViewState, PageSize};
use relovetree_fork::Badge;

/// Execute the list command.
pub async fn execute_list(args: ListArgs, app: &App) -> Result<()> {
    let prefs = app.preferences();
    let mut state = match args.url.as_deref() {
        Some(url) => prefs.resolve(Some(url)),
        None => prefs.load(),
    };
    apply_args(&mut state, &args)?;

    let console = app.console(false)?;
    let page = console.list(&state).await?;

    // Remember the page actually shown
    state.set_page(page.page);
    prefs.save(&state)?;

    if !args.no_check {
        console.view_changed(&page.items);
        if let Some(report) = console.scheduler().settle().await {
            tracing::debug!(
                checked = report.checked.len(),
                failed = report.failures.len(),
                "Refreshed visible rows"
            );
        }
        tracing::debug!("{}", console.metrics().summary());
    }

    let badges: Vec<Badge> = page.items.iter().map(|tree| console.badge(tree)).collect();
    println!("{}", app.formatter.format_page(&page, &badges)?);

    let query = state.to_query_string();
    if app.formatter.is_table() && !query.is_empty() {
        println!("{}", app.formatter.info(&format!("?{}", query)));
    }

    Ok(())
}

/// Layer explicit flags over the stored view state.
fn apply_args(state: &mut ListViewState, args: &ListArgs) -> Result<()> {
    if let Some(q) = &args.q {
        state.set_query(q.clone());
    }
    if let Some(sort) = args.sort {
        state.set_sort(sort);
    }
    if let Some(size) = args.size {
        state.set_page_size(PageSize::try_from(size).map_err(CliError::InvalidInput)?);
    }
    if let Some(page) = args.page {
        state.set_page(page);
    }
    Ok(())
}
