//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use relovetree_domain::traits::{Toast, ToastKind};
use relovetree_domain::{ListPage, Tree, TreeId};
use relovetree_fork::{Badge, BatchReport, CheckOutcome};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one page of the viewer's trees with their badges.
    pub fn format_page(&self, page: &ListPage, badges: &[Badge]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = page
                    .items
                    .iter()
                    .zip(badges)
                    .map(|(tree, badge)| {
                        serde_json::json!({
                            "id": tree.id.as_str(),
                            "title": tree.title,
                            "nodes": tree.content.nodes.len(),
                            "likes": tree.stats.likes,
                            "views": tree.stats.views,
                            "updated_at": tree.updated_at.as_str(),
                            "status": badge_key(*badge),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "page": page.page,
                    "total_pages": page.total_pages,
                    "total_items": page.total_items,
                    "items": items,
                }))?)
            }
            OutputFormat::Quiet => Ok(ids(&page.items)),
            OutputFormat::Table => {
                if page.items.is_empty() {
                    return Ok(self.colorize("No trees found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Nodes", "Likes", "Views", "Updated", "Status"]);
                for (tree, badge) in page.items.iter().zip(badges) {
                    builder.push_record([
                        tree.id.to_string(),
                        tree.title.clone(),
                        tree.content.nodes.len().to_string(),
                        tree.stats.likes.to_string(),
                        tree.stats.views.to_string(),
                        tree.updated_at.to_string(),
                        self.badge(*badge),
                    ]);
                }

                Ok(format!(
                    "{}\nPage {}/{} ({} trees)",
                    self.table(builder),
                    page.page,
                    page.total_pages,
                    page.total_items
                ))
            }
        }
    }

    /// Format an operator listing of trees.
    pub fn format_trees(&self, trees: &[Tree]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(trees)?),
            OutputFormat::Quiet => Ok(ids(trees)),
            OutputFormat::Table => {
                if trees.is_empty() {
                    return Ok(self.colorize("No trees found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Owner", "Title", "Nodes", "Updated", "Cloned From"]);
                for tree in trees {
                    let source = tree
                        .provenance
                        .as_ref()
                        .map(|p| p.source_id.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    builder.push_record([
                        tree.id.to_string(),
                        tree.owner_id.to_string(),
                        tree.title.clone(),
                        tree.content.nodes.len().to_string(),
                        tree.updated_at.to_string(),
                        source,
                    ]);
                }

                Ok(self.table(builder))
            }
        }
    }

    /// Format a tree's nodes with the completeness heuristic.
    pub fn format_dump(&self, tree: &Tree) -> Result<String> {
        let summary = tree.content.summary();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "tree": tree,
                "node_count": summary.node_count,
                "edge_count": summary.edge_count,
                "complete_nodes": summary.complete_nodes,
                "completeness": summary.completeness(),
            }))?),
            OutputFormat::Quiet => Ok(format!("{:.0}", summary.completeness() * 100.0)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Node", "Title", "Date", "Description", "Media", "Complete"]);
                for node in &tree.content.nodes {
                    builder.push_record([
                        node.id.clone(),
                        node.title.clone(),
                        node.date.clone().unwrap_or_default(),
                        truncate(&node.description, 40),
                        mark(node.media_url.is_some(), "yes"),
                        mark(node.is_complete(), "✓"),
                    ]);
                }

                Ok(format!(
                    "{} ({})\n{}\n{} nodes, {} edges, {}/{} complete ({:.0}%)",
                    tree.title,
                    tree.id,
                    self.table(builder),
                    summary.node_count,
                    summary.edge_count,
                    summary.complete_nodes,
                    summary.node_count,
                    summary.completeness() * 100.0
                ))
            }
        }
    }

    /// Format the result of a single check.
    pub fn format_check(&self, id: &TreeId, outcome: &CheckOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "id": id.as_str(),
                "has_update": outcome.has_update,
                "source_version_marker": outcome.source_version_marker.as_str(),
                "source_title": outcome.source_summary.title,
                "source_owner": outcome.source_summary.owner_id.as_str(),
                "source_nodes": outcome.source_summary.content.node_count,
            }))?),
            OutputFormat::Quiet => Ok(outcome.has_update.to_string()),
            OutputFormat::Table => Ok(format!(
                "Source: {} by {} ({} nodes)\nSource updated: {}",
                outcome.source_summary.title,
                outcome.source_summary.owner_id,
                outcome.source_summary.content.node_count,
                outcome.source_version_marker
            )),
        }
    }

    /// Format a batch report.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<serde_json::Value> = report
                    .failures
                    .iter()
                    .map(|(id, e)| serde_json::json!({ "id": id.as_str(), "error": e.to_string() }))
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "checked": report.checked.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                    "updates": report.updates.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                    "failures": failures,
                    "superseded": report.superseded.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                    "skipped_cached": report.skipped_cached,
                    "skipped_in_flight": report.skipped_in_flight,
                    "deferred": report.deferred,
                }))?)
            }
            OutputFormat::Quiet => Ok(report
                .updates
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut lines = vec![format!(
                    "Checked {}, updates {}, failed {}, cached {}, deferred {}",
                    report.checked.len(),
                    report.updates.len(),
                    report.failures.len(),
                    report.skipped_cached,
                    report.deferred
                )];
                for id in &report.updates {
                    lines.push(self.warning(&format!("{} has an update", id)));
                }
                for (id, e) in &report.failures {
                    lines.push(self.error(&format!("{}: {}", id, e)));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Render a toast for the terminal.
    pub fn toast(&self, toast: &Toast) -> String {
        match toast.kind {
            ToastKind::Success => self.success(&toast.message),
            ToastKind::Info => self.info(&toast.message),
            ToastKind::Warning => self.warning(&toast.message),
            ToastKind::Error => self.error(&toast.message),
        }
    }

    /// Whether output is meant for people rather than scripts.
    pub fn is_table(&self) -> bool {
        self.format == OutputFormat::Table
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn badge(&self, badge: Badge) -> String {
        match badge {
            Badge::UpdateAvailable => self.colorize("업데이트 있음", "yellow"),
            Badge::UpToDate => self.colorize("최신", "green"),
            Badge::Unknown => "확인 전".to_string(),
            Badge::Original => "-".to_string(),
        }
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn badge_key(badge: Badge) -> &'static str {
    match badge {
        Badge::UpdateAvailable => "update_available",
        Badge::UpToDate => "up_to_date",
        Badge::Unknown => "unknown",
        Badge::Original => "original",
    }
}

fn ids(trees: &[Tree]) -> String {
    trees.iter().map(|t| t.id.to_string()).collect::<Vec<_>>().join("\n")
}

fn mark(flag: bool, label: &str) -> String {
    if flag {
        label.to_string()
    } else {
        String::new()
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}
