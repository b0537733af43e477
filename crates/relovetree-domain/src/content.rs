//! Tree content: moments (nodes) and the links between them (edges)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single moment on the timeline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node identifier, unique within its tree
    pub id: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Date of the moment (free-form, usually `YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Linked media (video or image URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl Node {
    /// Create a node with only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// A node is complete when title, date and description are all filled in
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && self.date.as_deref().is_some_and(|d| !d.trim().is_empty())
            && !self.description.trim().is_empty()
    }
}

/// A directed link between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id
    pub from: String,

    /// Target node id
    pub to: String,

    /// Optional label shown on the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Create an unlabeled edge
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }
}

/// The structured payload of a tree
///
/// Replaced wholesale by a sync; never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeContent {
    /// Moments on the timeline
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Links between moments
    #[serde(default)]
    pub edges: Vec<Edge>,

    /// Free-form metadata (artist, theme colour, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TreeContent {
    /// Summarise the content for display next to a staleness result
    pub fn summary(&self) -> ContentSummary {
        ContentSummary {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            complete_nodes: self.nodes.iter().filter(|n| n.is_complete()).count(),
        }
    }
}

/// Counts describing a tree's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentSummary {
    /// Number of nodes
    pub node_count: usize,

    /// Number of edges
    pub edge_count: usize,

    /// Nodes with title, date and description
    pub complete_nodes: usize,
}

impl ContentSummary {
    /// Share of complete nodes in `[0.0, 1.0]`; an empty tree counts as complete
    pub fn completeness(&self) -> f64 {
        if self.node_count == 0 {
            return 1.0;
        }
        self.complete_nodes as f64 / self.node_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            title: "Debut stage".to_string(),
            date: Some("2019-08-08".to_string()),
            description: "First broadcast performance".to_string(),
            media_url: None,
        }
    }

    #[test]
    fn test_node_completeness() {
        assert!(complete_node("n1").is_complete());

        let mut missing_date = complete_node("n2");
        missing_date.date = None;
        assert!(!missing_date.is_complete());

        let mut blank_description = complete_node("n3");
        blank_description.description = "   ".to_string();
        assert!(!blank_description.is_complete());
    }

    #[test]
    fn test_summary_counts() {
        let content = TreeContent {
            nodes: vec![complete_node("a"), Node::new("b", "Fan meeting")],
            edges: vec![Edge::new("a", "b")],
            metadata: BTreeMap::new(),
        };

        let summary = content.summary();
        assert_eq!(summary.node_count, 2);
        assert_eq!(summary.edge_count, 1);
        assert_eq!(summary.complete_nodes, 1);
        assert_eq!(summary.completeness(), 0.5);
    }

    #[test]
    fn test_empty_content_is_complete() {
        assert_eq!(TreeContent::default().summary().completeness(), 1.0);
    }

    #[test]
    fn test_content_deserializes_with_missing_fields() {
        let content: TreeContent =
            serde_json::from_str(r#"{"nodes":[{"id":"n1","mediaUrl":"https://v/1"}]}"#).unwrap();
        assert_eq!(content.nodes.len(), 1);
        assert_eq!(content.nodes[0].media_url.as_deref(), Some("https://v/1"));
        assert!(content.edges.is_empty());
    }
}
