//! List view state: free-text filter, sort key, page size and page
//!
//! The state is mirrored into a URL query string (`q`, `sort`, `size`, `page`)
//! so views can be bookmarked. Default values are omitted from the URL.

use crate::Tree;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort order for tree lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently updated first
    #[default]
    UpdatedDesc,
    /// Least recently updated first
    UpdatedAsc,
    /// Title A to Z
    NameAsc,
    /// Title Z to A
    NameDesc,
    /// Largest trees first
    NodesDesc,
    /// Most liked first
    LikesDesc,
    /// Most viewed first
    ViewsDesc,
}

impl SortKey {
    /// All sort keys in display order
    pub const ALL: [SortKey; 7] = [
        SortKey::UpdatedDesc,
        SortKey::UpdatedAsc,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::NodesDesc,
        SortKey::LikesDesc,
        SortKey::ViewsDesc,
    ];

    /// URL representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::UpdatedDesc => "updated_desc",
            SortKey::UpdatedAsc => "updated_asc",
            SortKey::NameAsc => "name_asc",
            SortKey::NameDesc => "name_desc",
            SortKey::NodesDesc => "nodes_desc",
            SortKey::LikesDesc => "likes_desc",
            SortKey::ViewsDesc => "views_desc",
        }
    }

    fn compare(&self, a: &Tree, b: &Tree) -> Ordering {
        match self {
            SortKey::UpdatedDesc => b.updated_at.as_str().cmp(a.updated_at.as_str()),
            SortKey::UpdatedAsc => a.updated_at.as_str().cmp(b.updated_at.as_str()),
            SortKey::NameAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::NameDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
            SortKey::NodesDesc => b.content.nodes.len().cmp(&a.content.nodes.len()),
            SortKey::LikesDesc => b.stats.likes.cmp(&a.stats.likes),
            SortKey::ViewsDesc => b.stats.views.cmp(&a.stats.views),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// Allowed page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    /// 10 rows
    Ten,
    /// 20 rows
    #[default]
    Twenty,
    /// 50 rows
    Fifty,
}

impl PageSize {
    /// Number of rows per page
    pub fn get(&self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(PageSize::Ten),
            20 => Ok(PageSize::Twenty),
            50 => Ok(PageSize::Fifty),
            other => Err(format!("Unsupported page size: {}", other)),
        }
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.get()
    }
}

/// Filter, sort and paging state of a tree list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListViewState {
    /// Free-text title filter
    pub query: String,

    /// Sort order
    pub sort: SortKey,

    /// Rows per page
    pub page_size: PageSize,

    /// 1-based page index
    pub page: usize,
}

impl Default for ListViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort: SortKey::default(),
            page_size: PageSize::default(),
            page: 1,
        }
    }
}

impl ListViewState {
    /// Change the filter text and go back to the first page
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Change the sort order and go back to the first page
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    /// Change the page size and go back to the first page
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    /// Jump to a page (values below 1 become 1)
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Serialize non-default values as `q=..&sort=..&size=..&page=..`
    ///
    /// # Examples
    ///
    /// ```
    /// use relovetree_domain::{ListViewState, SortKey};
    ///
    /// let mut state = ListViewState::default();
    /// assert_eq!(state.to_query_string(), "");
    ///
    /// state.set_sort(SortKey::LikesDesc);
    /// state.set_page(3);
    /// assert_eq!(state.to_query_string(), "sort=likes_desc&page=3");
    /// ```
    pub fn to_query_string(&self) -> String {
        let defaults = Self::default();
        let mut out = form_urlencoded::Serializer::new(String::new());

        let query = self.query.trim();
        if !query.is_empty() {
            out.append_pair("q", query);
        }
        if self.sort != defaults.sort {
            out.append_pair("sort", self.sort.as_str());
        }
        if self.page_size != defaults.page_size {
            out.append_pair("size", &self.page_size.get().to_string());
        }
        if self.page > 1 {
            out.append_pair("page", &self.page.to_string());
        }

        out.finish()
    }

    /// Parse a query string, ignoring unknown keys and invalid values
    ///
    /// A leading `?` is accepted.
    pub fn from_query_string(input: &str) -> Self {
        let mut state = Self::default();
        let input = input.strip_prefix('?').unwrap_or(input);

        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            match key.as_ref() {
                "q" => state.query = value.trim().to_string(),
                "sort" => {
                    if let Ok(sort) = value.parse() {
                        state.sort = sort;
                    }
                }
                "size" => {
                    if let Some(size) = value.parse::<usize>().ok().and_then(|v| PageSize::try_from(v).ok()) {
                        state.page_size = size;
                    }
                }
                "page" => {
                    if let Ok(page) = value.parse::<usize>() {
                        state.page = page.max(1);
                    }
                }
                _ => {}
            }
        }

        state
    }

    /// Filter, sort and slice `trees` according to this state
    ///
    /// A page past the end is clamped to the last page.
    pub fn apply(&self, trees: &[Tree]) -> ListPage {
        let needle = self.query.trim().to_lowercase();
        let mut matching: Vec<&Tree> = trees
            .iter()
            .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
            .collect();

        matching.sort_by(|a, b| self.sort.compare(a, b).then_with(|| a.id.cmp(&b.id)));

        let size = self.page_size.get();
        let total_items = matching.len();
        let total_pages = total_items.div_ceil(size).max(1);
        let page = self.page.clamp(1, total_pages);

        let items = matching
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect();

        ListPage {
            items,
            page,
            total_pages,
            total_items,
        }
    }
}

/// One page of a filtered, sorted tree list
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    /// Trees on this page
    pub items: Vec<Tree>,

    /// 1-based page actually shown
    pub page: usize,

    /// Number of pages (at least 1)
    pub total_pages: usize,

    /// Trees matching the filter
    pub total_items: usize,
}
