// Copyright 2025 Cowboy AI, LLC.

//! Domain record trait, provenance stamps, and pagination types
//!
//! Every domain entity flowing through the composition layer implements
//! [`DomainRecord`]: a string identity, an optional parent reference, and a
//! provenance slot ([`Origin`]) that composite services stamp so that later
//! calls can be routed back to the owning backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use indexmap::IndexMap;

/// Provenance stamp attached to records returned from a composite service
///
/// Serializes as the `_platform` / `_originalId` fields that appear inline
/// on composite results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Zero-based index of the owning adapter within the composite
    #[serde(rename = "_platform")]
    pub platform_index: usize,
    /// The backend's native id, before composite rewriting
    #[serde(rename = "_originalId")]
    pub original_id: String,
}

impl Origin {
    /// Create an origin stamp
    pub fn new(platform_index: usize, original_id: impl Into<String>) -> Self {
        Self {
            platform_index,
            original_id: original_id.into(),
        }
    }
}

/// A domain entity with string identity and composite provenance
///
/// `parent_id` has a no-op default because most domains are flat; category
/// trees override it so composite id rewriting can follow the reference.
pub trait DomainRecord: Clone + Send + Sync + 'static {
    /// The record's identifier
    fn id(&self) -> &str;

    /// Replace the record's identifier
    fn set_id(&mut self, id: String);

    /// Reference to another record of the same domain and platform, if any
    fn parent_id(&self) -> Option<&str> {
        None
    }

    /// Replace the parent reference
    fn set_parent_id(&mut self, _parent_id: Option<String>) {}

    /// Provenance stamp, present once a composite has touched the record
    fn origin(&self) -> Option<&Origin>;

    /// Set or clear the provenance stamp
    fn set_origin(&mut self, origin: Option<Origin>);
}

/// Query options for `list` operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based page to fetch
    pub page: u32,
    /// Page size
    pub per_page: u32,
    /// Free-text search term understood by adapters that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Adapter-interpreted filters (field name to value)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, Value>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
            search: None,
            filters: IndexMap::new(),
        }
    }
}

impl ListQuery {
    /// Query for a specific page
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    /// Builder-style search term
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Builder-style filter
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// Pagination metadata accompanying a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The page that was requested
    pub current_page: u32,
    /// The page size that was requested
    pub per_page: u32,
    /// Total matching records across the backend(s)
    pub total_items: u64,
    /// Total pages at `per_page`
    pub total_pages: u32,
}

impl PageInfo {
    /// Page info derived from a total count and the caller's query
    pub fn for_total(query: &ListQuery, total_items: u64) -> Self {
        let per_page = query.per_page.max(1) as u64;
        Self {
            current_page: query.page,
            per_page: query.per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page) as u32,
        }
    }
}

/// One page of records plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPage<T> {
    /// The records on this page
    pub items: Vec<T>,
    /// Pagination metadata
    pub page_info: PageInfo,
}

impl<T> RecordPage<T> {
    /// A page with the given items and a total count
    pub fn new(items: Vec<T>, query: &ListQuery, total_items: u64) -> Self {
        Self {
            items,
            page_info: PageInfo::for_total(query, total_items),
        }
    }

    /// The empty page for a query
    pub fn empty(query: &ListQuery) -> Self {
        Self::new(Vec::new(), query, 0)
    }
}
