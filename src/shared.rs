// Copyright 2025 Cowboy AI, LLC.

//! Shared services without per-platform variants
//!
//! Search and token storage are resolved once per registry rather than once
//! per platform: every [`ServiceBundle`](crate::ServiceBundle) carries the
//! same instance. The defaults here keep a registry fully populated when no
//! real implementation is supplied; token refresh and OAuth flows stay out
//! of scope (the token service is a passive holder).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entity::{ListQuery, RecordPage};
use crate::errors::ComposeResult;
use crate::platform::Platform;
use crate::records::{ApiToken, SearchHit};

/// A search request spanning domains and platforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search term
    pub text: String,
    /// Restrict to these domains ("category", "product", ...); empty means all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    /// 1-based page to fetch
    pub page: u32,
    /// Page size
    pub per_page: u32,
}

impl SearchQuery {
    /// Query for `text` with default pagination
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            domains: Vec::new(),
            page: 1,
            per_page: 25,
        }
    }

    fn as_list_query(&self) -> ListQuery {
        ListQuery::page(self.page, self.per_page)
    }
}

/// Cross-domain search, shared across all bundles of a registry
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a search
    async fn search(&self, query: &SearchQuery) -> ComposeResult<RecordPage<SearchHit>>;
}

/// Search service that matches nothing
///
/// The designated fallback so a registry always hands out a working bundle.
#[derive(Debug, Default)]
pub struct OfflineSearchService;

#[async_trait]
impl SearchService for OfflineSearchService {
    async fn search(&self, query: &SearchQuery) -> ComposeResult<RecordPage<SearchHit>> {
        Ok(RecordPage::empty(&query.as_list_query()))
    }
}

/// Per-platform API credential storage, shared across all bundles
///
/// Refreshing expired tokens belongs to the platform adapters' request
/// layer; this service only stores and hands back what it was given.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// The stored token for `platform`, if any
    async fn token_for(&self, platform: Platform) -> ComposeResult<Option<ApiToken>>;

    /// Store (or replace) the token for `platform`
    async fn store(&self, platform: Platform, token: ApiToken) -> ComposeResult<()>;

    /// Drop the token for `platform`
    async fn revoke(&self, platform: Platform) -> ComposeResult<()>;
}

/// Process-local token storage
#[derive(Debug, Default)]
pub struct InMemoryTokenService {
    tokens: RwLock<HashMap<Platform, ApiToken>>,
}

impl InMemoryTokenService {
    /// Create an empty token store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenService for InMemoryTokenService {
    async fn token_for(&self, platform: Platform) -> ComposeResult<Option<ApiToken>> {
        Ok(self.tokens.read().unwrap().get(&platform).cloned())
    }

    async fn store(&self, platform: Platform, token: ApiToken) -> ComposeResult<()> {
        self.tokens.write().unwrap().insert(platform, token);
        Ok(())
    }

    async fn revoke(&self, platform: Platform) -> ComposeResult<()> {
        self.tokens.write().unwrap().remove(&platform);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_store_round_trip() {
        let service = InMemoryTokenService::new();
        assert_eq!(service.token_for(Platform::Shopify).await.unwrap(), None);

        let token = ApiToken::bearer("shpat_123");
        service.store(Platform::Shopify, token.clone()).await.unwrap();
        assert_eq!(
            service.token_for(Platform::Shopify).await.unwrap(),
            Some(token)
        );
        assert_eq!(service.token_for(Platform::Wix).await.unwrap(), None);

        service.revoke(Platform::Shopify).await.unwrap();
        assert_eq!(service.token_for(Platform::Shopify).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_search_matches_nothing() {
        let service = OfflineSearchService;
        let page = service.search(&SearchQuery::text("widget")).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page_info.current_page, 1);
    }
}
