// Copyright 2025 Cowboy AI, LLC.

//! Composite services: N adapters behind one domain interface
//!
//! A [`CompositeService`] implements [`DomainService`] by fanning reads
//! across every wrapped adapter and routing writes to the owning adapter.
//! Records leave the composite with composite ids (`p<index>_<id>`) and an
//! [`Origin`] stamp; those ids are accepted back on `get_by_id`, `update`,
//! and `delete` and routed to the adapter that produced them.
//!
//! The adapter list and its order are fixed at construction. Composite id
//! decoding depends on that order, so a composite is never resized or
//! reordered; reconfiguration replaces the whole composite at the factory.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use lru::LruCache;
use tracing::{debug, warn};

use crate::adapter::{Capabilities, Capability, DomainService, PlatformAdapter};
use crate::composite_id::CompositeId;
use crate::entity::{DomainRecord, ListQuery, Origin, RecordPage};
use crate::errors::{ComposeError, ComposeResult};
use crate::handle::AdapterHandle;
use crate::platform::PlatformConfig;

/// Bare ids resolved by probing are remembered up to this many entries.
const PROBE_CACHE_SIZE: usize = 256;

struct CompositeSlot<T: DomainRecord> {
    handle: AdapterHandle<T>,
    config: PlatformConfig,
}

/// N platform adapters presented as one logical domain service
pub struct CompositeService<T: DomainRecord> {
    domain: String,
    slots: Vec<CompositeSlot<T>>,
    probe_cache: Mutex<LruCache<String, usize>>,
    adapter_timeout: Option<Duration>,
}

impl<T: DomainRecord> CompositeService<T> {
    /// Compose `adapters` in the given order
    ///
    /// Each adapter gets a fresh handle and an empty configuration; use
    /// [`CompositeService::from_slots`] when handles and configurations
    /// already exist (the factory path).
    pub fn new(domain: impl Into<String>, adapters: Vec<Arc<dyn PlatformAdapter<T>>>) -> Self {
        let slots = adapters
            .into_iter()
            .map(|adapter| {
                let platform = adapter.descriptor().platform;
                CompositeSlot {
                    handle: AdapterHandle::new(platform, adapter),
                    config: PlatformConfig::new(),
                }
            })
            .collect();
        Self::build(domain.into(), slots)
    }

    /// Compose already-cached handles with their initialization configs
    pub fn from_slots(
        domain: impl Into<String>,
        slots: Vec<(AdapterHandle<T>, PlatformConfig)>,
    ) -> Self {
        let slots = slots
            .into_iter()
            .map(|(handle, config)| CompositeSlot { handle, config })
            .collect();
        Self::build(domain.into(), slots)
    }

    fn build(domain: String, slots: Vec<CompositeSlot<T>>) -> Self {
        Self {
            domain,
            slots,
            probe_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(PROBE_CACHE_SIZE).expect("probe cache size is nonzero"),
            )),
            adapter_timeout: None,
        }
    }

    /// Race every adapter call against a deadline
    ///
    /// A timeout is treated exactly like an adapter failure: logged and
    /// excluded from read fan-out, surfaced for targeted writes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = Some(timeout);
        self
    }

    /// Domain label used in errors and logs
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Number of composed adapters
    pub fn adapter_count(&self) -> usize {
        self.slots.len()
    }

    fn slot_label(&self, index: usize) -> String {
        format!("{}[{index}]", self.slots[index].handle.platform().key())
    }

    /// Ensure every adapter has had `initialize` attempted, then return the
    /// indices of the ones that are usable.
    ///
    /// Already-initialized adapters are skipped; `Failed` adapters stay
    /// failed (no retry) and are silently excluded from fan-out.
    async fn usable_slots(&self) -> Vec<usize> {
        join_all(
            self.slots
                .iter()
                .map(|slot| slot.handle.initialize_now(&slot.config)),
        )
        .await;

        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.handle.is_ready())
            .map(|(index, _)| index)
            .collect()
    }

    async fn with_deadline<F, R>(&self, index: usize, fut: F) -> ComposeResult<R>
    where
        F: std::future::Future<Output = ComposeResult<R>>,
    {
        match self.adapter_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(result) => result,
                Err(_) => Err(ComposeError::platform_op(
                    self.slot_label(index),
                    format!("timed out after {}ms", deadline.as_millis()),
                )),
            },
            None => fut.await,
        }
    }

    /// Rewrite a record's ids into the composite namespace and stamp its
    /// provenance.
    fn stamp(&self, record: &mut T, index: usize) {
        let original = record.id().to_string();
        if let Some(parent) = record.parent_id().map(str::to_string) {
            if CompositeId::parse(&parent).is_none() {
                record.set_parent_id(Some(CompositeId::encode(index, &parent)));
            }
        }
        record.set_origin(Some(Origin::new(index, original.clone())));
        record.set_id(CompositeId::encode(index, &original));
    }

    /// Strip composite prefixes from a record before handing it to the
    /// adapter at `index`; a prefix naming a different adapter is rejected.
    fn localize(&self, index: usize, mut record: T) -> ComposeResult<T> {
        record.set_origin(None);

        if let Some(id) = CompositeId::parse(record.id()) {
            if id.index != index {
                return Err(ComposeError::InvalidRecord {
                    reason: format!(
                        "record id {} belongs to adapter {}, not {}",
                        record.id(),
                        id.index,
                        self.slot_label(index)
                    ),
                });
            }
            record.set_id(id.original);
        }

        if let Some(parent) = record.parent_id().map(str::to_string) {
            if let Some(id) = CompositeId::parse(&parent) {
                if id.index != index {
                    return Err(ComposeError::InvalidRecord {
                        reason: format!("parent id {parent} references another platform"),
                    });
                }
                record.set_parent_id(Some(id.original));
            }
        }

        Ok(record)
    }

    fn wrap_err(&self, index: usize, err: ComposeError) -> ComposeError {
        match err {
            err @ ComposeError::UnsupportedOperation { .. } => err,
            err => ComposeError::platform_op(self.slot_label(index), err.to_string()),
        }
    }

    fn cached_probe(&self, id: &str) -> Option<usize> {
        self.probe_cache.lock().unwrap().get(id).copied()
    }

    fn remember_probe(&self, id: &str, index: usize) {
        self.probe_cache.lock().unwrap().put(id.to_string(), index);
    }

    fn forget_probe(&self, id: &str) {
        self.probe_cache.lock().unwrap().pop(id);
    }

    /// Find the adapter that owns `id`, either by decoding a composite id
    /// (bounds-checked; no probe) or by probing every usable adapter in
    /// order. Returns the owning index plus the platform-native id.
    async fn resolve_owner(&self, id: &str, usable: &[usize]) -> Option<(usize, String)> {
        if let Some(decoded) = CompositeId::parse(id) {
            if decoded.index >= self.slots.len() {
                return None;
            }
            return Some((decoded.index, decoded.original));
        }

        if let Some(index) = self.cached_probe(id) {
            if usable.contains(&index) {
                return Some((index, id.to_string()));
            }
        }

        for &index in usable {
            let adapter = self.slots[index].handle.adapter();
            match self.with_deadline(index, adapter.get_by_id(id)).await {
                Ok(Some(_)) => {
                    self.remember_probe(id, index);
                    return Some((index, id.to_string()));
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(
                        domain = %self.domain,
                        slot = %self.slot_label(index),
                        error = %err,
                        "probe failed; trying next adapter"
                    );
                }
            }
        }
        None
    }
}

#[async_trait]
impl<T: DomainRecord> DomainService<T> for CompositeService<T> {
    /// Union of the composed adapters' capabilities
    fn capabilities(&self) -> Capabilities {
        self.slots
            .iter()
            .fold(Capabilities::none(), |caps, slot| {
                caps.union(slot.handle.adapter().capabilities())
            })
    }

    fn is_initialized(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.handle.is_ready() || slot.handle.adapter().is_initialized())
    }

    async fn list(&self, query: &ListQuery) -> ComposeResult<RecordPage<T>> {
        let usable = self.usable_slots().await;
        if usable.is_empty() {
            debug!(domain = %self.domain, "no usable adapters; returning empty page");
            return Ok(RecordPage::empty(query));
        }

        let calls = usable.iter().map(|&index| {
            let adapter = self.slots[index].handle.adapter();
            async move { (index, self.with_deadline(index, adapter.list(query)).await) }
        });

        // join_all preserves argument order, so output follows adapter
        // order regardless of which backend responds first.
        let mut items = Vec::new();
        let mut total_items: u64 = 0;
        for (index, result) in join_all(calls).await {
            match result {
                Ok(mut page) => {
                    total_items += page.page_info.total_items;
                    for record in &mut page.items {
                        self.stamp(record, index);
                    }
                    items.extend(page.items);
                }
                Err(err) => {
                    warn!(
                        domain = %self.domain,
                        slot = %self.slot_label(index),
                        error = %err,
                        "adapter list failed; contributing no results"
                    );
                }
            }
        }

        Ok(RecordPage::new(items, query, total_items))
    }

    async fn get_by_id(&self, id: &str) -> ComposeResult<Option<T>> {
        let usable = self.usable_slots().await;
        if usable.is_empty() {
            return Ok(None);
        }

        if let Some(decoded) = CompositeId::parse(id) {
            if decoded.index >= self.slots.len() || !usable.contains(&decoded.index) {
                return Ok(None);
            }
            let adapter = self.slots[decoded.index].handle.adapter();
            let found = self
                .with_deadline(decoded.index, adapter.get_by_id(&decoded.original))
                .await
                .map_err(|err| self.wrap_err(decoded.index, err))?;
            return Ok(found.map(|mut record| {
                self.stamp(&mut record, decoded.index);
                record
            }));
        }

        // Bare per-platform id: probe every adapter in order. A cached
        // probe result is tried first; on a stale hit the full scan runs.
        if let Some(index) = self.cached_probe(id) {
            if usable.contains(&index) {
                let adapter = self.slots[index].handle.adapter();
                if let Ok(Some(mut record)) =
                    self.with_deadline(index, adapter.get_by_id(id)).await
                {
                    self.stamp(&mut record, index);
                    return Ok(Some(record));
                }
                self.forget_probe(id);
            }
        }

        for &index in &usable {
            let adapter = self.slots[index].handle.adapter();
            match self.with_deadline(index, adapter.get_by_id(id)).await {
                Ok(Some(mut record)) => {
                    self.remember_probe(id, index);
                    self.stamp(&mut record, index);
                    return Ok(Some(record));
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        domain = %self.domain,
                        slot = %self.slot_label(index),
                        error = %err,
                        "probe failed; trying next adapter"
                    );
                }
            }
        }
        Ok(None)
    }

    async fn create(&self, record: T) -> ComposeResult<T> {
        let usable = self.usable_slots().await;
        if usable.is_empty() {
            return Err(ComposeError::NotInitialized {
                domain: self.domain.clone(),
            });
        }

        let index = usable
            .iter()
            .copied()
            .find(|&index| {
                self.slots[index]
                    .handle
                    .adapter()
                    .capabilities()
                    .supports(Capability::Create)
            })
            .ok_or_else(|| ComposeError::unsupported("create", None))?;

        let record = self.localize(index, record)?;
        let adapter = self.slots[index].handle.adapter();
        let mut created = self
            .with_deadline(index, adapter.create(record))
            .await
            .map_err(|err| self.wrap_err(index, err))?;
        self.stamp(&mut created, index);
        Ok(created)
    }

    async fn update(&self, id: &str, patch: T) -> ComposeResult<T> {
        let usable = self.usable_slots().await;
        if usable.is_empty() {
            return Err(ComposeError::NotInitialized {
                domain: self.domain.clone(),
            });
        }

        let (index, original) = self.resolve_owner(id, &usable).await.ok_or_else(|| {
            ComposeError::platform_op(
                self.domain.clone(),
                format!("no adapter recognizes id {id}"),
            )
        })?;
        if !usable.contains(&index) {
            return Err(ComposeError::NotInitialized {
                domain: self.domain.clone(),
            });
        }

        let adapter = self.slots[index].handle.adapter();
        if !adapter.capabilities().supports(Capability::Update) {
            return Err(ComposeError::unsupported(
                "update",
                Some(&self.slot_label(index)),
            ));
        }

        let patch = self.localize(index, patch)?;
        let mut updated = self
            .with_deadline(index, adapter.update(&original, patch))
            .await
            .map_err(|err| self.wrap_err(index, err))?;
        self.stamp(&mut updated, index);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> ComposeResult<bool> {
        let usable = self.usable_slots().await;
        if usable.is_empty() {
            return Err(ComposeError::NotInitialized {
                domain: self.domain.clone(),
            });
        }

        let Some((index, original)) = self.resolve_owner(id, &usable).await else {
            // Unknown target is a miss, not an error, mirroring get_by_id.
            return Ok(false);
        };
        if !usable.contains(&index) {
            return Err(ComposeError::NotInitialized {
                domain: self.domain.clone(),
            });
        }

        let adapter = self.slots[index].handle.adapter();
        if !adapter.capabilities().supports(Capability::Delete) {
            return Err(ComposeError::unsupported(
                "delete",
                Some(&self.slot_label(index)),
            ));
        }

        let deleted = self
            .with_deadline(index, adapter.delete(&original))
            .await
            .map_err(|err| self.wrap_err(index, err))?;
        if deleted {
            self.forget_probe(&original);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::records::Category;
    use crate::testing::ScriptedAdapter;

    fn composite_of(
        adapters: Vec<Arc<dyn PlatformAdapter<Category>>>,
    ) -> CompositeService<Category> {
        CompositeService::new("category", adapters)
    }

    #[tokio::test]
    async fn localize_strips_matching_prefix_and_rejects_foreign_ones() {
        let composite = composite_of(vec![
            Arc::new(ScriptedAdapter::new(Platform::Shopify)),
            Arc::new(ScriptedAdapter::new(Platform::WooCommerce)),
        ]);

        let mut record = Category::new("p1_9", "Base");
        record.set_origin(Some(Origin::new(1, "9")));
        let localized = composite.localize(1, record.clone()).unwrap();
        assert_eq!(localized.id, "9");
        assert!(localized.origin.is_none());

        let err = composite.localize(0, record).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn stamp_rewrites_parent_references() {
        let composite = composite_of(vec![Arc::new(ScriptedAdapter::new(Platform::Shopify))]);

        let mut record = Category::new("5", "Child").with_parent("7");
        composite.stamp(&mut record, 0);
        assert_eq!(record.id, "p0_5");
        assert_eq!(record.parent_id.as_deref(), Some("p0_7"));
        assert_eq!(record.origin, Some(Origin::new(0, "5")));
    }

    #[tokio::test]
    async fn probe_results_are_memoized() {
        let shopify = Arc::new(
            ScriptedAdapter::new(Platform::Shopify)
                .with_records(vec![Category::new("1", "Root")])
                .initialized(),
        );
        let woo = Arc::new(
            ScriptedAdapter::new(Platform::WooCommerce)
                .with_records(vec![Category::new("9", "Base")])
                .initialized(),
        );
        let composite = composite_of(vec![shopify.clone(), woo.clone()]);

        // First bare-id lookup probes shopify (miss) then woo (hit).
        let hit = composite.get_by_id("9").await.unwrap().unwrap();
        assert_eq!(hit.id, "p1_9");
        assert_eq!(shopify.get_calls(), 1);
        assert_eq!(woo.get_calls(), 1);

        // Second lookup goes straight to the cached owner.
        composite.get_by_id("9").await.unwrap().unwrap();
        assert_eq!(shopify.get_calls(), 1);
        assert_eq!(woo.get_calls(), 2);
    }
}
