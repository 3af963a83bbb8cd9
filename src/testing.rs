// Copyright 2025 Cowboy AI, LLC.

//! Scripted in-memory adapters for tests, benches, and demos
//!
//! [`ScriptedAdapter`] is a fully in-memory [`PlatformAdapter`] whose
//! behavior (records served, capabilities, failure modes, response delay) is
//! fixed at construction. It exists so composition behavior can be exercised
//! without any real backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::adapter::{Capabilities, Capability, DomainService, PlatformAdapter};
use crate::entity::{DomainRecord, ListQuery, RecordPage};
use crate::errors::{ComposeError, ComposeResult};
use crate::platform::{ConfigRequirements, Platform, PlatformConfig, PlatformDescriptor};

/// In-memory adapter with scripted behavior
pub struct ScriptedAdapter<T: DomainRecord> {
    descriptor: PlatformDescriptor,
    capabilities: Capabilities,
    records: RwLock<Vec<T>>,
    initialized: AtomicBool,
    accept_initialize: bool,
    fail_operations: bool,
    reported_total: Option<u64>,
    delay: Option<Duration>,
    initialize_calls: AtomicUsize,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl<T: DomainRecord> ScriptedAdapter<T> {
    /// Adapter for `platform` with no records, no required config, full
    /// write capabilities, and initialization that always succeeds
    pub fn new(platform: Platform) -> Self {
        Self {
            descriptor: PlatformDescriptor::new(platform, ConfigRequirements::none()),
            capabilities: Capabilities::all(),
            records: RwLock::new(Vec::new()),
            initialized: AtomicBool::new(false),
            accept_initialize: true,
            fail_operations: false,
            reported_total: None,
            delay: None,
            initialize_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// Serve these records
    pub fn with_records(self, records: Vec<T>) -> Self {
        *self.records.write().unwrap() = records;
        self
    }

    /// Advertise only these capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Require these configuration fields before initializing
    pub fn with_required_keys(mut self, keys: &[&str]) -> Self {
        self.descriptor.requirements = ConfigRequirements::new(keys, &[]);
        self
    }

    /// Report this total item count from `list` instead of the record count
    pub fn with_reported_total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Sleep this long inside `initialize` and every operation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Start already initialized
    pub fn initialized(self) -> Self {
        self.initialized.store(true, Ordering::SeqCst);
        self
    }

    /// Refuse initialization even with valid configuration
    pub fn rejecting_initialize(mut self) -> Self {
        self.accept_initialize = false;
        self
    }

    /// Fail every read and write operation
    pub fn failing(mut self) -> Self {
        self.fail_operations = true;
        self
    }

    /// How many times `initialize` was invoked
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// How many times `list` was invoked
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// How many times `get_by_id` was invoked
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn fail_if_scripted(&self, operation: &str) -> ComposeResult<()> {
        if self.fail_operations {
            Err(ComposeError::platform_op(
                self.descriptor.platform.key(),
                format!("scripted {operation} failure"),
            ))
        } else {
            Ok(())
        }
    }

    fn ensure_capability(&self, capability: Capability) -> ComposeResult<()> {
        if self.capabilities.supports(capability) {
            Ok(())
        } else {
            Err(ComposeError::unsupported(
                capability.operation(),
                Some(self.descriptor.platform.key()),
            ))
        }
    }
}

#[async_trait]
impl<T: DomainRecord> DomainService<T> for ScriptedAdapter<T> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn list(&self, query: &ListQuery) -> ComposeResult<RecordPage<T>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.fail_if_scripted("list")?;

        let records = self.records.read().unwrap();
        let per_page = query.per_page.max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * per_page;
        let items: Vec<T> = records.iter().skip(start).take(per_page).cloned().collect();
        let total = self.reported_total.unwrap_or(records.len() as u64);
        Ok(RecordPage::new(items, query, total))
    }

    async fn get_by_id(&self, id: &str) -> ComposeResult<Option<T>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.fail_if_scripted("get_by_id")?;

        let records = self.records.read().unwrap();
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, mut record: T) -> ComposeResult<T> {
        self.pause().await;
        self.fail_if_scripted("create")?;
        self.ensure_capability(Capability::Create)?;

        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }
        self.records.write().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, mut patch: T) -> ComposeResult<T> {
        self.pause().await;
        self.fail_if_scripted("update")?;
        self.ensure_capability(Capability::Update)?;

        let mut records = self.records.write().unwrap();
        let slot = records.iter_mut().find(|r| r.id() == id).ok_or_else(|| {
            ComposeError::platform_op(
                self.descriptor.platform.key(),
                format!("no record with id {id}"),
            )
        })?;
        patch.set_id(id.to_string());
        *slot = patch.clone();
        Ok(patch)
    }

    async fn delete(&self, id: &str) -> ComposeResult<bool> {
        self.pause().await;
        self.fail_if_scripted("delete")?;
        self.ensure_capability(Capability::Delete)?;

        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() < before)
    }
}

#[async_trait]
impl<T: DomainRecord> PlatformAdapter<T> for ScriptedAdapter<T> {
    fn descriptor(&self) -> PlatformDescriptor {
        self.descriptor.clone()
    }

    async fn initialize(&self, config: &PlatformConfig) -> bool {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let missing = self.descriptor.missing_keys(config);
        if !missing.is_empty() {
            tracing::warn!(
                platform = %self.descriptor.platform,
                missing = ?missing,
                "refusing to initialize with incomplete configuration"
            );
            return false;
        }
        if !self.accept_initialize {
            return false;
        }
        self.initialized.store(true, Ordering::SeqCst);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Product;

    #[tokio::test]
    async fn missing_required_key_fails_initialize() {
        let adapter: ScriptedAdapter<Product> =
            ScriptedAdapter::new(Platform::Magento).with_required_keys(&["base_url", "api_key"]);

        let incomplete = PlatformConfig::new().with("base_url", "https://shop.example");
        assert!(!adapter.initialize(&incomplete).await);
        assert!(!adapter.is_initialized());

        let complete = incomplete.with("api_key", "k");
        assert!(adapter.initialize(&complete).await);
        assert!(adapter.is_initialized());
        assert_eq!(adapter.initialize_calls(), 2);
    }

    #[tokio::test]
    async fn create_assigns_an_id_when_absent() {
        let adapter = ScriptedAdapter::new(Platform::Sylius);
        let created = adapter
            .create(Product::new("", "Widget", 1999, "USD"))
            .await
            .unwrap();
        assert!(!created.id().is_empty());
        assert_eq!(adapter.get_by_id(created.id()).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn read_only_adapter_rejects_writes() {
        let adapter = ScriptedAdapter::new(Platform::Wix).with_capabilities(Capabilities::none());
        let err = adapter
            .create(Product::new("p1", "Widget", 100, "USD"))
            .await
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
