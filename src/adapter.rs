// Copyright 2025 Cowboy AI, LLC.

//! Service traits, adapter capabilities, and the offline no-op adapter
//!
//! [`DomainService`] is the interface callers program against: one canonical
//! operation set per domain, implemented both by single-platform adapters and
//! by composites over several of them. [`PlatformAdapter`] extends it with
//! the lifecycle surface (descriptor, initialization) the factory needs.
//!
//! Write operations are capability-gated: an adapter advertises what it
//! supports through [`Capabilities`], and routing consults that set rather
//! than probing for unimplemented methods.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::entity::{DomainRecord, ListQuery, RecordPage};
use crate::errors::{ComposeError, ComposeResult};
use crate::platform::{PlatformConfig, PlatformDescriptor};

/// An optionally-supported write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The adapter can create records
    Create,
    /// The adapter can update records
    Update,
    /// The adapter can delete records
    Delete,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::Create => 0b001,
            Capability::Update => 0b010,
            Capability::Delete => 0b100,
        }
    }

    /// Operation name as it appears in errors and logs
    pub fn operation(&self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Update => "update",
            Capability::Delete => "delete",
        }
    }
}

/// The set of write operations an adapter supports
///
/// Reads (`list`, `get_by_id`) are always supported and not tracked here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    bits: u8,
}

impl Capabilities {
    /// No write support (read-only adapter)
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Full write support
    pub const fn all() -> Self {
        Self { bits: 0b111 }
    }

    /// Builder-style addition of one capability
    pub const fn with(self, capability: Capability) -> Self {
        Self {
            bits: self.bits | capability.bit(),
        }
    }

    /// Whether `capability` is in the set
    pub const fn supports(&self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }

    /// Set union
    pub const fn union(self, other: Capabilities) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Whether the set is empty
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Canonical operation set for one commerce domain
///
/// Implemented by per-platform adapters and by
/// [`CompositeService`](crate::CompositeService); application code should
/// depend on this trait and stay indifferent to how many backends sit behind
/// it. `get_by_id` misses are `Ok(None)`, never an error. The default
/// `create`/`update`/`delete` bodies reject with
/// [`ComposeError::UnsupportedOperation`]; implementations that override one
/// must advertise the matching [`Capability`].
#[async_trait]
pub trait DomainService<T: DomainRecord>: Send + Sync {
    /// Write operations this service supports
    fn capabilities(&self) -> Capabilities {
        Capabilities::none()
    }

    /// Whether at least one usable backend is ready to serve calls
    fn is_initialized(&self) -> bool;

    /// List records matching `query`
    async fn list(&self, query: &ListQuery) -> ComposeResult<RecordPage<T>>;

    /// Fetch one record by id; a miss is `Ok(None)`
    async fn get_by_id(&self, id: &str) -> ComposeResult<Option<T>>;

    /// Create a record
    async fn create(&self, _record: T) -> ComposeResult<T> {
        Err(ComposeError::unsupported("create", None))
    }

    /// Update the record identified by `id` with the fields of `patch`
    async fn update(&self, _id: &str, _patch: T) -> ComposeResult<T> {
        Err(ComposeError::unsupported("update", None))
    }

    /// Delete the record identified by `id`; `Ok(false)` when it did not exist
    async fn delete(&self, _id: &str) -> ComposeResult<bool> {
        Err(ComposeError::unsupported("delete", None))
    }
}

/// A per-platform backend implementation of one domain
///
/// Adapters translate a concrete platform API into the canonical record
/// shape. Construction must be cheap and infallible; all I/O belongs in
/// `initialize` and the operation methods. `initialize` validates its
/// configuration against [`PlatformAdapter::descriptor`] and reports failure
/// by returning `false` rather than erroring, so that resolution can always
/// hand back an adapter object and let callers decide how to react.
/// `initialize` must be idempotent: the composition layer may attempt it
/// more than once while a fire-and-forget initialization is in flight.
#[async_trait]
pub trait PlatformAdapter<T: DomainRecord>: DomainService<T> {
    /// The platform this adapter talks to and its configuration contract
    fn descriptor(&self) -> PlatformDescriptor;

    /// Validate `config` and prepare the adapter for use
    ///
    /// Returns `false` (never an error) when required configuration is
    /// missing or the backend rejects the credentials.
    async fn initialize(&self, config: &PlatformConfig) -> bool;
}

/// The designated no-op backend
///
/// Returned whenever resolution would otherwise produce nothing, so callers
/// always receive a working service object: every list is empty, every
/// lookup misses, and writes are unsupported.
#[derive(Debug)]
pub struct OfflineAdapter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> OfflineAdapter<T> {
    /// Create an offline adapter
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for OfflineAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: DomainRecord> DomainService<T> for OfflineAdapter<T> {
    fn is_initialized(&self) -> bool {
        true
    }

    async fn list(&self, query: &ListQuery) -> ComposeResult<RecordPage<T>> {
        Ok(RecordPage::empty(query))
    }

    async fn get_by_id(&self, _id: &str) -> ComposeResult<Option<T>> {
        Ok(None)
    }
}

#[async_trait]
impl<T: DomainRecord> PlatformAdapter<T> for OfflineAdapter<T> {
    fn descriptor(&self) -> PlatformDescriptor {
        PlatformDescriptor::offline()
    }

    async fn initialize(&self, _config: &PlatformConfig) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Category;

    #[test]
    fn capabilities_set_operations() {
        let caps = Capabilities::none().with(Capability::Create);
        assert!(caps.supports(Capability::Create));
        assert!(!caps.supports(Capability::Update));
        assert!(!caps.is_empty());

        let merged = caps.union(Capabilities::none().with(Capability::Delete));
        assert!(merged.supports(Capability::Create));
        assert!(merged.supports(Capability::Delete));
        assert!(!merged.supports(Capability::Update));

        assert!(Capabilities::all().supports(Capability::Update));
        assert!(Capabilities::none().is_empty());
    }

    #[test]
    fn offline_adapter_is_inert() {
        let adapter: OfflineAdapter<Category> = OfflineAdapter::new();
        assert!(adapter.is_initialized());
        assert!(adapter.capabilities().is_empty());
        assert_eq!(
            adapter.descriptor().platform,
            crate::platform::Platform::Offline
        );

        tokio_test::block_on(async {
            assert!(adapter.initialize(&PlatformConfig::new()).await);

            let page = adapter.list(&ListQuery::default()).await.unwrap();
            assert!(page.items.is_empty());

            assert!(adapter.get_by_id("42").await.unwrap().is_none());

            let err = adapter.create(Category::new("1", "x")).await.unwrap_err();
            assert!(err.is_unsupported());
        });
    }
}
