// Copyright 2025 Cowboy AI, LLC.

//! Per-domain service factories
//!
//! A [`ServiceFactory`] is the single authoritative source of adapter
//! instances for one domain, keyed by [`Platform`]. It lazily constructs
//! and caches one [`AdapterHandle`] per platform, starts initialization
//! fire-and-forget, and builds cached [`CompositeService`]s over
//! multi-platform selections. Factories are explicit, injected objects
//! owned by the [`ServiceRegistry`](crate::ServiceRegistry); there is no
//! module-global instance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::adapter::{OfflineAdapter, PlatformAdapter};
use crate::composite::CompositeService;
use crate::entity::DomainRecord;
use crate::errors::{ComposeError, ComposeResult};
use crate::handle::AdapterHandle;
use crate::platform::{Platform, PlatformConfig};

/// Constructs one adapter instance from a platform configuration
///
/// Construction must be synchronous and infallible; I/O and validation
/// belong in the adapter's `initialize`. Any
/// `Fn(&PlatformConfig) -> Arc<dyn PlatformAdapter<T>>` qualifies.
pub trait AdapterBuilder<T: DomainRecord>: Send + Sync {
    /// Build a fresh adapter for `config`
    fn build(&self, config: &PlatformConfig) -> Arc<dyn PlatformAdapter<T>>;
}

impl<T, F> AdapterBuilder<T> for F
where
    T: DomainRecord,
    F: Fn(&PlatformConfig) -> Arc<dyn PlatformAdapter<T>> + Send + Sync,
{
    fn build(&self, config: &PlatformConfig) -> Arc<dyn PlatformAdapter<T>> {
        self(config)
    }
}

struct Registration<T: DomainRecord> {
    builder: Arc<dyn AdapterBuilder<T>>,
    config: PlatformConfig,
}

impl<T: DomainRecord> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            config: self.config.clone(),
        }
    }
}

/// Single authoritative source of adapter instances for one domain
pub struct ServiceFactory<T: DomainRecord> {
    domain: String,
    registrations: RwLock<HashMap<Platform, Registration<T>>>,
    handles: RwLock<HashMap<Platform, AdapterHandle<T>>>,
    composites: RwLock<HashMap<Vec<Platform>, Arc<CompositeService<T>>>>,
    offline: Arc<OfflineAdapter<T>>,
}

impl<T: DomainRecord> ServiceFactory<T> {
    /// Create a factory for the named domain ("category", "product", ...)
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            registrations: RwLock::new(HashMap::new()),
            handles: RwLock::new(HashMap::new()),
            composites: RwLock::new(HashMap::new()),
            offline: Arc::new(OfflineAdapter::new()),
        }
    }

    /// Domain this factory serves
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Register how to build this domain's adapter for `platform`
    ///
    /// Re-registering a platform discards any cached handle and composite
    /// for it, exactly like [`ServiceFactory::configure`].
    pub fn register(
        &self,
        platform: Platform,
        builder: Arc<dyn AdapterBuilder<T>>,
        config: PlatformConfig,
    ) {
        self.registrations
            .write()
            .unwrap()
            .insert(platform, Registration { builder, config });
        let stale = self.handles.write().unwrap().remove(&platform);
        if stale.is_some() {
            self.composites.write().unwrap().clear();
        }
    }

    /// The designated no-op service for this domain
    pub fn offline(&self) -> Arc<dyn PlatformAdapter<T>> {
        self.offline.clone()
    }

    /// Resolve the adapter for one platform
    ///
    /// A cached handle is returned regardless of its initialization state;
    /// callers must tolerate not-yet-initialized failures or await
    /// [`AdapterHandle::wait_ready`] through [`ServiceFactory::handle`].
    /// Unregistered platforms resolve to the offline adapter, so the result
    /// is always a working object.
    pub fn service(&self, platform: Platform) -> Arc<dyn PlatformAdapter<T>> {
        match self.resolve_handle(platform) {
            Some(handle) => handle.adapter(),
            None => {
                debug!(
                    domain = %self.domain,
                    %platform,
                    "no adapter registered; resolving to offline"
                );
                self.offline()
            }
        }
    }

    /// The cached handle for `platform`, if one exists or can be built
    pub fn handle(&self, platform: Platform) -> Option<AdapterHandle<T>> {
        self.resolve_handle(platform)
    }

    /// Resolve a composite service over `platforms`, in the given order
    ///
    /// Platforms with no registration are skipped (logged); an empty
    /// selection, or one where nothing resolves, falls back to a composite
    /// over the offline adapter alone. Composites are cached per selection
    /// and invalidated by any reconfiguration.
    pub fn composite(&self, platforms: &[Platform]) -> Arc<CompositeService<T>> {
        let key: Vec<Platform> = platforms.to_vec();
        if let Some(existing) = self.composites.read().unwrap().get(&key) {
            return existing.clone();
        }

        let mut slots = Vec::with_capacity(platforms.len());
        for &platform in platforms {
            match self.resolve_handle(platform) {
                Some(handle) => {
                    let config = self.config_for(platform);
                    slots.push((handle, config));
                }
                None => warn!(
                    domain = %self.domain,
                    %platform,
                    "platform not registered; omitting from composite"
                ),
            }
        }

        let composite = if slots.is_empty() {
            let offline = AdapterHandle::new(Platform::Offline, self.offline());
            Arc::new(CompositeService::from_slots(
                self.domain.clone(),
                vec![(offline, PlatformConfig::new())],
            ))
        } else {
            Arc::new(CompositeService::from_slots(self.domain.clone(), slots))
        };

        self.composites
            .write()
            .unwrap()
            .entry(key)
            .or_insert(composite)
            .clone()
    }

    /// Replace the adapter for `platform` with one built from `config`
    ///
    /// The previous handle is discarded, never mutated; operations already
    /// in flight on it complete against the old adapter. Every cached
    /// composite is dropped because it captured the stale adapter.
    pub fn configure(
        &self,
        platform: Platform,
        config: PlatformConfig,
    ) -> ComposeResult<AdapterHandle<T>> {
        let builder = {
            let mut registrations = self.registrations.write().unwrap();
            let registration =
                registrations
                    .get_mut(&platform)
                    .ok_or_else(|| ComposeError::NotRegistered {
                        domain: self.domain.clone(),
                        platform,
                    })?;
            registration.config = config.clone();
            registration.builder.clone()
        };

        let handle = AdapterHandle::new(platform, builder.build(&config));
        let replaced = self
            .handles
            .write()
            .unwrap()
            .insert(platform, handle.clone());
        handle.start_initialize(config);
        self.composites.write().unwrap().clear();

        info!(
            domain = %self.domain,
            %platform,
            replaced = replaced.is_some(),
            "reconfigured platform adapter"
        );
        Ok(handle)
    }

    /// Drop every cached handle and composite
    ///
    /// The next resolution rebuilds from the current registrations.
    pub fn reset(&self) {
        self.handles.write().unwrap().clear();
        self.composites.write().unwrap().clear();
    }

    fn config_for(&self, platform: Platform) -> PlatformConfig {
        self.registrations
            .read()
            .unwrap()
            .get(&platform)
            .map(|registration| registration.config.clone())
            .unwrap_or_default()
    }

    fn resolve_handle(&self, platform: Platform) -> Option<AdapterHandle<T>> {
        if let Some(handle) = self.handles.read().unwrap().get(&platform) {
            return Some(handle.clone());
        }

        let registration = self.registrations.read().unwrap().get(&platform).cloned()?;
        let handle = AdapterHandle::new(platform, registration.builder.build(&registration.config));

        let mut handles = self.handles.write().unwrap();
        if let Some(existing) = handles.get(&platform) {
            // Another caller built it first; keep theirs.
            return Some(existing.clone());
        }
        handle.start_initialize(registration.config);
        handles.insert(platform, handle.clone());
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Category;
    use crate::testing::ScriptedAdapter;

    fn scripted_builder(platform: Platform) -> Arc<dyn AdapterBuilder<Category>> {
        Arc::new(move |_config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Category>> {
            Arc::new(ScriptedAdapter::new(platform))
        })
    }

    #[tokio::test]
    async fn register_replaces_cached_handle() {
        let factory: ServiceFactory<Category> = ServiceFactory::new("category");
        factory.register(
            Platform::Shopify,
            scripted_builder(Platform::Shopify),
            PlatformConfig::new(),
        );

        let first = factory.handle(Platform::Shopify).unwrap();
        factory.register(
            Platform::Shopify,
            scripted_builder(Platform::Shopify),
            PlatformConfig::new(),
        );
        let second = factory.handle(Platform::Shopify).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn reset_forces_rebuild() {
        let factory: ServiceFactory<Category> = ServiceFactory::new("category");
        factory.register(
            Platform::Wix,
            scripted_builder(Platform::Wix),
            PlatformConfig::new(),
        );

        let before = factory.handle(Platform::Wix).unwrap();
        factory.reset();
        let after = factory.handle(Platform::Wix).unwrap();
        assert_ne!(before.id(), after.id());
    }

    #[tokio::test]
    async fn configure_requires_a_registration() {
        let factory: ServiceFactory<Category> = ServiceFactory::new("category");
        let err = factory
            .configure(Platform::Magento, PlatformConfig::new())
            .unwrap_err();
        assert!(matches!(err, ComposeError::NotRegistered { .. }));
    }
}
