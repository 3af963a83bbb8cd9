// Copyright 2025 Cowboy AI, LLC.

//! Service registry: the composition root
//!
//! A [`ServiceRegistry`] owns one [`ServiceFactory`] per domain plus the
//! shared search and token services, and resolves them into cached
//! [`ServiceBundle`]s. Application code should depend on the registry (or a
//! bundle it hands out) and nothing below it.
//!
//! The registry is built once at process start through
//! [`ServiceRegistryBuilder`] and passed down explicitly. Bundle caching is
//! a second layer above the factories' adapter caches: reconfiguring a
//! backend must invalidate both, which [`ServiceRegistry::configure`] does
//! in one step.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::adapter::DomainService;
use crate::errors::ComposeResult;
use crate::factory::ServiceFactory;
use crate::platform::{Platform, PlatformConfig};
use crate::records::{Basket, Category, InventoryLevel, Order, Product, Refund};
use crate::shared::{InMemoryTokenService, OfflineSearchService, SearchService, TokenService};

/// Every domain's resolved service for one platform selection
///
/// Immutable once cached; invalidation replaces the bundle wholesale.
pub struct ServiceBundle {
    /// The platform selection this bundle was resolved for
    pub platforms: Vec<Platform>,
    /// Category service
    pub category: Arc<dyn DomainService<Category>>,
    /// Product service
    pub product: Arc<dyn DomainService<Product>>,
    /// Order service
    pub order: Arc<dyn DomainService<Order>>,
    /// Inventory service
    pub inventory: Arc<dyn DomainService<InventoryLevel>>,
    /// Basket service
    pub basket: Arc<dyn DomainService<Basket>>,
    /// Refund service
    pub refund: Arc<dyn DomainService<Refund>>,
    /// Shared search service
    pub search: Arc<dyn SearchService>,
    /// Shared token service
    pub token: Arc<dyn TokenService>,
}

impl ServiceBundle {
    /// The single platform this bundle serves, when it is not a composite
    pub fn platform(&self) -> Option<Platform> {
        match self.platforms.as_slice() {
            [platform] => Some(*platform),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ServiceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBundle")
            .field("platforms", &self.platforms)
            .finish()
    }
}

/// Builder for [`ServiceRegistry`]
///
/// Exposes each domain factory so platform adapters can be registered
/// before the registry is handed to application code:
///
/// ```rust
/// use std::sync::Arc;
/// use commerce_compose::testing::ScriptedAdapter;
/// use commerce_compose::{
///     Platform, PlatformAdapter, PlatformConfig, ServiceRegistryBuilder,
/// };
/// use commerce_compose::records::Category;
///
/// let builder = ServiceRegistryBuilder::new();
/// builder.category_factory().register(
///     Platform::Shopify,
///     Arc::new(|_config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Category>> {
///         Arc::new(ScriptedAdapter::new(Platform::Shopify))
///     }),
///     PlatformConfig::new(),
/// );
/// let registry = builder.build();
/// ```
pub struct ServiceRegistryBuilder {
    category: Arc<ServiceFactory<Category>>,
    product: Arc<ServiceFactory<Product>>,
    order: Arc<ServiceFactory<Order>>,
    inventory: Arc<ServiceFactory<InventoryLevel>>,
    basket: Arc<ServiceFactory<Basket>>,
    refund: Arc<ServiceFactory<Refund>>,
    search: Arc<dyn SearchService>,
    token: Arc<dyn TokenService>,
}

impl Default for ServiceRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistryBuilder {
    /// Start a registry with empty factories and the default shared services
    pub fn new() -> Self {
        Self {
            category: Arc::new(ServiceFactory::new("category")),
            product: Arc::new(ServiceFactory::new("product")),
            order: Arc::new(ServiceFactory::new("order")),
            inventory: Arc::new(ServiceFactory::new("inventory")),
            basket: Arc::new(ServiceFactory::new("basket")),
            refund: Arc::new(ServiceFactory::new("refund")),
            search: Arc::new(OfflineSearchService),
            token: Arc::new(InMemoryTokenService::new()),
        }
    }

    /// Use this search service instead of the offline default
    pub fn with_search(mut self, search: Arc<dyn SearchService>) -> Self {
        self.search = search;
        self
    }

    /// Use this token service instead of the in-memory default
    pub fn with_token(mut self, token: Arc<dyn TokenService>) -> Self {
        self.token = token;
        self
    }

    /// Category factory, for adapter registration
    pub fn category_factory(&self) -> &ServiceFactory<Category> {
        &self.category
    }

    /// Product factory, for adapter registration
    pub fn product_factory(&self) -> &ServiceFactory<Product> {
        &self.product
    }

    /// Order factory, for adapter registration
    pub fn order_factory(&self) -> &ServiceFactory<Order> {
        &self.order
    }

    /// Inventory factory, for adapter registration
    pub fn inventory_factory(&self) -> &ServiceFactory<InventoryLevel> {
        &self.inventory
    }

    /// Basket factory, for adapter registration
    pub fn basket_factory(&self) -> &ServiceFactory<Basket> {
        &self.basket
    }

    /// Refund factory, for adapter registration
    pub fn refund_factory(&self) -> &ServiceFactory<Refund> {
        &self.refund
    }

    /// Finish the registry
    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            category: self.category,
            product: self.product,
            order: self.order,
            inventory: self.inventory,
            basket: self.basket,
            refund: self.refund,
            search: self.search,
            token: self.token,
            bundles: RwLock::new(HashMap::new()),
            composite_bundles: RwLock::new(HashMap::new()),
        }
    }
}

/// Composition root resolving and caching per-platform service bundles
pub struct ServiceRegistry {
    category: Arc<ServiceFactory<Category>>,
    product: Arc<ServiceFactory<Product>>,
    order: Arc<ServiceFactory<Order>>,
    inventory: Arc<ServiceFactory<InventoryLevel>>,
    basket: Arc<ServiceFactory<Basket>>,
    refund: Arc<ServiceFactory<Refund>>,
    search: Arc<dyn SearchService>,
    token: Arc<dyn TokenService>,
    bundles: RwLock<HashMap<Platform, Arc<ServiceBundle>>>,
    composite_bundles: RwLock<HashMap<Vec<Platform>, Arc<ServiceBundle>>>,
}

impl ServiceRegistry {
    /// Builder with empty factories and default shared services
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    /// Resolve (or return the cached) bundle for one platform
    pub fn services(&self, platform: Platform) -> Arc<ServiceBundle> {
        if let Some(bundle) = self.bundles.read().unwrap().get(&platform) {
            return bundle.clone();
        }

        let bundle = Arc::new(self.assemble(platform));
        self.bundles
            .write()
            .unwrap()
            .entry(platform)
            .or_insert(bundle)
            .clone()
    }

    /// Resolve (or return the cached) composite bundle over `platforms`
    ///
    /// Every per-platform domain in the bundle is a
    /// [`CompositeService`](crate::CompositeService) in the given platform
    /// order.
    pub fn composite_services(&self, platforms: &[Platform]) -> Arc<ServiceBundle> {
        let key: Vec<Platform> = platforms.to_vec();
        if let Some(bundle) = self.composite_bundles.read().unwrap().get(&key) {
            return bundle.clone();
        }

        let bundle = Arc::new(self.assemble_composite(platforms));
        self.composite_bundles
            .write()
            .unwrap()
            .entry(key)
            .or_insert(bundle)
            .clone()
    }

    /// Drop the cached bundle(s) involving `platform`
    ///
    /// Factory-level adapter caches are a separate layer and are left
    /// untouched; use [`ServiceRegistry::configure`] when the backend's
    /// configuration changed.
    pub fn invalidate(&self, platform: Platform) {
        self.bundles.write().unwrap().remove(&platform);
        self.composite_bundles
            .write()
            .unwrap()
            .retain(|platforms, _| !platforms.contains(&platform));
        info!(%platform, "invalidated cached service bundles");
    }

    /// Drop every cached bundle
    pub fn invalidate_all(&self) {
        self.bundles.write().unwrap().clear();
        self.composite_bundles.write().unwrap().clear();
        info!("invalidated all cached service bundles");
    }

    /// Reconfigure `platform` across every domain registered for it, then
    /// invalidate the bundle layer
    ///
    /// Returns how many domain factories were reconfigured; domains with no
    /// registration for `platform` are skipped.
    pub fn configure(&self, platform: Platform, config: &PlatformConfig) -> usize {
        let mut reconfigured = 0;
        reconfigured += ok_count(self.category.configure(platform, config.clone()));
        reconfigured += ok_count(self.product.configure(platform, config.clone()));
        reconfigured += ok_count(self.order.configure(platform, config.clone()));
        reconfigured += ok_count(self.inventory.configure(platform, config.clone()));
        reconfigured += ok_count(self.basket.configure(platform, config.clone()));
        reconfigured += ok_count(self.refund.configure(platform, config.clone()));

        if reconfigured == 0 {
            warn!(%platform, "configure matched no registered domain");
        }
        self.invalidate(platform);
        reconfigured
    }

    /// Category service for `platform` (delegates to the cached bundle)
    pub fn category_service(&self, platform: Platform) -> Arc<dyn DomainService<Category>> {
        self.services(platform).category.clone()
    }

    /// Product service for `platform`
    pub fn product_service(&self, platform: Platform) -> Arc<dyn DomainService<Product>> {
        self.services(platform).product.clone()
    }

    /// Order service for `platform`
    pub fn order_service(&self, platform: Platform) -> Arc<dyn DomainService<Order>> {
        self.services(platform).order.clone()
    }

    /// Inventory service for `platform`
    pub fn inventory_service(&self, platform: Platform) -> Arc<dyn DomainService<InventoryLevel>> {
        self.services(platform).inventory.clone()
    }

    /// Basket service for `platform`
    pub fn basket_service(&self, platform: Platform) -> Arc<dyn DomainService<Basket>> {
        self.services(platform).basket.clone()
    }

    /// Refund service for `platform`
    pub fn refund_service(&self, platform: Platform) -> Arc<dyn DomainService<Refund>> {
        self.services(platform).refund.clone()
    }

    /// The shared search service
    pub fn search_service(&self) -> Arc<dyn SearchService> {
        self.search.clone()
    }

    /// The shared token service
    pub fn token_service(&self) -> Arc<dyn TokenService> {
        self.token.clone()
    }

    /// Category factory (adapter-cache layer)
    pub fn category_factory(&self) -> &ServiceFactory<Category> {
        &self.category
    }

    /// Product factory (adapter-cache layer)
    pub fn product_factory(&self) -> &ServiceFactory<Product> {
        &self.product
    }

    /// Order factory (adapter-cache layer)
    pub fn order_factory(&self) -> &ServiceFactory<Order> {
        &self.order
    }

    /// Inventory factory (adapter-cache layer)
    pub fn inventory_factory(&self) -> &ServiceFactory<InventoryLevel> {
        &self.inventory
    }

    /// Basket factory (adapter-cache layer)
    pub fn basket_factory(&self) -> &ServiceFactory<Basket> {
        &self.basket
    }

    /// Refund factory (adapter-cache layer)
    pub fn refund_factory(&self) -> &ServiceFactory<Refund> {
        &self.refund
    }

    fn assemble(&self, platform: Platform) -> ServiceBundle {
        ServiceBundle {
            platforms: vec![platform],
            category: self.category.service(platform),
            product: self.product.service(platform),
            order: self.order.service(platform),
            inventory: self.inventory.service(platform),
            basket: self.basket.service(platform),
            refund: self.refund.service(platform),
            search: self.search.clone(),
            token: self.token.clone(),
        }
    }

    fn assemble_composite(&self, platforms: &[Platform]) -> ServiceBundle {
        ServiceBundle {
            platforms: platforms.to_vec(),
            category: self.category.composite(platforms),
            product: self.product.composite(platforms),
            order: self.order.composite(platforms),
            inventory: self.inventory.composite(platforms),
            basket: self.basket.composite(platforms),
            refund: self.refund.composite(platforms),
            search: self.search.clone(),
            token: self.token.clone(),
        }
    }
}

fn ok_count<T>(result: ComposeResult<T>) -> usize {
    result.is_ok() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unregistered_platform_resolves_to_a_working_bundle() {
        let registry = ServiceRegistry::builder().build();
        let bundle = registry.services(Platform::Squarespace);

        assert_eq!(bundle.platform(), Some(Platform::Squarespace));
        assert!(bundle.category.capabilities().is_empty());

        let page = bundle
            .category
            .list(&crate::entity::ListQuery::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn composite_bundle_reports_its_selection() {
        let registry = ServiceRegistry::builder().build();
        let bundle =
            registry.composite_services(&[Platform::Shopify, Platform::WooCommerce]);
        assert_eq!(
            bundle.platforms,
            vec![Platform::Shopify, Platform::WooCommerce]
        );
        assert_eq!(bundle.platform(), None);
    }
}
