// Copyright 2025 Cowboy AI, LLC.

//! Factory and registry resolution: singleton identity, offline fallback,
//! reconfiguration invalidation, and the two cache layers.

use std::sync::Arc;

use commerce_compose::records::Category;
use commerce_compose::testing::ScriptedAdapter;
use commerce_compose::{
    AdapterBuilder, DomainService, ListQuery, Platform, PlatformAdapter, PlatformConfig,
    ServiceFactory, ServiceRegistry,
};

/// Builder whose adapters serve one category named after the config's
/// `tag` field, so tests can observe which configuration built an adapter.
fn tagged_builder(platform: Platform) -> Arc<dyn AdapterBuilder<Category>> {
    Arc::new(move |config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Category>> {
        let tag = config.get_str("tag").unwrap_or("untagged").to_string();
        Arc::new(
            ScriptedAdapter::new(platform)
                .with_records(vec![Category::new("1", tag)])
                .initialized(),
        )
    })
}

fn config_with_tag(tag: &str) -> PlatformConfig {
    PlatformConfig::new().with("tag", tag)
}

#[tokio::test]
async fn resolving_the_same_platform_twice_returns_the_same_adapter() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");
    factory.register(
        Platform::Shopify,
        tagged_builder(Platform::Shopify),
        config_with_tag("v1"),
    );

    let first = factory.service(Platform::Shopify);
    let second = factory.service(Platform::Shopify);
    assert!(Arc::ptr_eq(&first, &second));

    let handle_a = factory.handle(Platform::Shopify).unwrap();
    let handle_b = factory.handle(Platform::Shopify).unwrap();
    assert_eq!(handle_a.id(), handle_b.id());
}

#[tokio::test]
async fn unregistered_platforms_resolve_to_the_offline_adapter() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");

    let service = factory.service(Platform::Magento);
    assert!(service.is_initialized());
    assert!(service.capabilities().is_empty());

    let page = service.list(&ListQuery::default()).await.unwrap();
    assert!(page.items.is_empty());
    assert!(factory.handle(Platform::Magento).is_none());
}

#[tokio::test]
async fn reconfiguration_replaces_the_handle_and_flows_the_new_config() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");
    factory.register(
        Platform::Shopify,
        tagged_builder(Platform::Shopify),
        config_with_tag("v1"),
    );

    let before = factory.service(Platform::Shopify);
    let before_handle = factory.handle(Platform::Shopify).unwrap();
    let page = before.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v1");

    let new_handle = factory
        .configure(Platform::Shopify, config_with_tag("v2"))
        .unwrap();
    assert_ne!(before_handle.id(), new_handle.id());

    let after = factory.service(Platform::Shopify);
    assert!(!Arc::ptr_eq(&before, &after));

    let page = after.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v2");

    // The discarded handle still serves in-flight callers independently.
    let page = before.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v1");
}

#[tokio::test]
async fn reconfiguration_rebuilds_cached_composites() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");
    factory.register(
        Platform::Shopify,
        tagged_builder(Platform::Shopify),
        config_with_tag("shopify-v1"),
    );
    factory.register(
        Platform::WooCommerce,
        tagged_builder(Platform::WooCommerce),
        config_with_tag("woo-v1"),
    );

    let selection = [Platform::Shopify, Platform::WooCommerce];
    let before = factory.composite(&selection);
    assert!(Arc::ptr_eq(&before, &factory.composite(&selection)));

    let page = before.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[1].name, "woo-v1");

    factory
        .configure(Platform::WooCommerce, config_with_tag("woo-v2"))
        .unwrap();

    let after = factory.composite(&selection);
    assert!(!Arc::ptr_eq(&before, &after));

    let page = after.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "shopify-v1");
    assert_eq!(page.items[1].name, "woo-v2");
}

#[tokio::test]
async fn composite_order_follows_the_selection_order() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");
    factory.register(
        Platform::Shopify,
        tagged_builder(Platform::Shopify),
        config_with_tag("shopify"),
    );
    factory.register(
        Platform::WooCommerce,
        tagged_builder(Platform::WooCommerce),
        config_with_tag("woo"),
    );

    let reversed = factory.composite(&[Platform::WooCommerce, Platform::Shopify]);
    let page = reversed.list(&ListQuery::default()).await.unwrap();

    assert_eq!(page.items[0].name, "woo");
    assert_eq!(page.items[0].id, "p0_1");
    assert_eq!(page.items[1].name, "shopify");
    assert_eq!(page.items[1].id, "p1_1");
}

#[tokio::test]
async fn empty_or_unresolvable_selections_fall_back_to_offline() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");

    let empty = factory.composite(&[]);
    assert_eq!(empty.adapter_count(), 1);
    assert!(empty.list(&ListQuery::default()).await.unwrap().items.is_empty());

    let unresolvable = factory.composite(&[Platform::Magento, Platform::Sylius]);
    assert_eq!(unresolvable.adapter_count(), 1);
    assert!(unresolvable
        .list(&ListQuery::default())
        .await
        .unwrap()
        .items
        .is_empty());
}

#[tokio::test]
async fn initialization_failure_is_permanent_but_not_fatal() {
    let factory: ServiceFactory<Category> = ServiceFactory::new("category");
    factory.register(
        Platform::PrestaShop,
        Arc::new(
            move |_config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Category>> {
                Arc::new(
                    ScriptedAdapter::new(Platform::PrestaShop)
                        .with_required_keys(&["api_key"]),
                )
            },
        ),
        PlatformConfig::new(), // api_key missing
    );

    let handle = factory.handle(Platform::PrestaShop).unwrap();
    assert!(!handle.wait_ready().await);

    let service = factory.service(Platform::PrestaShop);
    assert!(!service.is_initialized());
}

#[tokio::test]
async fn registry_caches_bundles_per_platform() {
    let registry = registry_with_shopify("v1");

    let first = registry.services(Platform::Shopify);
    let second = registry.services(Platform::Shopify);
    assert!(Arc::ptr_eq(&first, &second));

    let other = registry.services(Platform::WooCommerce);
    assert!(!Arc::ptr_eq(&first, &other));
}

#[tokio::test]
async fn registry_invalidation_drops_only_the_bundle_layer() {
    let registry = registry_with_shopify("v1");

    let before = registry.services(Platform::Shopify);
    registry.invalidate(Platform::Shopify);
    let after = registry.services(Platform::Shopify);

    // New bundle object, same underlying adapter: the factory cache is a
    // separate layer and was not touched.
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(Arc::ptr_eq(&before.category, &after.category));
}

#[tokio::test]
async fn registry_configure_invalidates_both_layers() {
    let registry = registry_with_shopify("v1");

    let before = registry.services(Platform::Shopify);
    let page = before.category.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v1");

    let reconfigured = registry.configure(Platform::Shopify, &config_with_tag("v2"));
    assert_eq!(reconfigured, 1); // only the category domain is registered

    let after = registry.services(Platform::Shopify);
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!Arc::ptr_eq(&before.category, &after.category));

    let page = after.category.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v2");
}

#[tokio::test]
async fn registry_composite_bundles_are_cached_and_invalidated() {
    let registry = registry_with_shopify("v1");
    let selection = [Platform::Shopify, Platform::WooCommerce];

    let first = registry.composite_services(&selection);
    assert!(Arc::ptr_eq(&first, &registry.composite_services(&selection)));

    registry.invalidate(Platform::WooCommerce);
    let second = registry.composite_services(&selection);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn registry_accessors_delegate_to_the_bundle() {
    let registry = registry_with_shopify("v1");

    let via_accessor = registry.category_service(Platform::Shopify);
    let via_bundle = registry.services(Platform::Shopify).category.clone();
    assert!(Arc::ptr_eq(&via_accessor, &via_bundle));

    let page = via_accessor.list(&ListQuery::default()).await.unwrap();
    assert_eq!(page.items[0].name, "v1");
}

fn registry_with_shopify(tag: &str) -> ServiceRegistry {
    let builder = ServiceRegistry::builder();
    builder.category_factory().register(
        Platform::Shopify,
        tagged_builder(Platform::Shopify),
        config_with_tag(tag),
    );
    builder.build()
}
