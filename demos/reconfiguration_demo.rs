// Copyright 2025 Cowboy AI, LLC.

//! Swap a backend's configuration at runtime and watch both cache layers
//! re-resolve: `cargo run --example reconfiguration_demo`

use std::sync::Arc;

use anyhow::Result;

use commerce_compose::records::Product;
use commerce_compose::testing::ScriptedAdapter;
use commerce_compose::{
    AdapterBuilder, DomainService, ListQuery, Platform, PlatformAdapter, PlatformConfig,
    ServiceRegistry,
};

/// Builds adapters whose catalog is named after the configured store, so
/// the effect of reconfiguration is visible in the output.
fn store_builder() -> Arc<dyn AdapterBuilder<Product>> {
    Arc::new(|config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Product>> {
        let store = config.get_str("store").unwrap_or("unconfigured").to_string();
        Arc::new(
            ScriptedAdapter::new(Platform::Magento)
                .with_records(vec![Product::new(
                    "sku-1",
                    format!("Widget ({store})"),
                    1999,
                    "EUR",
                )])
                .initialized(),
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let builder = ServiceRegistry::builder();
    builder.product_factory().register(
        Platform::Magento,
        store_builder(),
        PlatformConfig::new().with("store", "staging"),
    );
    let registry = builder.build();

    let products = registry.product_service(Platform::Magento);
    let page = products.list(&ListQuery::default()).await?;
    println!("before: {}", page.items[0].name);

    // Point the platform at a different store. The factory discards its
    // handle, the registry drops its bundle, and the next resolution sees
    // the new backend; the old adapter keeps serving in-flight callers.
    let reconfigured = registry.configure(
        Platform::Magento,
        &PlatformConfig::new().with("store", "production"),
    );
    println!("reconfigured {reconfigured} domain(s)");

    let products = registry.product_service(Platform::Magento);
    let page = products.list(&ListQuery::default()).await?;
    println!("after: {}", page.items[0].name);

    Ok(())
}
