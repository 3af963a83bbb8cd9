// Copyright 2025 Cowboy AI, LLC.

//! Resolve a two-platform storefront and read through the composite:
//! `cargo run --example storefront_demo`

use std::sync::Arc;

use anyhow::Result;

use commerce_compose::records::Category;
use commerce_compose::testing::ScriptedAdapter;
use commerce_compose::{
    AdapterBuilder, DomainService, ListQuery, Platform, PlatformAdapter, PlatformConfig,
    ServiceRegistry,
};

fn demo_builder(platform: Platform, names: &[&str]) -> Arc<dyn AdapterBuilder<Category>> {
    let records: Vec<Category> = names
        .iter()
        .enumerate()
        .map(|(i, name)| Category::new(format!("{}", i + 1), *name))
        .collect();
    Arc::new(move |_config: &PlatformConfig| -> Arc<dyn PlatformAdapter<Category>> {
        Arc::new(
            ScriptedAdapter::new(platform)
                .with_records(records.clone())
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
    builder.category_factory().register(
        Platform::Shopify,
        demo_builder(Platform::Shopify, &["Apparel", "Footwear"]),
        PlatformConfig::new().with("shop_domain", "demo.myshopify.com"),
    );
    builder.category_factory().register(
        Platform::WooCommerce,
        demo_builder(Platform::WooCommerce, &["Homeware"]),
        PlatformConfig::new().with("base_url", "https://demo.example/wp-json"),
    );
    let registry = builder.build();

    // One platform: ids pass through untouched.
    let shopify = registry.services(Platform::Shopify);
    let page = shopify.category.list(&ListQuery::default()).await?;
    println!("shopify alone:");
    for category in &page.items {
        println!("  {} {}", category.id, category.name);
    }

    // Both platforms: one interface, namespaced ids.
    let storefront = registry.composite_services(&[Platform::Shopify, Platform::WooCommerce]);
    let page = storefront.category.list(&ListQuery::default()).await?;
    println!("composite storefront ({} categories):", page.page_info.total_items);
    for category in &page.items {
        println!(
            "  {} {} (from adapter {})",
            category.id,
            category.name,
            category.origin.as_ref().map(|o| o.platform_index).unwrap_or_default()
        );
    }

    // Composite ids route straight back to the owning platform.
    if let Some(first) = page.items.first() {
        let again = storefront.category.get_by_id(&first.id).await?;
        println!("round trip {} -> {:?}", first.id, again.map(|c| c.name));
    }

    Ok(())
}
