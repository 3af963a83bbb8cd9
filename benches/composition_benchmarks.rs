use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use commerce_compose::records::Category;
use commerce_compose::testing::ScriptedAdapter;
use commerce_compose::{
    CompositeId, CompositeService, DomainService, ListQuery, Platform, PlatformAdapter,
};

fn setup_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn composite_with(adapters: usize, records_each: usize) -> CompositeService<Category> {
    let platforms = [
        Platform::Shopify,
        Platform::WooCommerce,
        Platform::Magento,
        Platform::Sylius,
        Platform::Wix,
        Platform::PrestaShop,
    ];
    let adapters: Vec<Arc<dyn PlatformAdapter<Category>>> = (0..adapters)
        .map(|i| {
            let records = (0..records_each)
                .map(|n| Category::new(format!("{n}"), format!("Category {n}")))
                .collect();
            Arc::new(
                ScriptedAdapter::new(platforms[i % platforms.len()])
                    .with_records(records)
                    .initialized(),
            ) as Arc<dyn PlatformAdapter<Category>>
        })
        .collect();
    CompositeService::new("category", adapters)
}

fn benchmark_composite_id_codec(c: &mut Criterion) {
    c.bench_function("composite_id_encode", |b| {
        b.iter(|| CompositeId::encode(black_box(3), black_box("order_2024_0001")))
    });

    c.bench_function("composite_id_parse", |b| {
        b.iter(|| CompositeId::parse(black_box("p3_order_2024_0001")))
    });

    c.bench_function("composite_id_parse_bare", |b| {
        b.iter(|| CompositeId::parse(black_box("order_2024_0001")))
    });
}

fn benchmark_composite_list(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("composite_list");

    for adapters in [1usize, 2, 4] {
        let composite = composite_with(adapters, 50);
        let query = ListQuery::page(1, 50);
        group.bench_with_input(
            BenchmarkId::from_parameter(adapters),
            &composite,
            |b, composite| {
                b.iter(|| {
                    rt.block_on(async { composite.list(black_box(&query)).await.unwrap() })
                })
            },
        );
    }
    group.finish();
}

fn benchmark_get_by_id_routing(c: &mut Criterion) {
    let rt = setup_runtime();
    let composite = composite_with(4, 50);

    c.bench_function("get_by_id_composite_id", |b| {
        b.iter(|| rt.block_on(async { composite.get_by_id(black_box("p3_25")).await.unwrap() }))
    });

    c.bench_function("get_by_id_bare_probe", |b| {
        b.iter(|| rt.block_on(async { composite.get_by_id(black_box("25")).await.unwrap() }))
    });
}

criterion_group!(
    benches,
    benchmark_composite_id_codec,
    benchmark_composite_list,
    benchmark_get_by_id_routing
);
criterion_main!(benches);
