// Copyright 2025 Cowboy AI, LLC.

//! # Commerce Compose
//!
//! Multi-backend service composition for commerce domains: one canonical
//! interface per domain (categories, products, orders, inventory, baskets,
//! refunds) resolved, cached, and aggregated across any number of
//! independent platform backends.
//!
//! The building blocks, leaf first:
//! - **[`PlatformAdapter`]**: a per-platform backend implementation of one
//!   domain's operation set, with explicit [`Capabilities`] for the writes
//!   it supports
//! - **[`ServiceFactory`]**: per-domain source of adapter instances, one
//!   cached [`AdapterHandle`] per platform, fire-and-forget initialization
//! - **[`CompositeService`]**: N adapters behind one domain interface,
//!   fanning reads out and routing writes via composite ids
//!   (`p<index>_<id>`)
//! - **[`ServiceRegistry`]**: the composition root, resolving every
//!   domain's service into a cached [`ServiceBundle`] per platform
//!   selection
//!
//! ## Design principles
//!
//! 1. **Always a working object**: resolution never returns null or errors;
//!    what cannot be resolved becomes the offline no-op adapter
//! 2. **Swap on write**: caches replace handles and bundles wholesale, so a
//!    reader sees the old object or the new one, never a half-built one
//! 3. **Reads isolate failure, writes surface it**: a failing backend
//!    contributes nothing to a fan-out read; a targeted write propagates
//!    its owner's failure
//! 4. **Deterministic order**: composite output follows adapter
//!    construction order, not completion order
//! 5. **Explicit state**: adapter initialization is an observable state
//!    machine, not a race against a background task

#![warn(missing_docs)]

mod adapter;
mod composite;
mod composite_id;
mod entity;
mod errors;
mod factory;
mod handle;
mod platform;
mod registry;
mod shared;

pub mod records;
pub mod testing;

pub use adapter::{Capabilities, Capability, DomainService, OfflineAdapter, PlatformAdapter};
pub use composite::CompositeService;
pub use composite_id::CompositeId;
pub use entity::{DomainRecord, ListQuery, Origin, PageInfo, RecordPage};
pub use errors::{ComposeError, ComposeResult};
pub use factory::{AdapterBuilder, ServiceFactory};
pub use handle::{AdapterHandle, InitState};
pub use platform::{ConfigRequirements, Platform, PlatformConfig, PlatformDescriptor};
pub use registry::{ServiceBundle, ServiceRegistry, ServiceRegistryBuilder};
pub use shared::{
    InMemoryTokenService, OfflineSearchService, SearchQuery, SearchService, TokenService,
};
