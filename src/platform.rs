// Copyright 2025 Cowboy AI, LLC.

//! Platform identifiers and per-platform configuration
//!
//! Platforms form a closed enum so that adapter caches can be keyed by a
//! real map key instead of free-form strings. Each platform declares which
//! configuration fields it needs through a [`PlatformDescriptor`]; a
//! [`PlatformConfig`] is validated against that descriptor before an
//! adapter's `initialize` is attempted.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ComposeError;

/// Identifier of a commerce backend platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Shopify
    Shopify,
    /// WooCommerce
    WooCommerce,
    /// Magento / Adobe Commerce
    Magento,
    /// Sylius
    Sylius,
    /// Wix Stores
    Wix,
    /// PrestaShop
    PrestaShop,
    /// Squarespace Commerce
    Squarespace,
    /// The designated no-op backend used when nothing else resolves
    Offline,
}

impl Platform {
    /// All known platforms, in declaration order
    pub const ALL: [Platform; 8] = [
        Platform::Shopify,
        Platform::WooCommerce,
        Platform::Magento,
        Platform::Sylius,
        Platform::Wix,
        Platform::PrestaShop,
        Platform::Squarespace,
        Platform::Offline,
    ];

    /// Stable lowercase key for this platform
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Shopify => "shopify",
            Platform::WooCommerce => "woocommerce",
            Platform::Magento => "magento",
            Platform::Sylius => "sylius",
            Platform::Wix => "wix",
            Platform::PrestaShop => "prestashop",
            Platform::Squarespace => "squarespace",
            Platform::Offline => "offline",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Platform {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .find(|p| p.key() == s.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| ComposeError::UnknownPlatform {
                value: s.to_string(),
            })
    }
}

/// Configuration field names a platform adapter needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequirements {
    /// Fields that must be present and non-blank before initialization
    pub required: Vec<String>,
    /// Fields the adapter understands but can work without
    pub optional: Vec<String>,
}

impl ConfigRequirements {
    /// Requirements with no mandatory fields
    pub fn none() -> Self {
        Self::default()
    }

    /// Build requirements from field-name lists
    pub fn new(required: &[&str], optional: &[&str]) -> Self {
        Self {
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A platform key plus the configuration fields its adapter requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Which platform the adapter talks to
    pub platform: Platform,
    /// Configuration contract for that adapter
    pub requirements: ConfigRequirements,
}

impl PlatformDescriptor {
    /// Create a descriptor
    pub fn new(platform: Platform, requirements: ConfigRequirements) -> Self {
        Self {
            platform,
            requirements,
        }
    }

    /// Descriptor for the no-op backend (no configuration needed)
    pub fn offline() -> Self {
        Self::new(Platform::Offline, ConfigRequirements::none())
    }

    /// Names of required fields that are absent or blank in `config`
    pub fn missing_keys(&self, config: &PlatformConfig) -> Vec<String> {
        self.requirements
            .required
            .iter()
            .filter(|key| config.is_blank(key))
            .cloned()
            .collect()
    }
}

/// Key/value configuration handed to an adapter's `initialize`
///
/// Field order is preserved so that log lines and missing-key reports read
/// in the order the platform declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformConfig {
    values: IndexMap<String, Value>,
}

impl PlatformConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a value as a string slice, if it is one
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is absent, null, or an empty/whitespace-only string
    pub fn is_blank(&self, key: &str) -> bool {
        match self.values.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    /// Number of configured fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no fields are configured
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over configured fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}
