// Copyright 2025 Cowboy AI, LLC.

//! Canonical commerce record types
//!
//! These are the entity shapes per-platform adapters translate their payloads
//! into. Every type keeps an `attributes` map for fields the canonical shape
//! does not model; monetary amounts are minor units (cents) plus an ISO 4217
//! currency code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::{DomainRecord, Origin};
use crate::platform::Platform;

/// A catalog category, possibly part of a tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier (composite-rewritten when returned from a composite)
    pub id: String,
    /// Display name
    pub name: String,
    /// URL slug, if the platform exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent category id within the same platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Sort position among siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Category {
    /// Create a category with just an id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style parent reference
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

impl DomainRecord for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// A purchasable product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Stock-keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price in minor units
    pub price_minor: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Ids of categories this product belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Create a product with an id, name, and price
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price_minor,
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl DomainRecord for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed but not yet paid
    #[default]
    Pending,
    /// Payment captured
    Paid,
    /// Shipped or otherwise fulfilled
    Fulfilled,
    /// Cancelled before fulfilment
    Cancelled,
    /// Fully refunded
    Refunded,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the line refers to
    pub product_id: String,
    /// Product name at purchase time
    pub name: String,
    /// Quantity ordered
    pub quantity: u32,
    /// Unit price in minor units at purchase time
    pub unit_price_minor: i64,
}

/// A customer order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier
    pub id: String,
    /// Human-facing order number, if distinct from the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Lifecycle state
    pub status: OrderStatus,
    /// Ordered lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    /// Order total in minor units
    pub total_minor: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// When the order was placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<DateTime<Utc>>,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Order {
    /// Create an order with an id and total
    pub fn new(id: impl Into<String>, total_minor: i64, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_minor,
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl DomainRecord for Order {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// Stock on hand for one SKU at one location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    /// Identifier
    pub id: String,
    /// Stock-keeping unit the level refers to
    pub sku: String,
    /// Units on hand (negative means oversold)
    pub quantity: i64,
    /// Warehouse or location identifier, if the platform tracks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl InventoryLevel {
    /// Create an inventory level
    pub fn new(id: impl Into<String>, sku: impl Into<String>, quantity: i64) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            quantity,
            ..Self::default()
        }
    }
}

impl DomainRecord for InventoryLevel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// One line of a basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketLine {
    /// Product the line refers to
    pub product_id: String,
    /// Quantity in the basket
    pub quantity: u32,
    /// Unit price in minor units
    pub unit_price_minor: i64,
}

/// An in-progress shopping basket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Identifier
    pub id: String,
    /// Customer the basket belongs to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Basket contents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<BasketLine>,
    /// ISO 4217 currency code
    pub currency: String,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Basket {
    /// Create an empty basket
    pub fn new(id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl DomainRecord for Basket {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// A refund against an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    /// Identifier
    pub id: String,
    /// Order being refunded (platform-native id)
    pub order_id: String,
    /// Amount refunded in minor units
    pub amount_minor: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Free-text reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Provenance stamp set by composite services
    #[serde(flatten)]
    pub origin: Option<Origin>,
    /// Fields outside the canonical shape
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Refund {
    /// Create a refund
    pub fn new(
        id: impl Into<String>,
        order_id: impl Into<String>,
        amount_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            amount_minor,
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl DomainRecord for Refund {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }
}

/// A single result from the shared search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identifier of the matched record
    pub id: String,
    /// Domain the record belongs to ("category", "product", ...)
    pub domain: String,
    /// Display title of the match
    pub title: String,
    /// Relevance score, higher is better
    pub score: f64,
    /// Platform the match came from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// API credentials held for a platform by the shared token service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToken {
    /// Bearer token presented to the platform API
    pub access_token: String,
    /// Refresh token, when the platform issues one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry instant, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// A token that never expires
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Whether the token's expiry instant has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn category_origin_flattens_into_stamp_fields() {
        let mut category = Category::new("1", "Root");
        category.set_origin(Some(Origin::new(0, "1")));
        category.set_id("p0_1".to_string());

        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["id"], "p0_1");
        assert_eq!(json["_platform"], 0);
        assert_eq!(json["_originalId"], "1");

        let back: Category = serde_json::from_value(json).unwrap();
        assert_eq!(back.origin, Some(Origin::new(0, "1")));
    }

    #[test]
    fn unstamped_category_omits_stamp_fields() {
        let category = Category::new("1", "Root");
        let json = serde_json::to_value(&category).unwrap();
        assert!(json.get("_platform").is_none());
        assert!(json.get("_originalId").is_none());
    }

    #[test]
    fn order_serde_round_trip() {
        let mut order = Order::new("o-1", 12_50, "EUR");
        order.status = OrderStatus::Paid;
        order.line_items.push(LineItem {
            product_id: "prod-1".to_string(),
            name: "Widget".to_string(),
            quantity: 2,
            unit_price_minor: 6_25,
        });

        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn token_expiry() {
        assert!(!ApiToken::bearer("t").is_expired());

        let expired = ApiToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        };
        assert!(expired.is_expired());
    }
}
