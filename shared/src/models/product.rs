//! Product catalog and per-stop product lines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry (e.g. "Black Mulch"); carries no quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product request attached to a stop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductLine {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub product_id: Uuid,
    /// Requested quantity, always positive
    pub quantity: i32,
    /// Delivered so far, within `0..=quantity`
    pub delivered_quantity: i32,
    pub spread_requested: bool,
    /// Only meaningful when `spread_requested` is set
    pub is_spread: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AsRef<ProductLine> for ProductLine {
    fn as_ref(&self) -> &ProductLine {
        self
    }
}

/// Product line joined with its catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductLineDetail {
    #[serde(flatten)]
    pub line: ProductLine,
    pub product: Option<Product>,
}

impl ProductLineDetail {
    /// Display name used for per-product breakdowns
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown")
    }
}

impl AsRef<ProductLine> for ProductLineDetail {
    fn as_ref(&self) -> &ProductLine {
        &self.line
    }
}
