//! Cart API seam.
//!
//! The controller talks to the storefront only through [`CartApi`]. The HTTP
//! implementation lives in `lattice-cart-client`; tests use [`MockCartApi`].

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::ids::{ItemId, VariantId};

/// A failure reported by the server, either as a non-2xx status or as
/// `success: false` in a 2xx payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    /// HTTP status, when the failure was HTTP-level.
    pub status: Option<u16>,

    /// Server-supplied message (`error` or `message` field), shown verbatim.
    pub message: Option<String>,

    /// Last known-good quantity of the affected line, when supplied.
    pub original_quantity: Option<u32>,
}

/// Errors at the cart API seam.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No usable response: the request could not be sent or the body could
    /// not be read.
    #[error("cart request failed: {0}")]
    Transport(String),

    /// The server declined the request.
    #[error("cart request rejected: {}", .0.message.as_deref().unwrap_or("no message"))]
    Rejected(Rejection),
}

impl ApiError {
    /// A rejection carrying only a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(Rejection {
            message: Some(message.into()),
            ..Rejection::default()
        })
    }
}

/// Response to a successful add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddResponse {
    /// Server message, e.g. "Item added to cart".
    #[serde(default)]
    pub message: Option<String>,

    /// Number of lines in the cart after the add, when reported.
    #[serde(default, alias = "cart_count")]
    pub item_count: Option<u32>,
}

/// Response to a successful quantity update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateResponse {
    /// The quantity the server stored.
    pub quantity: u32,

    /// Line subtotal after the update.
    pub subtotal: Decimal,

    /// Cart total after the update.
    pub cart_total: Decimal,

    /// Cart item count after the update.
    pub item_count: u32,

    /// Availability of the line's variant, when reported.
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// Response to a successful removal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoveResponse {
    /// Cart total after the removal. The JSON API omits it.
    #[serde(default)]
    pub cart_total: Option<Decimal>,

    /// Cart item count after the removal.
    pub item_count: u32,
}

/// Response to a successful clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClearResponse {
    /// Server message, e.g. "Removed 3 items from cart".
    #[serde(default)]
    pub message: Option<String>,
}

/// One line of a [`CartSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineSnapshot {
    /// Line identifier.
    pub id: ItemId,

    /// Variant identifier, when the server exposes it.
    #[serde(default)]
    pub variant_id: Option<VariantId>,

    /// Product display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Variant display name.
    #[serde(default)]
    pub variant_name: Option<String>,

    /// Quantity on the line.
    pub quantity: u32,

    /// Line subtotal.
    pub subtotal: Decimal,

    /// Maximum quantity the server will accept for this line.
    #[serde(default, alias = "max_quantity")]
    pub max: Option<u32>,

    /// Availability, when reported.
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// Full cart state as served by the cart endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CartSnapshot {
    /// Cart lines.
    #[serde(default)]
    pub items: Vec<LineSnapshot>,

    /// Cart item count.
    #[serde(default, alias = "count")]
    pub item_count: u32,

    /// Cart total.
    #[serde(default)]
    pub total: Decimal,
}

impl CartSnapshot {
    /// Find a line by id.
    #[must_use]
    pub fn line(&self, item: &ItemId) -> Option<&LineSnapshot> {
        self.items.iter().find(|line| &line.id == item)
    }
}

/// Storefront cart endpoints.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Number of lines in the visitor's cart.
    async fn count(&self) -> Result<u32, ApiError>;

    /// Add `quantity` of a variant to the cart.
    async fn add_item(&self, variant: &VariantId, quantity: u32)
    -> Result<AddResponse, ApiError>;

    /// Set the quantity of a line.
    async fn update_quantity(
        &self,
        item: &ItemId,
        quantity: u32,
    ) -> Result<UpdateResponse, ApiError>;

    /// Remove a line.
    async fn remove_item(&self, item: &ItemId) -> Result<RemoveResponse, ApiError>;

    /// Remove every line.
    async fn clear(&self) -> Result<ClearResponse, ApiError>;

    /// Fetch the full cart.
    async fn cart(&self) -> Result<CartSnapshot, ApiError>;

    /// Fetch the rendered cart view and return the inner content of its
    /// mini-cart region, if the page has one.
    async fn mini_cart_fragment(&self) -> Result<Option<String>, ApiError>;
}
