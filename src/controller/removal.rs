//! Removing lines and clearing the cart.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    config::SyncMode,
    confirm::{Confirmation, Prompt},
    errors::CartError,
    ids::ItemId,
    notify::Notification,
    view::{LinePhase, Patch},
};

use super::{CartController, FailureText};

const REMOVE_FAILURE: FailureText = FailureText {
    declined: "Failed to remove item",
    unreachable: "An error occurred while removing the item",
};

const CLEAR_FAILURE: FailureText = FailureText {
    declined: "Failed to clear cart",
    unreachable: "An error occurred while clearing your cart",
};

impl CartController {
    /// Remove a line after the user confirms.
    ///
    /// Returns [`Confirmation::Cancelled`] without sending anything when the
    /// user declines. A quantity edit of the line still waiting for its
    /// debounce window is dropped; one already sent completes first.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the removal request fails. The line stays
    /// in place.
    pub async fn remove_item(&self, item: &ItemId) -> Result<Confirmation, CartError> {
        if self.inner.confirmer.confirm(Prompt::remove_item()).await == Confirmation::Cancelled {
            debug!(%item, "removal cancelled");

            return Ok(Confirmation::Cancelled);
        }

        if self.inner.edits.cancel(item) {
            debug!(%item, "dropped pending quantity edit");
        }

        let turn = self.inner.turns.acquire(item).await;

        let variant = self
            .inner
            .view
            .borrow()
            .line(item)
            .and_then(|line| line.variant_id.clone());

        debug!(%item, ?variant, "removing line");

        self.apply(Patch::Phase {
            item: item.clone(),
            phase: LinePhase::Removing,
        });

        let response = match self.inner.api.remove_item(item).await {
            Ok(response) => response,
            Err(error) => {
                self.apply(Patch::Phase {
                    item: item.clone(),
                    phase: LinePhase::Idle,
                });

                return Err(self.fail(error, REMOVE_FAILURE));
            }
        };

        info!(%item, item_count = response.item_count, "line removed");

        self.notify(Notification::success("Item removed from cart"));

        let fallback = match self.inner.config.sync {
            SyncMode::Patch => {
                self.apply(Patch::Phase {
                    item: item.clone(),
                    phase: LinePhase::FadingOut,
                });

                tokio::time::sleep(self.inner.config.removal_transition()).await;

                let total = match response.cart_total {
                    Some(total) => Some(total),
                    None => self.fetch_total().await,
                };

                let removed = self.apply(Patch::RemoveLine(item.clone()));
                let summarized = self.apply(Patch::Summary {
                    total,
                    item_count: response.item_count,
                });

                if removed.entered_empty || summarized.entered_empty {
                    info!("cart is now empty");
                }

                Vec::new()
            }
            SyncMode::Reload => vec![
                Patch::RemoveLine(item.clone()),
                Patch::Summary {
                    total: response.cart_total,
                    item_count: response.item_count,
                },
            ],
        };

        drop(turn);
        self.inner.turns.forget(item);

        self.after_mutation(fallback).await;

        Ok(Confirmation::Confirmed)
    }

    /// Empty the cart after the user confirms.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the clear request fails. The view is left
    /// unchanged.
    pub async fn clear_cart(&self) -> Result<Confirmation, CartError> {
        if self.inner.confirmer.confirm(Prompt::clear_cart()).await == Confirmation::Cancelled {
            debug!("clear cancelled");

            return Ok(Confirmation::Cancelled);
        }

        let response = match self.inner.api.clear().await {
            Ok(response) => response,
            Err(error) => return Err(self.fail(error, CLEAR_FAILURE)),
        };

        info!("cart cleared");

        self.inner.edits.cancel_all();
        self.inner.turns.forget_idle();

        let fallback = match self.inner.config.sync {
            SyncMode::Patch => {
                self.apply(Patch::Reset);

                Vec::new()
            }
            SyncMode::Reload => vec![Patch::Reset],
        };

        self.notify(Notification::success(
            response
                .message
                .unwrap_or_else(|| "Your cart has been cleared".to_string()),
        ));

        self.after_mutation(fallback).await;

        Ok(Confirmation::Confirmed)
    }

    /// Cart total for removal responses that do not carry one.
    async fn fetch_total(&self) -> Option<Decimal> {
        match self.inner.api.cart().await {
            Ok(snapshot) => Some(snapshot.total),
            Err(error) => {
                warn!(%error, "removal response had no total and the cart could not be fetched");

                None
            }
        }
    }
}
