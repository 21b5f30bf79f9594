//! Debounced quantity edits.

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info};

use crate::{
    api::{ApiError, Rejection, UpdateResponse},
    config::SyncMode,
    errors::CartError,
    ids::ItemId,
    notify::Notification,
    quantity::{Adjustment, sanitize},
    view::{CartView, Patch},
};

use super::{CartController, FailureText};

const UPDATE_FAILURE: FailureText = FailureText {
    declined: "Failed to update cart",
    unreachable: "An error occurred while updating your cart",
};

/// How a quantity edit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// A later edit replaced this one, or the line went away, before
    /// anything was sent.
    Superseded,

    /// The server stored the new quantity.
    Updated(UpdateResponse),

    /// The request failed; the user has been told.
    Failed(CartError),
}

/// A quantity edit waiting out its debounce window or in flight.
///
/// Dropping it does not cancel the edit.
#[derive(Debug)]
pub struct ScheduledUpdate {
    handle: JoinHandle<QuantityUpdate>,
}

impl ScheduledUpdate {
    /// Wait for the edit to settle.
    pub async fn settled(self) -> QuantityUpdate {
        match self.handle.await {
            Ok(update) => update,
            Err(join_error) if join_error.is_cancelled() => QuantityUpdate::Superseded,
            Err(join_error) => {
                error!(%join_error, "quantity update task failed");

                QuantityUpdate::Failed(CartError::Interrupted)
            }
        }
    }
}

/// Keeps a line's input disabled while it is held; re-enables it on drop,
/// whichever way the request ends.
struct BusyInput<'a> {
    view: &'a watch::Sender<CartView>,
    item: ItemId,
}

impl<'a> BusyInput<'a> {
    fn hold(view: &'a watch::Sender<CartView>, item: &ItemId) -> Self {
        view.send_modify(|view| {
            view.reconcile(Patch::InputBusy {
                item: item.clone(),
                busy: true,
            });
        });

        Self {
            view,
            item: item.clone(),
        }
    }
}

impl Drop for BusyInput<'_> {
    fn drop(&mut self) {
        let item = self.item.clone();

        self.view.send_modify(|view| {
            view.reconcile(Patch::InputBusy { item, busy: false });
        });
    }
}

impl CartController {
    /// Handle an edit of a line's quantity input.
    ///
    /// The typed value is sanitized against the line's maximum straight
    /// away. The request itself waits for the debounce window; a further
    /// edit of the same line within the window replaces this one, so a burst
    /// of edits sends a single request carrying the last value.
    ///
    /// Must be called from within a tokio runtime.
    pub fn change_quantity(&self, item: &ItemId, raw: &str) -> ScheduledUpdate {
        let max = self.inner.view.borrow().max_quantity(item);
        let sanitized = sanitize(raw, max);

        let text = match sanitized.adjustment {
            Adjustment::None => raw.trim().to_string(),
            Adjustment::RaisedToMinimum | Adjustment::ClampedToMaximum => {
                sanitized.quantity.to_string()
            }
        };

        self.apply(Patch::InputText {
            item: item.clone(),
            text,
        });

        if let Some(warning) = sanitized.warning() {
            self.notify(Notification::warning(warning));
        }

        let controller = self.clone();
        let line = item.clone();

        let handle = self.inner.edits.schedule(item, move |ticket| {
            tokio::spawn(async move {
                tokio::time::sleep(controller.inner.config.debounce()).await;

                if !controller.inner.edits.commit(&line, ticket) {
                    return QuantityUpdate::Superseded;
                }

                controller.send_update(&line, sanitized.quantity).await
            })
        });

        ScheduledUpdate { handle }
    }

    async fn send_update(&self, item: &ItemId, quantity: u32) -> QuantityUpdate {
        let _turn = self.inner.turns.acquire(item).await;

        let variant = match self.inner.view.borrow().line(item) {
            Some(line) => line.variant_id.clone(),
            None => {
                debug!(%item, "line is gone, dropping quantity edit");

                return QuantityUpdate::Superseded;
            }
        };

        let _busy = BusyInput::hold(&self.inner.view, item);

        debug!(%item, ?variant, quantity, "updating quantity");

        match self.inner.api.update_quantity(item, quantity).await {
            Ok(response) => {
                info!(%item, quantity = response.quantity, "quantity updated");

                let patches = vec![
                    Patch::Line {
                        item: item.clone(),
                        quantity: response.quantity,
                        subtotal: response.subtotal,
                        in_stock: response.in_stock,
                    },
                    Patch::Summary {
                        total: Some(response.cart_total),
                        item_count: response.item_count,
                    },
                ];

                let fallback = match self.inner.config.sync {
                    SyncMode::Patch => {
                        for patch in patches {
                            self.apply(patch);
                        }

                        Vec::new()
                    }
                    SyncMode::Reload => patches,
                };

                self.notify(Notification::success("Cart updated successfully"));

                self.after_mutation(fallback).await;

                QuantityUpdate::Updated(response)
            }
            Err(error) => {
                if let ApiError::Rejected(Rejection {
                    original_quantity: Some(original @ 1..),
                    ..
                }) = &error
                {
                    self.apply(Patch::InputQuantity {
                        item: item.clone(),
                        quantity: *original,
                    });
                }

                QuantityUpdate::Failed(self.fail(error, UPDATE_FAILURE))
            }
        }
    }
}
