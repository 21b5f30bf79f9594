//! Cart controller.
//!
//! [`CartController`] turns user gestures into [`CartApi`] calls and folds
//! the responses back into the [`CartView`] registry. Every operation
//! reports failures to the user through the [`Notifier`] before returning,
//! so callers wiring gestures to operations may ignore the returned error.

use std::{fmt, sync::Arc};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    api::{ApiError, CartApi, CartSnapshot},
    config::{ControllerConfig, SyncMode},
    confirm::Confirmer,
    errors::CartError,
    ids::VariantId,
    money::{self, CurrencyError},
    notify::{Notification, Notifier},
    view::{CartLineView, CartView, Patch, Reconciled},
};

mod lines;
mod quantity;
mod removal;

pub use quantity::{QuantityUpdate, ScheduledUpdate};

use lines::{LineTurns, PendingEdits};

/// Messages shown when an operation fails.
#[derive(Debug, Clone, Copy)]
struct FailureText {
    /// Shown when the server declines without a message of its own.
    declined: &'static str,

    /// Shown when the server cannot be reached.
    unreachable: &'static str,
}

const ADD_FAILURE: FailureText = FailureText {
    declined: "Failed to add item to cart",
    unreachable: "Error adding item to cart. Please try again.",
};

/// Controller for the cart widgets of a page.
///
/// Cheap to clone; clones share the same view and in-flight bookkeeping.
#[derive(Clone)]
pub struct CartController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn CartApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    config: ControllerConfig,
    view: watch::Sender<CartView>,
    turns: LineTurns,
    edits: PendingEdits,
}

impl fmt::Debug for CartController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartController")
            .field("config", &self.inner.config)
            .field("edits", &self.inner.edits)
            .finish_non_exhaustive()
    }
}

impl CartController {
    /// Create a controller with an empty view.
    ///
    /// # Errors
    ///
    /// Returns a [`CurrencyError`] when the configured currency is unknown.
    pub fn new(
        api: Arc<dyn CartApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        config: ControllerConfig,
    ) -> Result<Self, CurrencyError> {
        let currency = money::currency(&config.currency)?;
        let (view, _) = watch::channel(CartView::new(currency, config.default_max_quantity));

        Ok(Self {
            inner: Arc::new(Inner {
                api,
                notifier,
                confirmer,
                config,
                view,
                turns: LineTurns::default(),
                edits: PendingEdits::default(),
            }),
        })
    }

    /// Controller settings.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Watch the view; the receiver sees every reconciliation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartView> {
        self.inner.view.subscribe()
    }

    /// A copy of the current view.
    #[must_use]
    pub fn snapshot(&self) -> CartView {
        self.inner.view.borrow().clone()
    }

    /// Register a line rendered by the page.
    pub fn mount_line(&self, line: CartLineView) {
        self.inner.view.send_modify(|view| {
            view.mount_line(line);
        });
    }

    /// Seed the registry from a cart snapshot rendered by the page.
    pub fn seed(&self, snapshot: CartSnapshot) {
        self.apply(Patch::Replace(snapshot));
    }

    /// Register a mini-cart container so previews are fetched into it.
    pub fn mount_mini_cart(&self) {
        self.apply(Patch::MountMiniCart);
    }

    /// Page load: refresh the badges and build the registry from the server.
    pub async fn load(&self) {
        self.refresh_cart_count().await;

        if let Err(error) = self.reload().await {
            debug!(%error, "cart view left unseeded");
        }
    }

    /// Rebuild the registry from a fresh snapshot of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the snapshot cannot be fetched; the view
    /// is left as it was.
    pub async fn reload(&self) -> Result<(), CartError> {
        match self.inner.api.cart().await {
            Ok(snapshot) => {
                debug!(lines = snapshot.items.len(), "reloaded cart");

                self.apply(Patch::Replace(snapshot));

                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to reload cart");

                Err(error.into())
            }
        }
    }

    /// Update every count badge from the server. Failures are only logged.
    pub async fn refresh_cart_count(&self) {
        match self.inner.api.count().await {
            Ok(count) => {
                self.apply(Patch::Count(count));
            }
            Err(error) => warn!(%error, "failed to refresh cart count"),
        }
    }

    /// Refresh the mounted mini-cart from the rendered cart view.
    ///
    /// Does nothing when no mini-cart is mounted. Failures are only logged.
    pub async fn refresh_mini_cart_preview(&self) {
        let mounted = self.inner.view.borrow().mini_cart().is_some();

        if !mounted {
            return;
        }

        match self.inner.api.mini_cart_fragment().await {
            Ok(Some(content)) => {
                self.apply(Patch::MiniCart(content));
            }
            Ok(None) => debug!("cart view has no mini-cart region"),
            Err(error) => warn!(%error, "failed to refresh mini-cart"),
        }
    }

    /// Add `quantity` of a variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the request is invalid, unreachable or
    /// declined. Cart state is left unchanged.
    pub async fn add_item(&self, variant: &VariantId, quantity: u32) -> Result<(), CartError> {
        if variant.is_blank() {
            return Err(self.invalid("Please choose a product option"));
        }

        if quantity == 0 {
            return Err(self.invalid("Quantity must be at least 1"));
        }

        debug!(%variant, quantity, "adding to cart");

        match self.inner.api.add_item(variant, quantity).await {
            Ok(response) => {
                info!(%variant, quantity, "added to cart");

                self.after_mutation(Vec::new()).await;

                self.notify(Notification::success(
                    response
                        .message
                        .unwrap_or_else(|| "Item added to cart".to_string()),
                ));

                self.refresh_mini_cart_preview().await;

                Ok(())
            }
            Err(error) => Err(self.fail(error, ADD_FAILURE)),
        }
    }

    /// Follow-up shared by every successful mutation.
    ///
    /// In reload mode `fallback` is applied when the view cannot be rebuilt
    /// from the server, so the mutation still shows.
    async fn after_mutation(&self, fallback: Vec<Patch>) {
        if self.inner.config.sync == SyncMode::Reload {
            if let Err(error) = self.reload().await {
                error!(%error, "cart changed but the view could not be reloaded, patching it");

                for patch in fallback {
                    self.apply(patch);
                }
            }
        }

        self.refresh_cart_count().await;
    }

    fn apply(&self, patch: Patch) -> Reconciled {
        let mut reconciled = Reconciled::default();

        self.inner.view.send_modify(|view| {
            reconciled = view.reconcile(patch);
        });

        reconciled
    }

    fn notify(&self, notification: Notification) {
        self.inner.notifier.notify(notification);
    }

    fn invalid(&self, message: &str) -> CartError {
        self.notify(Notification::warning(message));

        CartError::Validation(message.to_string())
    }

    /// Log a failed request, tell the user, and convert the error.
    fn fail(&self, error: ApiError, text: FailureText) -> CartError {
        let message = match &error {
            ApiError::Transport(reason) => {
                error!(%reason, "cart request failed");

                text.unreachable.to_string()
            }
            ApiError::Rejected(rejection) => {
                warn!(
                    status = ?rejection.status,
                    reason = ?rejection.message,
                    "cart request declined"
                );

                rejection
                    .message
                    .clone()
                    .unwrap_or_else(|| text.declined.to_string())
            }
        };

        self.notify(Notification::error(message));

        error.into()
    }
}
