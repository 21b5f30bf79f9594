//! Lattice Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{
        AddResponse, ApiError, CartApi, CartSnapshot, ClearResponse, LineSnapshot, Rejection,
        RemoveResponse, UpdateResponse,
    },
    config::{ControllerConfig, SyncMode},
    confirm::{AutoConfirm, Confirmation, Confirmer, ModalConfirmer, PendingConfirmation, Prompt},
    controller::{CartController, QuantityUpdate, ScheduledUpdate},
    errors::CartError,
    ids::{ItemId, VariantId},
    money::CurrencyError,
    notify::{ChannelNotifier, Level, Notification, Notifier, TracingNotifier},
    view::{CartLineView, CartView, CartViewState, LinePhase, Patch},
};
