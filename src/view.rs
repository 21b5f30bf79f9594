//! Cart view model.
//!
//! [`CartView`] is the registry a front end renders from. It maps line
//! identifiers to slot handles and is only ever changed through
//! [`CartView::reconcile`].

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};

use crate::{
    api::{CartSnapshot, LineSnapshot},
    ids::{ItemId, VariantId},
    money::format_amount,
    quantity::DEFAULT_MAX_QUANTITY,
};

new_key_type! {
    /// Line Key
    pub struct LineKey;
}

/// Lifecycle of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinePhase {
    /// Rendered and interactive.
    #[default]
    Idle,

    /// A removal request is in flight; the remove control is busy.
    Removing,

    /// Removal succeeded and the line is transitioning out.
    FadingOut,
}

/// The quantity input of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityInput {
    /// Text currently displayed in the input.
    pub text: String,

    /// Whether the input is disabled while a request is in flight.
    pub disabled: bool,
}

/// A rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    /// Line identifier
    pub item_id: ItemId,

    /// Variant on this line, when known.
    pub variant_id: Option<VariantId>,

    /// Display name
    pub name: Option<String>,

    /// Last quantity confirmed by the server.
    pub quantity: u32,

    /// Maximum quantity advertised for this line.
    pub max_quantity: u32,

    /// Line subtotal
    pub subtotal: Decimal,

    /// Availability, when reported.
    pub in_stock: Option<bool>,

    /// Quantity input state.
    pub input: QuantityInput,

    /// Lifecycle phase.
    pub phase: LinePhase,
}

impl CartLineView {
    /// Build a line from a snapshot entry.
    #[must_use]
    pub fn from_snapshot(line: &LineSnapshot, default_max: u32) -> Self {
        let name = match (&line.name, &line.variant_name) {
            (Some(name), Some(variant)) if !variant.is_empty() => {
                Some(format!("{name} ({variant})"))
            }
            (name, _) => name.clone(),
        };

        let max_quantity = line.max.unwrap_or(default_max).max(1);
        let quantity = line.quantity.clamp(1, max_quantity);

        Self {
            item_id: line.id.clone(),
            variant_id: line.variant_id.clone(),
            name,
            quantity,
            max_quantity,
            subtotal: line.subtotal,
            in_stock: line.in_stock,
            input: QuantityInput {
                text: quantity.to_string(),
                disabled: false,
            },
            phase: LinePhase::Idle,
        }
    }

    /// Availability label for the line's badge.
    #[must_use]
    pub fn availability(&self) -> Option<&'static str> {
        self.in_stock
            .map(|in_stock| if in_stock { "In Stock" } else { "Low Stock" })
    }
}

/// Cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummaryView {
    /// Cart item count
    pub item_count: u32,

    /// Cart total
    pub total: Decimal,
}

/// The count shown by every cart badge on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountBadges {
    /// Displayed count
    pub count: u32,
}

impl CountBadges {
    /// Badges are hidden while the count is zero.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.count > 0
    }
}

/// A mounted mini-cart preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiniCartView {
    /// Inner content of the last fetched preview.
    pub content: String,
}

/// Whether the cart view shows lines or the empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartViewState {
    /// Lines (possibly none yet) are displayed.
    #[default]
    Populated,

    /// The empty-cart message is displayed.
    Empty,
}

/// A change to the view. Every view mutation is expressed as a patch.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Set the badge count.
    Count(u32),

    /// Set the totals (and badges) from a mutation response. A `None` total
    /// leaves the displayed total as it is.
    Summary {
        /// Cart total, when reported.
        total: Option<Decimal>,

        /// Cart item count
        item_count: u32,
    },

    /// Apply a quantity update response to a line.
    Line {
        /// Line identifier
        item: ItemId,

        /// Stored quantity
        quantity: u32,

        /// Line subtotal
        subtotal: Decimal,

        /// Availability, when reported.
        in_stock: Option<bool>,
    },

    /// Show sanitized text in a line's input.
    InputText {
        /// Line identifier
        item: ItemId,

        /// Text to display
        text: String,
    },

    /// Put a known quantity back into a line's input, kept within
    /// `1..=max_quantity`.
    InputQuantity {
        /// Line identifier
        item: ItemId,

        /// Quantity to display
        quantity: u32,
    },

    /// Disable or re-enable a line's input.
    InputBusy {
        /// Line identifier
        item: ItemId,

        /// Whether the input is disabled
        busy: bool,
    },

    /// Move a line to another phase.
    Phase {
        /// Line identifier
        item: ItemId,

        /// New phase
        phase: LinePhase,
    },

    /// Drop a line from the registry.
    RemoveLine(ItemId),

    /// Replace every line and the totals from a snapshot.
    Replace(CartSnapshot),

    /// Reset to an empty cart.
    Reset,

    /// Mount an (empty) mini-cart container.
    MountMiniCart,

    /// Splice fetched content into the mini-cart.
    MiniCart(String),
}

/// What a reconciliation changed beyond the patched fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconciled {
    /// The patch referred to a line that is not in the registry.
    pub missing_line: bool,

    /// The view switched to the empty state.
    pub entered_empty: bool,
}

/// The registry a front end renders the cart from.
#[derive(Debug, Clone)]
pub struct CartView {
    lines: SlotMap<LineKey, CartLineView>,
    index: FxHashMap<ItemId, LineKey>,
    order: Vec<LineKey>,
    summary: CartSummaryView,
    badges: CountBadges,
    mini_cart: Option<MiniCartView>,
    state: CartViewState,
    currency: &'static Currency,
    default_max: u32,
}

impl CartView {
    /// Create an empty registry.
    #[must_use]
    pub fn new(currency: &'static Currency, default_max: u32) -> Self {
        Self {
            lines: SlotMap::with_key(),
            index: FxHashMap::default(),
            order: Vec::new(),
            summary: CartSummaryView::default(),
            badges: CountBadges::default(),
            mini_cart: None,
            state: CartViewState::Populated,
            currency,
            default_max: default_max.max(1),
        }
    }

    /// Add a line as rendered by the page.
    ///
    /// A line with the same id replaces the existing one in place.
    pub fn mount_line(&mut self, line: CartLineView) -> LineKey {
        if let Some(&key) = self.index.get(&line.item_id) {
            if let Some(existing) = self.lines.get_mut(key) {
                *existing = line;

                return key;
            }
        }

        let item = line.item_id.clone();
        let key = self.lines.insert(line);

        self.index.insert(item, key);
        self.order.push(key);
        self.state = CartViewState::Populated;

        key
    }

    /// Apply a patch. This is the only way the controller changes the view.
    pub fn reconcile(&mut self, patch: Patch) -> Reconciled {
        let mut reconciled = Reconciled::default();
        let settles = matches!(
            patch,
            Patch::Summary { .. } | Patch::RemoveLine(_) | Patch::Replace(_) | Patch::Reset
        );

        match patch {
            Patch::Count(count) => self.badges.count = count,
            Patch::Summary { total, item_count } => {
                if let Some(total) = total {
                    self.summary.total = total;
                }

                self.summary.item_count = item_count;
                self.badges.count = item_count;
            }
            Patch::Line {
                item,
                quantity,
                subtotal,
                in_stock,
            } => {
                reconciled.missing_line = !self.with_line(&item, |line| {
                    line.quantity = quantity.clamp(1, line.max_quantity);
                    line.input.text = line.quantity.to_string();
                    line.subtotal = subtotal;

                    if in_stock.is_some() {
                        line.in_stock = in_stock;
                    }
                });
            }
            Patch::InputText { item, text } => {
                reconciled.missing_line = !self.with_line(&item, |line| line.input.text = text);
            }
            Patch::InputQuantity { item, quantity } => {
                reconciled.missing_line = !self.with_line(&item, |line| {
                    line.input.text = quantity.clamp(1, line.max_quantity).to_string();
                });
            }
            Patch::InputBusy { item, busy } => {
                reconciled.missing_line =
                    !self.with_line(&item, |line| line.input.disabled = busy);
            }
            Patch::Phase { item, phase } => {
                reconciled.missing_line = !self.with_line(&item, |line| line.phase = phase);
            }
            Patch::RemoveLine(item) => match self.index.remove(&item) {
                Some(key) => {
                    self.lines.remove(key);
                    self.order.retain(|existing| *existing != key);
                }
                None => reconciled.missing_line = true,
            },
            Patch::Replace(snapshot) => {
                self.clear_lines();

                for line in &snapshot.items {
                    self.mount_line(CartLineView::from_snapshot(line, self.default_max));
                }

                self.summary = CartSummaryView {
                    item_count: snapshot.item_count,
                    total: snapshot.total,
                };
                self.badges.count = snapshot.item_count;
            }
            Patch::Reset => {
                self.clear_lines();
                self.summary = CartSummaryView::default();
                self.badges.count = 0;
            }
            Patch::MountMiniCart => {
                self.mini_cart.get_or_insert_with(MiniCartView::default);
            }
            Patch::MiniCart(content) => {
                if let Some(mini_cart) = self.mini_cart.as_mut() {
                    mini_cart.content = content;
                }
            }
        }

        if settles {
            reconciled.entered_empty = self.settle_state();
        }

        reconciled
    }

    /// Look up a line by id.
    #[must_use]
    pub fn line(&self, item: &ItemId) -> Option<&CartLineView> {
        self.index.get(item).and_then(|key| self.lines.get(*key))
    }

    /// Lines in render order.
    pub fn lines(&self) -> impl Iterator<Item = &CartLineView> {
        self.order.iter().filter_map(|key| self.lines.get(*key))
    }

    /// Number of rendered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cart totals.
    #[must_use]
    pub fn summary(&self) -> CartSummaryView {
        self.summary
    }

    /// Shared count badges.
    #[must_use]
    pub fn badges(&self) -> CountBadges {
        self.badges
    }

    /// Mini-cart preview, when mounted.
    #[must_use]
    pub fn mini_cart(&self) -> Option<&MiniCartView> {
        self.mini_cart.as_ref()
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> CartViewState {
        self.state
    }

    /// Maximum quantity accepted for a line, falling back to the default.
    #[must_use]
    pub fn max_quantity(&self, item: &ItemId) -> u32 {
        self.line(item)
            .map_or(self.default_max, |line| line.max_quantity)
    }

    /// Displayed cart total, e.g. `$75.00`.
    #[must_use]
    pub fn total_text(&self) -> String {
        format_amount(self.summary.total, self.currency)
    }

    /// Displayed subtotal of a line, e.g. `$25.00`.
    #[must_use]
    pub fn subtotal_text(&self, item: &ItemId) -> Option<String> {
        self.line(item)
            .map(|line| format_amount(line.subtotal, self.currency))
    }

    /// Display currency.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn with_line(&mut self, item: &ItemId, update: impl FnOnce(&mut CartLineView)) -> bool {
        let Some(line) = self
            .index
            .get(item)
            .and_then(|key| self.lines.get_mut(*key))
        else {
            return false;
        };

        update(line);

        true
    }

    fn clear_lines(&mut self) {
        self.lines.clear();
        self.index.clear();
        self.order.clear();
    }

    /// Enter the empty state when nothing is left; leave it as soon as
    /// anything is. Returns whether the empty state was entered just now.
    fn settle_state(&mut self) -> bool {
        let empty = self.lines.is_empty() && self.summary.item_count == 0;

        match (self.state, empty) {
            (CartViewState::Populated, true) => {
                self.state = CartViewState::Empty;

                true
            }
            (CartViewState::Empty, false) => {
                self.state = CartViewState::Populated;

                false
            }
            _ => false,
        }
    }
}

impl Default for CartView {
    fn default() -> Self {
        Self::new(rusty_money::iso::USD, DEFAULT_MAX_QUANTITY)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn line(id: &str, quantity: u32, subtotal: Decimal) -> LineSnapshot {
        LineSnapshot {
            id: ItemId::from(id),
            variant_id: None,
            name: Some("Tee".to_string()),
            variant_name: Some("Large".to_string()),
            quantity,
            subtotal,
            max: Some(10),
            in_stock: Some(true),
        }
    }

    fn populated() -> CartView {
        let mut view = CartView::new(USD, DEFAULT_MAX_QUANTITY);

        view.reconcile(Patch::Replace(CartSnapshot {
            items: vec![
                line("1", 2, Decimal::new(20, 0)),
                line("2", 1, Decimal::new(15, 0)),
            ],
            item_count: 2,
            total: Decimal::new(35, 0),
        }));

        view
    }

    #[test]
    fn replace_seeds_lines_in_order() {
        let view = populated();

        let ids: Vec<&str> = view.lines().map(|line| line.item_id.as_str()).collect();

        assert_eq!(ids, ["1", "2"]);
        assert_eq!(view.badges().count, 2);
        assert_eq!(view.total_text(), "$35.00");
        assert_eq!(view.state(), CartViewState::Populated);
    }

    #[test]
    fn snapshot_lines_combine_product_and_variant_names() {
        let view = populated();

        let name = view
            .line(&ItemId::from("1"))
            .and_then(|line| line.name.clone());

        assert_eq!(name.as_deref(), Some("Tee (Large)"));
    }

    #[test]
    fn line_patch_updates_quantity_subtotal_and_input() {
        let mut view = populated();
        let item = ItemId::from("1");

        let reconciled = view.reconcile(Patch::Line {
            item: item.clone(),
            quantity: 5,
            subtotal: Decimal::new(25, 0),
            in_stock: Some(false),
        });

        assert!(!reconciled.missing_line);
        assert_eq!(view.subtotal_text(&item).as_deref(), Some("$25.00"));

        let line = view.line(&item);

        assert_eq!(line.map(|line| line.input.text.as_str()), Some("5"));
        assert_eq!(line.and_then(CartLineView::availability), Some("Low Stock"));
    }

    #[test]
    fn line_patch_never_exceeds_the_advertised_maximum() {
        let mut view = populated();
        let item = ItemId::from("1");

        view.reconcile(Patch::Line {
            item: item.clone(),
            quantity: 50,
            subtotal: Decimal::new(500, 0),
            in_stock: None,
        });

        assert_eq!(view.line(&item).map(|line| line.quantity), Some(10));
    }

    #[test]
    fn reverted_input_stays_within_the_line_bounds() {
        let mut view = populated();
        let item = ItemId::from("1");

        view.reconcile(Patch::InputQuantity {
            item: item.clone(),
            quantity: 0,
        });

        assert_eq!(view.line(&item).map(|line| line.input.text.as_str()), Some("1"));

        view.reconcile(Patch::InputQuantity {
            item: item.clone(),
            quantity: 99,
        });

        assert_eq!(view.line(&item).map(|line| line.input.text.as_str()), Some("10"));
    }

    #[test]
    fn patches_for_unknown_lines_are_reported() {
        let mut view = populated();

        let reconciled = view.reconcile(Patch::InputBusy {
            item: ItemId::from("nope"),
            busy: true,
        });

        assert!(reconciled.missing_line);
    }

    #[test]
    fn summary_without_total_keeps_the_displayed_total() {
        let mut view = populated();

        view.reconcile(Patch::Summary {
            total: None,
            item_count: 1,
        });

        assert_eq!(view.total_text(), "$35.00");
        assert_eq!(view.badges().count, 1);
    }

    #[test]
    fn empty_state_is_entered_once() {
        let mut view = populated();

        view.reconcile(Patch::RemoveLine(ItemId::from("1")));
        view.reconcile(Patch::Summary {
            total: Some(Decimal::new(15, 0)),
            item_count: 1,
        });

        let removed = view.reconcile(Patch::RemoveLine(ItemId::from("2")));

        assert!(!removed.entered_empty, "a summary still reports one item");

        let emptied = view.reconcile(Patch::Summary {
            total: Some(Decimal::ZERO),
            item_count: 0,
        });

        assert!(emptied.entered_empty);
        assert_eq!(view.state(), CartViewState::Empty);

        let again = view.reconcile(Patch::Summary {
            total: Some(Decimal::ZERO),
            item_count: 0,
        });

        assert!(!again.entered_empty);
        assert!(!view.badges().visible());
    }

    #[test]
    fn mini_cart_content_is_only_spliced_when_mounted() {
        let mut view = populated();

        view.reconcile(Patch::MiniCart("<p>ignored</p>".to_string()));

        assert!(view.mini_cart().is_none());

        view.reconcile(Patch::MountMiniCart);
        view.reconcile(Patch::MiniCart("<p>2 items</p>".to_string()));

        assert_eq!(
            view.mini_cart().map(|mini| mini.content.as_str()),
            Some("<p>2 items</p>")
        );
    }

    #[test]
    fn reset_clears_lines_and_totals() {
        let mut view = populated();

        let reconciled = view.reconcile(Patch::Reset);

        assert!(reconciled.entered_empty);
        assert!(view.is_empty());
        assert_eq!(view.total_text(), "$0.00");
    }
}
