//! Terminal rendering of the cart view.

use std::io;

use lattice_cart::{
    notify::Notification,
    view::{CartView, CartViewState},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

/// Write the cart lines and totals.
pub(crate) fn write_cart(out: &mut impl io::Write, view: &CartView) -> io::Result<()> {
    if view.state() == CartViewState::Empty || view.is_empty() {
        writeln!(out, "Your cart is empty")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Item", "Name", "Quantity", "Subtotal", "Availability"]);

    for line in view.lines() {
        builder.push_record([
            line.item_id.to_string(),
            line.name.clone().unwrap_or_default(),
            line.quantity.to_string(),
            view.subtotal_text(&line.item_id).unwrap_or_default(),
            line.availability().unwrap_or_default().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..4), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "{} item(s), total {}",
        view.summary().item_count,
        view.total_text()
    )
}

/// Write a notification as a single line.
pub(crate) fn write_notification(
    out: &mut impl io::Write,
    notification: &Notification,
) -> io::Result<()> {
    writeln!(out, "[{}] {}", notification.level, notification.message)
}

#[cfg(test)]
mod tests {
    use lattice_cart::{
        api::{CartSnapshot, LineSnapshot},
        ids::ItemId,
        view::Patch,
    };
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn render(view: &CartView) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        write_cart(&mut out, view)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn lines_and_totals_are_listed() -> TestResult {
        let mut view = CartView::default();

        view.reconcile(Patch::Replace(CartSnapshot {
            items: vec![LineSnapshot {
                id: ItemId::from("42"),
                variant_id: None,
                name: Some("Tee".to_string()),
                variant_name: Some("Large".to_string()),
                quantity: 5,
                subtotal: Decimal::new(25, 0),
                max: Some(10),
                in_stock: Some(false),
            }],
            item_count: 1,
            total: Decimal::new(75, 0),
        }));

        let text = render(&view)?;

        assert!(text.contains("Tee (Large)"), "{text}");
        assert!(text.contains("$25.00"), "{text}");
        assert!(text.contains("Low Stock"), "{text}");
        assert!(text.ends_with("1 item(s), total $75.00\n"), "{text}");

        Ok(())
    }

    #[test]
    fn empty_carts_say_so() -> TestResult {
        let mut view = CartView::default();

        view.reconcile(Patch::Reset);

        assert_eq!(render(&view)?, "Your cart is empty\n");

        Ok(())
    }

    #[test]
    fn notifications_show_their_level() -> TestResult {
        let mut out = Vec::new();

        write_notification(&mut out, &Notification::warning("Maximum available quantity is 10"))?;

        assert_eq!(
            String::from_utf8(out)?,
            "[warning] Maximum available quantity is 10\n"
        );

        Ok(())
    }
}
