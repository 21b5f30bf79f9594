//! Subcommand dispatch.

use std::io;

use lattice_cart::{
    confirm::Confirmation,
    controller::{CartController, QuantityUpdate},
    errors::CartError,
    ids::{ItemId, VariantId},
    notify::Notification,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::{config::Command, errors::CliError, render};

/// Run one command against the controller, then report what the user was
/// told along the way.
pub(crate) async fn run(
    command: &Command,
    controller: &CartController,
    notifications: &mut UnboundedReceiver<Notification>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let outcome = dispatch(command, controller).await;

    while let Ok(notification) = notifications.try_recv() {
        render::write_notification(out, &notification)?;
    }

    match outcome? {
        Output::Nothing => {}
        Output::Count(count) => writeln!(out, "{count}")?,
        Output::Cart => render::write_cart(out, &controller.snapshot())?,
        Output::Preview(Some(content)) => writeln!(out, "{content}")?,
        Output::Preview(None) => writeln!(out, "No mini-cart preview available")?,
        Output::Cancelled => writeln!(out, "Nothing changed")?,
    }

    Ok(())
}

/// What to print once the command has finished.
#[derive(Debug, PartialEq, Eq)]
enum Output {
    Nothing,
    Count(u32),
    Cart,
    Preview(Option<String>),
    Cancelled,
}

async fn dispatch(command: &Command, controller: &CartController) -> Result<Output, CartError> {
    debug!(?command, "running cart command");

    match command {
        Command::Count => {
            controller.refresh_cart_count().await;

            Ok(Output::Count(controller.snapshot().badges().count))
        }
        Command::Show => {
            controller.load().await;

            Ok(Output::Cart)
        }
        Command::Add { variant, quantity } => {
            controller
                .add_item(&VariantId::from(variant.as_str()), *quantity)
                .await?;

            Ok(Output::Nothing)
        }
        Command::Update { item, quantity } => {
            controller.reload().await?;

            match controller
                .change_quantity(&ItemId::from(item.as_str()), quantity)
                .settled()
                .await
            {
                QuantityUpdate::Failed(error) => Err(error),
                QuantityUpdate::Updated(_) => Ok(Output::Cart),
                QuantityUpdate::Superseded => Ok(Output::Cancelled),
            }
        }
        Command::Remove { item } => {
            controller.reload().await?;

            let confirmation = controller
                .remove_item(&ItemId::from(item.as_str()))
                .await?;

            Ok(confirmed(confirmation))
        }
        Command::Clear => Ok(confirmed(controller.clear_cart().await?)),
        Command::Preview => {
            controller.mount_mini_cart();
            controller.refresh_mini_cart_preview().await;

            let content = controller
                .snapshot()
                .mini_cart()
                .map(|mini_cart| mini_cart.content.clone())
                .filter(|content| !content.trim().is_empty());

            Ok(Output::Preview(content))
        }
    }
}

fn confirmed(confirmation: Confirmation) -> Output {
    match confirmation {
        Confirmation::Confirmed => Output::Cart,
        Confirmation::Cancelled => Output::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lattice_cart::{
        api::{ApiError, CartSnapshot, ClearResponse, MockCartApi},
        config::ControllerConfig,
        confirm::AutoConfirm,
        notify::ChannelNotifier,
    };
    use testresult::TestResult;
    use tokio::sync::mpsc;

    use super::*;

    async fn output(api: MockCartApi, command: Command) -> Result<String, Box<dyn std::error::Error>> {
        let (sender, mut notifications) = mpsc::unbounded_channel();
        let controller = CartController::new(
            Arc::new(api),
            Arc::new(ChannelNotifier::new(sender)),
            Arc::new(AutoConfirm),
            ControllerConfig::default(),
        )?;

        let mut out = Vec::new();

        run(&command, &controller, &mut notifications, &mut out).await?;

        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn count_prints_the_badge() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_count().once().returning(|| Ok(4));

        assert_eq!(output(api, Command::Count).await?, "4\n");

        Ok(())
    }

    #[tokio::test]
    async fn clearing_reports_the_notification_then_the_empty_cart() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_clear().once().returning(|| {
            Ok(ClearResponse {
                message: Some("Removed 2 items from cart".to_string()),
            })
        });
        api.expect_count().returning(|| Ok(0));

        assert_eq!(
            output(api, Command::Clear).await?,
            "[success] Removed 2 items from cart\nYour cart is empty\n"
        );

        Ok(())
    }

    #[tokio::test]
    async fn failures_are_reported_before_the_error_is_returned() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_add_item()
            .once()
            .returning(|_, _| Err(ApiError::rejected("Out of stock")));

        let (sender, mut notifications) = mpsc::unbounded_channel();
        let controller = CartController::new(
            Arc::new(api),
            Arc::new(ChannelNotifier::new(sender)),
            Arc::new(AutoConfirm),
            ControllerConfig::default(),
        )?;

        let mut out = Vec::new();
        let command = Command::Add {
            variant: "7".to_string(),
            quantity: 1,
        };

        let result = run(&command, &controller, &mut notifications, &mut out).await;

        assert!(matches!(result, Err(CliError::Cart(CartError::Server { .. }))));
        assert_eq!(String::from_utf8(out)?, "[error] Out of stock\n");

        Ok(())
    }

    #[tokio::test]
    async fn preview_without_a_region_says_so() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_mini_cart_fragment().once().returning(|| Ok(None));
        api.expect_cart().never();

        assert_eq!(
            output(api, Command::Preview).await?,
            "No mini-cart preview available\n"
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn updating_a_line_not_in_the_cart_changes_nothing() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_cart()
            .once()
            .returning(|| Ok(CartSnapshot::default()));
        api.expect_update_quantity().never();

        let command = Command::Update {
            item: "404".to_string(),
            quantity: "2".to_string(),
        };

        assert_eq!(output(api, command).await?, "Nothing changed\n");

        Ok(())
    }

    #[tokio::test]
    async fn show_loads_the_cart() -> TestResult {
        let mut api = MockCartApi::new();

        api.expect_count().once().returning(|| Ok(0));
        api.expect_cart()
            .once()
            .returning(|| Ok(CartSnapshot::default()));

        assert_eq!(output(api, Command::Show).await?, "Your cart is empty\n");

        Ok(())
    }
}
