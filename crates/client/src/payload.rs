//! Response payloads.
//!
//! Every storefront endpoint answers with a JSON object. A non-2xx status or
//! `"success": false` marks a failure, whatever the status. The JSON API
//! answers mutations with a full cart snapshot, which is normalized here into
//! the same responses the form endpoints produce.

use lattice_cart::{
    api::{ApiError, CartSnapshot, Rejection, UpdateResponse},
    ids::ItemId,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

/// Fields checked, in order, for a server message on failures.
const MESSAGE_FIELDS: [&str; 3] = ["error", "message", "detail"];

/// Split a response into its payload or a rejection.
///
/// A 2xx body that is not JSON is accepted as [`Value::Null`].
pub(crate) fn classify(status: u16, body: &str) -> Result<Value, ApiError> {
    let success = (200..300).contains(&status);

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        if success {
            return Ok(Value::Null);
        }

        return Err(ApiError::Rejected(Rejection {
            status: Some(status),
            ..Rejection::default()
        }));
    };

    let declined = value.get("success").and_then(Value::as_bool) == Some(false);

    if success && !declined {
        return Ok(value);
    }

    Err(ApiError::Rejected(Rejection {
        status: (!success).then_some(status),
        message: message(&value),
        original_quantity: value
            .get("original_quantity")
            .and_then(Value::as_u64)
            .and_then(|quantity| u32::try_from(quantity).ok()),
    }))
}

fn message(value: &Value) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

/// Decode an accepted payload.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|error| ApiError::Transport(format!("unexpected response body: {error}")))
}

/// Decode an accepted payload, falling back to the default for empty bodies.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> Result<T, ApiError> {
    if value.is_null() {
        return Ok(T::default());
    }

    decode(value)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountPayload {
    #[serde(default)]
    pub(crate) count: u32,
}

/// A JSON API mutation response.
#[derive(Debug, Deserialize)]
struct SnapshotMutation {
    #[serde(default)]
    cart: Option<CartSnapshot>,

    #[serde(default)]
    item_count: Option<u32>,
}

/// Build an [`UpdateResponse`] from a JSON API quantity update.
pub(crate) fn update_from_snapshot(item: &ItemId, value: Value) -> Result<UpdateResponse, ApiError> {
    let mutation: SnapshotMutation = decode(value)?;

    let Some(cart) = mutation.cart else {
        return Err(ApiError::Transport(
            "update response carried no cart".to_string(),
        ));
    };

    let Some(line) = cart.line(item) else {
        return Err(ApiError::Transport(format!(
            "update response carried no line {item}"
        )));
    };

    Ok(UpdateResponse {
        quantity: line.quantity,
        subtotal: line.subtotal,
        cart_total: cart.total,
        item_count: mutation.item_count.unwrap_or(cart.item_count),
        in_stock: line.in_stock,
    })
}

#[cfg(test)]
mod tests {
    use lattice_cart::api::{AddResponse, RemoveResponse};
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn accepted_payloads_pass_through() -> TestResult {
        let value = classify(200, r#"{"success": true, "message": "Item added to cart", "cart_count": 3}"#)?;
        let added: AddResponse = decode(value)?;

        assert_eq!(added.message.as_deref(), Some("Item added to cart"));
        assert_eq!(added.item_count, Some(3));

        Ok(())
    }

    #[test]
    fn declined_payloads_carry_the_server_message() {
        let rejected = classify(200, r#"{"success": false, "message": "Out of stock"}"#);

        assert_eq!(
            rejected,
            Err(ApiError::Rejected(Rejection {
                status: None,
                message: Some("Out of stock".to_string()),
                original_quantity: None,
            }))
        );
    }

    #[test]
    fn error_field_wins_over_message() {
        let rejected = classify(
            400,
            r#"{"success": false, "error": "Only 4 left", "message": "Cart updated", "original_quantity": 2}"#,
        );

        assert_eq!(
            rejected,
            Err(ApiError::Rejected(Rejection {
                status: Some(400),
                message: Some("Only 4 left".to_string()),
                original_quantity: Some(2),
            }))
        );
    }

    #[test]
    fn failed_status_without_json_is_a_bare_rejection() {
        let rejected = classify(502, "<html>Bad Gateway</html>");

        assert_eq!(
            rejected,
            Err(ApiError::Rejected(Rejection {
                status: Some(502),
                ..Rejection::default()
            }))
        );
    }

    #[test]
    fn successful_status_without_json_is_empty() -> TestResult {
        assert_eq!(classify(204, "")?, Value::Null);

        Ok(())
    }

    #[test]
    fn form_removal_keeps_the_total() -> TestResult {
        let removed: RemoveResponse =
            decode(json!({"success": true, "cart_total": "45.50", "item_count": 2}))?;

        assert_eq!(removed.cart_total, Some(Decimal::new(4550, 2)));
        assert_eq!(removed.item_count, 2);

        Ok(())
    }

    #[test]
    fn json_updates_are_read_from_the_snapshot() -> TestResult {
        let value = json!({
            "success": true,
            "message": "Cart updated",
            "item_count": 2,
            "cart": {
                "id": 9,
                "total": "40.00",
                "item_count": 2,
                "items": [
                    {"id": 41, "quantity": 1, "subtotal": "15.00", "name": "Mug"},
                    {"id": 42, "quantity": 5, "subtotal": "25.00", "name": "Tee"}
                ]
            }
        });

        let update = update_from_snapshot(&ItemId::from("42"), value)?;

        assert_eq!(update.quantity, 5);
        assert_eq!(update.subtotal, Decimal::new(2500, 2));
        assert_eq!(update.cart_total, Decimal::new(4000, 2));
        assert_eq!(update.item_count, 2);

        Ok(())
    }

    #[test]
    fn json_updates_without_the_line_are_unreadable() {
        let value = json!({"success": true, "cart": {"items": [], "total": "0.00"}});

        assert!(matches!(
            update_from_snapshot(&ItemId::from("42"), value),
            Err(ApiError::Transport(_))
        ));
    }
}
