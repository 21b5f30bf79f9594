//! Quantity input sanitization

/// Maximum used when a line advertises no maximum of its own.
pub const DEFAULT_MAX_QUANTITY: u32 = 99;

/// How a raw input value was adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// The value was accepted as typed.
    None,

    /// The value was missing, non-numeric or below one and was raised to one.
    RaisedToMinimum,

    /// The value exceeded the advertised maximum and was lowered to it.
    ClampedToMaximum,
}

/// A quantity ready to be sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitized {
    /// The quantity to send, always within `1..=max`.
    pub quantity: u32,

    /// What happened to the typed value.
    pub adjustment: Adjustment,

    /// The maximum the value was checked against.
    pub max: u32,
}

impl Sanitized {
    /// Warning shown to the user when the value was clamped.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        matches!(self.adjustment, Adjustment::ClampedToMaximum)
            .then(|| format!("Maximum available quantity is {}", self.max))
    }
}

/// Sanitize a quantity typed into a line's input.
///
/// The value is read the way a browser number input is read: surrounding
/// whitespace is ignored and the leading integer is taken, so `"3.9"` reads
/// as `3` and `"4 items"` as `4`. Anything without a leading integer, and any
/// value below one, becomes `1`. Values above `max` become `max`.
pub fn sanitize(raw: &str, max: u32) -> Sanitized {
    let max = max.max(1);

    match leading_integer(raw) {
        Some(value) if (1..=i64::from(max)).contains(&value) => Sanitized {
            quantity: u32::try_from(value).unwrap_or(max),
            adjustment: Adjustment::None,
            max,
        },
        Some(value) if value > i64::from(max) => Sanitized {
            quantity: max,
            adjustment: Adjustment::ClampedToMaximum,
            max,
        },
        _ => Sanitized {
            quantity: 1,
            adjustment: Adjustment::RaisedToMinimum,
            max,
        },
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }

    // Anything too long for an i64 is certainly above any advertised maximum.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);

    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_within_bounds_are_kept() {
        let sanitized = sanitize("5", 10);

        assert_eq!(sanitized.quantity, 5);
        assert_eq!(sanitized.adjustment, Adjustment::None);
        assert_eq!(sanitized.warning(), None);
    }

    #[test]
    fn non_numeric_values_become_one() {
        for raw in ["", "abc", "  ", "-", "x5"] {
            let sanitized = sanitize(raw, 10);

            assert_eq!(sanitized.quantity, 1, "input {raw:?} should become 1");
            assert_eq!(sanitized.adjustment, Adjustment::RaisedToMinimum);
        }
    }

    #[test]
    fn values_below_one_become_one() {
        for raw in ["0", "-3", "-0"] {
            assert_eq!(sanitize(raw, 10).quantity, 1, "input {raw:?} should become 1");
        }
    }

    #[test]
    fn values_above_max_clamp_with_a_warning() {
        let sanitized = sanitize("42", 10);

        assert_eq!(sanitized.quantity, 10);
        assert_eq!(sanitized.adjustment, Adjustment::ClampedToMaximum);
        assert_eq!(
            sanitized.warning().as_deref(),
            Some("Maximum available quantity is 10")
        );
    }

    #[test]
    fn the_leading_integer_is_used() {
        assert_eq!(sanitize(" 3.9", 10).quantity, 3);
        assert_eq!(sanitize("4 items", 10).quantity, 4);
        assert_eq!(sanitize("+7", 10).quantity, 7);
    }

    #[test]
    fn huge_values_clamp_to_max() {
        let sanitized = sanitize("99999999999999999999999", 12);

        assert_eq!(sanitized.quantity, 12);
        assert_eq!(sanitized.adjustment, Adjustment::ClampedToMaximum);
    }

    #[test]
    fn a_zero_max_is_treated_as_one() {
        assert_eq!(sanitize("3", 0).quantity, 1);
    }
}
