use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by the currency.
pub const CURRENCY_SCALE: u32 = 2;

/// A positive payment amount with at most two decimal places.
///
/// The remote terminal only understands integer minor units, so the value must
/// convert to cents without rounding. Construction is the validation point:
/// holding an `Amount` means the value is safe to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(GatewayError::InvalidAmount(format!(
                "{value} must be positive"
            )));
        }

        let normalized = value.normalize();
        if normalized.scale() > CURRENCY_SCALE {
            return Err(GatewayError::InvalidAmount(format!(
                "{value} has more than {CURRENCY_SCALE} decimal places"
            )));
        }

        let amount = Self(normalized);
        if amount.checked_minor_units().is_none() {
            return Err(GatewayError::InvalidAmount(format!("{value} is too large")));
        }
        Ok(amount)
    }

    /// Parses a decimal string as received from the register, e.g. `"25.50"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let value = Decimal::from_str(trimmed)
            .map_err(|e| GatewayError::InvalidAmount(format!("{trimmed:?}: {e}")))?;
        Self::new(value)
    }

    /// The amount in cents.
    pub fn minor_units(&self) -> i64 {
        // Checked at construction.
        self.checked_minor_units().unwrap_or_default()
    }

    fn checked_minor_units(&self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::from(10_i64.pow(CURRENCY_SCALE)))?
            .to_i64()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
