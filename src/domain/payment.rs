use super::amount::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation key minted once per payment attempt and echoed back by the
/// terminal in its callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReferenceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ReferenceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settings that shape every dispatched payment command.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDefaults {
    pub currency: String,
    pub callback_url: String,
    pub order_id: String,
    pub is_debit: bool,
}

/// The payment fragment delivered to the terminal application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCommand {
    pub action: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_debit: bool,
    pub purchase_amount: i64,
    pub tip_amount: i64,
    pub currency: String,
    pub reference_id: ReferenceId,
    pub order_id: String,
    pub callback_url: String,
}

impl PaymentCommand {
    pub fn sale(amount: Amount, reference_id: ReferenceId, defaults: &PaymentDefaults) -> Self {
        Self {
            action: "sale".to_string(),
            is_debit: defaults.is_debit,
            purchase_amount: amount.minor_units(),
            tip_amount: 0,
            currency: defaults.currency.clone(),
            reference_id,
            order_id: defaults.order_id.clone(),
            callback_url: defaults.callback_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> PaymentDefaults {
        PaymentDefaults {
            currency: "NZD".to_string(),
            callback_url: "https://example.test/callback".to_string(),
            order_id: "order-1".to_string(),
            is_debit: true,
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ReferenceId::generate();
        let b = ReferenceId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_sale_command_wire_format() {
        let id = ReferenceId::from("ref-1");
        let cmd = PaymentCommand::sale(Amount::parse("25.50").unwrap(), id, &defaults());

        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "sale");
        assert_eq!(json["isDebit"], true);
        assert_eq!(json["purchaseAmount"], 2550);
        assert_eq!(json["tipAmount"], 0);
        assert_eq!(json["currency"], "NZD");
        assert_eq!(json["referenceId"], "ref-1");
        assert_eq!(json["orderId"], "order-1");
        assert_eq!(json["callbackUrl"], "https://example.test/callback");
    }

    #[test]
    fn test_credit_sale_omits_debit_flag() {
        let mut defaults = defaults();
        defaults.is_debit = false;
        let cmd = PaymentCommand::sale(
            Amount::parse("1").unwrap(),
            ReferenceId::generate(),
            &defaults,
        );

        let json = serde_json::to_value(&cmd).unwrap();
        assert!(json.get("isDebit").is_none());
    }
}
