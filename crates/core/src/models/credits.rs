use serde::{Deserialize, Serialize};

/// Reply of `POST /register_user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub credits: u64,
    #[serde(rename = "is_new", alias = "isNewUser", default)]
    pub is_new: bool,
}

/// `{"credits": n}`, returned by the lookup and direct-buy endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsReply {
    pub credits: u64,
}

/// Order descriptor handed to the checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDescriptor {
    pub order_id: String,
    /// Public key of the payment gateway account.
    pub key: String,
    /// Amount in minor currency units (paise, cents).
    pub amount: u64,
    pub currency: String,
}

/// Contact details pre-filled in the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPrefill {
    pub email: String,
    pub contact: String,
}

/// Price of a credit package in minor units: one currency unit per credit.
pub fn price_in_minor_units(credits: u64) -> u64 {
    credits.saturating_mul(100)
}
