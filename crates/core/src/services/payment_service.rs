use std::sync::Arc;

use crate::config::PurchaseMode;
use crate::errors::CoreError;
use crate::models::credits::CheckoutPrefill;
use crate::providers::traits::{CheckoutWidget, CreditsLedger, PaymentGateway};

pub const MISSING_UID_MESSAGE: &str = "User ID missing, please log in.";

/// Buys credits and reports the balance the server holds afterwards.
///
/// Checkout flow:
/// 1. Ask the backend for an order descriptor
/// 2. Hand it to the external checkout widget and wait for payment
/// 3. Re-read the balance from the ledger (the gateway credits it server-side)
///
/// The direct flow grants credits with one ledger call instead.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    checkout: Arc<dyn CheckoutWidget>,
    ledger: Arc<dyn CreditsLedger>,
    mode: PurchaseMode,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        checkout: Arc<dyn CheckoutWidget>,
        ledger: Arc<dyn CreditsLedger>,
        mode: PurchaseMode,
    ) -> Self {
        Self {
            gateway,
            checkout,
            ledger,
            mode,
        }
    }

    pub fn mode(&self) -> PurchaseMode {
        self.mode
    }

    /// Buy `credits` for `uid`. Returns the new server-reported balance.
    pub async fn purchase(
        &self,
        uid: Option<&str>,
        credits: u64,
        prefill: &CheckoutPrefill,
    ) -> Result<u64, CoreError> {
        let uid = uid
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CoreError::Validation(MISSING_UID_MESSAGE.into()))?;
        if credits == 0 {
            return Err(CoreError::Validation(
                "Credit amount must be positive".into(),
            ));
        }

        match self.mode {
            PurchaseMode::Checkout => {
                let order = self.gateway.create_order(uid, credits).await?;
                tracing::info!(
                    order_id = %order.order_id,
                    amount = order.amount,
                    currency = %order.currency,
                    "order created; opening checkout"
                );
                self.checkout.checkout(&order, prefill).await?;
                self.ledger.fetch_credits(uid).await
            }
            PurchaseMode::Direct => self.ledger.buy_credits(uid, credits).await,
        }
    }
}
