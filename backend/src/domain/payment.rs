//! Payment authorization collaborator.
//!
//! The donation flow never talks to a real processor. It depends on the
//! [`PaymentAuthorizer`] trait; [`SimulatedPaymentGateway`] is the stub used by
//! the app and the demo binary.

use async_trait::async_trait;
use log::{info, warn};
use shared::{Amount, Currency, PaymentMethod};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Opaque token proving the payment collaborator accepted a charge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationRef(String);

impl AuthorizationRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthorizationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the payment collaborator needs to authorize a charge
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Card token or PayPal account handle from the payment widget
    pub token: String,
    pub amount: Amount,
    pub currency: Currency,
}

/// Authorization refused or failed. The message is shown to the donor as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    /// Authorize a charge. May suspend while the collaborator responds.
    async fn authorize(&self, details: &PaymentDetails) -> Result<AuthorizationRef, AuthError>;
}

/// Well-known test card that is always declined
pub const DECLINED_TEST_CARD: &str = "4000000000000002";

/// Stub gateway that approves everything except configured declines.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    latency: Duration,
    declined_tokens: HashSet<String>,
    forced_decline: Option<String>,
}

impl SimulatedPaymentGateway {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            declined_tokens: HashSet::from([DECLINED_TEST_CARD.to_string()]),
            forced_decline: None,
        }
    }

    /// Simulate network latency on every authorization
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Decline any payment using `token`
    pub fn decline_token(mut self, token: impl Into<String>) -> Self {
        self.declined_tokens.insert(token.into());
        self
    }

    /// Decline every payment with `message`
    pub fn decline_all(mut self, message: impl Into<String>) -> Self {
        self.forced_decline = Some(message.into());
        self
    }
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentAuthorizer for SimulatedPaymentGateway {
    async fn authorize(&self, details: &PaymentDetails) -> Result<AuthorizationRef, AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(message) = &self.forced_decline {
            warn!("Simulated gateway declined {} {} payment", details.amount, details.currency.code());
            return Err(AuthError::new(message.clone()));
        }

        if self.declined_tokens.contains(details.token.trim()) {
            warn!("Simulated gateway declined token for {} payment", details.method.label());
            let message = match details.method {
                PaymentMethod::Card => "Your card was declined.",
                PaymentMethod::Paypal => "PayPal could not authorize this payment.",
            };
            return Err(AuthError::new(message));
        }

        let reference = AuthorizationRef::new(format!("auth_{}", Uuid::new_v4().simple()));
        info!(
            "Simulated gateway authorized {} {} via {}",
            details.amount,
            details.currency.code(),
            details.method.label()
        );
        Ok(reference)
    }
}
