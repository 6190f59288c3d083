//! Domain model for a donation.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Amount, Currency, DonationStatus, PaymentMethod};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    /// Insertion sequence within the store; breaks `created_at` ties
    pub sequence: u64,
    pub amount: Amount,
    pub currency: Currency,
    pub donor_name: String,
    pub donor_email: String,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub transaction_id: String,
    /// Authorization reference consumed when the donation was accepted
    pub authorization_ref: String,
}

impl Donation {
    /// Generate a donation ID from the acceptance time and store sequence.
    /// Format: donation::<epoch_millis>::<sequence>
    pub fn generate_id(epoch_millis: i64, sequence: u64) -> String {
        format!("donation::{}::{}", epoch_millis, sequence)
    }

    /// Generate a simulated gateway transaction reference.
    pub fn generate_transaction_id() -> String {
        format!("txn_{}", Uuid::new_v4().simple())
    }

    /// Name to show publicly for this donation
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            "Anonymous"
        } else {
            &self.donor_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation_at(created_at: DateTime<Utc>, is_anonymous: bool) -> Donation {
        Donation {
            id: Donation::generate_id(created_at.timestamp_millis(), 1),
            sequence: 1,
            amount: Amount::from_cents(2500),
            currency: Currency::Usd,
            donor_name: "Grace Hopper".to_string(),
            donor_email: "grace@example.org".to_string(),
            message: None,
            is_anonymous,
            payment_method: PaymentMethod::Card,
            status: DonationStatus::Completed,
            created_at,
            transaction_id: Donation::generate_transaction_id(),
            authorization_ref: "auth_test".to_string(),
        }
    }

    #[test]
    fn test_generate_id() {
        assert_eq!(Donation::generate_id(1625846400123, 7), "donation::1625846400123::7");
    }

    #[test]
    fn test_generate_transaction_id_is_distinct() {
        let a = Donation::generate_transaction_id();
        let b = Donation::generate_transaction_id();
        assert!(a.starts_with("txn_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_name_redacts_anonymous() {
        let now = Utc::now();
        assert_eq!(donation_at(now, false).display_name(), "Grace Hopper");
        assert_eq!(donation_at(now, true).display_name(), "Anonymous");
    }
}
