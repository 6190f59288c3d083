//! Mock donations for the demo dashboard.

use chrono::{DateTime, Duration, Utc};
use shared::{Amount, Currency, DonationStatus, PaymentMethod};

use crate::domain::models::donation::Donation;

struct SeedDonation {
    donor_name: &'static str,
    donor_email: &'static str,
    cents: i64,
    days_ago: i64,
    message: Option<&'static str>,
    is_anonymous: bool,
    payment_method: PaymentMethod,
}

const SEED_DONATIONS: &[SeedDonation] = &[
    SeedDonation {
        donor_name: "Esther Park",
        donor_email: "esther.park@example.org",
        cents: 10_000,
        days_ago: 40,
        message: Some("For the Easter service flowers"),
        is_anonymous: false,
        payment_method: PaymentMethod::Card,
    },
    SeedDonation {
        donor_name: "Daniel Okafor",
        donor_email: "daniel.okafor@example.org",
        cents: 5_000,
        days_ago: 6,
        message: None,
        is_anonymous: false,
        payment_method: PaymentMethod::Paypal,
    },
    SeedDonation {
        donor_name: "Hannah Reyes",
        donor_email: "hannah.reyes@example.org",
        cents: 2_500,
        days_ago: 3,
        message: Some("Thank you for the new hymn books"),
        is_anonymous: true,
        payment_method: PaymentMethod::Card,
    },
    SeedDonation {
        donor_name: "Samuel Brooks",
        donor_email: "samuel.brooks@example.org",
        cents: 15_000,
        days_ago: 1,
        message: Some("Youth choir trip"),
        is_anonymous: false,
        payment_method: PaymentMethod::Card,
    },
];

/// Completed mock donations dated relative to `now`, oldest first
pub fn demo_donations(now: DateTime<Utc>) -> Vec<Donation> {
    SEED_DONATIONS
        .iter()
        .enumerate()
        .map(|(index, seed)| {
            let sequence = index as u64 + 1;
            let created_at = now - Duration::days(seed.days_ago);
            Donation {
                id: Donation::generate_id(created_at.timestamp_millis(), sequence),
                sequence,
                amount: Amount::from_cents(seed.cents),
                currency: Currency::Usd,
                donor_name: seed.donor_name.to_string(),
                donor_email: seed.donor_email.to_string(),
                message: seed.message.map(str::to_string),
                is_anonymous: seed.is_anonymous,
                payment_method: seed.payment_method,
                status: DonationStatus::Completed,
                created_at,
                transaction_id: Donation::generate_transaction_id(),
                authorization_ref: format!("auth_seed_{}", sequence),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_donations_are_unique_and_completed() {
        let donations = demo_donations(Utc::now());

        assert_eq!(donations.len(), SEED_DONATIONS.len());
        let mut ids = HashSet::new();
        for donation in &donations {
            assert_eq!(donation.status, DonationStatus::Completed);
            assert!(ids.insert(donation.id.clone()));
            assert!(ids.insert(donation.transaction_id.clone()));
        }
    }

    #[test]
    fn test_demo_donations_oldest_first() {
        let donations = demo_donations(Utc::now());

        assert!(donations.windows(2).all(|pair| pair[0].created_at < pair[1].created_at));
    }
}
