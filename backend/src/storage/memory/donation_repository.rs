use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

use super::connection::MemoryConnection;
use crate::domain::models::donation::Donation;
use crate::storage::traits::DonationStorage;

/// In-memory donation repository
#[derive(Clone)]
pub struct DonationRepository {
    connection: MemoryConnection,
}

impl DonationRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> Result<Vec<Donation>> {
        let donations = self
            .connection
            .donations()
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(donations.clone())
    }
}

fn newest_first(a: &Donation, b: &Donation) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.sequence.cmp(&a.sequence))
}

#[async_trait]
impl DonationStorage for DonationRepository {
    async fn store_donation(&self, donation: &Donation) -> Result<()> {
        let mut donations = self
            .connection
            .donations()
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let collides = donations.iter().any(|existing| {
            existing.id == donation.id
                || existing.transaction_id == donation.transaction_id
                || existing.id == donation.transaction_id
                || existing.transaction_id == donation.id
        });
        if collides {
            return Err(anyhow!(
                "Donation {} / {} collides with an existing identifier",
                donation.id,
                donation.transaction_id
            ));
        }

        donations.push(donation.clone());
        debug!("Stored donation {} ({} total)", donation.id, donations.len());
        Ok(())
    }

    async fn get_donation(&self, donation_id: &str) -> Result<Option<Donation>> {
        let donations = self
            .connection
            .donations()
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(donations.iter().find(|d| d.id == donation_id).cloned())
    }

    async fn list_donations(&self) -> Result<Vec<Donation>> {
        self.read_all()
    }

    async fn list_recent_donations(&self, limit: usize) -> Result<Vec<Donation>> {
        let mut donations = self.read_all()?;
        donations.sort_by(newest_first);
        donations.truncate(limit);
        Ok(donations)
    }

    async fn list_donations_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Donation>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|d| d.created_at >= start && d.created_at < end)
            .collect())
    }

    async fn identifier_exists(&self, identifier: &str) -> Result<bool> {
        let donations = self
            .connection
            .donations()
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(donations
            .iter()
            .any(|d| d.id == identifier || d.transaction_id == identifier))
    }

    async fn count_donations(&self) -> Result<usize> {
        let donations = self
            .connection
            .donations()
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(donations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::Connection;
    use chrono::{Duration, TimeZone};
    use shared::{Amount, Currency, DonationStatus, PaymentMethod};

    fn donation(sequence: u64, created_at: DateTime<Utc>) -> Donation {
        Donation {
            id: Donation::generate_id(created_at.timestamp_millis(), sequence),
            sequence,
            amount: Amount::from_cents(1000),
            currency: Currency::Usd,
            donor_name: format!("Donor {}", sequence),
            donor_email: format!("donor{}@example.org", sequence),
            message: None,
            is_anonymous: false,
            payment_method: PaymentMethod::Card,
            status: DonationStatus::Completed,
            created_at,
            transaction_id: format!("txn_{}", sequence),
            authorization_ref: format!("auth_{}", sequence),
        }
    }

    #[tokio::test]
    async fn test_store_and_list_in_insertion_order() {
        let repo = MemoryConnection::new().create_donation_repository();
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();

        repo.store_donation(&donation(1, base + Duration::hours(2))).await.unwrap();
        repo.store_donation(&donation(2, base)).await.unwrap();

        let all = repo.list_donations().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sequence, 1);
        assert_eq!(all[1].sequence, 2);
        assert_eq!(repo.count_donations().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_identifiers() {
        let repo = MemoryConnection::new().create_donation_repository();
        let now = Utc::now();
        let first = donation(1, now);
        repo.store_donation(&first).await.unwrap();

        let mut same_txn = donation(2, now);
        same_txn.transaction_id = first.transaction_id.clone();
        assert!(repo.store_donation(&same_txn).await.is_err());

        let mut same_id = donation(3, now);
        same_id.id = first.id.clone();
        assert!(repo.store_donation(&same_id).await.is_err());

        assert_eq!(repo.count_donations().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first_with_sequence_tiebreak() {
        let repo = MemoryConnection::new().create_donation_repository();
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();

        repo.store_donation(&donation(1, base)).await.unwrap();
        repo.store_donation(&donation(2, base + Duration::days(2))).await.unwrap();
        repo.store_donation(&donation(3, base)).await.unwrap();

        let recent = repo.list_recent_donations(10).await.unwrap();
        let order: Vec<u64> = recent.iter().map(|d| d.sequence).collect();
        assert_eq!(order, vec![2, 3, 1]);

        let limited = repo.list_recent_donations(1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].sequence, 2);
    }

    #[tokio::test]
    async fn test_list_between_is_half_open() {
        let repo = MemoryConnection::new().create_donation_repository();
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();

        repo.store_donation(&donation(1, start)).await.unwrap();
        repo.store_donation(&donation(2, end)).await.unwrap();
        repo.store_donation(&donation(3, start - Duration::seconds(1))).await.unwrap();

        let june = repo.list_donations_between(start, end).await.unwrap();
        assert_eq!(june.len(), 1);
        assert_eq!(june[0].sequence, 1);
    }

    #[tokio::test]
    async fn test_identifier_exists_and_get() {
        let repo = MemoryConnection::new().create_donation_repository();
        let stored = donation(1, Utc::now());
        repo.store_donation(&stored).await.unwrap();

        assert!(repo.identifier_exists(&stored.id).await.unwrap());
        assert!(repo.identifier_exists(&stored.transaction_id).await.unwrap());
        assert!(!repo.identifier_exists("txn_missing").await.unwrap());

        assert_eq!(repo.get_donation(&stored.id).await.unwrap(), Some(stored));
        assert_eq!(repo.get_donation("donation::0::0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_the_same_table() {
        let connection = MemoryConnection::new();
        let writer = connection.create_donation_repository();
        let reader = connection.clone().create_donation_repository();

        writer.store_donation(&donation(1, Utc::now())).await.unwrap();
        assert_eq!(reader.count_donations().await.unwrap(), 1);
    }
}
