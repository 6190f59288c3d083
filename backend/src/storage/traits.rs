//! # Storage Traits
//!
//! Storage abstraction traits that let different donation backends be used
//! interchangeably by the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::donation::Donation;

/// Trait defining the interface for donation storage operations
///
/// Donations are append-only: there is no update or delete.
#[async_trait]
pub trait DonationStorage: Send + Sync {
    /// Append a new donation. Fails if its `id` or `transaction_id` is
    /// already present.
    async fn store_donation(&self, donation: &Donation) -> Result<()>;

    /// Retrieve a donation by ID
    async fn get_donation(&self, donation_id: &str) -> Result<Option<Donation>>;

    /// All donations in insertion order
    async fn list_donations(&self) -> Result<Vec<Donation>>;

    /// Most recent donations first (by `created_at`, then sequence),
    /// truncated to `limit`
    async fn list_recent_donations(&self, limit: usize) -> Result<Vec<Donation>>;

    /// Donations with `start <= created_at < end`
    async fn list_donations_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Donation>>;

    /// True if any stored donation uses `identifier` as its `id` or its
    /// `transaction_id`
    async fn identifier_exists(&self, identifier: &str) -> Result<bool>;

    /// Number of stored donations
    async fn count_donations(&self) -> Result<usize>;
}

/// Trait defining the interface for storage connections
///
/// Provides factory methods for repositories so the domain layer never needs
/// to know which backend it is running against.
pub trait Connection: Send + Sync + Clone {
    /// The type of DonationStorage this connection creates
    type DonationRepository: DonationStorage;

    /// Create a new donation repository for this connection
    fn create_donation_repository(&self) -> Self::DonationRepository;
}
