use std::sync::{Arc, RwLock};

use crate::domain::models::donation::Donation;
use crate::storage::traits::Connection;

/// MemoryConnection owns the shared in-process donation table.
///
/// Cloning the connection shares the same table, so every repository created
/// from it sees the same records.
#[derive(Clone, Default)]
pub struct MemoryConnection {
    donations: Arc<RwLock<Vec<Donation>>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn donations(&self) -> &Arc<RwLock<Vec<Donation>>> {
        &self.donations
    }
}

impl Connection for MemoryConnection {
    type DonationRepository = super::donation_repository::DonationRepository;

    fn create_donation_repository(&self) -> Self::DonationRepository {
        super::donation_repository::DonationRepository::new(self.clone())
    }
}
