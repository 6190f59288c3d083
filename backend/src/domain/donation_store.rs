//! Donation store domain logic.
//!
//! The store owns the append-only collection of completed donations and the
//! aggregate statistics derived from it.
//!
//! ## Business Rules
//!
//! - Only completed donations are stored; failed attempts never get here
//! - `id` and `transaction_id` are unique for the lifetime of the store
//! - Stats are a cache over the records and always equal a full recompute
//! - Totals are kept in integer cents, so they never drift
//! - One submission at a time: id generation, append and stats update happen
//!   under a single write lock

use chrono::{DateTime, Datelike, TimeZone, Utc};
use log::{error, info, warn};
use shared::{
    Amount, DonationConfig, DonationStats, DonationStatus, DonationSummary, MonthlyProgress, RecentDonation,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::commands::donations::SubmitDonationCommand;
use crate::domain::models::donation::Donation;
use crate::domain::validation::DonationValidator;
use crate::io::mappers::donation_mapper::DonationMapper;
use crate::storage::{Connection, DonationStorage};

/// Attempts at drawing a fresh random transaction reference before the store
/// gives up and reports a broken uniqueness guarantee
const TRANSACTION_ID_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The command broke a store precondition. The flow validates first, so
    /// this signals a caller bug.
    #[error("Donation rejected: {0}")]
    InvalidInput(String),
    /// Identifier uniqueness was violated
    #[error("Duplicate donation identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("Donation storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Running totals guarded together with the sequence counter
#[derive(Debug, Default)]
struct Ledger {
    total_raised: Amount,
    donor_count: u64,
    next_sequence: u64,
}

impl Ledger {
    fn stats(&self) -> DonationStats {
        DonationStats::from_totals(self.total_raised, self.donor_count)
    }
}

fn sum_amounts(donations: &[Donation]) -> Result<Amount, StoreError> {
    donations
        .iter()
        .try_fold(Amount::ZERO, |total, d| total.checked_add(d.amount))
        .ok_or_else(|| StoreError::InvalidInput("Donation total overflows".to_string()))
}

/// Half-open `[start, end)` bounds of the UTC calendar month containing `now`
fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

pub struct DonationStore<C: Connection> {
    donation_repository: C::DonationRepository,
    validator: DonationValidator,
    config: DonationConfig,
    ledger: Mutex<Ledger>,
}

impl<C: Connection> DonationStore<C> {
    pub fn new(connection: Arc<C>, config: DonationConfig) -> Self {
        let donation_repository = connection.create_donation_repository();
        Self {
            donation_repository,
            validator: DonationValidator::new(config.clone()),
            config,
            ledger: Mutex::new(Ledger {
                next_sequence: 1,
                ..Ledger::default()
            }),
        }
    }

    /// Build a store preloaded with existing donations (demo data, tests).
    /// Stats are rebuilt with a full recompute.
    pub async fn with_donations(
        connection: Arc<C>,
        config: DonationConfig,
        donations: Vec<Donation>,
    ) -> Result<Self, StoreError> {
        let store = Self::new(connection, config);
        let mut max_sequence = 0;
        for donation in &donations {
            store
                .validator
                .check_donation(donation)
                .map_err(StoreError::InvalidInput)?;
            for identifier in [&donation.id, &donation.transaction_id] {
                if store.donation_repository.identifier_exists(identifier).await? {
                    return Err(StoreError::DuplicateIdentifier(identifier.clone()));
                }
            }
            if donation.id == donation.transaction_id {
                return Err(StoreError::DuplicateIdentifier(donation.id.clone()));
            }
            store.donation_repository.store_donation(donation).await?;
            max_sequence = max_sequence.max(donation.sequence);
        }

        let stats = store.recompute_stats().await?;
        {
            let mut ledger = store.ledger.lock().await;
            ledger.total_raised = stats.total_raised;
            ledger.donor_count = stats.donor_count;
            ledger.next_sequence = max_sequence + 1;
        }
        info!(
            "Loaded {} donations totalling {}",
            stats.donor_count, stats.total_raised
        );
        Ok(store)
    }

    /// Record an authorized donation.
    pub async fn submit(&self, command: SubmitDonationCommand) -> Result<Donation, StoreError> {
        self.validator
            .check_command(&command)
            .map_err(StoreError::InvalidInput)?;

        let mut ledger = self.ledger.lock().await;

        let created_at = Utc::now();
        let sequence = ledger.next_sequence;
        let id = Donation::generate_id(created_at.timestamp_millis(), sequence);
        if self.donation_repository.identifier_exists(&id).await? {
            error!("Generated donation id {} already exists", id);
            return Err(StoreError::DuplicateIdentifier(id));
        }
        let transaction_id = self.fresh_transaction_id(&id).await?;
        let total_raised = ledger.total_raised.checked_add(command.amount).ok_or_else(|| {
            StoreError::InvalidInput(format!("Donation of {} would overflow the running total", command.amount))
        })?;

        let donation = Donation {
            id,
            sequence,
            amount: command.amount,
            currency: self.config.currency,
            donor_name: command.donor_name,
            donor_email: command.donor_email,
            message: command.message,
            is_anonymous: command.is_anonymous,
            payment_method: command.payment_method,
            status: DonationStatus::Completed,
            created_at,
            transaction_id,
            authorization_ref: command.authorization.into_inner(),
        };

        self.donation_repository.store_donation(&donation).await?;

        ledger.next_sequence += 1;
        ledger.total_raised = total_raised;
        ledger.donor_count += 1;

        info!(
            "Accepted donation {} for {} (total {} from {} donors)",
            donation.id, donation.amount, ledger.total_raised, ledger.donor_count
        );
        Ok(donation)
    }

    async fn fresh_transaction_id(&self, donation_id: &str) -> Result<String, StoreError> {
        for _ in 0..TRANSACTION_ID_ATTEMPTS {
            let candidate = Donation::generate_transaction_id();
            if candidate != donation_id && !self.donation_repository.identifier_exists(&candidate).await? {
                return Ok(candidate);
            }
            warn!("Transaction id {} collided, drawing another", candidate);
        }
        error!("Could not generate a unique transaction id for {}", donation_id);
        Err(StoreError::DuplicateIdentifier(format!(
            "no unique transaction id for {}",
            donation_id
        )))
    }

    /// Current aggregate statistics
    pub async fn stats(&self) -> DonationStats {
        self.ledger.lock().await.stats()
    }

    /// Recompute statistics from the stored records
    pub async fn recompute_stats(&self) -> Result<DonationStats, StoreError> {
        let donations = self.donation_repository.list_donations().await?;
        let total = sum_amounts(&donations)?;
        Ok(DonationStats::from_totals(total, donations.len() as u64))
    }

    /// Most recent donations first, with anonymous donors redacted
    pub async fn recent_donations(&self, limit: usize) -> Result<Vec<RecentDonation>, StoreError> {
        let donations = self.donation_repository.list_recent_donations(limit).await?;
        Ok(donations.iter().map(DonationMapper::to_recent).collect())
    }

    /// Progress toward `goal` for the calendar month containing `now`
    pub async fn monthly_progress(&self, goal: Amount, now: DateTime<Utc>) -> Result<MonthlyProgress, StoreError> {
        let (start, end) = month_bounds(now);
        let current = sum_amounts(&self.donation_repository.list_donations_between(start, end).await?)?;

        let percentage = if goal.is_positive() {
            (current.cents() as f64 / goal.cents() as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(MonthlyProgress {
            current,
            goal,
            percentage,
        })
    }

    /// Dashboard projection using the configured goal and list size
    pub async fn summary(&self, now: DateTime<Utc>) -> Result<DonationSummary, StoreError> {
        let goal = Amount::from_major(self.config.monthly_goal);
        Ok(DonationSummary {
            stats: self.stats().await,
            monthly_progress: self.monthly_progress(goal, now).await?,
            recent: self.recent_donations(self.config.recent_limit).await?,
        })
    }

    /// All donations in acceptance order
    pub async fn donations(&self) -> Result<Vec<Donation>, StoreError> {
        Ok(self.donation_repository.list_donations().await?)
    }

    pub async fn get_donation(&self, donation_id: &str) -> Result<Option<Donation>, StoreError> {
        Ok(self.donation_repository.get_donation(donation_id).await?)
    }

    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.donation_repository.count_donations().await?)
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    pub fn config(&self) -> &DonationConfig {
        &self.config
    }
}
