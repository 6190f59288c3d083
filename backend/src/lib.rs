//! # Donations Backend
//!
//! Non-UI logic for the worship community app's donation feature.
//!
//! - **Domain**: donation store, donation flow and their business rules
//! - **Storage**: memory-resident donation records behind storage traits
//! - **IO**: mapping domain donations to the `shared` DTOs the UI renders
//! - **Config**: form limits and dashboard settings
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (donation form, dashboard widgets)
//!     ↓
//! DonationFlowController (one per donor session)
//!     ↓
//! DonationStore (shared, injected by Arc)
//!     ↓
//! Storage Layer (in-memory repository)
//! ```
//!
//! There is no global store: callers build an [`AppState`] with
//! [`initialize_backend`] and hand out flows from it.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use chrono::Utc;
use log::info;
use shared::DonationConfig;
use std::sync::Arc;

use crate::domain::{seed, DonationFlowController, DonationStore, PaymentAuthorizer, SimulatedPaymentGateway};
use crate::storage::MemoryConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub donation_store: Arc<DonationStore<MemoryConnection>>,
    pub payment_authorizer: Arc<dyn PaymentAuthorizer>,
}

impl AppState {
    /// Start a new flow instance for one donor session
    pub fn new_donation_flow(&self) -> DonationFlowController<MemoryConnection> {
        DonationFlowController::new(self.donation_store.clone(), self.payment_authorizer.clone())
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: DonationConfig, with_demo_data: bool) -> anyhow::Result<AppState> {
    config::validate(&config)?;

    info!("Setting up in-memory donation storage");
    let connection = Arc::new(MemoryConnection::new());

    let donation_store = if with_demo_data {
        info!("Loading demo donations");
        DonationStore::with_donations(connection, config, seed::demo_donations(Utc::now())).await?
    } else {
        DonationStore::new(connection, config)
    };

    info!("Setting up simulated payment gateway");
    Ok(AppState {
        donation_store: Arc::new(donation_store),
        payment_authorizer: Arc::new(SimulatedPaymentGateway::new()),
    })
}
