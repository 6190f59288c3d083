use std::path::PathBuf;

use chrono::Utc;
use donations_backend::config::{self, CONFIG_PATH_ENV};
use donations_backend::domain::FlowState;
use donations_backend::initialize_backend;
use shared::{DonationDraft, PaymentMethod};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = config::load(config_path.as_deref())?;

    let app_state = initialize_backend(config, true).await?;
    let flow = app_state.new_donation_flow();
    flow.open_form()?;

    // A too-small gift is caught by the form before any payment call
    let mut draft = DonationDraft {
        amount_input: "0.99".to_string(),
        donor_name: "Demo Donor".to_string(),
        donor_email: "demo@example.org".to_string(),
        message: "Blessings from the demo".to_string(),
        is_anonymous: false,
        payment_method: Some(PaymentMethod::Card),
        payment_token: "tok_visa".to_string(),
    };
    if let FlowState::FormOpen { errors, .. } = flow.submit(draft.clone()).await? {
        for (field, message) in &errors {
            warn!(field = field.as_str(), "{}", message);
        }
    }

    draft.amount_input = "25.00".to_string();
    match flow.submit(draft).await? {
        FlowState::Succeeded { donation } => {
            info!(id = %donation.id, transaction_id = %donation.transaction_id, "Donation accepted");
            if let Some(message) = flow.success_message() {
                info!("{}", message);
            }
            flow.close()?;
        }
        FlowState::Failed { message, .. } => warn!("Donation failed: {}", message),
        other => warn!("Unexpected flow state: {}", other.name()),
    }

    let summary = app_state.donation_store.summary(Utc::now()).await?;
    info!(
        total = %summary.stats.total_raised,
        donors = summary.stats.donor_count,
        average = summary.stats.average_donation,
        "Donation stats"
    );
    info!(
        current = %summary.monthly_progress.current,
        goal = %summary.monthly_progress.goal,
        "Monthly progress {:.1}%",
        summary.monthly_progress.percentage
    );
    for recent in &summary.recent {
        info!("{} gave {} on {}", recent.donor_name, recent.amount, recent.created_at);
    }

    Ok(())
}
