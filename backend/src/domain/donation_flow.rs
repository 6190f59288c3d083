//! Donation flow state machine.
//!
//! Drives one donor's attempt to give:
//! `Idle → FormOpen → Submitting → {Succeeded, Failed}`.
//!
//! Validation runs before the payment collaborator is contacted. The store is
//! touched exactly once, after authorization succeeds. Validation and
//! authorization problems become flow state; only illegal transitions are
//! returned as [`FlowError`].

use log::{error, info, warn};
use shared::{DonationConfig, DonationDraft, DonationRecord, FieldErrors};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::commands::donations::SubmitDonationCommand;
use crate::domain::donation_store::{DonationStore, StoreError};
use crate::domain::models::donation::Donation;
use crate::domain::payment::{PaymentAuthorizer, PaymentDetails};
use crate::domain::validation::DonationValidator;
use crate::io::mappers::donation_mapper::DonationMapper;
use crate::storage::Connection;

/// Shown when the store refuses an authorized donation
const RECORDING_FAILED_MESSAGE: &str = "We couldn't record your donation. Please try again.";

/// Shown when a submission was abandoned before it finished
const INTERRUPTED_MESSAGE: &str = "Your donation was interrupted before it was recorded. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    FormOpen { draft: DonationDraft, errors: FieldErrors },
    Submitting { draft: DonationDraft },
    Succeeded { donation: Donation },
    Failed { draft: DonationDraft, message: String },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::FormOpen { .. } => "form open",
            FlowState::Submitting { .. } => "submitting",
            FlowState::Succeeded { .. } => "succeeded",
            FlowState::Failed { .. } => "failed",
        }
    }

    fn form(draft: DonationDraft) -> Self {
        FlowState::FormOpen {
            draft,
            errors: FieldErrors::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    #[error("A donation is already being submitted")]
    SubmissionInProgress,
}

/// Held while a submission is in flight. Dropping it without [`finish`]
/// (the submit future was cancelled, or the authorizer panicked) moves the
/// flow from Submitting to Failed so the donor can retry.
///
/// [`finish`]: InFlight::finish
struct InFlight<'a> {
    state: &'a Mutex<FlowState>,
    draft: Option<DonationDraft>,
}

impl InFlight<'_> {
    fn finish(mut self) -> DonationDraft {
        self.draft.take().unwrap_or_default()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, FlowState::Submitting { .. }) {
            warn!("Donation submission abandoned while in flight");
            *state = FlowState::Failed {
                draft,
                message: INTERRUPTED_MESSAGE.to_string(),
            };
        }
    }
}

pub struct DonationFlowController<C: Connection> {
    store: Arc<DonationStore<C>>,
    authorizer: Arc<dyn PaymentAuthorizer>,
    validator: DonationValidator,
    state: Mutex<FlowState>,
}

impl<C: Connection> DonationFlowController<C> {
    /// Flow using the store's own form limits
    pub fn new(store: Arc<DonationStore<C>>, authorizer: Arc<dyn PaymentAuthorizer>) -> Self {
        let config = store.config().clone();
        Self::with_config(store, authorizer, config)
    }

    pub fn with_config(
        store: Arc<DonationStore<C>>,
        authorizer: Arc<dyn PaymentAuthorizer>,
        config: DonationConfig,
    ) -> Self {
        Self {
            store,
            authorizer,
            validator: DonationValidator::new(config),
            state: Mutex::new(FlowState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `next` to the current state. `None` means the action is not
    /// allowed from there.
    fn transition(
        &self,
        action: &'static str,
        next: impl FnOnce(&FlowState) -> Option<FlowState>,
    ) -> Result<FlowState, FlowError> {
        let mut state = self.lock_state();
        match next(&*state) {
            Some(new_state) => {
                info!("Donation flow: {} -> {} ({})", state.name(), new_state.name(), action);
                *state = new_state;
                Ok(state.clone())
            }
            None if matches!(*state, FlowState::Submitting { .. }) => Err(FlowError::SubmissionInProgress),
            None => Err(FlowError::InvalidTransition {
                action,
                state: state.name(),
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FlowState {
        self.lock_state().clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(*self.lock_state(), FlowState::Submitting { .. })
    }

    /// Field-level validation messages; empty outside of FormOpen
    pub fn field_errors(&self) -> FieldErrors {
        match &*self.lock_state() {
            FlowState::FormOpen { errors, .. } => errors.clone(),
            _ => FieldErrors::new(),
        }
    }

    /// Failed-state message, if any
    pub fn error_message(&self) -> Option<String> {
        match &*self.lock_state() {
            FlowState::Failed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// The accepted donation for the confirmation screen
    pub fn confirmation(&self) -> Option<DonationRecord> {
        match &*self.lock_state() {
            FlowState::Succeeded { donation } => Some(DonationMapper::to_dto(donation)),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<String> {
        match &*self.lock_state() {
            FlowState::Succeeded { donation } => Some(self.validator.success_message(donation.amount)),
            _ => None,
        }
    }

    /// Idle/Succeeded → FormOpen with an empty form
    pub fn open_form(&self) -> Result<FlowState, FlowError> {
        self.transition("open the form", |state| match state {
            FlowState::Idle | FlowState::Succeeded { .. } => Some(FlowState::form(DonationDraft {
                payment_method: Some(Default::default()),
                ..DonationDraft::default()
            })),
            _ => None,
        })
    }

    /// Keep the typed values; clears stale field errors
    pub fn update_draft(&self, draft: DonationDraft) -> Result<FlowState, FlowError> {
        self.transition("edit the form", |state| match state {
            FlowState::FormOpen { .. } => Some(FlowState::form(draft)),
            _ => None,
        })
    }

    /// FormOpen/Failed → Idle
    pub fn cancel(&self) -> Result<FlowState, FlowError> {
        self.transition("cancel", |state| match state {
            FlowState::FormOpen { .. } | FlowState::Failed { .. } => Some(FlowState::Idle),
            _ => None,
        })
    }

    /// Failed → FormOpen with the values the donor entered
    pub fn dismiss_error(&self) -> Result<FlowState, FlowError> {
        self.transition("dismiss the error", |state| match state {
            FlowState::Failed { draft, .. } => Some(FlowState::form(draft.clone())),
            _ => None,
        })
    }

    /// Succeeded → Idle. The stored donation is unaffected.
    pub fn close(&self) -> Result<FlowState, FlowError> {
        self.transition("close", |state| match state {
            FlowState::Succeeded { .. } => Some(FlowState::Idle),
            _ => None,
        })
    }

    /// Validate, authorize and record a donation.
    ///
    /// Allowed from FormOpen, and from Failed as a retry. Rejected with
    /// [`FlowError::SubmissionInProgress`] while another submit on this
    /// controller is awaiting authorization.
    pub async fn submit(&self, draft: DonationDraft) -> Result<FlowState, FlowError> {
        let validated = {
            let mut state = self.lock_state();
            match &*state {
                FlowState::FormOpen { .. } | FlowState::Failed { .. } => {}
                FlowState::Submitting { .. } => {
                    warn!("Ignoring submit while a donation is in flight");
                    return Err(FlowError::SubmissionInProgress);
                }
                other => {
                    return Err(FlowError::InvalidTransition {
                        action: "submit",
                        state: other.name(),
                    })
                }
            }

            match self.validator.validate(&draft) {
                Ok(validated) => {
                    info!("Donation flow: {} -> submitting", state.name());
                    *state = FlowState::Submitting { draft: draft.clone() };
                    validated
                }
                Err(errors) => {
                    info!("Donation form rejected: {} invalid field(s)", errors.len());
                    *state = FlowState::FormOpen { draft, errors };
                    return Ok(state.clone());
                }
            }
        };
        let in_flight = InFlight {
            state: &self.state,
            draft: Some(draft),
        };

        let details = PaymentDetails {
            method: validated.payment_method,
            token: validated.payment_token.clone(),
            amount: validated.amount,
            currency: self.store.config().currency,
        };

        let outcome = match self.authorizer.authorize(&details).await {
            Ok(authorization) => {
                let command = SubmitDonationCommand {
                    amount: validated.amount,
                    donor_name: validated.donor_name,
                    donor_email: validated.donor_email,
                    message: validated.message,
                    is_anonymous: validated.is_anonymous,
                    payment_method: validated.payment_method,
                    authorization,
                };
                self.store.submit(command).await.map_err(|e| {
                    match &e {
                        StoreError::DuplicateIdentifier(_) => error!("Donation identifier invariant broken: {}", e),
                        _ => error!("Authorized donation was not recorded: {}", e),
                    }
                    RECORDING_FAILED_MESSAGE.to_string()
                })
            }
            Err(auth_error) => {
                warn!("Payment authorization failed: {}", auth_error);
                Err(auth_error.message)
            }
        };

        let draft = in_flight.finish();
        let mut state = self.lock_state();
        *state = match outcome {
            Ok(donation) => {
                info!("Donation flow: submitting -> succeeded ({})", donation.id);
                FlowState::Succeeded { donation }
            }
            Err(message) => {
                info!("Donation flow: submitting -> failed");
                FlowState::Failed { draft, message }
            }
        };
        Ok(state.clone())
    }
}
