//! Domain-level command types
//! These structs are used by services inside the domain layer. The
//! presentation layer works with the DTOs in the `shared` crate.

pub mod donations {
    use crate::domain::payment::AuthorizationRef;
    use shared::{Amount, PaymentMethod};

    /// Input for recording an authorized donation in the store.
    ///
    /// Callers validate the form first; the store only re-checks the
    /// preconditions.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SubmitDonationCommand {
        pub amount: Amount,
        pub donor_name: String,
        pub donor_email: String,
        pub message: Option<String>,
        pub is_anonymous: bool,
        pub payment_method: PaymentMethod,
        pub authorization: AuthorizationRef,
    }
}
