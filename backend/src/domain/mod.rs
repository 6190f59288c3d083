//! # Domain Module
//!
//! Business logic for community donations, independent of the UI and of the
//! storage backend.
//!
//! ## Module Organization
//!
//! - **donation_store**: Completed donations, derived stats and read projections
//! - **donation_flow**: The donor-facing submission state machine
//! - **validation**: Form rules, amount parsing and display helpers
//! - **payment**: Payment authorization collaborator and its stub
//! - **seed**: Mock donations for the demo dashboard
//!
//! ## Business Rules
//!
//! - Donations are at least the configured minimum (1.00 by default)
//! - Name and a well-formed email are required unless the donor is anonymous
//! - Anonymous donors are shown as "Anonymous" everywhere public
//! - A donation is recorded only after payment authorization succeeds
//! - Recorded donations are never changed or removed

pub mod commands;
pub mod donation_flow;
pub mod donation_store;
pub mod models;
pub mod payment;
pub mod seed;
pub mod validation;

pub use donation_flow::*;
pub use donation_store::*;
pub use payment::*;
pub use validation::*;
