//! # Storage Module
//!
//! Holds donation records for the lifetime of the process.
//!
//! The domain layer only talks to the [`DonationStorage`] trait and obtains
//! repositories through a [`Connection`], so the memory-resident backend can
//! be replaced without touching the donation store or the flow controller.
//! Nothing here is durable across restarts.

pub mod memory;
pub mod traits;

pub use memory::{DonationRepository, MemoryConnection};
pub use traits::{Connection, DonationStorage};
