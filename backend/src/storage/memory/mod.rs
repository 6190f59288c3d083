//! Memory-resident storage backend.

pub mod connection;
pub mod donation_repository;

pub use connection::MemoryConnection;
pub use donation_repository::DonationRepository;
