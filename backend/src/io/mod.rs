//! # IO Module
//!
//! Adapter layer between the presentation layer and the domain logic. It
//! turns domain donations into the `shared` DTOs the UI renders.

pub mod mappers;
