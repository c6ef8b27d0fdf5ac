//! Driven adapters implementing the domain's outbound ports.
//!
//! - **persistence**: PostgreSQL repositories over Diesel
//! - **security**: JWT bearer tokens and Argon2 password hashing
//!
//! Adapters translate between infrastructure types and domain types and hold
//! no business rules.

pub mod persistence;
pub mod security;
