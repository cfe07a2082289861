//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and the login adapter
//! - **password**: argon2 hashing shared by login and account bootstrap
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod password;
pub mod persistence;
