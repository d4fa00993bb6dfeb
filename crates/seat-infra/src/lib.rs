//! # Seat Infrastructure
//!
//! Concrete implementations of the ports defined in `seat-core`.
//! This crate contains the document store adapters and password hashing.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `mongodb` - MongoDB document store support
//! - `auth` - Argon2 password hashing

pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use store::{InMemoryPostStore, InMemoryUserStore};

#[cfg(feature = "auth")]
pub use auth::Argon2PasswordService;

// Re-exports - MongoDB
#[cfg(feature = "mongodb")]
pub use store::{MongoConfig, MongoConnections, MongoPostStore, MongoUserStore};
