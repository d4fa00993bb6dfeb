//! Document store adapters.

mod memory;

#[cfg(feature = "mongodb")]
mod document;
#[cfg(feature = "mongodb")]
mod mongo;

pub use memory::{InMemoryPostStore, InMemoryUserStore};

#[cfg(feature = "mongodb")]
pub use mongo::{MongoConfig, MongoConnections, MongoPostStore, MongoUserStore};
