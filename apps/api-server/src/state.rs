//! Application state - shared across all handlers.

use std::sync::Arc;

use seat_core::ports::{PasswordService, PostStore, UserStore};
use seat_infra::{
    Argon2PasswordService, InMemoryPostStore, InMemoryUserStore, MongoConfig, MongoConnections,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub users: Arc<dyn UserStore>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(mongo: Option<&MongoConfig>) -> Self {
        let (posts, users): (Arc<dyn PostStore>, Arc<dyn UserStore>) = match mongo {
            Some(config) => match MongoConnections::init(config).await {
                Ok(connections) => (Arc::new(connections.posts), Arc::new(connections.users)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to MongoDB: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory_stores()
                }
            },
            None => {
                tracing::warn!("MONGODB_URI not set. Running with the in-memory store.");
                Self::in_memory_stores()
            }
        };

        tracing::info!("Application state initialized");

        Self {
            posts,
            users,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    fn in_memory_stores() -> (Arc<dyn PostStore>, Arc<dyn UserStore>) {
        (
            Arc::new(InMemoryPostStore::new()),
            Arc::new(InMemoryUserStore::new()),
        )
    }
}
