//! Persistence layer for books.
//!
//! The service only depends on [`BookStore`]; the engine is picked once at
//! startup from `database.url` and shared as an [`Arc<dyn BookStore>`].

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

pub use books::PgBookStore;
pub use memory::MemoryBookStore;

/// Capability set the book service needs from a store
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book; the store assigns its id
    async fn create(&self, book: NewBook) -> AppResult<Book>;

    /// Every book, in insertion order
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// Apply `changes` and return the updated book, or `None` if `id` is unknown
    async fn update_by_id(&self, id: Uuid, changes: &BookChanges) -> AppResult<Option<Book>>;

    /// Remove the book and return it, or `None` if `id` is unknown
    async fn delete_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;
}

pub type SharedBookStore = Arc<dyn BookStore>;

/// Open the store described by `config`, running migrations for PostgreSQL
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<SharedBookStore> {
    if config.is_memory() {
        tracing::warn!("Using in-memory book store; data is lost on shutdown");
        return Ok(Arc::new(MemoryBookStore::new()));
    }

    let store = PgBookStore::connect(config).await?;
    tracing::info!("Connected to database");

    store.migrate().await?;
    tracing::info!("Database migrations completed");

    Ok(Arc::new(store))
}
