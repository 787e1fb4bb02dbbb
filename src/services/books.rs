//! Book catalog service

use uuid::Uuid;

use super::uploads::{UploadStore, UploadedFile};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChanges, CreateBook, NewBook, UpdateBook},
    repository::SharedBookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: SharedBookStore,
    uploads: UploadStore,
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| AppError::BadRequest(format!("Invalid book id: {}", e)))
}

impl BooksService {
    pub fn new(store: SharedBookStore, uploads: UploadStore) -> Self {
        Self { store, uploads }
    }

    /// Validate and persist a new book
    pub async fn create(&self, payload: CreateBook) -> AppResult<Book> {
        let data = NewBook::try_from(payload)?;
        let book = self.store.create(data).await?;
        tracing::info!("Created book id={}", book.id);
        Ok(book)
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.find_all().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::book_not_found)
    }

    /// Apply the fields present in `payload`; an empty payload returns the book unchanged
    pub async fn update(&self, id: &str, payload: UpdateBook) -> AppResult<Book> {
        let changes = BookChanges::try_from(payload)?;
        let id = parse_id(id)?;
        let book = self
            .store
            .update_by_id(id, &changes)
            .await?
            .ok_or_else(AppError::book_not_found)?;
        tracing::info!("Updated book id={}", book.id);
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let id = parse_id(id)?;
        self.store
            .delete_by_id(id)
            .await?
            .ok_or_else(AppError::book_not_found)?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Store `file` (if any) and record its path as the book's cover image
    pub async fn update_cover_image(&self, id: &str, file: Option<UploadedFile>) -> AppResult<Book> {
        let id = parse_id(id)?;
        let book = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::book_not_found)?;

        let Some(file) = file else {
            tracing::debug!("No cover image attached for book id={}", id);
            return Ok(book);
        };

        let path = self.uploads.store(&file).await?;
        let book = self
            .store
            .update_by_id(id, &BookChanges::cover_image(path))
            .await?
            .ok_or_else(AppError::book_not_found)?;
        tracing::info!("Updated cover image for book id={}", book.id);
        Ok(book)
    }
}
