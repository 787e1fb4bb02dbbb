//! In-process book store, insertion ordered

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<IndexMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> AppResult<Book> {
        let book = Book::from_new(Uuid::new_v4(), book);
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.books.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn update_by_id(&self, id: Uuid, changes: &BookChanges) -> AppResult<Option<Book>> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(&id).map(|book| {
            book.apply(changes);
            book.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        // shift_remove keeps the remaining books in insertion order
        Ok(self.books.write().await.shift_remove(&id))
    }
}
