//! Business logic services

pub mod books;
pub mod uploads;

use crate::repository::SharedBookStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services on top of the given store and upload directory
    pub fn new(store: SharedBookStore, uploads: uploads::UploadStore) -> Self {
        Self {
            books: books::BooksService::new(store, uploads),
        }
    }
}
