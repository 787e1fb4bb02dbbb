//! Data models for Bookshelf

pub mod book;
pub mod scalar;
pub mod validation;

// Re-export commonly used types
pub use book::{Book, BookChanges, CreateBook, NewBook, UpdateBook};
pub use validation::FieldError;
