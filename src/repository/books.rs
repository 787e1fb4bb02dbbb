//! PostgreSQL book store

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use super::BookStore;
use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::book::{Book, BookChanges, NewBook},
};

const BOOK_COLUMNS: &str = "id, title, author, published_date, isbn, cover_image";

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// `column = $n` assignments for the provided fields; `$1` is reserved for the id
fn set_clauses(changes: &BookChanges) -> Vec<String> {
    let mut sets = Vec::new();

    macro_rules! add_field {
        ($field:expr, $name:expr) => {
            if $field.is_some() {
                sets.push(format!("{} = ${}", $name, sets.len() + 2));
            }
        };
    }

    add_field!(changes.title, "title");
    add_field!(changes.author, "author");
    add_field!(changes.published_date, "published_date");
    add_field!(changes.isbn, "isbn");
    add_field!(changes.cover_image, "cover_image");

    sets
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn create(&self, book: NewBook) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (id, title, author, published_date, isbn)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(Uuid::new_v4())
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.published_date)
            .bind(&book.isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_by_id(&self, id: Uuid, changes: &BookChanges) -> AppResult<Option<Book>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let sets = set_clauses(changes);

        let query = format!(
            "UPDATE books SET {} WHERE id = $1 RETURNING {BOOK_COLUMNS}",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, Book>(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.title);
        bind_field!(changes.author);
        bind_field!(changes.published_date);
        bind_field!(changes.isbn);
        bind_field!(changes.cover_image);

        let row = builder.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let query = format!("DELETE FROM books WHERE id = $1 RETURNING {BOOK_COLUMNS}");
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
