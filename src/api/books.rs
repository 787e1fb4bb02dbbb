//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Payload;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    services::uploads::UploadedFile,
    AppState,
};

/// Multipart field carrying the cover image
pub const COVER_IMAGE_FIELD: &str = "coverImage";

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Multipart form accepted by the cover image endpoint
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct CoverImageForm {
    #[serde(rename = "coverImage")]
    #[schema(value_type = String, format = Binary)]
    pub cover_image: Vec<u8>,
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 400, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(book))
}

/// Update some or all fields of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Validation failed or malformed ID", body = crate::error::ValidationErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(&id, payload).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

/// Upload a cover image for a book
#[utoipa::path(
    patch,
    path = "/books/cover-image/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body(content = CoverImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Book, with coverImage set when a file was sent", body = Book),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Unexpected or unreadable file part", body = String, content_type = "text/plain")
    )
)]
pub async fn update_book_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Option<Multipart>,
) -> AppResult<Json<Book>> {
    let file = match multipart {
        Some(multipart) => read_cover_image(multipart).await?,
        None => None,
    };
    let book = state.services.books.update_cover_image(&id, file).await?;
    Ok(Json(book))
}

/// Pull the single `coverImage` file out of the form; other text parts are ignored
async fn read_cover_image(mut multipart: Multipart) -> AppResult<Option<UploadedFile>> {
    let mut cover = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(format!("Multipart error: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if field.name() != Some(COVER_IMAGE_FIELD) || cover.is_some() {
            return Err(AppError::Internal(format!(
                "Unexpected field: {}",
                field.name().unwrap_or_default()
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("Multipart error: {}", e)))?;
        cover = Some(UploadedFile {
            file_name: Some(file_name),
            bytes: bytes.to_vec(),
        });
    }

    Ok(cover)
}
