//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use std::any::Any;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Form, Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, INTERNAL_ERROR_BODY},
    AppState,
};

/// Request body extractor for JSON and urlencoded forms
///
/// Rejections use the application error shape. Any other content type yields
/// an empty payload, so the validation rules report the missing fields.
pub struct Payload<T>(pub T);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Other;
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("application/json") || essence.to_ascii_lowercase().ends_with("+json") {
        BodyKind::Json
    } else if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()));

        match kind {
            BodyKind::Json => match Json::<T>::from_request(req, state).await {
                Ok(Json(value)) => Ok(Payload(value)),
                Err(rejection) => Err(json_rejection_error(rejection)),
            },
            BodyKind::Form => match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => Ok(Payload(value)),
                Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
            },
            BodyKind::Other => Ok(Payload(T::default())),
        }
    }
}

/// Well-formed JSON of the wrong shape is a client error; an unreadable body is not
fn json_rejection_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(_) => AppError::BadRequest(rejection.body_text()),
        _ => AppError::Internal(rejection.body_text()),
    }
}

/// Fallback for panics raised while handling a request
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Unhandled error while serving request: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        INTERNAL_ERROR_BODY,
    )
        .into_response()
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let max_upload_bytes = state.config.uploads.max_bytes;

    let routes = Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/cover-image/:id", patch(books::update_book_cover))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body, Bytes};
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        repository::MemoryBookStore,
        services::{uploads::UploadStore, Services},
    };

    fn app() -> Router {
        let config = AppConfig::default();
        let services = Services::new(
            Arc::new(MemoryBookStore::new()),
            UploadStore::from_config(&config.uploads),
        );
        create_router(AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }

    async fn post_books(content_type: &str, body: &'static str) -> (StatusCode, Bytes) {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/books")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        (status, to_bytes(response.into_body(), usize::MAX).await.unwrap())
    }

    #[test]
    fn body_kind_from_content_type() {
        assert_eq!(body_kind(Some("application/json")), BodyKind::Json);
        assert_eq!(body_kind(Some("Application/JSON; charset=utf-8")), BodyKind::Json);
        assert_eq!(body_kind(Some("application/merge-patch+json")), BodyKind::Json);
        assert_eq!(
            body_kind(Some("application/x-www-form-urlencoded")),
            BodyKind::Form
        );
        assert_eq!(body_kind(Some("text/plain")), BodyKind::Other);
        assert_eq!(body_kind(None), BodyKind::Other);
    }

    #[tokio::test]
    async fn unknown_content_type_reports_every_field() {
        let (status, bytes) = post_books("text/plain", "title=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"ISBN"));
    }

    #[tokio::test]
    async fn urlencoded_body_creates_book() {
        let (status, bytes) = post_books(
            "application/x-www-form-urlencoded",
            "title=Form+Book&author=Someone&publishedDate=2023-07-15&ISBN=1234567890",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["title"], "Form Book");
        assert_eq!(body["ISBN"], "1234567890");
    }

    #[tokio::test]
    async fn malformed_json_is_plain_text_500() {
        let (status, bytes) = post_books("application/json", "{\"title\": ").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&bytes[..], INTERNAL_ERROR_BODY.as_bytes());
    }

    #[tokio::test]
    async fn wrongly_shaped_json_is_bad_request() {
        let (status, bytes) = post_books("application/json", "\"just a title\"").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let request = axum::http::Request::builder().uri("/books").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"[]");
    }

    #[tokio::test]
    async fn panic_handler_returns_plain_text_500() {
        let response = handle_panic(Box::new("kaboom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], INTERNAL_ERROR_BODY.as_bytes());
    }
}
