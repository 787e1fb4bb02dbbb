//! Book model, request payloads and validation rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateLength, ValidationErrors};

use super::scalar;
use super::validation::{flatten_errors, rule_error, FieldError};
use crate::error::{AppError, AppResult};

/// Wire names of the validated fields, in reporting order
pub const BOOK_FIELDS: [&str; 4] = ["title", "author", "publishedDate", "ISBN"];

const ISBN_MIN_LEN: u64 = 10;
const ISBN_MAX_LEN: u64 = 13;

/// Accepted input layouts for `publishedDate`
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(rename = "publishedDate")]
    pub published_date: NaiveDate,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    /// Stored path of the uploaded cover image
    #[serde(rename = "coverImage", default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Book {
    pub fn from_new(id: Uuid, data: NewBook) -> Self {
        Self {
            id,
            title: data.title,
            author: data.author,
            published_date: data.published_date,
            isbn: data.isbn,
            cover_image: None,
        }
    }

    /// Apply the provided fields, leaving the others untouched
    pub fn apply(&mut self, changes: &BookChanges) {
        if let Some(ref title) = changes.title {
            self.title = title.clone();
        }
        if let Some(ref author) = changes.author {
            self.author = author.clone();
        }
        if let Some(published_date) = changes.published_date {
            self.published_date = published_date;
        }
        if let Some(ref isbn) = changes.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(ref cover_image) = changes.cover_image {
            self.cover_image = Some(cover_image.clone());
        }
    }
}

/// Create book request
///
/// Missing fields deserialize as empty strings so they are reported by the
/// validation rules instead of failing body parsing. Numbers and booleans are
/// read as text.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateBook {
    #[serde(deserialize_with = "scalar::string")]
    pub title: String,
    #[serde(deserialize_with = "scalar::string")]
    pub author: String,
    #[serde(rename = "publishedDate", deserialize_with = "scalar::string")]
    #[schema(example = "2023-07-15")]
    pub published_date: String,
    #[serde(rename = "ISBN", deserialize_with = "scalar::string")]
    #[schema(example = "1234567890123")]
    pub isbn: String,
}

/// Update book request, every field optional
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateBook {
    #[serde(deserialize_with = "scalar::optional_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar::optional_string")]
    pub author: Option<String>,
    #[serde(rename = "publishedDate", deserialize_with = "scalar::optional_string")]
    pub published_date: Option<String>,
    #[serde(rename = "ISBN", deserialize_with = "scalar::optional_string")]
    pub isbn: Option<String>,
    /// Stored cover path; not validated
    #[serde(rename = "coverImage", deserialize_with = "scalar::optional_string")]
    pub cover_image: Option<String>,
}

/// Validated creation data handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_date: NaiveDate,
    pub isbn: String,
}

/// Validated partial update handed to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.published_date.is_none()
            && self.isbn.is_none()
            && self.cover_image.is_none()
    }

    pub fn cover_image(path: String) -> Self {
        Self {
            cover_image: Some(path),
            ..Self::default()
        }
    }
}

pub fn parse_published_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn check_not_empty(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &'static str) {
    if !value.validate_length(Some(1), None, None) {
        errors.add(field, rule_error("required", message));
    }
}

fn check_date(errors: &mut ValidationErrors, value: &str) {
    if parse_published_date(value).is_none() {
        errors.add("publishedDate", rule_error("date", "Published date must be a valid date"));
    }
}

fn check_isbn(errors: &mut ValidationErrors, value: &str, empty_message: &'static str) {
    check_not_empty(errors, "ISBN", value, empty_message);
    if !value.validate_length(Some(ISBN_MIN_LEN), Some(ISBN_MAX_LEN), None) {
        errors.add("ISBN", rule_error("length", "ISBN must be between 10 and 13 characters"));
    }
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Validate for CreateBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_empty(&mut errors, "title", &self.title, "Title is required");
        check_not_empty(&mut errors, "author", &self.author, "Author is required");
        check_date(&mut errors, &self.published_date);
        check_isbn(&mut errors, &self.isbn, "ISBN is required");
        into_result(errors)
    }
}

impl Validate for UpdateBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ref title) = self.title {
            check_not_empty(&mut errors, "title", title, "Title cannot be empty");
        }
        if let Some(ref author) = self.author {
            check_not_empty(&mut errors, "author", author, "Author cannot be empty");
        }
        if let Some(ref published_date) = self.published_date {
            check_date(&mut errors, published_date);
        }
        if let Some(ref isbn) = self.isbn {
            check_isbn(&mut errors, isbn, "ISBN cannot be empty");
        }
        into_result(errors)
    }
}

/// Run the payload's rules and return every violation in reporting order
pub fn field_errors<T: Validate>(payload: &T) -> Vec<FieldError> {
    match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten_errors(&errors, &BOOK_FIELDS),
    }
}

impl TryFrom<CreateBook> for NewBook {
    type Error = AppError;

    fn try_from(payload: CreateBook) -> AppResult<Self> {
        let errors = field_errors(&payload);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let published_date = parse_published_date(&payload.published_date)
            .ok_or_else(|| AppError::Internal("validated date failed to parse".to_string()))?;
        Ok(Self {
            title: payload.title,
            author: payload.author,
            published_date,
            isbn: payload.isbn,
        })
    }
}

impl TryFrom<UpdateBook> for BookChanges {
    type Error = AppError;

    fn try_from(payload: UpdateBook) -> AppResult<Self> {
        let errors = field_errors(&payload);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let published_date = match payload.published_date {
            Some(ref value) => Some(
                parse_published_date(value)
                    .ok_or_else(|| AppError::Internal("validated date failed to parse".to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            title: payload.title,
            author: payload.author,
            published_date,
            isbn: payload.isbn,
            cover_image: payload.cover_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateBook {
        CreateBook {
            title: "Test Book".to_string(),
            author: "Test Author".to_string(),
            published_date: "2023-07-15".to_string(),
            isbn: "1234567890123".to_string(),
        }
    }

    fn messages(errors: &[FieldError]) -> Vec<(&str, &str)> {
        errors.iter().map(|e| (e.field.as_str(), e.message.as_str())).collect()
    }

    #[test]
    fn valid_create_has_no_errors() {
        assert!(field_errors(&valid_create()).is_empty());
        let book = NewBook::try_from(valid_create()).unwrap();
        assert_eq!(book.published_date, NaiveDate::from_ymd_opt(2023, 7, 15).unwrap());
    }

    #[test]
    fn empty_create_reports_every_rule_in_order() {
        let errors = field_errors(&CreateBook::default());
        assert_eq!(
            messages(&errors),
            vec![
                ("title", "Title is required"),
                ("author", "Author is required"),
                ("publishedDate", "Published date must be a valid date"),
                ("ISBN", "ISBN is required"),
                ("ISBN", "ISBN must be between 10 and 13 characters"),
            ]
        );
    }

    #[test]
    fn missing_title_is_reported() {
        let payload: CreateBook = serde_json::from_value(serde_json::json!({
            "author": "Test Author",
            "publishedDate": "2023-07-15",
            "ISBN": "1234567890123"
        }))
        .unwrap();
        assert_eq!(messages(&field_errors(&payload)), vec![("title", "Title is required")]);
    }

    #[test]
    fn isbn_length_bounds() {
        for (isbn, ok) in [("12345", false), ("1234567890", true), ("1234567890123", true), ("12345678901234", false)] {
            let payload = CreateBook {
                isbn: isbn.to_string(),
                ..valid_create()
            };
            let errors = field_errors(&payload);
            assert_eq!(errors.is_empty(), ok, "isbn {isbn}");
            if !ok {
                assert_eq!(
                    messages(&errors),
                    vec![("ISBN", "ISBN must be between 10 and 13 characters")]
                );
            }
        }
    }

    #[test]
    fn dates_must_be_real_calendar_dates() {
        assert!(parse_published_date("2023-07-15").is_some());
        assert!(parse_published_date("2023/07/15").is_some());
        assert!(parse_published_date("2023-02-30").is_none());
        assert!(parse_published_date("15-07-2023").is_none());
        assert!(parse_published_date("yesterday").is_none());
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(field_errors(&UpdateBook::default()).is_empty());

        let payload = UpdateBook {
            title: Some(String::new()),
            isbn: Some("123".to_string()),
            ..UpdateBook::default()
        };
        assert_eq!(
            messages(&field_errors(&payload)),
            vec![
                ("title", "Title cannot be empty"),
                ("ISBN", "ISBN must be between 10 and 13 characters"),
            ]
        );
    }

    #[test]
    fn update_null_is_treated_as_absent() {
        let payload: UpdateBook =
            serde_json::from_value(serde_json::json!({ "title": "Updated", "author": null })).unwrap();
        let changes = BookChanges::try_from(payload).unwrap();
        assert_eq!(changes.title.as_deref(), Some("Updated"));
        assert!(changes.author.is_none());
    }

    #[test]
    fn numeric_isbn_is_validated_as_text() {
        let payload: CreateBook = serde_json::from_value(serde_json::json!({
            "title": "Test Book",
            "author": "Test Author",
            "publishedDate": "2023-07-15",
            "ISBN": 1234567890
        }))
        .unwrap();
        let book = NewBook::try_from(payload).unwrap();
        assert_eq!(book.isbn, "1234567890");

        let payload: CreateBook = serde_json::from_value(serde_json::json!({ "ISBN": 12345 })).unwrap();
        assert!(field_errors(&payload)
            .iter()
            .any(|e| e.message == "ISBN must be between 10 and 13 characters"));
    }

    #[test]
    fn update_carries_cover_image() {
        let payload: UpdateBook =
            serde_json::from_value(serde_json::json!({ "coverImage": "uploads/x.jpg" })).unwrap();
        let changes = BookChanges::try_from(payload).unwrap();
        assert_eq!(changes.cover_image.as_deref(), Some("uploads/x.jpg"));
        assert!(changes.title.is_none());
    }

    #[test]
    fn apply_keeps_omitted_fields() {
        let mut book = Book::from_new(Uuid::new_v4(), NewBook::try_from(valid_create()).unwrap());
        let before = book.clone();
        book.apply(&BookChanges {
            title: Some("Updated".to_string()),
            ..BookChanges::default()
        });
        assert_eq!(book.title, "Updated");
        assert_eq!(book.author, before.author);
        assert_eq!(book.published_date, before.published_date);
        assert_eq!(book.isbn, before.isbn);
        assert_eq!(book.cover_image, None);
    }

    #[test]
    fn serializes_with_wire_names() {
        let mut book = Book::from_new(Uuid::nil(), NewBook::try_from(valid_create()).unwrap());
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["publishedDate"], "2023-07-15");
        assert_eq!(json["ISBN"], "1234567890123");
        assert!(json.get("coverImage").is_none());

        book.cover_image = Some("uploads/cover.jpg".to_string());
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["coverImage"], "uploads/cover.jpg");
    }
}
