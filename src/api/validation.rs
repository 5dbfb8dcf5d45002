//! Request body validation.
//!
//! Request DTOs implement [`Validate`]; handlers take them through
//! [`ValidatedJson`], which rejects malformed JSON and invalid fields with
//! `400` before the handler runs.

use std::str::FromStr;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::db::utils::{normalize_range_end, normalize_timestamp};

pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_URL_LEN: usize = 2048;

/// Field-level checks for a request body.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// JSON body that has passed [`Validate`].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// A required string: non-blank and at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    check_len(field, value, max)
}

/// An optional string of at most `max` characters.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<(), ApiError> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ApiError> {
    if tags.len() > MAX_TAGS {
        return Err(ApiError::validation(format!(
            "at most {} tags are allowed",
            MAX_TAGS
        )));
    }
    for tag in tags {
        require_text("tag", tag, MAX_TAG_LEN)?;
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    require_text("email", email, MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::validation(format!(
            "email is not a valid address: {}",
            email
        ))),
    }
}

pub fn validate_url(url: &str) -> Result<(), ApiError> {
    require_text("url", url, MAX_URL_LEN)?;
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(ApiError::validation("url must start with http:// or https://")),
    }
}

/// Parse an optional timestamp into storage format.
pub fn parse_timestamp(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => normalize_timestamp(raw).map(Some).ok_or_else(|| {
            ApiError::validation(format!(
                "{} must be a timestamp like 2025-01-31 18:00:00, got '{}'",
                field, raw
            ))
        }),
    }
}

/// Parse the closing bound of an inclusive range. A bare date covers the
/// whole day.
pub fn parse_range_end(field: &str, value: &str) -> Result<String, ApiError> {
    normalize_range_end(value).ok_or_else(|| {
        ApiError::validation(format!(
            "{} must be a date or timestamp like 2025-01-31, got '{}'",
            field, value
        ))
    })
}

/// Parse an optional enum query or body value.
pub fn parse_enum<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = String>,
{
    value.map(|raw| raw.parse().map_err(ApiError::Validation)).transpose()
}
