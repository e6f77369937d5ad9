use std::convert::Infallible;

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::http::AppError;

/// Request body as a JSON object.
///
/// Anything that is not a JSON object (malformed JSON, an array, an empty
/// or unreadable body, or a request whose Content-Type is not JSON) yields
/// an empty object, so callers always see field validation errors rather
/// than parse errors.
#[derive(Debug, Default)]
pub struct JsonObject(pub Map<String, Value>);

impl JsonObject {
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// Fails with every missing field listed, in the order requested.
    pub fn require_fields(&self, fields: &[&str]) -> Result<(), AppError> {
        let missing: Vec<&str> = fields
            .iter()
            .copied()
            .filter(|field| self.0.get(*field).map_or(true, is_blank))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::bad_request(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn text(&self, field: &str) -> Result<String, AppError> {
        match self.0.get(field) {
            Some(Value::String(value)) => Ok(value.clone()),
            _ => Err(AppError::bad_request(format!("{} must be a string", field))),
        }
    }

    /// `null` and absence both read as `None`.
    pub fn optional_text(&self, field: &str) -> Result<Option<String>, AppError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(AppError::bad_request(format!("{} must be a string", field))),
        }
    }

    pub fn id(&self, field: &str) -> Result<i64, AppError> {
        self.0
            .get(field)
            .and_then(Value::as_i64)
            .ok_or_else(|| AppError::bad_request(format!("{} must be an integer", field)))
    }

    pub fn optional_i32(&self, field: &str) -> Result<Option<i32>, AppError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .and_then(|value| i32::try_from(value).ok())
                .map(Some)
                .ok_or_else(|| AppError::bad_request(format!("{} must be an integer", field))),
        }
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.0.get(field).map(coerce_bool)
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self::default());
        }
        let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
        Ok(Self::parse(&bytes))
    }
}

/// `application/json` or an `application/*+json` type, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Absent-equivalent values for required fields.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Truthiness: null, false, zero, and empty strings, arrays and objects are
/// false; everything else is true.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
