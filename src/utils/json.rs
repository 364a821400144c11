use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::utils::decimal::parse_amount;

/// `Json` request body whose rejections render as `AppError`, so a payload
/// that fails to deserialize is a 400 like any other invalid field.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// How a single field appears in a PATCH body.
pub enum NullableValue<T> {
    Omitted,
    Null,
    Value(T),
}

impl<T> NullableValue<T> {
    /// Shape expected by `Option<Option<T>>` changeset fields on nullable columns.
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            NullableValue::Omitted => None,
            NullableValue::Null => Some(None),
            NullableValue::Value(value) => Some(Some(value)),
        }
    }
}

pub fn classify_nullable<T>(
    optional_value: Option<&Value>,
    parse: impl FnOnce(&Value) -> Result<T, String>,
) -> Result<NullableValue<T>, String> {
    match optional_value {
        None => Ok(NullableValue::Omitted),
        Some(Value::Null) => Ok(NullableValue::Null),
        Some(other) => parse(other).map(NullableValue::Value),
    }
}

fn parse_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_owned()),
        other => Err(format!("expected string or null, got {other}")),
    }
}

fn parse_date(value: &Value) -> Result<NaiveDate, String> {
    let raw = parse_string(value)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| format!("expected date formatted as YYYY-MM-DD, got {raw}"))
}

fn parse_integer(value: &Value) -> Result<i64, String> {
    value
        .as_i64()
        .ok_or_else(|| format!("expected integer or null, got {value}"))
}

fn field<'a>(body: &'a Value, name: &str) -> AppResult<Option<&'a Value>> {
    match body {
        Value::Object(map) => Ok(map.get(name)),
        _ => Err(AppError::bad_request("request body must be a JSON object")),
    }
}

fn with_field<T>(name: &str, result: Result<T, String>) -> AppResult<T> {
    result.map_err(|message| AppError::bad_request(format!("{name}: {message}")))
}

/// Nullable text column; an empty string clears the column like `null` does.
pub fn patch_text(body: &Value, name: &str) -> AppResult<Option<Option<String>>> {
    let class = with_field(name, classify_nullable(field(body, name)?, parse_string))?;
    Ok(match class {
        NullableValue::Value(value) if value.is_empty() => Some(None),
        other => other.into_change(),
    })
}

/// NOT NULL (or defaulted) text column: `null` and blank strings are rejected.
pub fn patch_required_text(body: &Value, name: &str) -> AppResult<Option<String>> {
    match with_field(name, classify_nullable(field(body, name)?, parse_string))? {
        NullableValue::Omitted => Ok(None),
        NullableValue::Null => Err(AppError::bad_request(format!("{name} cannot be null"))),
        NullableValue::Value(value) if value.is_empty() => Err(AppError::bad_request(format!(
            "{name} must not be empty"
        ))),
        NullableValue::Value(value) => Ok(Some(value)),
    }
}

pub fn patch_date(body: &Value, name: &str) -> AppResult<Option<Option<NaiveDate>>> {
    with_field(name, classify_nullable(field(body, name)?, parse_date)).map(NullableValue::into_change)
}

pub fn patch_integer(body: &Value, name: &str) -> AppResult<Option<Option<i64>>> {
    with_field(name, classify_nullable(field(body, name)?, parse_integer))
        .map(NullableValue::into_change)
}

pub fn patch_amount(body: &Value, name: &str) -> AppResult<Option<Option<Decimal>>> {
    with_field(name, classify_nullable(field(body, name)?, parse_amount))
        .map(NullableValue::into_change)
}
