use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serializer;
use serde_json::Value;

/// `faturas.valor` is declared DECIMAL(10, 2).
pub const AMOUNT_SCALE: u32 = 2;
pub const AMOUNT_PRECISION: u32 = 10;

pub fn parse_amount(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        other => return Err(format!("expected decimal number or string, got {other}")),
    };
    let parsed = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| format!("invalid decimal amount: {raw}"))?;
    validate_amount(parsed)
}

pub fn validate_amount(value: Decimal) -> Result<Decimal, String> {
    let normalized = value.normalize();
    if normalized.scale() > AMOUNT_SCALE {
        return Err(format!(
            "amount must have at most {AMOUNT_SCALE} decimal places"
        ));
    }
    let max = Decimal::new(10i64.pow(AMOUNT_PRECISION) - 1, AMOUNT_SCALE);
    if normalized.abs() > max {
        return Err(format!("amount must not exceed {max}"));
    }
    Ok(normalized)
}

pub fn amount_to_db(value: Decimal) -> Result<f64, String> {
    value
        .to_f64()
        .ok_or_else(|| format!("amount {value} is not representable"))
}

pub fn amount_from_db(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|decimal| {
        let mut rounded = decimal.round_dp(AMOUNT_SCALE);
        rounded.rescale(AMOUNT_SCALE);
        rounded
    })
}

pub fn serialize_amount<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.and_then(amount_from_db) {
        Some(amount) => serializer.serialize_some(&amount.to_string()),
        None => serializer.serialize_none(),
    }
}
