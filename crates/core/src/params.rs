//! Helpers for extracting typed parameters from a `serde_json::Value` object.
//!
//! The `param_*` helpers are lenient: a missing key or a value of the wrong
//! type yields the default. The `checked_*` helpers still default on a
//! missing key but report a present value of the wrong type as
//! [`HatchError::ParamTypeMismatch`].

use serde_json::Value;

use crate::error::HatchError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn checked<T>(
    params: &Value,
    name: &str,
    default: T,
    expected: &str,
    extract: impl Fn(&Value) -> Option<T>,
) -> Result<T, HatchError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => extract(v).ok_or_else(|| HatchError::ParamTypeMismatch {
            name: name.to_owned(),
            expected: expected.to_owned(),
            got: json_type_name(v).to_owned(),
        }),
    }
}

/// Like [`param_f64`], but a present non-number is an error.
pub fn checked_f64(params: &Value, name: &str, default: f64) -> Result<f64, HatchError> {
    checked(params, name, default, "f64", Value::as_f64)
}

/// Like [`param_usize`], but a present non-integer (or negative) is an error.
pub fn checked_usize(params: &Value, name: &str, default: usize) -> Result<usize, HatchError> {
    checked(params, name, default, "usize", |v| {
        v.as_u64().map(|n| n as usize)
    })
}

/// Like [`checked_usize`], for 64-bit values such as PRNG seeds.
pub fn checked_u64(params: &Value, name: &str, default: u64) -> Result<u64, HatchError> {
    checked(params, name, default, "u64", Value::as_u64)
}

/// Like [`param_bool`], but a present non-bool is an error.
pub fn checked_bool(params: &Value, name: &str, default: bool) -> Result<bool, HatchError> {
    checked(params, name, default, "bool", Value::as_bool)
}
