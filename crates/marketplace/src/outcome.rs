//! Contract result decoding.
//!
//! Contract bindings are not consistent about the shape of returned values: a value may be
//! returned as is, wrapped into a `{ "value": ... }` object, or wrapped into an `Ok`/`Err`
//! variant. Every result is decoded here exactly once into a [`ChainOutcome`].

use derive_more::{Display, Error, From};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Result of a contract call: either a value, or a contract error code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainOutcome<T> {
    Ok(T),
    Err(u32),
}

impl<T> ChainOutcome<T> {
    /// Convert into a regular [`Result`] with the raw error code.
    pub fn into_result(self) -> Result<T, u32> {
        match self {
            ChainOutcome::Ok(value) => Ok(value),
            ChainOutcome::Err(code) => Err(code),
        }
    }
}

/// Result decoding errors.
#[derive(Debug, Display, From, Error)]
pub enum DecodeError {
    /// Value does not match the expected type.
    #[display(fmt = "unexpected result shape: {}", _0)]
    Json(serde_json::Error),

    /// `Err` variant does not contain a numeric error code.
    #[display(fmt = "unable to read contract error code from {}", _0)]
    InvalidErrorCode(#[error(ignore)] Value),
}

/// Keys of an `Ok` variant wrapper.
const OK_KEYS: [&str; 2] = ["Ok", "ok"];

/// Keys of an `Err` variant wrapper.
const ERR_KEYS: [&str; 3] = ["Err", "err", "error"];

/// Get the only entry of a JSON object, if its key is one of the provided keys.
fn single_entry<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    if object.len() != 1 {
        return None;
    }

    keys.iter().find_map(|key| object.get(*key))
}

/// Remove `{ "value": ... }` wrappers from the provided value.
///
/// Wrapped and bare values are equivalent, so applying this function to an already
/// unwrapped value returns it unchanged.
pub fn unwrap_value(mut value: Value) -> Value {
    loop {
        match value {
            Value::Object(mut object) if object.len() == 1 && object.contains_key("value") => {
                value = object.remove("value").unwrap_or(Value::Null);
            }
            other => return other,
        }
    }
}

/// Decode a contract call result into a [`ChainOutcome`].
pub fn decode_outcome<T: DeserializeOwned>(value: Value) -> Result<ChainOutcome<T>, DecodeError> {
    let value = unwrap_value(value);

    if let Value::Object(object) = &value {
        if let Some(inner) = single_entry(object, &OK_KEYS) {
            let inner = unwrap_value(inner.clone());
            return Ok(ChainOutcome::Ok(serde_json::from_value(inner)?));
        }

        if let Some(inner) = single_entry(object, &ERR_KEYS) {
            return error_code(inner)
                .map(ChainOutcome::Err)
                .ok_or_else(|| DecodeError::InvalidErrorCode(inner.clone()));
        }
    }

    Ok(ChainOutcome::Ok(serde_json::from_value(value)?))
}

/// Read an error code from one of its possible representations.
fn error_code(value: &Value) -> Option<u32> {
    match unwrap_value(value.clone()) {
        Value::Number(number) => number.as_u64().and_then(|code| u32::try_from(code).ok()),
        Value::String(message) => message
            .trim()
            .parse()
            .ok()
            .or_else(|| crate::errors::parse_host_error_code(&message)),
        Value::Object(object) => object
            .get("code")
            .and_then(error_code)
            .or_else(|| object.get("message").and_then(error_code)),
        _ => None,
    }
}
