use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RestError, RestResult};
use crate::validation::validate_fields;

pub mod subscriptions;

const INVALID_JSON: &str = "Invalid JSON";

/// Decode a JSON body whose keys must all be in `allowed`.
/// The whitelist is checked on the raw object so that unknown keys are rejected
/// instead of being dropped by typed decoding.
pub fn parse_payload<T: DeserializeOwned>(
    body: &[u8],
    allowed: &HashSet<&'static str>,
) -> RestResult<T> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to decode request body");
        RestError::MalformedInput(INVALID_JSON.into())
    })?;

    let Some(object) = value.as_object() else {
        return Err(RestError::MalformedInput(INVALID_JSON.into()));
    };
    validate_fields(object, allowed)?;

    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(error = %e, "Failed to decode request body");
        RestError::MalformedInput(INVALID_JSON.into())
    })
}
