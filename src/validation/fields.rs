use std::collections::HashSet;

use serde_json::{Map, Value};

use super::ValidationErrors;

const NOT_PERMITTED: &str = "field is not permitted";

lazy_static::lazy_static! {
    /// Fields accepted by `POST /subscriptions`
    pub static ref CREATE_FIELDS: HashSet<&'static str> =
        ["service_name", "price", "user_id", "start_date", "end_date"]
            .into_iter()
            .collect();
    /// Fields accepted by `PUT /subscriptions/{id}`
    pub static ref UPDATE_FIELDS: HashSet<&'static str> =
        ["service_name", "price", "start_date", "end_date"]
            .into_iter()
            .collect();
    /// Fields accepted by `POST /subscriptions/aggregate`
    pub static ref AGGREGATE_FIELDS: HashSet<&'static str> =
        ["user_id", "service_name", "start_date", "end_date"]
            .into_iter()
            .collect();
}

/// Reject every key of a raw JSON object that is not in `allowed`.
/// Runs before typed decoding, which would otherwise silently drop unknown keys.
pub fn validate_fields(
    payload: &Map<String, Value>,
    allowed: &HashSet<&'static str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for field in payload.keys() {
        if !allowed.contains(field.as_str()) {
            errors.push(field.as_str(), NOT_PERMITTED);
        }
    }
    errors.into_result(|| ())
}
