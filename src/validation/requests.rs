use uuid::Uuid;

use crate::domain::{parse_month_year, MonthYear};
use crate::model::{
    provided, AggregationRequest, CreateSubscriptionRequest, NewSubscription,
    UpdateSubscriptionRequest, CLEAR_SENTINEL,
};
use crate::repo::AggregateQuery;

use super::ValidationErrors;

const MAX_SERVICE_NAME_LEN: usize = 255;

/// Human-readable messages, one per field and failure reason
pub mod messages {
    pub const SERVICE_NAME_REQUIRED: &str = "service name is required";
    pub const SERVICE_NAME_TOO_LONG: &str = "service name must not exceed 255 characters";
    pub const PRICE_NEGATIVE: &str = "price cannot be negative";
    pub const USER_ID_REQUIRED: &str = "user id is required";
    pub const USER_ID_EMPTY: &str = "user id cannot be empty";
    pub const USER_ID_NOT_UUID: &str = "user id must be a UUID";
    pub const START_DATE_REQUIRED: &str = "start date is required";
    pub const START_DATE_FORMAT: &str = "start date must be in MM-YYYY format";
    pub const END_DATE_REQUIRED: &str = "end date is required";
    pub const END_DATE_FORMAT: &str = "end date must be in MM-YYYY format";
}

use messages::*;

fn too_long(service_name: &str) -> bool {
    service_name.chars().count() > MAX_SERVICE_NAME_LEN
}

/// Parse a date token, recording `message` against `field` on failure
fn parse_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    token: &str,
    message: &'static str,
) -> Option<MonthYear> {
    match parse_month_year(token) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, message);
            None
        }
    }
}

/// Parse a token that must be present and well-formed
fn required_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    token: Option<&str>,
    missing: &'static str,
    malformed: &'static str,
) -> Option<MonthYear> {
    match token {
        None => {
            errors.push(field, missing);
            None
        }
        Some(token) => parse_date(errors, field, token, malformed),
    }
}

/// Validate a create request, yielding the parsed subscription when every rule holds
pub fn validate_create(
    req: &CreateSubscriptionRequest,
) -> Result<NewSubscription, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let service_name = provided(&req.service_name);
    match service_name {
        None => errors.push("service_name", SERVICE_NAME_REQUIRED),
        Some(name) if too_long(name) => errors.push("service_name", SERVICE_NAME_TOO_LONG),
        Some(_) => {}
    }

    let price = req.price.unwrap_or_default();
    if price < 0 {
        errors.push("price", PRICE_NEGATIVE);
    }

    let user_id = match provided(&req.user_id) {
        None => {
            errors.push("user_id", USER_ID_REQUIRED);
            None
        }
        Some(id) => match Uuid::parse_str(id) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("user_id", USER_ID_NOT_UUID);
                None
            }
        },
    };

    let start_date = required_date(
        &mut errors,
        "start_date",
        provided(&req.start_date),
        START_DATE_REQUIRED,
        START_DATE_FORMAT,
    );

    let end_date = provided(&req.end_date)
        .and_then(|token| parse_date(&mut errors, "end_date", token, END_DATE_FORMAT));

    match (service_name, user_id, start_date) {
        (Some(service_name), Some(user_id), Some(start_date)) if errors.is_empty() => {
            Ok(NewSubscription {
                service_name: service_name.to_string(),
                price,
                user_id,
                start_date,
                end_date,
            })
        }
        _ => Err(errors),
    }
}

/// Validate an update request.
/// Only provided fields are checked; `"null"` is accepted as an end date.
pub fn validate_update(req: &UpdateSubscriptionRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if provided(&req.service_name).is_some_and(too_long) {
        errors.push("service_name", SERVICE_NAME_TOO_LONG);
    }

    if req.price.is_some_and(|price| price < 0) {
        errors.push("price", PRICE_NEGATIVE);
    }

    if let Some(token) = provided(&req.start_date) {
        parse_date(&mut errors, "start_date", token, START_DATE_FORMAT);
    }

    if let Some(token) = provided(&req.end_date).filter(|t| *t != CLEAR_SENTINEL) {
        parse_date(&mut errors, "end_date", token, END_DATE_FORMAT);
    }

    errors.into_result(|| ())
}

/// Validate an aggregation request, yielding the query to run
pub fn validate_aggregation(
    req: &AggregationRequest,
) -> Result<AggregateQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let start = required_date(
        &mut errors,
        "start_date",
        provided(&req.start_date),
        START_DATE_REQUIRED,
        START_DATE_FORMAT,
    );
    let end = required_date(
        &mut errors,
        "end_date",
        provided(&req.end_date),
        END_DATE_REQUIRED,
        END_DATE_FORMAT,
    );

    let user_id = match req.user_id.as_deref() {
        None => None,
        Some("") => {
            errors.push("user_id", USER_ID_EMPTY);
            None
        }
        Some(id) => match Uuid::parse_str(id) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("user_id", USER_ID_NOT_UUID);
                None
            }
        },
    };

    if req.service_name.as_deref().is_some_and(too_long) {
        errors.push("service_name", SERVICE_NAME_TOO_LONG);
    }

    match (start, end) {
        (Some(start), Some(end)) if errors.is_empty() => Ok(AggregateQuery {
            start,
            end,
            user_id,
            service_name: req.service_name.clone(),
        }),
        _ => Err(errors),
    }
}
