use chrono::{DateTime, NaiveDate, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::MonthYear;

/// End date value that clears the column on update
pub const CLEAR_SENTINEL: &str = "null";

/// A request string that counts as given: present and non-empty
pub fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Stored Subscription record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    /// Price in the smallest currency unit
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    /// `None` while the subscription is still active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Creation and update timestamps
    /// NOTE: Set by the database, `updated_at` is refreshed on every update
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated subscription, ready to insert
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

/// Body of `POST /subscriptions`.
/// Fields are optional at the decoding stage so that missing values are reported
/// by validation rather than rejected as malformed JSON.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PUT /subscriptions/{id}`.
/// Empty strings and a zero price count as "not provided".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<String>,
    /// `"null"` clears the end date
    pub end_date: Option<String>,
}

/// Body of `POST /subscriptions/aggregate`
#[derive(Debug, Default, Deserialize)]
pub struct AggregationRequest {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AggregationResponse {
    pub total_cost: i64,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

/// Query string of `GET /subscriptions`.
/// Kept as raw strings: bad pagination values fall back to defaults instead of failing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}
