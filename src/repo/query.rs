use chrono::{DateTime, NaiveDate, Utc};

use sqlx::{Postgres, QueryBuilder};

use thiserror::Error;

use uuid::Uuid;

use crate::domain::{parse_month_year, MonthYear};
use crate::model::{provided, ListParams, UpdateSubscriptionRequest, CLEAR_SENTINEL};
use crate::validation::{messages, ValidationErrors};

pub(crate) const SELECT_SUBSCRIPTIONS: &str = "select id, service_name, price, user_id, start_date, \
     end_date, created_at, updated_at from subscriptions";

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// A single column change of a partial update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    ServiceName(String),
    Price(i32),
    StartDate(NaiveDate),
    /// `None` clears the column
    EndDate(Option<NaiveDate>),
}

impl Assignment {
    pub fn column(&self) -> &'static str {
        match self {
            Self::ServiceName(_) => "service_name",
            Self::Price(_) => "price",
            Self::StartDate(_) => "start_date",
            Self::EndDate(_) => "end_date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("Invalid {0} format (use MM-YYYY)")]
    InvalidDateFormat(&'static str),

    #[error("No fields to update")]
    NoFieldsToUpdate,
}

/// Ordered, non-empty set of column assignments for a partial update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSet(Vec<Assignment>);

impl UpdateSet {
    pub fn assignments(&self) -> &[Assignment] {
        &self.0
    }

    /// Render `update ... set <assignments>, updated_at = $n where id = $m`
    pub fn build(&self, id: Uuid, updated_at: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("update subscriptions set ");

        let mut set = builder.separated(", ");
        for assignment in &self.0 {
            set.push(assignment.column());
            set.push_unseparated(" = ");
            match assignment {
                Assignment::ServiceName(name) => set.push_bind_unseparated(name.clone()),
                Assignment::Price(price) => set.push_bind_unseparated(*price),
                Assignment::StartDate(date) => set.push_bind_unseparated(*date),
                Assignment::EndDate(date) => set.push_bind_unseparated(*date),
            };
        }
        set.push("updated_at = ");
        set.push_bind_unseparated(updated_at);

        builder.push(" where id = ");
        builder.push_bind(id);
        builder
    }
}

fn parse_assigned_date(token: &str, field: &'static str) -> Result<NaiveDate, UpdateError> {
    parse_month_year(token)
        .map(NaiveDate::from)
        .map_err(|_| UpdateError::InvalidDateFormat(field))
}

impl TryFrom<&UpdateSubscriptionRequest> for UpdateSet {
    type Error = UpdateError;

    /// Empty strings and a zero price are treated as absent, so a price can never be
    /// set to exactly 0 through an update.
    fn try_from(req: &UpdateSubscriptionRequest) -> Result<Self, Self::Error> {
        let mut assignments = Vec::new();

        if let Some(name) = provided(&req.service_name) {
            assignments.push(Assignment::ServiceName(name.to_string()));
        }

        if let Some(price) = req.price.filter(|price| *price > 0) {
            assignments.push(Assignment::Price(price));
        }

        if let Some(token) = provided(&req.start_date) {
            let date = parse_assigned_date(token, "start_date")?;
            assignments.push(Assignment::StartDate(date));
        }

        if let Some(token) = provided(&req.end_date) {
            let date = if token == CLEAR_SENTINEL {
                None
            } else {
                Some(parse_assigned_date(token, "end_date")?)
            };
            assignments.push(Assignment::EndDate(date));
        }

        if assignments.is_empty() {
            return Err(UpdateError::NoFieldsToUpdate);
        }
        Ok(Self(assignments))
    }
}

/// Sum of prices over subscriptions active within a month range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQuery {
    pub start: MonthYear,
    pub end: MonthYear,
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name
    pub service_name: Option<String>,
}

impl AggregateQuery {
    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(
            "select coalesce(sum(price), 0)::bigint as total_cost from subscriptions where start_date >= ",
        );
        builder.push_bind(self.start.first_day());
        builder.push(" and (end_date is null or end_date <= ");
        builder.push_bind(self.end.first_day());
        builder.push(")");

        if let Some(user_id) = self.user_id {
            builder.push(" and user_id = ");
            builder.push_bind(user_id);
        }
        if let Some(service_name) = &self.service_name {
            builder.push(" and service_name ilike ");
            builder.push_bind(format!("%{}%", service_name));
        }
        builder
    }
}

/// Filter and pagination for listing subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SubscriptionFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            service_name: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl SubscriptionFilter {
    /// Render the filtered select, newest first
    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(SELECT_SUBSCRIPTIONS);

        if self.user_id.is_some() || self.service_name.is_some() {
            builder.push(" where ");
            let mut and = builder.separated(" and ");
            if let Some(user_id) = self.user_id {
                and.push("user_id = ");
                and.push_bind_unseparated(user_id);
            }
            if let Some(service_name) = &self.service_name {
                and.push("service_name ilike ");
                and.push_bind_unseparated(format!("%{}%", service_name));
            }
        }

        builder.push(" order by created_at desc limit ");
        builder.push_bind(self.limit);
        builder.push(" offset ");
        builder.push_bind(self.offset);
        builder
    }
}

impl TryFrom<ListParams> for SubscriptionFilter {
    type Error = ValidationErrors;

    /// Out-of-range or unparseable pagination falls back to the defaults
    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let user_id = match provided(&params.user_id) {
            None => None,
            Some(id) => Some(Uuid::parse_str(id).map_err(|_| {
                let mut errors = ValidationErrors::new();
                errors.push("user_id", messages::USER_ID_NOT_UUID);
                errors
            })?),
        };

        let limit = provided(&params.limit)
            .and_then(|limit| limit.parse::<i64>().ok())
            .filter(|limit| (1..=MAX_LIMIT).contains(limit))
            .unwrap_or(DEFAULT_LIMIT);

        let offset = provided(&params.offset)
            .and_then(|offset| offset.parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0);

        Ok(Self {
            user_id,
            service_name: provided(&params.service_name).map(str::to_string),
            limit,
            offset,
        })
    }
}
