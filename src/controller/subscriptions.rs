use actix_web::dev::HttpServiceFactory;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use sqlx::PgPool;

use uuid::Uuid;

use crate::controller::parse_payload;
use crate::error::{RestError, RestResult};
use crate::model::{
    AggregationRequest, AggregationResponse, CreateSubscriptionRequest, ListParams,
    UpdateSubscriptionRequest,
};
use crate::repo::{SubscriptionFilter, SubscriptionRepo, UpdateSet};
use crate::validation::{
    validate_aggregation, validate_create, validate_update, AGGREGATE_FIELDS, CREATE_FIELDS,
    UPDATE_FIELDS,
};

const NOT_FOUND: &str = "Subscription not found";

fn parse_id(id: &str) -> RestResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| RestError::MalformedInput("Invalid subscription ID".into()))
}

/// List subscriptions, newest first
#[tracing::instrument(name = "List subscriptions", skip(pool))]
#[get("")]
async fn list(
    pool: web::Data<PgPool>,
    params: web::Query<ListParams>,
) -> RestResult<impl Responder> {
    let filter = SubscriptionFilter::try_from(params.into_inner())?;
    let subscriptions = SubscriptionRepo::list(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

/// Create endpoint for new subscriptions
#[tracing::instrument(name = "Create a new subscription", skip(pool, body))]
#[post("")]
async fn create(pool: web::Data<PgPool>, body: web::Bytes) -> RestResult<impl Responder> {
    let req: CreateSubscriptionRequest = parse_payload(&body, &CREATE_FIELDS)?;
    let new_subscription = validate_create(&req)?;

    let subscription = SubscriptionRepo::insert(pool.get_ref(), &new_subscription).await?;

    tracing::info!(
        subscription_id = %subscription.id,
        user_id = %subscription.user_id,
        service_name = %subscription.service_name,
        "Subscription created"
    );

    Ok(HttpResponse::Created().json(subscription))
}

/// Total cost of subscriptions active within a month range
#[tracing::instrument(name = "Aggregate subscription costs", skip(pool, body))]
#[post("/aggregate")]
async fn aggregate(pool: web::Data<PgPool>, body: web::Bytes) -> RestResult<impl Responder> {
    let req: AggregationRequest = parse_payload(&body, &AGGREGATE_FIELDS)?;
    let query = validate_aggregation(&req)?;

    let total_cost = SubscriptionRepo::aggregate(pool.get_ref(), &query).await?;

    let response = AggregationResponse {
        total_cost,
        period: format!(
            "{} to {}",
            req.start_date.unwrap_or_default(),
            req.end_date.unwrap_or_default()
        ),
        user_id: query.user_id,
    };

    tracing::info!(
        total_cost = response.total_cost,
        period = %response.period,
        "Subscription aggregation completed"
    );

    Ok(HttpResponse::Ok().json(response))
}

#[tracing::instrument(name = "Fetch a subscription", skip(pool))]
#[get("/{id}")]
async fn fetch(pool: web::Data<PgPool>, path: web::Path<String>) -> RestResult<impl Responder> {
    let id = parse_id(&path)?;

    let subscription = SubscriptionRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or(RestError::NotFound(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Partial update: only provided fields are changed
#[tracing::instrument(name = "Update a subscription", skip(pool, body))]
#[put("/{id}")]
async fn update(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    body: web::Bytes,
) -> RestResult<impl Responder> {
    let id = parse_id(&path)?;

    let req: UpdateSubscriptionRequest = parse_payload(&body, &UPDATE_FIELDS)?;
    validate_update(&req)?;
    let update = UpdateSet::try_from(&req)?;

    if SubscriptionRepo::update(pool.get_ref(), id, &update).await? == 0 {
        return Err(RestError::NotFound(NOT_FOUND));
    }

    tracing::info!(subscription_id = %id, "Subscription updated");

    Ok(HttpResponse::Ok())
}

#[tracing::instrument(name = "Delete a subscription", skip(pool))]
#[delete("/{id}")]
async fn remove(pool: web::Data<PgPool>, path: web::Path<String>) -> RestResult<impl Responder> {
    let id = parse_id(&path)?;

    if SubscriptionRepo::delete(pool.get_ref(), id).await? == 0 {
        return Err(RestError::NotFound(NOT_FOUND));
    }

    tracing::info!(subscription_id = %id, "Subscription deleted");

    Ok(HttpResponse::NoContent())
}

/// Subscriptions API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/subscriptions")
        .service(list)
        .service(create)
        .service(aggregate)
        .service(fetch)
        .service(update)
        .service(remove)
}
