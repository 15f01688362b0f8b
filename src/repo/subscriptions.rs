use chrono::Utc;

use sqlx::PgExecutor;

use uuid::Uuid;

use crate::model::{NewSubscription, Subscription};

use super::query::{AggregateQuery, SubscriptionFilter, UpdateSet, SELECT_SUBSCRIPTIONS};

/// Repository for interfacing with the subscriptions table
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    #[tracing::instrument(name = "Insert subscription", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_subscription: &NewSubscription,
    ) -> sqlx::Result<Subscription> {
        sqlx::query_as::<_, Subscription>(
            "insert into subscriptions(service_name, price, user_id, start_date, end_date) \
             values ($1, $2, $3, $4, $5) \
             returning id, service_name, price, user_id, start_date, end_date, created_at, updated_at",
        )
        .bind(new_subscription.service_name.as_str())
        .bind(new_subscription.price)
        .bind(new_subscription.user_id)
        .bind(new_subscription.start_date.first_day())
        .bind(new_subscription.end_date.map(|date| date.first_day()))
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch a subscription by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Subscription>> {
        let sql = format!("{} where id = $1", SELECT_SUBSCRIPTIONS);
        sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Apply a partial update as a single statement, returning the number of rows changed
    #[tracing::instrument(name = "Update a subscription by id", skip(executor))]
    pub async fn update<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        update: &UpdateSet,
    ) -> sqlx::Result<u64> {
        let mut query = update.build(id, Utc::now());
        let result = query.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "Delete a subscription by id", skip(executor))]
    pub async fn delete<'con>(executor: impl PgExecutor<'con>, id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("delete from subscriptions where id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "List subscriptions", skip(executor))]
    pub async fn list<'con>(
        executor: impl PgExecutor<'con>,
        filter: &SubscriptionFilter,
    ) -> sqlx::Result<Vec<Subscription>> {
        let mut query = filter.build();
        query
            .build_query_as::<Subscription>()
            .fetch_all(executor)
            .await
    }

    /// Total price of the matching subscriptions, zero when nothing matches
    #[tracing::instrument(name = "Aggregate subscription costs", skip(executor))]
    pub async fn aggregate<'con>(
        executor: impl PgExecutor<'con>,
        aggregate: &AggregateQuery,
    ) -> sqlx::Result<i64> {
        let mut query = aggregate.build();
        query
            .build_query_scalar::<i64>()
            .fetch_one(executor)
            .await
    }
}
