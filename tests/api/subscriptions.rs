use reqwest::StatusCode;

use serde_json::json;

use sqlx::PgPool;

use uuid::Uuid;

use subscription_aggregator::model::Subscription;

use crate::helpers::{new_subscription_body, TestApp};

#[sqlx::test]
async fn create_returns_created_for_valid_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user_id = Uuid::new_v4();

    let res = app
        .subscription_create(&json!({
            "service_name": "Netflix",
            "price": 999,
            "user_id": user_id,
            "start_date": "01-2024",
        }))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CREATED, res.status());
    assert!(res.headers().contains_key("x-request-id"));

    let created: Subscription = res.json().await.expect("Failed to decode body");
    assert_eq!("Netflix", created.service_name);
    assert_eq!(999, created.price);
    assert_eq!(user_id, created.user_id);
    assert_eq!("2024-01-01", created.start_date.to_string());
    assert!(created.end_date.is_none());

    let row = sqlx::query_as::<_, (String, i32)>(
        "select service_name, price from subscriptions where id = $1",
    )
    .bind(created.id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(("Netflix".to_string(), 999), row);

    Ok(())
}

#[sqlx::test]
async fn create_returns_bad_request_for_invalid_data(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user_id = Uuid::new_v4();

    let test_cases = vec![
        (
            "missing user_id",
            json!({ "service_name": "Netflix", "price": 999, "start_date": "01-2024" }),
            Some("user_id"),
        ),
        (
            "malformed start date",
            json!({ "service_name": "Netflix", "price": 999, "user_id": user_id, "start_date": "2024-01" }),
            Some("start_date"),
        ),
        (
            "negative price",
            json!({ "service_name": "Netflix", "price": -1, "user_id": user_id, "start_date": "01-2024" }),
            Some("price"),
        ),
        (
            "unknown field",
            json!({ "service_name": "Netflix", "price": 999, "user_id": user_id, "start_date": "01-2024", "id": 1 }),
            Some("id"),
        ),
        (
            "price of the wrong type",
            json!({ "service_name": "Netflix", "price": "999", "user_id": user_id, "start_date": "01-2024" }),
            None,
        ),
    ];

    for (desc, body, field) in test_cases {
        let res = app
            .subscription_create(&body)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "API did not fail when payload was {}",
            desc
        );

        let text = res.text().await.expect("Failed to read body");
        if let Some(field) = field {
            assert!(
                text.contains(field),
                "Error for {} did not mention {}: {}",
                desc,
                field,
                text
            );
        }
    }

    let count = sqlx::query_scalar::<_, i64>("select count(*) from subscriptions")
        .fetch_one(&pool)
        .await?;
    assert_eq!(0, count);

    Ok(())
}

#[sqlx::test]
async fn create_reports_every_invalid_field(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .subscription_create(&json!({ "price": -5, "end_date": "13-2024" }))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    let text = res.text().await.expect("Failed to read body");
    assert_eq!(5, text.split("; ").count(), "Unexpected body: {}", text);

    Ok(())
}

#[sqlx::test]
async fn fetch_returns_created_subscription(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let created = app.create_subscription(&new_subscription_body()).await;

    let res = app
        .subscription_fetch(&created.id.to_string())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let fetched: Subscription = res.json().await.expect("Failed to decode body");
    assert_eq!(created.id, fetched.id);
    assert_eq!(created.service_name, fetched.service_name);

    Ok(())
}

#[sqlx::test]
async fn fetch_returns_not_found_for_unknown_id(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .subscription_fetch(&Uuid::new_v4().to_string())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}

#[sqlx::test]
async fn fetch_returns_bad_request_for_malformed_id(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .subscription_fetch("not-a-uuid")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn update_with_clear_sentinel_clears_end_date(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let mut body = new_subscription_body();
    body["end_date"] = json!("06-2024");
    let created = app.create_subscription(&body).await;
    assert!(created.end_date.is_some());

    let res = app
        .subscription_update(&created.id.to_string(), &json!({ "end_date": "null" }))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let fetched: Subscription = app
        .subscription_fetch(&created.id.to_string())
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to decode body");

    assert!(fetched.end_date.is_none());
    assert_eq!(created.price, fetched.price);
    assert!(fetched.updated_at >= created.updated_at);

    Ok(())
}

#[sqlx::test]
async fn update_changes_only_provided_fields(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let created = app.create_subscription(&new_subscription_body()).await;

    let res = app
        .subscription_update(
            &created.id.to_string(),
            &json!({ "service_name": "Spotify Premium", "start_date": "03-2024" }),
        )
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let fetched: Subscription = app
        .subscription_fetch(&created.id.to_string())
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to decode body");

    assert_eq!("Spotify Premium", fetched.service_name);
    assert_eq!("2024-03-01", fetched.start_date.to_string());
    assert_eq!(created.price, fetched.price);
    assert_eq!(created.user_id, fetched.user_id);

    Ok(())
}

#[sqlx::test]
async fn update_with_no_fields_is_bad_request(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let created = app.create_subscription(&new_subscription_body()).await;

    for body in [json!({}), json!({ "price": 0 }), json!({ "service_name": "" })] {
        let res = app
            .subscription_update(&created.id.to_string(), &body)
            .await
            .expect("Failed to execute request");

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "body: {}", body);
        assert_eq!(
            "No fields to update",
            res.text().await.expect("Failed to read body")
        );
    }

    let price = sqlx::query_scalar::<_, i32>("select price from subscriptions where id = $1")
        .bind(created.id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(created.price, price);

    Ok(())
}

#[sqlx::test]
async fn update_rejects_fields_outside_whitelist(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let created = app.create_subscription(&new_subscription_body()).await;

    let res = app
        .subscription_update(
            &created.id.to_string(),
            &json!({ "user_id": Uuid::new_v4(), "price": 100 }),
        )
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn update_returns_not_found_for_unknown_id(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .subscription_update(&Uuid::new_v4().to_string(), &json!({ "price": 100 }))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}

#[sqlx::test]
async fn delete_twice_returns_not_found_second_time(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let created = app.create_subscription(&new_subscription_body()).await;
    let id = created.id.to_string();

    let first = app
        .subscription_delete(&id)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NO_CONTENT, first.status());

    let second = app
        .subscription_delete(&id)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, second.status());

    Ok(())
}

#[sqlx::test]
async fn list_filters_by_user_and_paginates(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user_id = Uuid::new_v4();

    for _ in 0..3 {
        let mut body = new_subscription_body();
        body["user_id"] = json!(user_id);
        app.create_subscription(&body).await;
    }
    app.create_subscription(&new_subscription_body()).await;

    let user_id = user_id.to_string();

    let all: Vec<Subscription> = app
        .subscription_list(&[("user_id", user_id.as_str())])
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to decode body");
    assert_eq!(3, all.len());
    assert!(all
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    let page: Vec<Subscription> = app
        .subscription_list(&[("user_id", user_id.as_str()), ("limit", "2"), ("offset", "2")])
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to decode body");
    assert_eq!(1, page.len());

    Ok(())
}

#[sqlx::test]
async fn list_rejects_malformed_user_id(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .subscription_list(&[("user_id", "nope")])
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}
