use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::app(engine)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn create_category(app: &Router, name: &str, planned_budget_minor: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/categories",
        Some(json!({ "name": name, "planned_budget_minor": planned_budget_minor })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn rent_and_food_over_http() {
    let app = test_app().await;
    let rent = create_category(&app, "Rent", 150_000).await;
    let food = create_category(&app, "Food", 35_000).await;
    assert_eq!(rent["remaining_balance_minor"], 150_000);
    assert_eq!(rent["actual_balance_minor"], 0);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/categories/transfer/{}/{}", id_of(&rent), id_of(&food)),
        Some(json!({ "amount_minor": 10_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["from_category"]["planned_budget_minor"], 140_000);
    assert_eq!(body["to_category"]["planned_budget_minor"], 45_000);
    assert_eq!(body["amount_minor"], 10_000);

    let (status, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({
            "category_id": id_of(&food),
            "amount_minor": 5_000,
            "description": "groceries",
            "date": "2026-03-14",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{expense}");
    assert_eq!(expense["date"], "2026-03-14");

    let (status, food) = send(&app, Method::GET, &format!("/categories/{}", id_of(&food)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(food["planned_budget_minor"], 45_000);
    assert_eq!(food["actual_balance_minor"], 5_000);
    assert_eq!(food["remaining_balance_minor"], 40_000);

    let (status, report) = send(&app, Method::GET, "/categories/verify", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["clean"], true);
    assert_eq!(report["categories_checked"], 2);
}

#[tokio::test]
async fn create_category_defaults_budget_to_zero() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::POST, "/categories", Some(json!({ "name": "Misc" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["planned_budget_minor"], 0);
    assert_eq!(body["remaining_balance_minor"], 0);
}

#[tokio::test]
async fn list_categories_returns_all() {
    let app = test_app().await;
    create_category(&app, "Rent", 100).await;
    create_category(&app, "Food", 200).await;

    let (status, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|category| category["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Food", "Rent"]);
}

#[tokio::test]
async fn patch_category_keeps_omitted_fields() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 30_000).await;
    let uri = format!("/categories/{}", id_of(&food));

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "name": "Groceries" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Groceries");
    assert_eq!(body["planned_budget_minor"], 30_000);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "planned_budget_minor": 40_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Groceries");
    assert_eq!(body["remaining_balance_minor"], 40_000);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn patch_expense_keeps_omitted_fields() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 30_000).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({
            "category_id": id_of(&food),
            "amount_minor": 2_500,
            "payment_method": "card",
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/expenses/{}", id_of(&expense)),
        Some(json!({ "description": "lunch" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["amount_minor"], 2_500);
    assert_eq!(body["payment_method"], "card");
    assert_eq!(body["description"], "lunch");

    let (_, food) = send(&app, Method::GET, &format!("/categories/{}", id_of(&food)), None).await;
    assert_eq!(food["actual_balance_minor"], 2_500);
    assert_eq!(food["remaining_balance_minor"], 27_500);
}

#[tokio::test]
async fn list_expenses_filters_by_category() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 30_000).await;
    let fun = create_category(&app, "Fun", 10_000).await;
    for (category, amount) in [(&food, 100), (&fun, 200), (&food, 300)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/expenses",
            Some(json!({ "category_id": id_of(category), "amount_minor": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/expenses?category_id={}", id_of(&food)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expenses"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/expenses", None).await;
    assert_eq!(body["expenses"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn delete_category_in_use_conflicts() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 30_000).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "category_id": id_of(&food), "amount_minor": 1_000 })),
    )
    .await;
    let category_uri = format!("/categories/{}", id_of(&food));

    let (status, body) = send(&app, Method::DELETE, &category_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/expenses/{}", id_of(&expense)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &category_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &category_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transfer_errors_map_to_status_codes() {
    let app = test_app().await;
    let rent = create_category(&app, "Rent", 150_000).await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/categories/transfer/{}/{}", id_of(&rent), id_of(&rent)),
        Some(json!({ "amount_minor": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/categories/transfer/{missing}/{}", id_of(&rent)),
        Some(json!({ "amount_minor": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/categories/transfer/{}/{missing}", id_of(&rent)),
        Some(json!({ "amount_minor": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, rent_after) = send(&app, Method::GET, &format!("/categories/{}", id_of(&rent)), None).await;
    assert_eq!(rent_after, rent);
}

#[tokio::test]
async fn malformed_requests_are_rejected_with_error_body() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/categories/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "amount_minor": "ten" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "category_id": uuid::Uuid::new_v4(), "amount_minor": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn null_date_is_ignored_while_empty_text_clears() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 30_000).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({
            "category_id": id_of(&food),
            "amount_minor": 700,
            "date": "2026-03-14",
            "description": "lunch",
            "entity_id": 7,
        })),
    )
    .await;
    let uri = format!("/expenses/{}", id_of(&expense));

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "date": null, "entity_id": null, "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["date"], "2026-03-14");
    assert_eq!(body["entity_id"], 7);
    assert_eq!(body["description"], Value::Null);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "date": "2026-04-01" }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["date"], "2026-04-01");
}

#[tokio::test]
async fn oversized_amounts_are_rejected_and_reads_keep_working() {
    let app = test_app().await;
    let food = create_category(&app, "Food", 0).await;
    let rent = create_category(&app, "Rent", 150_000).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "category_id": id_of(&food), "amount_minor": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/categories/transfer/{}/{}", id_of(&rent), id_of(&food)),
        Some(json!({ "amount_minor": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);

    let (status, report) = send(&app, Method::GET, "/categories/verify", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["clean"], true);
}
