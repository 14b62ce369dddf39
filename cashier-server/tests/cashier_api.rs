//! HTTP API integration tests
//!
//! Drives the full router (auth middleware included) against an
//! in-memory database via `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use cashier_server::db::DbService;
use cashier_server::db::models::{DiningTable, Order, OrderItem, Staff};
use cashier_server::db::repository::{OrderRepository, StaffRepository, TableRepository};
use cashier_server::{Config, ServerState, api};
use shared::PaymentStatus;

async fn test_app() -> (Router, Surreal<Db>) {
    let db = DbService::new_memory().await.expect("memory db").db;
    let state = ServerState::with_db(Config::default(), db.clone());
    (api::build_app(state), db)
}

async fn seed_staff(db: &Surreal<Db>, email: &str, password: &str, is_active: bool) {
    let repo = StaffRepository::new(db.clone());
    repo.create(Staff {
        id: None,
        restaurant_code: "R1".into(),
        staff_name: "Nimal".into(),
        password: Staff::hash_password(password).expect("hash"),
        role: 1,
        mobile_number: String::new(),
        email: email.to_string(),
        address: String::new(),
        nic: String::new(),
        profile_image_url: String::new(),
        is_active,
    })
    .await
    .expect("seed staff");
}

async fn seed_table(db: &Surreal<Db>, name: &str, order_id: &str, pin: &str) -> String {
    let repo = TableRepository::new(db.clone());
    let table = repo
        .create(DiningTable {
            id: None,
            table_name: name.to_string(),
            pax: 4,
            order_id: order_id.to_string(),
            session_pin: pin.to_string(),
            pin_generated_at: None,
            customer_id: None,
        })
        .await
        .expect("seed table")
        .expect("table record");
    table.id.expect("table id").to_string()
}

async fn seed_order(db: &Surreal<Db>, order_number: &str, table_id: &str) {
    let repo = OrderRepository::new(db.clone());
    repo.create(Order {
        id: None,
        restaurant_code: "R1".into(),
        order_number: order_number.to_string(),
        table_id: table_id.parse().expect("record id"),
        table_name: "T1".into(),
        items: vec![OrderItem {
            item_id: "item:1".into(),
            item_name: "Rice & Curry".into(),
            item_image: String::new(),
            quantity: 1,
            price: 950.0,
            actual_price: 950.0,
            discount: 0.0,
            selected_modifiers: vec![],
            item_total: 950.0,
        }],
        subtotal: 950.0,
        discount: 0.0,
        tax: 95.0,
        total: 1045.0,
        payment_method: "cash".into(),
        payment_status: PaymentStatus::Pending,
        order_status: "new".into(),
        customer_phone: String::new(),
        notes: String::new(),
        bill_is_settle: false,
    })
    .await
    .expect("seed order");
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(app.clone(), req)
        .await
        .expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn patch_json(path: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/staff/login",
            json!({"email": email, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["accessToken"]
        .as_str()
        .expect("access token")
        .to_string()
}

// ---------------------------------------------------------------- health

#[tokio::test]
async fn test_health_is_public() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["version"].is_string());
}

// ---------------------------------------------------------------- login

#[tokio::test]
async fn test_login_success_returns_token_and_staff_without_password() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/staff/login",
            json!({"email": "nimal@example.com", "password": "hunter2"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["data"]["accessToken"].as_str().is_some());
    assert_eq!(body["data"]["staff"]["staffName"], "Nimal");
    assert!(body["data"]["staff"].get("password").is_none());
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;

    let token = login(&app, "NIMAL@Example.COM", "hunter2").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password_are_indistinguishable() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;

    let (status_a, body_a) = send(
        &app,
        post_json(
            "/api/staff/login",
            json!({"email": "ghost@example.com", "password": "hunter2"}),
        ),
    )
    .await;
    let (status_b, body_b) = send(
        &app,
        post_json(
            "/api/staff/login",
            json!({"email": "nimal@example.com", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a["message"], "Invalid email or password");
    assert_eq!(body_a["message"], body_b["message"]);
}

#[tokio::test]
async fn test_login_inactive_staff_is_forbidden() {
    let (app, db) = test_app().await;
    seed_staff(&db, "gone@example.com", "hunter2", false).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/staff/login",
            json!({"email": "gone@example.com", "password": "hunter2"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Staff account is inactive");
}

// 停用检查先于密码校验：密码错也要 403 而不是 401
#[tokio::test]
async fn test_login_inactive_staff_wrong_password_is_still_forbidden() {
    let (app, db) = test_app().await;
    seed_staff(&db, "gone@example.com", "hunter2", false).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/staff/login",
            json!({"email": "gone@example.com", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Staff account is inactive");
}

#[tokio::test]
async fn test_login_missing_fields_is_rejected() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/staff/login", json!({"email": "nimal@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

// ---------------------------------------------------------------- auth gate

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, get("/api/table", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token is required");
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, get("/api/table", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(&app, get("/api/staff/logout", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    // Same token is rejected afterwards, even though its signature is valid
    let (status, body) = send(&app, get("/api/table", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been invalidated");
}

#[tokio::test]
async fn test_frontend_logs_are_public_and_never_fail() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/logs/frontend",
            json!([
                {"level": "error", "message": "boom", "context": {"page": "tables"}},
                {"level": "nonsense"},
                42
            ]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

// ---------------------------------------------------------------- tables

#[tokio::test]
async fn test_table_list_is_sorted_by_name_with_derived_status() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    seed_table(&db, "T3", "", "").await;
    seed_table(&db, "T1", "ORD-1", "").await;
    seed_table(&db, "T2", "", "9944").await;

    let token = login(&app, "nimal@example.com", "hunter2").await;
    let (status, body) = send(&app, get("/api/table", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let tables = body["data"]["tables"].as_array().expect("tables array");
    assert_eq!(tables.len(), 3);

    let names: Vec<&str> = tables
        .iter()
        .map(|t| t["tableName"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["T1", "T2", "T3"]);

    assert_eq!(tables[0]["status"], "occupied");
    assert_eq!(tables[0]["isAvailable"], false);
    assert_eq!(tables[1]["status"], "pin_issued");
    assert_eq!(tables[1]["isAvailable"], false);
    assert_eq!(tables[2]["status"], "available");
    assert_eq!(tables[2]["isAvailable"], true);
}

#[tokio::test]
async fn test_table_order_requires_table_id() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(&app, get("/api/table/order", Some(&token))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Table ID is required");
}

#[tokio::test]
async fn test_table_order_unknown_table_is_not_found() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get("/api/table/order?tableId=dining_table:missing", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Table not found");
}

// 纯空白的 tableId 修剪后为空，落在缺参检查上
#[tokio::test]
async fn test_table_order_blank_id_is_rejected() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get("/api/table/order?tableId=%20%20", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Table ID is required");
}

// 非空但无法解析成 RecordId 的 tableId 视为不存在
#[tokio::test]
async fn test_table_order_unparseable_id_is_not_found() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get("/api/table/order?tableId=not-a-record-id", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Table not found");
}

#[tokio::test]
async fn test_table_order_without_order_returns_null_order() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "", "").await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get(&format!("/api/table/order?tableId={table_id}"), Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No order found for this table");
    assert!(body["data"]["order"].is_null());
    assert_eq!(body["data"]["table"]["tableName"], "T1");
    assert_eq!(body["data"]["table"]["isAvailable"], true);
}

#[tokio::test]
async fn test_table_order_dangling_reference_returns_null_order() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-GONE", "").await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get(&format!("/api/table/order?tableId={table_id}"), Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["order"].is_null());
    assert_eq!(body["data"]["table"]["isAvailable"], false);
}

#[tokio::test]
async fn test_table_order_returns_full_order_view() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-1", "1234").await;
    seed_order(&db, "ORD-1", &table_id).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        get(&format!("/api/table/order?tableId={table_id}"), Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let order = &body["data"]["order"];
    assert_eq!(order["orderNumber"], "ORD-1");
    assert_eq!(order["billIsSettle"], false);
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["items"][0]["itemName"], "Rice & Curry");
    assert_eq!(body["data"]["table"]["isAvailable"], false);
}

// ---------------------------------------------------------------- settle

#[tokio::test]
async fn test_settle_marks_order_paid_and_frees_table() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-1", "1234").await;
    seed_order(&db, "ORD-1", &table_id).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        patch_json(
            &format!("/api/table/settle?tableId={table_id}"),
            &token,
            Some(json!({"paymentMethod": "card"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bill settled successfully");
    assert_eq!(body["data"]["order"]["billIsSettle"], true);
    assert_eq!(body["data"]["order"]["paymentStatus"], "paid");
    assert_eq!(body["data"]["order"]["paymentMethod"], "card");
    assert_eq!(body["data"]["table"]["isAvailable"], true);

    // Table list reflects the release
    let (_, list) = send(&app, get("/api/table", Some(&token))).await;
    assert_eq!(list["data"]["tables"][0]["status"], "available");
}

#[tokio::test]
async fn test_settle_without_body_keeps_payment_method() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-1", "").await;
    seed_order(&db, "ORD-1", &table_id).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(
        &app,
        patch_json(&format!("/api/table/settle?tableId={table_id}"), &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["paymentMethod"], "cash");
}

#[tokio::test]
async fn test_settle_twice_fails_on_released_table() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-1", "").await;
    seed_order(&db, "ORD-1", &table_id).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let path = format!("/api/table/settle?tableId={table_id}");
    let (status, _) = send(&app, patch_json(&path, &token, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, patch_json(&path, &token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No order found for this table");
}

#[tokio::test]
async fn test_settle_already_settled_order_is_rejected() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let table_id = seed_table(&db, "T1", "ORD-1", "").await;
    seed_order(&db, "ORD-1", &table_id).await;

    // Order settled out-of-band but still referenced by the table
    db.query("UPDATE order SET bill_is_settle = true, payment_status = 'paid' WHERE order_number = 'ORD-1'")
        .await
        .expect("force settle");

    let token = login(&app, "nimal@example.com", "hunter2").await;
    let (status, body) = send(
        &app,
        patch_json(&format!("/api/table/settle?tableId={table_id}"), &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order is already settled");
}

#[tokio::test]
async fn test_settle_missing_table_id_is_rejected() {
    let (app, db) = test_app().await;
    seed_staff(&db, "nimal@example.com", "hunter2", true).await;
    let token = login(&app, "nimal@example.com", "hunter2").await;

    let (status, body) = send(&app, patch_json("/api/table/settle", &token, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Table ID is required");
}
