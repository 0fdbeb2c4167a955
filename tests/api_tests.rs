use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ev_rental::config::EnvironmentConfig;
use ev_rental::models::{Membership, Vehicle};
use ev_rental::repositories::MemoryRentalStore;
use ev_rental::routes::create_app_router;
use ev_rental::state::AppState;
use ev_rental::utils::jwt::{generate_token, JwtConfig};
use ev_rental::utils::time::ManualClock;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    clock: ManualClock,
    user: Uuid,
    vehicle: Uuid,
    vip_vehicle: Uuid,
}

async fn create_test_app() -> TestApp {
    let store = MemoryRentalStore::new();

    let membership = Membership {
        id: Uuid::new_v4(),
        name: "Basic".to_string(),
        discount_pct: Decimal::from(20),
        vip_access: false,
    };
    let user = Uuid::new_v4();
    store.insert_user(user, membership.id).await;
    store.insert_membership(membership).await;

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        make: "Nissan".to_string(),
        model: "Leaf".to_string(),
        year: 2022,
        hourly_rate: Decimal::from(10),
        vip_only: false,
        available: true,
        created_at: Utc::now(),
    };
    let vip_vehicle = Vehicle {
        id: Uuid::new_v4(),
        make: "Tesla".to_string(),
        model: "Model S".to_string(),
        hourly_rate: Decimal::from(40),
        vip_only: true,
        ..vehicle.clone()
    };
    let (vehicle_id, vip_vehicle_id) = (vehicle.id, vip_vehicle.id);
    store.insert_vehicle(vehicle).await;
    store.insert_vehicle(vip_vehicle).await;

    let config = EnvironmentConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "ENVIRONMENT" => Some("test".to_string()),
        _ => None,
    })
    .unwrap();

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap());
    let state = AppState::new(config, Arc::new(store), Arc::new(clock.clone()));

    TestApp {
        router: create_app_router(state),
        clock,
        user,
        vehicle: vehicle_id,
        vip_vehicle: vip_vehicle_id,
    }
}

fn token_for(user: Uuid) -> String {
    let config = JwtConfig {
        secret: SECRET.to_string(),
    };
    generate_token(user, 3600, &config).unwrap()
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = create_test_app().await;

    let (status, body) = app.send(Method::GET, "/api/rentals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/rentals")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rental_flow_over_http() {
    let app = create_test_app().await;
    let user = Some(app.user);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/rentals",
            user,
            Some(json!({ "vehicle_id": app.vehicle, "hours": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["scheduled_start"], "2024-05-01T09:00:00+08:00");

    let (status, body) = app.send(Method::GET, "/api/rentals/active", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicle_id"], app.vehicle.to_string());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/rentals",
            user,
            Some(json!({ "vehicle_id": app.vehicle, "hours": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    app.clock.advance(Duration::hours(7));
    let (status, body) = app.send(Method::POST, "/api/rentals/active/complete", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rental"]["status"], "completed");
    assert_eq!(body["data"]["invoice"]["final_cost"], "70.00");
    assert_eq!(body["data"]["invoice"]["overdue_hours"], 2);
    assert_eq!(body["data"]["discounted_rate"], "8.00");
    assert_eq!(body["data"]["overtime_rate"], "15.00");

    let invoice_id = body["data"]["invoice"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(Method::GET, "/api/billing/invoices?unpaid_only=true", user, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/billing/invoices/{}/pay", invoice_id);
    let (status, body) = app.send(Method::POST, &uri, user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paid"], true);

    let (status, _) = app.send(Method::POST, &uri, user, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .send(Method::GET, "/api/billing/invoices?unpaid_only=true", user, None)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app.send(Method::GET, "/api/rentals", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_late_cancellation_is_unprocessable() {
    let app = create_test_app().await;
    let user = Some(app.user);

    app.send(
        Method::POST,
        "/api/rentals",
        user,
        Some(json!({ "vehicle_id": app.vehicle, "hours": 3 })),
    )
    .await;

    app.clock.advance(Duration::minutes(90));
    let (status, body) = app.send(Method::POST, "/api/rentals/active/cancel", user, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "POLICY_REJECTED");
}

#[tokio::test]
async fn test_extend_and_cancel_over_http() {
    let app = create_test_app().await;
    let user = Some(app.user);

    app.send(
        Method::POST,
        "/api/rentals",
        user,
        Some(json!({ "vehicle_id": app.vehicle, "hours": 2 })),
    )
    .await;

    let (status, body) = app
        .send(Method::POST, "/api/rentals/active/extend", user, Some(json!({ "hours": 3 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scheduled_end"], "2024-05-01T14:00:00+08:00");

    let (status, _) = app
        .send(Method::POST, "/api/rentals/active/extend", user, Some(json!({ "hours": 0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::POST, "/api/rentals/active/cancel", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = app.send(Method::GET, "/api/rentals/active", user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vehicle_endpoints() {
    let app = create_test_app().await;
    let user = Some(app.user);

    let (status, body) = app.send(Method::GET, "/api/vehicles/available", user, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["hourly_rate"], "10.00");

    let uri = format!("/api/vehicles/{}", app.vip_vehicle);
    let (status, body) = app.send(Method::GET, &uri, user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vip_only"], true);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/rentals",
            user,
            Some(json!({ "vehicle_id": app.vip_vehicle, "hours": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let uri = format!("/api/vehicles/{}", Uuid::new_v4());
    let (status, _) = app.send(Method::GET, &uri, user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_estimate_over_http() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/billing/estimate",
            Some(app.user),
            Some(json!({ "vehicle_id": app.vehicle, "hours": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hourly_rate"], "8.00");
    assert_eq!(body["data"]["total_cost"], "24.00");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/billing/estimate",
            Some(app.user),
            Some(json!({ "vehicle_id": app.vehicle, "hours": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_rental_body_is_invalid_input() {
    let app = create_test_app().await;
    let user = Some(app.user);

    let bodies = [
        json!({ "vehicle_id": app.vehicle, "hours": 1.5 }),
        json!({ "hours": 2 }),
        json!({ "vehicle_id": app.vehicle, "hours": "3" }),
        json!({ "vehicle_id": "not-a-uuid", "hours": 2 }),
    ];
    for body in bodies {
        let (status, response) = app.send(Method::POST, "/api/rentals", user, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "INVALID_INPUT");
    }

    // Nothing was booked along the way.
    let (status, _) = app.send(Method::GET, "/api/rentals/active", user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_input_is_distinct_from_policy_rejection() {
    let app = create_test_app().await;
    let user = Some(app.user);

    app.send(
        Method::POST,
        "/api/rentals",
        user,
        Some(json!({ "vehicle_id": app.vehicle, "hours": 3 })),
    )
    .await;

    let (status, body) = app
        .send(Method::POST, "/api/rentals/active/extend", user, Some(json!({ "hours": 1.5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    app.clock.advance(Duration::minutes(61));
    let (status, body) = app.send(Method::POST, "/api/rentals/active/cancel", user, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "POLICY_REJECTED");
}

#[tokio::test]
async fn test_malformed_path_and_query_are_invalid_input() {
    let app = create_test_app().await;
    let user = Some(app.user);

    let (status, body) = app.send(Method::GET, "/api/vehicles/not-a-uuid", user, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = app
        .send(Method::POST, "/api/billing/invoices/12345/pay", user, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = app
        .send(Method::GET, "/api/billing/invoices?unpaid_only=maybe", user, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_missing_content_type_is_invalid_input() {
    let app = create_test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/billing/estimate")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(app.user)))
        .body(Body::from(json!({ "vehicle_id": app.vehicle, "hours": 1 }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
