//! HTTP tests: the full router over in-memory collaborators.
//!
//! No database or Redis is needed; rate limiting is skipped because the
//! state carries no cache.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{session_token, TestApp, WEBHOOK_SECRET};
use hotel_booking::api::create_router;
use hotel_booking::config::ROOM_UNAVAILABLE_MESSAGE;
use hotel_booking::domain::{IdentityProfile, RoomType, UserRole};
use hotel_booking::infra::webhook::{HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use hotel_booking::infra::WebhookVerifier;

fn router(app: &TestApp) -> Router {
    create_router(app.state(), &["http://localhost:5173".to_string()])
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session_token(user)));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session_token(user)));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed_webhook(id: &str, body: &Value, signature: Option<&str>) -> Request<Body> {
    let payload = body.to_string();
    let timestamp = Utc::now().timestamp();
    let signature = match signature {
        Some(sig) => sig.to_string(),
        None => WebhookVerifier::new(WEBHOOK_SECRET)
            .unwrap()
            .sign(id, timestamp, payload.as_bytes())
            .unwrap(),
    };

    Request::post("/api/clerk")
        .header(header::CONTENT_TYPE, "application/json")
        .header(HEADER_ID, id)
        .header(HEADER_TIMESTAMP, timestamp.to_string())
        .header(HEADER_SIGNATURE, signature)
        .body(Body::from(payload))
        .unwrap()
}

fn user_created(id: &str) -> Value {
    json!({
        "type": "user.created",
        "data": {
            "id": id,
            "email_addresses": [{"email_address": "nina@example.com"}],
            "first_name": "Nina",
            "last_name": "Rao",
            "image_url": "https://img.example/nina.png"
        }
    })
}

#[tokio::test]
async fn root_reports_api_is_working() {
    let app = TestApp::new();
    let response = router(&app)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"API is working.");
}

#[tokio::test]
async fn protected_route_without_session_is_a_business_failure() {
    let app = TestApp::new();
    let (status, body) = send(&router(&app), get("/api/user", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not authenticated");
}

#[tokio::test]
async fn forged_session_token_is_rejected() {
    let app = TestApp::new();
    app.store.add_user("user_guest", "guest@example.com", UserRole::Guest);
    let request = Request::get("/api/user")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let (_, body) = send(&router(&app), request).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn profile_and_recent_searches() {
    let app = TestApp::new();
    app.store.add_user("user_guest", "guest@example.com", UserRole::Guest);
    let router = router(&app);

    for city in ["Delhi", "Goa", "Pune", "Jaipur"] {
        let (_, body) = send(
            &router,
            post(
                "/api/user/store-recent-search",
                Some("user_guest"),
                json!({"recentSearchedCity": city}),
            ),
        )
        .await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "City added");
    }

    let (status, body) = send(&router, get("/api/user", Some("user_guest"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "guest");
    assert_eq!(body["recentSearchedCities"], json!(["Goa", "Pune", "Jaipur"]));
}

#[tokio::test]
async fn unknown_session_user_is_reconciled_from_identity_provider() {
    let app = TestApp::with_identity(vec![IdentityProfile::new(
        "user_late",
        "late@example.com",
        Some("Late"),
        Some("Comer"),
        None,
    )]);

    let (_, body) = send(&router(&app), get("/api/user", Some("user_late"))).await;

    assert_eq!(body["success"], true);
    assert_eq!(app.store.user("user_late").unwrap().username, "Late Comer");
}

#[tokio::test]
async fn registering_a_hotel_promotes_the_owner() {
    let app = TestApp::new();
    app.store.add_user("user_owner", "owner@example.com", UserRole::Guest);
    let router = router(&app);
    let hotel = json!({
        "name": "Sea Breeze",
        "address": "12 Marine Drive",
        "contact": "+91 98765 43210",
        "city": "Goa"
    });

    let (_, body) = send(&router, post("/api/hotels", Some("user_owner"), hotel.clone())).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Hotel Successfully Registered");
    assert_eq!(body["hotel"]["owner"], "user_owner");
    assert_eq!(app.store.user("user_owner").unwrap().role, UserRole::HotelOwner);

    let (status, body) = send(&router, post("/api/hotels", Some("user_owner"), hotel)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    let (_, body) = send(&router, get("/api/hotels/owner", Some("user_owner"))).await;
    assert_eq!(body["hotels"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn booking_flow_over_http() {
    let app = TestApp::new();
    app.store.add_user("user_owner", "owner@example.com", UserRole::HotelOwner);
    app.store.add_user("user_guest", "guest@example.com", UserRole::Guest);
    let hotel = app.store.add_hotel("user_owner", "Sea Breeze", "Goa");
    let room = app.store.add_room(hotel.id, RoomType::DoubleBed, 1000);
    let router = router(&app);

    let stay = json!({
        "room": room.id,
        "checkInDate": "2024-01-01",
        "checkOutDate": "2024-01-04",
        "guests": 2
    });

    let (_, body) = send(&router, post("/api/bookings/check-availability", None, stay.clone())).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["isAvailable"], true);

    let (_, body) = send(&router, post("/api/bookings/book", Some("user_guest"), stay.clone())).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Booking created successfully.");
    assert_eq!(body["booking"]["totalPrice"], 3000.0);
    assert_eq!(body["booking"]["status"], "pending");

    let (status, body) = send(&router, post("/api/bookings", Some("user_guest"), stay)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], ROOM_UNAVAILABLE_MESSAGE);

    let (_, body) = send(&router, get("/api/bookings/user", Some("user_guest"))).await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(body["bookings"][0]["hotel"]["name"], "Sea Breeze");

    let (_, body) = send(&router, get("/api/bookings/owner-dashboard", Some("user_owner"))).await;
    assert_eq!(body["dashboardData"]["totalBookings"], 1);
    assert_eq!(body["dashboardData"]["totalRevenue"], 3000.0);
}

#[tokio::test]
async fn inverted_dates_are_rejected_before_booking() {
    let app = TestApp::new();
    app.store.add_user("user_guest", "guest@example.com", UserRole::Guest);
    let hotel = app.store.add_hotel("user_guest", "Sea Breeze", "Goa");
    let room = app.store.add_room(hotel.id, RoomType::SingleBed, 1000);

    let (_, body) = send(
        &router(&app),
        post(
            "/api/bookings",
            Some("user_guest"),
            json!({
                "room": room.id,
                "checkInDate": "2024-01-04",
                "checkOutDate": "2024-01-01",
                "guests": 1
            }),
        ),
    )
    .await;

    assert_eq!(body["success"], false);
    assert!(app.store.bookings_of(room.id).is_empty());
}

#[tokio::test]
async fn room_listing_filters_by_destination() {
    let app = TestApp::new();
    app.store.add_user("user_owner", "owner@example.com", UserRole::HotelOwner);
    let goa = app.store.add_hotel("user_owner", "Sea Breeze", "Goa");
    let shimla = app.store.add_hotel("user_owner", "Hill View", "Shimla");
    app.store.add_room(goa.id, RoomType::DoubleBed, 2500);
    app.store.add_room(shimla.id, RoomType::FamilySuite, 7000);
    let router = router(&app);

    let (_, body) = send(&router, get("/api/rooms?destination=goa", None)).await;
    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["hotel"]["city"], "Goa");
    assert_eq!(rooms[0]["hotel"]["owner"]["_id"], "user_owner");

    let (_, body) = send(&router, get("/api/rooms?priceRanges=6000%2B", None)).await;
    assert_eq!(body["rooms"].as_array().unwrap().len(), 1);
    assert_eq!(body["rooms"][0]["roomType"], "Family Suite");
}

#[tokio::test]
async fn webhook_replay_upserts_one_user() {
    let app = TestApp::new();
    let router = router(&app);
    let event = user_created("user_nina");

    for _ in 0..2 {
        let (status, body) = send(&router, signed_webhook("msg_1", &event, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Webhook Received");
    }

    assert_eq!(app.store.user_count(), 1);
    let user = app.store.user("user_nina").unwrap();
    assert_eq!(user.email, "nina@example.com");
    assert_eq!(user.username, "Nina Rao");

    let deleted = json!({"type": "user.deleted", "data": {"id": "user_nina"}});
    let (_, body) = send(&router, signed_webhook("msg_2", &deleted, None)).await;
    assert_eq!(body["success"], true);
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn webhook_with_bad_signature_writes_nothing() {
    let app = TestApp::new();
    let router = router(&app);
    let event = user_created("user_mallory");

    let (status, body) = send(
        &router,
        signed_webhook("msg_3", &event, Some("v1,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.store.user_count(), 0);
}

#[tokio::test]
async fn health_is_degraded_without_infrastructure() {
    let app = TestApp::new();
    let (status, body) = send(&router(&app), get("/health", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
