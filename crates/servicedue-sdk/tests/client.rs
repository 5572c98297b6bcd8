//! End-to-end tests of [`ServiceDueClient`] against an in-process backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::TimeDelta;
use serde_json::{json, Value};

use servicedue_sdk::{
    AuthResponse, CampaignFlow, CampaignRunner, Channel, LaunchEvent, LeadId, PageRequest,
    ProgressConfig, ResetPasswordForm, SdkConfig, SdkError, Segment, ServiceDueClient, Session,
    SignInForm, SignUpForm, GENERIC_FAILURE,
};

const TOKEN: &str = "tok-123";

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Backend {
    launches: Arc<Mutex<Vec<Value>>>,
    customer_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

fn user_json(email: &str) -> Value {
    json!({
        "id": 7,
        "email": email,
        "first_name": "Sunil",
        "last_name": "Rao",
        "dealership_name": "Rao Motors"
    })
}

fn detail(status: StatusCode, detail: Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn sign_in(Json(body): Json<Value>) -> Response {
    if body["password"] == "correct-horse" {
        Json(json!({ "token": TOKEN, "user": user_json(body["email"].as_str().unwrap_or("")) }))
            .into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, json!("Invalid email or password"))
    }
}

async fn sign_up(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@dealer.in" {
        return detail(StatusCode::BAD_REQUEST, json!("Email already registered"));
    }
    Json(json!({ "token": TOKEN, "user": user_json(body["email"].as_str().unwrap_or("")) }))
        .into_response()
}

async fn reset_password() -> Response {
    Json(json!({ "message": "If the account exists, an email was sent" })).into_response()
}

async fn customers(
    State(backend): State<Backend>,
    Path(slug): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    backend.customer_queries.lock().unwrap().push(query);
    match slug.as_str() {
        "warranty" => Json(json!({
            "customers": [
                {
                    "id": 1,
                    "name": "Rajesh Kumar",
                    "phone": "+919800000001",
                    "bikeModel": "Access 125",
                    "vehicleNumber": "KA05AB1234",
                    "segment": "1ST_FREE",
                    "estimatedValue": 450.0,
                    "daysRemaining": 3
                },
                {
                    "id": "2",
                    "name": "Anita Desai",
                    "phone": "+919800000002",
                    "bike_model": "Jupiter",
                    "vehicle_number": "KA05CD5678",
                    "segment": "SOMETHING_NEW",
                    "estimated_value": 380.0,
                    "days_remaining": 9
                }
            ],
            "total": 12,
            "showing": 2,
            "has_more": true
        }))
        .into_response(),
        "winback" => detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{ "loc": ["query", "limit"], "msg": "limit too large" }]),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn launch(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, json!("Not authenticated"));
    }
    let queued = body["lead_ids"].as_array().map_or(0, Vec::len);
    backend.launches.lock().unwrap().push(body);
    Json(json!({ "campaign_id": 42, "queued": queued, "status": "queued" })).into_response()
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/customers/{slug}", get(customers))
        .route("/api/campaigns/launch", post(launch))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

fn client_for(base: &str) -> ServiceDueClient {
    ServiceDueClient::new(&SdkConfig {
        api_url: base.to_string(),
        ..SdkConfig::default()
    })
    .unwrap()
}

fn signed_in(base: &str) -> ServiceDueClient {
    let auth = AuthResponse {
        token: TOKEN.into(),
        user: Default::default(),
    };
    client_for(base).with_session(Session::new(auth, TimeDelta::hours(1)))
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_in_returns_token_and_user() {
    let (base, _) = spawn_backend().await;
    let form = SignInForm {
        email: "owner@raomotors.in".into(),
        password: "correct-horse".into(),
    };
    let auth = client_for(&base).sign_in(&form.validate().unwrap()).await.unwrap();
    assert_eq!(auth.token, TOKEN);
    assert_eq!(auth.user.id, "7");
    assert_eq!(auth.user.display_name(), "Sunil Rao");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized_with_detail() {
    let (base, _) = spawn_backend().await;
    let form = SignInForm {
        email: "owner@raomotors.in".into(),
        password: "wrong".into(),
    };
    let err = client_for(&base)
        .sign_in(&form.validate().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Unauthorized(_)));
    assert_eq!(err.banner(), "Invalid email or password");
}

#[tokio::test]
async fn sign_up_surfaces_backend_detail() {
    let (base, _) = spawn_backend().await;
    let form = SignUpForm {
        email: "taken@dealer.in".into(),
        password: "longenough".into(),
        confirm_password: "longenough".into(),
        first_name: "Sunil".into(),
        last_name: "Rao".into(),
        dealership_name: "Rao Motors".into(),
    };
    let client = client_for(&base);
    let err = client.sign_up(&form.validate().unwrap()).await.unwrap_err();
    match &err {
        SdkError::Api { status, detail } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(detail.as_deref(), Some("Email already registered"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let ok = SignUpForm {
        email: "new@dealer.in".into(),
        ..form
    };
    let auth = client.sign_up(&ok.validate().unwrap()).await.unwrap();
    assert_eq!(auth.user.email, "new@dealer.in");
}

#[tokio::test]
async fn reset_password_accepts_any_success_body() {
    let (base, _) = spawn_backend().await;
    let form = ResetPasswordForm {
        email: "owner@raomotors.in".into(),
    };
    client_for(&base)
        .reset_password(&form.validate().unwrap())
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn customer_page_is_decoded_with_paging_query() {
    let (base, backend) = spawn_backend().await;
    let page = signed_in(&base)
        .customers(Segment::Warranty, PageRequest::first(25))
        .await
        .unwrap();

    assert_eq!(page.total, 12);
    assert!(page.has_more);
    assert_eq!(page.customers.len(), 2);
    assert_eq!(page.customers[0].id, LeadId::new("1"));
    assert_eq!(page.customers[0].bike_model, "Access 125");
    assert_eq!(page.customers[1].vehicle_number, "KA05CD5678");
    assert_eq!(page.customers[1].segment, Segment::Routine);

    let queries = backend.customer_queries.lock().unwrap();
    assert_eq!(queries[0]["page"], "1");
    assert_eq!(queries[0]["limit"], "25");
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let (base, _) = spawn_backend().await;
    let auth = AuthResponse {
        token: "stale".into(),
        user: Default::default(),
    };
    let client = client_for(&base).with_session(Session::new(auth, TimeDelta::hours(1)));
    let err = client
        .customers(Segment::Warranty, PageRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn structured_detail_is_flattened() {
    let (base, _) = spawn_backend().await;
    let err = signed_in(&base)
        .customers(Segment::Winback, PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.banner(), "limit too large");
}

#[tokio::test]
async fn server_error_without_detail_is_generic() {
    let (base, _) = spawn_backend().await;
    let err = signed_in(&base)
        .customers(Segment::Routine, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Api { detail: None, .. }));
    assert_eq!(err.banner(), GENERIC_FAILURE);
}

// ---------------------------------------------------------------------------
// Campaign launch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirmed_flow_sends_exactly_one_launch() {
    let (base, backend) = spawn_backend().await;
    let client = signed_in(&base);

    let mut flow = CampaignFlow::new();
    assert!(flow.open_drawer(Segment::Warranty, 2));
    assert!(flow.choose_channel(Channel::Whatsapp));
    assert!(flow.confirm_drawer(2));
    let request = flow
        .confirm_launch(vec![LeadId::new("1"), LeadId::new("2")])
        .unwrap();

    let receipt = client.launch_campaign(&request).await.unwrap();
    assert_eq!(receipt.campaign_id.as_deref(), Some("42"));
    assert_eq!(receipt.queued, Some(2));

    let launches = backend.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(
        launches[0],
        json!({
            "lead_ids": ["1", "2"],
            "segment": "1ST_FREE",
            "channel": "whatsapp",
            "template_id": "WARRANTY_EXPIRY_URGENT"
        })
    );
}

#[tokio::test]
async fn runner_reports_real_launch_outcome() {
    let (base, backend) = spawn_backend().await;
    let client = signed_in(&base);

    let mut flow = CampaignFlow::new();
    flow.open_drawer(Segment::Routine, 1);
    flow.choose_channel(Channel::Voice);
    flow.confirm_drawer(1);
    let request = flow.confirm_launch(vec![LeadId::new("9")]).unwrap();

    let config = ProgressConfig {
        duration: std::time::Duration::from_millis(50),
        steps: 5,
        hold: std::time::Duration::from_millis(10),
    };
    let mut rx = CampaignRunner::spawn(
        async move { client.launch_campaign(&request).await },
        config,
    );

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert!(matches!(events.first(), Some(LaunchEvent::Progress(_))));
    assert!(events
        .iter()
        .any(|e| matches!(e, LaunchEvent::Completed(r) if r.queued == Some(1))));
    assert_eq!(events.last(), Some(&LaunchEvent::Dismissed));
    assert_eq!(backend.launches.lock().unwrap().len(), 1);
}
