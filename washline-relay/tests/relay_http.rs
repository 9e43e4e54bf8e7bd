use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use washline_core::{CompletedVehicle, NotificationService};
use washline_provider_relay::RelayClient;
use washline_relay::{AppState, RelayConfig, SEND_SMS_PATH, build_router};

const ACCOUNT_SID: &str = "ACtest";
// base64("ACtest:token")
const EXPECTED_AUTH: &str = "Basic QUN0ZXN0OnRva2Vu";

#[derive(Debug, Clone)]
struct GatewayHit {
    account: String,
    authorization: Option<String>,
    form: HashMap<String, String>,
}

#[derive(Clone)]
struct FakeGateway {
    hits: Arc<Mutex<Vec<GatewayHit>>>,
    status: StatusCode,
    reply: Value,
    delay: Duration,
}

impl FakeGateway {
    fn accepting() -> Self {
        Self {
            hits: Arc::default(),
            status: StatusCode::CREATED,
            reply: json!({ "sid": "SM0123456789abcdef", "status": "queued" }),
            delay: Duration::ZERO,
        }
    }

    fn rejecting(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            ..Self::accepting()
        }
    }

    fn hits(&self) -> Vec<GatewayHit> {
        self.hits.lock().expect("gateway log lock").clone()
    }
}

async fn messages(
    State(gateway): State<FakeGateway>,
    Path(account): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    gateway.hits.lock().expect("gateway log lock").push(GatewayHit {
        account,
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        form,
    });
    tokio::time::sleep(gateway.delay).await;
    (gateway.status, Json(gateway.reply.clone()))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn spawn_gateway(gateway: FakeGateway) -> SocketAddr {
    let app = Router::new()
        .route("/2010-04-01/Accounts/:account/Messages.json", post(messages))
        .with_state(gateway);
    serve(app).await
}

fn relay_config(gateway: Option<SocketAddr>, extra: &[(&str, &str)]) -> RelayConfig {
    let mut vars: HashMap<String, String> = extra
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    if let Some(addr) = gateway {
        vars.insert("TWILIO_ACCOUNT_SID".to_owned(), ACCOUNT_SID.to_owned());
        vars.insert("TWILIO_AUTH_TOKEN".to_owned(), "token".to_owned());
        vars.insert("TWILIO_PHONE_NUMBER".to_owned(), "+15005550006".to_owned());
        vars.insert("TWILIO_API_BASE".to_owned(), format!("http://{addr}"));
    }
    RelayConfig::from_lookup(|name| vars.get(name).cloned())
}

async fn spawn_relay(config: &RelayConfig) -> String {
    let state = AppState::from_config(config).expect("relay state");
    let addr = serve(build_router(state)).await;
    format!("http://{addr}{SEND_SMS_PATH}")
}

fn dispatcher(endpoint: &str) -> NotificationService {
    let relay = RelayClient::with_timeout(endpoint, Duration::from_secs(5)).expect("relay client");
    NotificationService::new(Arc::new(relay))
}

async fn post_json(url: &str, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .expect("relay reachable");
    let status = response.status();
    let body = response.json::<Value>().await.expect("json body");
    (status, body)
}

fn completion_body() -> Value {
    json!({
        "phoneNumber": "+639171234567",
        "customerName": "Ana",
        "plateNumber": "ABC-123",
        "services": ["Exterior Wash"],
        "packages": [],
        "totalAmount": 250,
        "completionTime": "Jun 1, 2024, 8:00 AM"
    })
}

#[tokio::test]
async fn completion_notice_reaches_gateway_and_returns_sid() {
    let gateway = FakeGateway::accepting();
    let gateway_addr = spawn_gateway(gateway.clone()).await;
    let endpoint = spawn_relay(&relay_config(Some(gateway_addr), &[])).await;

    let response = dispatcher(&endpoint)
        .send_car_completion_sms(
            CompletedVehicle::new("0917 123 4567", "Ana", "abc-123")
                .with_services(vec!["Exterior Wash".to_owned()])
                .with_total_amount(250.0),
        )
        .await;

    assert!(response.success, "{response:?}");
    assert_eq!(response.sid.as_deref(), Some("SM0123456789abcdef"));
    assert_eq!(
        response.message.as_deref(),
        Some("SMS notification sent successfully")
    );

    let hits = gateway.hits();
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];
    assert_eq!(hit.account, ACCOUNT_SID);
    assert_eq!(hit.authorization.as_deref(), Some(EXPECTED_AUTH));
    assert_eq!(hit.form.get("To").map(String::as_str), Some("639171234567"));
    assert_eq!(hit.form.get("From").map(String::as_str), Some("+15005550006"));
    let body = hit.form.get("Body").expect("message body");
    assert!(body.starts_with("Hi Ana! Your vehicle ABC-123"));
    assert!(body.contains("Services: Exterior Wash"));
    assert!(body.contains("Total: PHP 250.00"));
}

#[tokio::test]
async fn missing_credentials_fail_closed() {
    let endpoint = spawn_relay(&relay_config(None, &[])).await;

    let response = dispatcher(&endpoint)
        .send_motorcycle_completion_sms(CompletedVehicle::new("09171234567", "Ben", "12-AB"))
        .await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("SMS service not configured"));
    assert_eq!(response.sid, None);

    let (status, body) = post_json(&endpoint, &completion_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "error": "SMS service not configured" })
    );
}

#[tokio::test]
async fn missing_fields_are_rejected_before_the_gateway() {
    let gateway = FakeGateway::accepting();
    let gateway_addr = spawn_gateway(gateway.clone()).await;
    let endpoint = spawn_relay(&relay_config(Some(gateway_addr), &[])).await;

    let (status, body) = post_json(&endpoint, &json!({ "customerName": "Ana" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required fields: phoneNumber, plateNumber" })
    );

    let response = reqwest::Client::new()
        .post(&endpoint)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("relay reachable");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>().await.expect("json body");
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid request body"));

    assert!(gateway.hits().is_empty());
}

#[tokio::test]
async fn wrong_method_is_405() {
    let endpoint = spawn_relay(&relay_config(None, &[])).await;

    let response = reqwest::get(&endpoint).await.expect("relay reachable");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = response.json::<Value>().await.expect("json body");
    assert_eq!(body, json!({ "error": "Method not allowed" }));
}

#[tokio::test]
async fn gateway_rejection_keeps_status_code() {
    let gateway = FakeGateway::rejecting(
        StatusCode::UNAUTHORIZED,
        json!({ "code": 20003, "message": "Authenticate", "status": 401 }),
    );
    let gateway_addr = spawn_gateway(gateway).await;
    let endpoint = spawn_relay(&relay_config(Some(gateway_addr), &[])).await;

    let (status, body) = post_json(&endpoint, &completion_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "SMS gateway error (401): Authenticate");

    let response = dispatcher(&endpoint)
        .send_car_completion_sms(CompletedVehicle::new("09171234567", "Ana", "ABC-123"))
        .await;
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("SMS gateway error (401): Authenticate")
    );
}

#[tokio::test]
async fn slow_gateway_times_out_instead_of_hanging() {
    let gateway = FakeGateway {
        delay: Duration::from_secs(3),
        ..FakeGateway::accepting()
    };
    let gateway_addr = spawn_gateway(gateway).await;
    let endpoint = spawn_relay(&relay_config(
        Some(gateway_addr),
        &[("RELAY_GATEWAY_TIMEOUT_MS", "200")],
    ))
    .await;

    let started = std::time::Instant::now();
    let (status, body) = post_json(&endpoint, &completion_body()).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Network error")
    );
}

#[tokio::test]
async fn legacy_status_payload_is_still_relayed() {
    let gateway = FakeGateway::accepting();
    let gateway_addr = spawn_gateway(gateway.clone()).await;
    let endpoint = spawn_relay(&relay_config(Some(gateway_addr), &[])).await;

    let (status, body) = post_json(
        &endpoint,
        &json!({
            "status": "payment-pending",
            "plateNumber": "xyz-789",
            "serviceType": "car wash",
            "phoneNumber": "+639181234567",
            "queueNumber": 12
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "sid": "SM0123456789abcdef" }));
    let hits = gateway.hits();
    assert_eq!(
        hits[0].form.get("Body").map(String::as_str),
        Some("Your car wash for XYZ-789 (queue #12) is now payment pending.\nThank you for choosing our car wash!")
    );
}

#[tokio::test]
async fn repeated_sends_to_one_number_are_rate_limited() {
    let gateway = FakeGateway::accepting();
    let gateway_addr = spawn_gateway(gateway.clone()).await;
    let endpoint = spawn_relay(&relay_config(
        Some(gateway_addr),
        &[("RELAY_RATE_LIMIT_MAX", "2")],
    ))
    .await;

    for _ in 0..2 {
        let (status, _) = post_json(&endpoint, &completion_body()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = post_json(&endpoint, &completion_body()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);

    let mut other = completion_body();
    other["phoneNumber"] = json!("+639189999999");
    let (status, _) = post_json(&endpoint, &other).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(gateway.hits().len(), 3);
}

#[tokio::test]
async fn rate_limit_counts_every_spelling_of_one_number() {
    let gateway = FakeGateway::accepting();
    let gateway_addr = spawn_gateway(gateway.clone()).await;
    let endpoint = spawn_relay(&relay_config(
        Some(gateway_addr),
        &[("RELAY_RATE_LIMIT_MAX", "1")],
    ))
    .await;

    let mut outcomes = Vec::new();
    for phone in [
        "+639171234567",
        "639171234567",
        "09171234567",
        "0917 123 4567",
        "+63 917 123 4567",
    ] {
        let mut body = completion_body();
        body["phoneNumber"] = json!(phone);
        let (status, _) = post_json(&endpoint, &body).await;
        outcomes.push((phone, status));
    }

    assert_eq!(outcomes[0].1, StatusCode::OK);
    for (phone, status) in &outcomes[1..] {
        assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS, "{phone}");
    }
    assert_eq!(gateway.hits().len(), 1);
}

#[tokio::test]
async fn healthz_answers() {
    let endpoint = spawn_relay(&relay_config(None, &[])).await;
    let health = endpoint.replace(SEND_SMS_PATH, "/healthz");
    let response = reqwest::get(&health).await.expect("relay reachable");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("text body"), "ok");
}
