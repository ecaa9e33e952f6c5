use reqwest::StatusCode;
use serde_json::json;

use nestegg_api::config::Config;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(password: &str) -> Self {
        let config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            use_persistent_store: false,
            database_url: None,
            session_secret: "test-secret".to_string(),
            password_hash: nestegg_auth::hash_password(password),
            session_ttl: chrono::Duration::minutes(30),
            store_ping_interval: std::time::Duration::from_secs(3600),
        };

        // Build app (same router as prod), but bind to an ephemeral port.
        let app = nestegg_api::app::build_app(config).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn login(&self, client: &reqwest::Client, password: &str) -> String {
        let resp = client
            .post(format!("{}/api/auth/verify", self.base_url))
            .json(&json!({ "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let server = TestServer::spawn("the real password").await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/verify", server.base_url))
        .json(&json!({ "password": "not it" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ledger_routes_require_a_token() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/account/history", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    // Rejections use the same error shape as every other failure.
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], json!("unauthorized"));
    assert!(body["message"].is_string());

    let resp = client
        .get(format!("{}/api/account/history", server.base_url))
        .bearer_auth("garbage-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], json!("unauthorized"));
}

#[tokio::test]
async fn auth_status_reflects_the_session() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/auth/status", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["authenticated"], json!(false));

    let token = server.login(&client, "pw").await;
    let resp = client
        .get(format!("{}/api/auth/status", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["authenticated"], json!(true));
}

#[tokio::test]
async fn record_and_derive_balances_end_to_end() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();
    let token = server.login(&client, "pw").await;

    // Credit 100.00 to Savings.
    let resp = client
        .post(format!("{}/api/account/update", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "accountName": "Savings",
            "amount": "100.00",
            "transactionType": "add",
            "note": "first deposit",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["newBalance"], json!("100.00"));

    // Debit 30.00 from Savings; amount with a thousands separator is fine.
    let resp = client
        .post(format!("{}/api/account/update", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "accountName": "Savings",
            "amount": "30.00",
            "transactionType": "subtract",
        }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["newBalance"], json!("70.00"));

    // Credit 50.00 to Piggy.
    client
        .post(format!("{}/api/account/update", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "accountName": "Piggy",
            "amount": "50.00",
            "kind": "credit",
        }))
        .send()
        .await
        .unwrap();

    // History carries per-account and total balances.
    let resp = client
        .get(format!("{}/api/account/history", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["totalBalance"], json!("120.00"));
    assert_eq!(body["data"]["accountBalances"]["Savings"], json!("70.00"));
    assert_eq!(body["data"]["accountBalances"]["Piggy"], json!("50.00"));
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 3);

    // Single-account balance.
    let resp = client
        .get(format!("{}/api/account/balance/Savings", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["balance"], json!("70.00"));
}

#[tokio::test]
async fn invalid_amounts_are_rejected_and_store_stays_clean() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();
    let token = server.login(&client, "pw").await;

    for amount in ["0", "-5.00", "abc", "12.345"] {
        let resp = client
            .post(format!("{}/api/account/update", server.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "accountName": "Savings",
                "amount": amount,
                "transactionType": "add",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "amount {amount:?}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], json!("invalid_amount"));
    }

    let resp = client
        .get(format!("{}/api/account/history", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["totalBalance"], json!("0.00"));
}

#[tokio::test]
async fn history_limit_returns_the_latest_occurrence() {
    let server = TestServer::spawn("pw").await;
    let client = reqwest::Client::new();
    let token = server.login(&client, "pw").await;

    // Three transactions with out-of-order occurred_at timestamps.
    for (amount, occurred_at) in [
        ("10.00", "2026-01-10T09:00:00Z"),
        ("30.00", "2026-01-30T09:00:00Z"),
        ("20.00", "2026-01-20T09:00:00Z"),
    ] {
        client
            .post(format!("{}/api/account/update", server.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "accountName": "Savings",
                "amount": amount,
                "transactionType": "add",
                "dateTime": occurred_at,
            }))
            .send()
            .await
            .unwrap();
    }

    let resp = client
        .get(format!("{}/api/account/history?limit=1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let txns = body["data"]["transactions"].as_array().unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0]["amount"], json!("30.00"));
}
