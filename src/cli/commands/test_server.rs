//! A real API server on an ephemeral port for exercising CLI commands.

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::{AppState, ChangeNotifier, routes};
use crate::cli::api_client::ApiClient;
use crate::db::{Database, SqliteDatabase};

pub(crate) fn init_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub(crate) async fn spawn_test_server() -> (String, JoinHandle<()>) {
    init_crypto();

    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");

    let app = routes::create_router(AppState::new(db, ChangeNotifier::new()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (url, handle)
}

/// Client acting as `user_id`.
pub(crate) fn client(url: &str, user_id: &str) -> ApiClient {
    ApiClient::new(Some(url.to_string()), Some(user_id.to_string()))
}

/// Register a user and return their id.
pub(crate) async fn register(url: &str, name: &str) -> String {
    let anonymous = ApiClient::new(Some(url.to_string()), None);
    let body: Value = anonymous
        .post("/api/v1/users")
        .json(&json!({
            "email": format!("{}@example.com", name.to_lowercase()),
            "display_name": name,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["id"].as_str().unwrap().to_string()
}

/// POST a JSON body as `user_id` and return the parsed response.
pub(crate) async fn post_json(url: &str, user_id: &str, path: &str, body: Value) -> Value {
    let response = client(url, user_id)
        .post(path)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(
        response.status().is_success(),
        "POST {} failed with {}",
        path,
        response.status()
    );
    response.json().await.unwrap()
}
