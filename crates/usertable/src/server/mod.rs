//! HTTP API service for usertable.
//!
//! Maps the five `/api/users` endpoints onto [`Storage`] operations and
//! serves the browser page, either built in or from a configured directory.

mod assets;
mod handlers;
mod response;

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// State shared by every request handler.
///
/// Each handler takes the lock for exactly one store operation.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
}

impl AppState {
    /// Wrap an opened store.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// State backed by a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Storage::open_in_memory()?))
    }

    /// Run `f` against the store while holding the lock.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or [`Error::Internal`] if a previous
    /// holder panicked.
    pub fn with_storage<T>(&self, f: impl FnOnce(&Storage) -> Result<T>) -> Result<T> {
        let storage = self
            .storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))?;
        f(&storage)
    }
}

/// Build the application router.
///
/// With `public_dir` set, static files are served from that directory
/// instead of the built-in page.
pub fn router(state: AppState, public_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .with_state(state);

    let app = match public_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api
            .route("/", get(assets::index))
            .route("/index.html", get(assets::index))
            .route("/app.js", get(assets::app_js)),
    };
    app.layer(TraceLayer::new_for_http())
}

/// Open the configured database, bind the configured address and serve
/// until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the address cannot
/// be bound.
pub async fn run(config: &Config) -> Result<()> {
    let storage = Storage::open(config.database_path())?;
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        "API server running at http://{}",
        listener.local_addr()?
    );

    let app = router(AppState::new(storage), config.server.public_dir.as_deref());
    serve(listener, app, shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        router(AppState::in_memory().unwrap(), None)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn alice() -> Value {
        json!({"name": "Alice", "age": 30, "mobile": "555-1111"})
    }

    #[tokio::test]
    async fn test_create_returns_201_with_new_id() {
        let app = test_app();
        let (status, body) = send(&app, Method::POST, "/api/users", Some(alice())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["age"], 30);
        assert_eq!(body["mobile"], "555-1111");
        assert!(!body["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_echoes_numeric_ages_and_text_verbatim() {
        let app = test_app();
        for age in [json!(30.5), json!(-1), json!(5_000_000_000_u64)] {
            let payload = json!({"name": " Bob ", "age": age.clone(), "mobile": "   "});
            let (status, body) = send(&app, Method::POST, "/api/users", Some(payload)).await;

            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["name"], " Bob ");
            assert_eq!(body["age"], age);
            assert_eq!(body["mobile"], "   ");

            let uri = format!("/api/users/{}", body["id"].as_str().unwrap());
            let (_, fetched) = send(&app, Method::GET, &uri, None).await;
            assert_eq!(fetched, body);
        }
    }

    #[tokio::test]
    async fn test_create_missing_field_returns_400() {
        let app = test_app();
        for missing in ["name", "age", "mobile"] {
            let mut payload = alice();
            payload.as_object_mut().unwrap().remove(missing);
            let (status, body) = send(&app, Method::POST, "/api/users", Some(payload)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["message"].as_str().unwrap().contains(missing));
        }
        let (_, list) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400_message() {
        let app = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_get_round_trip_and_404() {
        let app = test_app();
        let (_, created) = send(&app, Method::POST, "/api/users", Some(alice())).await;
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = send(&app, Method::GET, &format!("/api/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, body) = send(&app, Method::GET, "/api/users/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "User not found"}));
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_keeps_id() {
        let app = test_app();
        let (_, created) = send(&app, Method::POST, "/api/users", Some(alice())).await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/api/users/{id}");

        let changes = json!({"name": "Alicia", "age": "31", "mobile": "555-9999"});
        let (status, updated) = send(&app, Method::PUT, &uri, Some(changes)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            updated,
            json!({"id": id, "name": "Alicia", "age": 31, "mobile": "555-9999"})
        );

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let app = test_app();
        let (status, _) = send(&app, Method::PUT, "/api/users/nope", Some(alice())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, created) = send(&app, Method::POST, "/api/users", Some(alice())).await;
        let uri = format!("/api/users/{}", created["id"].as_str().unwrap());
        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("age is required"));
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let app = test_app();
        let (_, created) = send(&app, Method::POST, "/api/users", Some(alice())).await;
        let uri = format!("/api/users/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_counts_creates_minus_deletes() {
        let app = test_app();
        let mut ids = Vec::new();
        for i in 0..5 {
            let payload = json!({"name": format!("U{i}"), "age": i, "mobile": "1"});
            let (_, created) = send(&app, Method::POST, "/api/users", Some(payload)).await;
            ids.push(created["id"].as_str().unwrap().to_string());
        }
        for id in &ids[..2] {
            send(&app, Method::DELETE, &format!("/api/users/{id}"), None).await;
        }

        let (status, list) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_serves_browser_page() {
        let app = test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("userTable"));

        let request = Request::builder().uri("/app.js").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/javascript"));
    }

    #[tokio::test]
    async fn test_page_cancels_delete_when_dialog_is_dismissed() {
        let request = Request::builder().uri("/app.js").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let script = String::from_utf8_lossy(&bytes);

        let hidden = script
            .find("'hidden.bs.modal'")
            .expect("dialog close handler");
        assert!(script[hidden..].contains("dispatch({ type: 'deleteCancelled' })"));
    }

    #[tokio::test]
    async fn test_serves_configured_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>custom page</p>").unwrap();
        let app = router(AppState::in_memory().unwrap(), Some(dir.path()));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<p>custom page</p>");

        let (status, list) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([]));
    }
}
