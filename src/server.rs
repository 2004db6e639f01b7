//! Forwarding endpoint in front of the upstream passage provider

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use divine_words_core::{
    build_options, BookEntry, Catalog, FetchError, Locale, OptionGroup, OptionItem, ProxyGateway,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

type SharedState = Arc<AppState>;

pub struct AppState {
    pub gateway: ProxyGateway,
    pub catalog: &'static Catalog,
    pub range_span: u16,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
}

pub async fn serve(config: ServerConfig, gateway: ProxyGateway, range_span: u16) -> Result<()> {
    let state = Arc::new(AppState {
        gateway,
        catalog: Catalog::standard(),
        range_span,
    });
    info!(
        %config.addr,
        upstream = state.gateway.base_url(),
        timeout = ?state.gateway.timeout(),
        static_dir = ?config.static_dir,
        "Binding HTTP listener"
    );
    let router = build_router(state, config.static_dir);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout(_) => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: "API timeout".to_string(),
            },
            FetchError::UpstreamRejected { status, message } => Self {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            FetchError::NetworkFailure(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/bible/:reference", get(api_bible))
        .route("/api/books", get(api_books))
        .route("/api/books/:key/:chapter/options", get(api_options))
        .with_state(state);

    let router = match static_dir {
        // Unknown paths fall through to the single-page bundle
        Some(dir) => {
            let index = dir.join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct BibleQuery {
    translation: Option<String>,
}

async fn api_bible(
    State(state): State<SharedState>,
    Path(reference): Path<String>,
    Query(query): Query<BibleQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state
        .gateway
        .fetch_raw(&reference, query.translation.as_deref())
        .await
    {
        Ok(passage) => Ok(Json(passage)),
        Err(e) => {
            warn!(%reference, error = %e, "Bible API Error");
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
    span: Option<u16>,
}

impl LocaleQuery {
    fn locale(&self) -> Result<Locale, ApiError> {
        match self.locale.as_deref() {
            None => Ok(Locale::default()),
            Some(s) => s
                .parse::<Locale>()
                .map_err(|e| ApiError::bad_request(e.to_string())),
        }
    }
}

async fn api_books(
    State(state): State<SharedState>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<Vec<BookEntry>>, ApiError> {
    let locale = query.locale()?;
    Ok(Json(state.catalog.list_books(locale)))
}

#[derive(Debug, Serialize)]
struct OptionsResponse {
    book: &'static str,
    name: &'static str,
    chapter: u16,
    verses: Vec<OptionItem>,
    ranges: Vec<OptionItem>,
}

async fn api_options(
    State(state): State<SharedState>,
    Path((key, chapter)): Path<(String, u16)>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let locale = query.locale()?;
    let book = state
        .catalog
        .find(&key)
        .ok_or_else(|| ApiError::not_found(format!("unknown book: {}", key)))?;
    let span = query.span.unwrap_or(state.range_span);
    let options =
        build_options(book, chapter, span).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (verses, ranges): (Vec<OptionItem>, Vec<OptionItem>) = options
        .items(locale)
        .into_iter()
        .partition(|item| item.group == OptionGroup::Verse);

    Ok(Json(OptionsResponse {
        book: book.key(),
        name: book.name(locale),
        chapter,
        verses,
        ranges,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use futures_util::StreamExt;
    use tower::ServiceExt;

    async fn upstream(Path(reference): Path<String>) -> Response {
        match reference.as_str() {
            "john+3:16" => Json(json!({ "reference": "John 3:16", "text": "For God so loved" })).into_response(),
            "slow+1:1" => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "text": "late" })).into_response()
            }
            "teapot+1:1" => StatusCode::IM_A_TEAPOT.into_response(),
            "stalled+1:1" => {
                let chunks = futures_util::stream::iter([Ok::<_, std::io::Error>("{")]).chain(
                    futures_util::stream::once(async {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        Ok("}")
                    }),
                );
                (StatusCode::NOT_FOUND, Body::from_stream(chunks)).into_response()
            }
            _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
        }
    }

    async fn spawn_upstream() -> String {
        let router = Router::new().route("/:reference", get(upstream));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn router(base: &str, timeout: Duration) -> Router {
        let state = Arc::new(AppState {
            gateway: ProxyGateway::new(base, timeout),
            catalog: Catalog::standard(),
            range_span: 3,
        });
        build_router(state, None)
    }

    async fn get_text(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_passage_forwarded_verbatim() {
        let base = spawn_upstream().await;
        let (status, body) =
            get_json(router(&base, Duration::from_secs(5)), "/api/bible/john+3:16?translation=web").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "reference": "John 3:16", "text": "For God so loved" }));
    }

    #[tokio::test]
    async fn test_rejection_keeps_upstream_status() {
        let base = spawn_upstream().await;
        let (status, body) =
            get_json(router(&base, Duration::from_secs(5)), "/api/bible/invalid+999:999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));

        let (status, body) =
            get_json(router(&base, Duration::from_secs(5)), "/api/bible/teapot+1:1").await;
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(body, json!({ "error": "API error" }));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_504() {
        let base = spawn_upstream().await;
        let (status, body) =
            get_json(router(&base, Duration::from_millis(200)), "/api/bible/slow+1:1").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, json!({ "error": "API timeout" }));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_maps_to_500() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (status, body) = get_json(
            router(&format!("http://{}", addr), Duration::from_secs(5)),
            "/api/bible/john+3:16",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Server error" }));
    }

    #[tokio::test]
    async fn test_static_bundle_with_spa_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<div id=\"app\"></div>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let app = || {
            let state = Arc::new(AppState {
                gateway: ProxyGateway::new("http://127.0.0.1:9", Duration::from_secs(1)),
                catalog: Catalog::standard(),
                range_span: 3,
            });
            build_router(state, Some(dir.path().to_path_buf()))
        };

        let (status, body) = get_text(app(), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");

        // Client-side routes fall back to the bundle's entry point
        let (status, body) = get_text(app(), "/some/route").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<div id=\"app\"></div>");

        let (status, body) = get_json(app(), "/api/books?locale=en").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 66);
    }

    #[tokio::test]
    async fn test_stalled_rejection_maps_to_504() {
        let base = spawn_upstream().await;
        let (status, body) =
            get_json(router(&base, Duration::from_millis(200)), "/api/bible/stalled+1:1").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, json!({ "error": "API timeout" }));
    }

    #[tokio::test]
    async fn test_books_listing_per_locale() {
        let (status, body) = get_json(router("http://127.0.0.1:9", Duration::from_secs(1)), "/api/books?locale=de").await;
        assert_eq!(status, StatusCode::OK);
        let books = body.as_array().unwrap();
        assert_eq!(books.len(), 66);
        assert_eq!(books[0]["name"], "1. Mose");
        assert_eq!(books[42]["key"], "john");
        assert_eq!(books[42]["chapters"], 21);

        let (status, _) = get_json(router("http://127.0.0.1:9", Duration::from_secs(1)), "/api/books?locale=fr").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verse_options_endpoint() {
        let app = || router("http://127.0.0.1:9", Duration::from_secs(1));

        let (status, body) = get_json(app(), "/api/books/john/3/options?locale=en").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "John");
        assert_eq!(body["verses"].as_array().unwrap().len(), 36);
        assert_eq!(body["ranges"][0], json!({ "value": "1-3", "label": "Verses 1-3", "group": "range" }));

        let (_, body) = get_json(app(), "/api/books/john/3/options?locale=de&span=10").await;
        assert_eq!(body["ranges"].as_array().unwrap().len(), 4);
        assert_eq!(body["ranges"][3]["value"], "31-36");

        let (status, _) = get_json(app(), "/api/books/john/22/options").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(app(), "/api/books/hezekiah/1/options").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
