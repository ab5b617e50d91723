//! In-memory stand-in for the micro-url backend.
//!
//! Serves every `/api` route the client calls, with the same status codes and
//! `{"error": "..."}` bodies as the real service, plus the `/{id}` redirect
//! that records views. Login state is a `sid` session cookie.

pub mod images;
pub mod store;
pub mod types;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub use store::{Created, Failure, Store};
pub use types::*;

pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Base used to build `short_url` values.
    pub public_url: String,
    pub oidc_provider: String,
    pub oidc_authorize_url: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8081".to_string(),
            oidc_provider: "Mock OIDC".to_string(),
            oidc_authorize_url: "http://localhost:8081/oidc/authorize".to_string(),
        }
    }
}

impl MockConfig {
    /// Overrides from `PUBLIC_URL`, `OIDC_PROVIDER` and `OIDC_AUTHORIZE_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, fallback: String| std::env::var(key).unwrap_or(fallback);
        Self {
            public_url: var("PUBLIC_URL", defaults.public_url),
            oidc_provider: var("OIDC_PROVIDER", defaults.oidc_provider),
            oidc_authorize_url: var("OIDC_AUTHORIZE_URL", defaults.oidc_authorize_url),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    config: Arc<MockConfig>,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::new(&config.public_url))),
        config: Arc::new(config),
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/url/new", post(new_url))
        .route("/api/url/{id}", get(url_info))
        .route("/api/url/update/{id}", put(update_url))
        .route("/api/url/delete/{id}", delete(delete_url))
        .route("/api/url/qr/{id}", get(qr_code))
        .route("/api/user", get(user_info))
        .route("/api/user/logout", get(logout))
        .route("/api/user/urls", get(user_urls))
        .route("/api/user/urls/page", get(user_urls_page))
        .route("/api/user/oidc/provider", get(oidc_provider))
        .route("/api/user/oidc/login", get(oidc_login))
        .route("/api/user/local/register", post(register))
        .route("/api/user/local/login", post(login))
        .route("/{id}", get(follow))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Failure> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| Failure::new(e.status(), e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, Failure> {
    params
        .map(|Query(value)| value)
        .map_err(|e| Failure::new(e.status(), e.body_text()))
}

/// Value of the session cookie, if the request carries one.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn session_cookie(sid: &str) -> String {
    format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax")
}

fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0")
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User, Failure> {
    let sid = session_id(headers).ok_or_else(Failure::not_logged_in)?;
    state
        .store
        .read()
        .await
        .session_user(&sid)
        .ok_or_else(Failure::not_logged_in)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn new_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortLink>), Failure> {
    let input = body(payload)?;
    let mut store = state.store.write().await;
    let owner = session_id(&headers)
        .and_then(|sid| store.session_user(&sid))
        .map(|user| user.user_id);
    match store.create_link(input, owner)? {
        Created::New(link) => {
            info!(id = %link.id, url = %link.original_url, "created short link");
            Ok((StatusCode::CREATED, Json(link)))
        }
        Created::Existing(link) => Ok((StatusCode::OK, Json(link))),
    }
}

async fn url_info(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ShortLink>, Failure> {
    let store = state.store.read().await;
    store.link(&id).map(Json).ok_or_else(Failure::url_not_found)
}

async fn update_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NewUrlRequest>, JsonRejection>,
) -> Result<Json<ShortLink>, Failure> {
    let input = body(payload)?;
    let link = state.store.write().await.update_link(&id, input)?;
    Ok(Json(link))
}

async fn delete_url(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<BasicResponse>, Failure> {
    if !state.store.write().await.delete_link(&id) {
        return Err(Failure::url_not_found());
    }
    info!(%id, "deleted short link");
    Ok(Json(BasicResponse {
        message: "URL deleted".to_string(),
    }))
}

async fn qr_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<QrQuery>, QueryRejection>,
) -> Result<Response, Failure> {
    let params = query(params)?;
    if state.store.read().await.link(&id).is_none() {
        return Err(Failure::url_not_found());
    }
    let format = params.format;
    let headers = [
        (header::CONTENT_TYPE, format.content_type()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{id}.{}\"", format.extension()),
        ),
    ];
    Ok((headers, format.placeholder()).into_response())
}

async fn follow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, Failure> {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let target = state
        .store
        .write()
        .await
        .visit(&id, ip)
        .ok_or_else(Failure::url_not_found)?;
    Ok(Redirect::permanent(&target))
}

async fn user_info(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    current_user(&state, &headers).await.map(Json)
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse, Failure> {
    let sid = session_id(&headers).ok_or_else(Failure::not_logged_in)?;
    if !state.store.write().await.logout(&sid) {
        return Err(Failure::bad_request("User session not found"));
    }
    Ok((
        [(header::SET_COOKIE, cleared_cookie())],
        Json(BasicResponse {
            message: "User logged out".to_string(),
        }),
    ))
}

async fn user_urls(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<UserLink>>, Failure> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(state.store.read().await.user_links(&user.user_id)))
}

async fn user_urls_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<Paginate>, QueryRejection>,
) -> Result<Json<UserLinksAndViews>, Failure> {
    let page = query(params)?;
    let user = current_user(&state, &headers).await?;
    let urls = state
        .store
        .read()
        .await
        .user_links_page(&user.user_id, page.page, page.size)?;
    Ok(Json(UserLinksAndViews { urls }))
}

async fn oidc_provider(State(state): State<AppState>) -> Json<OidcName> {
    Json(OidcName {
        name: state.config.oidc_provider.clone(),
    })
}

async fn oidc_login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.oidc_authorize_url)
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let input = body(payload)?;
    let (sid, user) = state.store.write().await.register(input)?;
    info!(user_id = %user.user_id, "registered local user");
    Ok(([(header::SET_COOKIE, session_cookie(&sid))], Json(user)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let input = body(payload)?;
    let (sid, user) = state.store.write().await.login(input)?;
    info!(user_id = %user.user_id, "local user logged in");
    Ok(([(header::SET_COOKIE, session_cookie(&sid))], Json(user)))
}
