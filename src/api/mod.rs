//! HTTP surface for the storefront.
//!
//! The route handlers own all the redirect/cookie plumbing; the auth
//! decisions themselves live in [`crate::auth`]. Every protected handler
//! resolves the session cookie into an explicit `ResolvedIdentity` through
//! the guard; there is no ambient "current user".

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::auth::{
    AuthError, Authenticator, Capability, Decision, ResolvedIdentity, SessionManager, authorize,
};
use crate::catalog::ProductStore;
use crate::types::{EmailAddress, SessionToken};

/// Name of the cookie carrying the session reference.
pub const SESSION_COOKIE: &str = "mangastore_session";

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub sessions: SessionManager,
    pub products: ProductStore,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
        .route("/productos", get(productos))
        .route("/carrito", get(carrito))
        .route("/contacto", get(contacto))
        .route("/api/products", get(list_products))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Credential payload for login and registration forms.
#[derive(Debug, Deserialize)]
struct CredentialsForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginPageParams {
    error: Option<String>,
}

// --- session cookie plumbing ---

/// Pull the session token out of the request's Cookie header, if any.
fn session_token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=')
            && name == SESSION_COOKIE
            && !value.is_empty()
        {
            return Some(SessionToken::new(value));
        }
    }

    None
}

/// Resolve the request's session cookie into an identity.
///
/// A missing, stale or bogus cookie is routine: it collapses to `Ok(None)`
/// and is only logged at debug. A storage fault is not routine and is
/// propagated so callers can answer with a server error instead of quietly
/// treating a healthy session as absent.
async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<ResolvedIdentity>, AuthError> {
    let Some(token) = session_token_from_headers(headers) else {
        return Ok(None);
    };

    match state.sessions.resolve_session(&token).await {
        Ok(identity) => Ok(Some(identity)),
        Err(AuthError::Storage(msg)) => Err(AuthError::Storage(msg)),
        Err(e) => {
            debug!(token = %token.redacted(), "session did not resolve: {}", e);
            Ok(None)
        }
    }
}

/// Resolve and authorize in one step for the protected pages.
///
/// On `Allow` the caller gets the identity; otherwise the ready-made
/// response: a redirect to the login page on deny, or a 500 when session
/// resolution hit a storage fault.
async fn require_authenticated(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ResolvedIdentity, Response> {
    let identity = match resolve_identity(state, headers).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("session resolution failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        }
    };

    match (authorize(identity.as_ref(), Capability::Authenticated), identity) {
        (Decision::Allow, Some(identity)) => Ok(identity),
        _ => Err(Redirect::to("/login").into_response()),
    }
}

fn session_cookie(token: &SessionToken, max_age_seconds: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token.as_str(),
        max_age_seconds
    )
}

fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn redirect_with_cookie(location: &str, cookie: &str) -> Response {
    let mut response = Redirect::to(location).into_response();
    match header::HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
            response
        }
        Err(e) => {
            error!("failed to encode session cookie: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// --- public pages ---

async fn index() -> Html<&'static str> {
    Html(
        "<h1>MangaStore</h1>\
         <p><a href=\"/productos\">Products</a> · <a href=\"/login\">Log in</a> · \
         <a href=\"/register\">Register</a></p>",
    )
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    // Flash-equivalent message: generic on purpose, whatever the failure.
    let flash = if params.error.is_some() {
        "<p>Invalid email or password.</p>"
    } else {
        ""
    };

    Html(format!(
        "<h1>Log in</h1>{}\
         <form method=\"post\" action=\"/login\">\
         <input name=\"email\" type=\"email\" placeholder=\"email\" required>\
         <input name=\"password\" type=\"password\" placeholder=\"password\" required>\
         <button type=\"submit\">Log in</button>\
         </form>",
        flash
    ))
}

async fn register_page() -> Html<&'static str> {
    Html(
        "<h1>Register</h1>\
         <form method=\"post\" action=\"/register\">\
         <input name=\"email\" type=\"email\" placeholder=\"email\" required>\
         <input name=\"password\" type=\"password\" placeholder=\"password\" required>\
         <button type=\"submit\">Register</button>\
         </form>",
    )
}

// --- auth routes ---

async fn register(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<CredentialsForm>,
) -> Response {
    let email = EmailAddress::new(form.email);

    match state.authenticator.register(&email, &form.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(AuthError::DuplicateIdentifier) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": AuthError::DuplicateIdentifier.to_string() })),
        )
            .into_response(),
        Err(AuthError::WeakPassword(msg)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": format!("weak password: {}", msg) })),
        )
            .into_response(),
        Err(e) => {
            error!("registration failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "registration failed" })),
            )
                .into_response()
        }
    }
}

async fn login(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<CredentialsForm>,
) -> Response {
    let email = EmailAddress::new(form.email);

    // Authenticate, then create the session; strictly in that order. A
    // session is never minted before verification completes.
    let identity = match state.authenticator.authenticate(&email, &form.password).await {
        Ok(identity) => identity,
        Err(AuthError::UserNotFound | AuthError::InvalidSecret) => {
            // Same redirect for both: no user enumeration via the surface.
            return Redirect::to("/login?error=invalid_credentials").into_response();
        }
        Err(e) => {
            error!("login failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "login failed" })),
            )
                .into_response();
        }
    };

    match state.sessions.create_session(&identity).await {
        Ok(token) => {
            let cookie = session_cookie(&token, state.sessions.ttl_seconds());
            redirect_with_cookie("/productos", &cookie)
        }
        Err(e) => {
            error!("session creation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "login failed" })),
            )
                .into_response()
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token_from_headers(&headers)
        && let Err(e) = state.sessions.terminate_session(&token).await
    {
        // Termination is idempotent, so the only failure mode is storage;
        // the cookie still gets cleared below.
        warn!("session termination failed: {}", e);
    }

    redirect_with_cookie("/login", &clear_session_cookie())
}

// --- protected routes ---

async fn productos(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identity = match require_authenticated(&state, &headers).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let products = match state.products.list().await {
        Ok(products) => products,
        Err(e) => {
            error!("product listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let count = products.len();
    Json(json!({
        "user": identity.email(),
        "products": products,
        "count": count,
    }))
    .into_response()
}

async fn carrito(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_authenticated(&state, &headers).await {
        return response;
    }

    "Your shopping cart will appear here.".into_response()
}

async fn contacto(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = require_authenticated(&state, &headers).await {
        return response;
    }

    "Here you can get in touch with us.".into_response()
}

// --- public API ---

async fn list_products(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let products = state.products.list().await.map_err(|e| {
        error!("product listing failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let count = products.len();
    Ok(Json(json!({
        "products": products,
        "count": count,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialStore, PasswordHasher, SessionConfig};
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let store = CredentialStore::new(db.clone());
        let state = AppState {
            authenticator: Authenticator::new(store.clone(), PasswordHasher::with_cost(4)),
            sessions: SessionManager::new(db.clone(), store, SessionConfig::default()),
            products: ProductStore::new(db),
        };
        create_router(state)
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Extract the "name=value" part of the session Set-Cookie header.
    fn session_cookie_pair(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
        let body = format!("email={}&password={}", email.replace('@', "%40"), password);

        let response = app
            .clone()
            .oneshot(form_request("/register", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .clone()
            .oneshot(form_request("/login", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/productos");

        session_cookie_pair(&response)
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_redirects_to_login() {
        let app = test_app().await;
        let response = app
            .oneshot(form_request("/register", "email=a%40x.com&password=password1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_duplicate_register_conflicts() {
        let app = test_app().await;
        let body = "email=a%40x.com&password=password1";

        let response = app.clone().oneshot(form_request("/register", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .oneshot(form_request("/register", "email=a%40x.com&password=password2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let app = test_app().await;
        let response = app
            .oneshot(form_request("/register", "email=a%40x.com&password=short"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_login_success_sets_cookie_and_grants_access() {
        let app = test_app().await;
        let cookie = register_and_login(&app, "a@x.com", "password1").await;
        assert!(cookie.starts_with(SESSION_COOKIE));

        let response = app
            .oneshot(get_with_cookie("/productos", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_wrong_password_redirects_without_cookie() {
        let app = test_app().await;
        app.clone()
            .oneshot(form_request("/register", "email=a%40x.com&password=password1"))
            .await
            .unwrap();

        let response = app
            .oneshot(form_request("/login", "email=a%40x.com&password=wrongwrong"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?error=invalid_credentials");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_user_redirects_identically() {
        let app = test_app().await;

        // Unknown email and wrong password are indistinguishable responses.
        let response = app
            .oneshot(form_request("/login", "email=nobody%40x.com&password=whatever1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?error=invalid_credentials");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_protected_routes_deny_without_session() {
        let app = test_app().await;

        for uri in ["/productos", "/carrito", "/contacto"] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), "/login", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_protected_routes_allow_with_session() {
        let app = test_app().await;
        let cookie = register_and_login(&app, "a@x.com", "password1").await;

        for uri in ["/productos", "/carrito", "/contacto"] {
            let response = app
                .clone()
                .oneshot(get_with_cookie(uri, &cookie))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_logout_terminates_session() {
        let app = test_app().await;
        let cookie = register_and_login(&app, "a@x.com", "password1").await;

        let response = app
            .clone()
            .oneshot(get_with_cookie("/logout", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        // Cookie is cleared and the old token no longer resolves.
        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cleared.contains("Max-Age=0"));

        let response = app
            .oneshot(get_with_cookie("/productos", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_logout_without_session_still_redirects() {
        let app = test_app().await;
        let response = app.oneshot(get_request("/logout")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_bogus_cookie_is_denied() {
        let app = test_app().await;
        let cookie = format!("{}={}", SESSION_COOKIE, "f".repeat(64));

        let response = app
            .oneshot(get_with_cookie("/productos", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_session_storage_fault_is_a_server_error() {
        // A handle with no namespace selected fails every query, which is
        // the closest thing to a down database the in-memory engine offers.
        let db = surrealdb::engine::any::connect("memory").await.unwrap();
        let store = CredentialStore::new(db.clone());
        let state = AppState {
            authenticator: Authenticator::new(store.clone(), PasswordHasher::with_cost(4)),
            sessions: SessionManager::new(db.clone(), store, SessionConfig::default()),
            products: ProductStore::new(db),
        };
        let app = create_router(state);

        let cookie = format!("{}={}", SESSION_COOKIE, "f".repeat(64));
        let response = app
            .oneshot(get_with_cookie("/productos", &cookie))
            .await
            .unwrap();

        // Not a silent redirect to /login: the session could not be checked.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_api_products_is_public() {
        let app = test_app().await;
        let response = app.oneshot(get_request("/api/products")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_page_shows_flash_on_error() {
        let app = test_app().await;
        let response = app
            .oneshot(get_request("/login?error=invalid_credentials"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_session_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("other=1; {}=tok123; another=2", SESSION_COOKIE)
                .parse()
                .unwrap(),
        );

        let token = session_token_from_headers(&headers).unwrap();
        assert_eq!(token.as_str(), "tok123");
    }

    #[test]
    fn test_session_token_from_headers_absent() {
        let headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "other=1".parse().unwrap());
        assert!(session_token_from_headers(&headers).is_none());

        // Empty value is not a token.
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}=", SESSION_COOKIE).parse().unwrap(),
        );
        assert!(session_token_from_headers(&headers).is_none());
    }
}
