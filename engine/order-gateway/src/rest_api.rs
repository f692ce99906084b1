//! REST API endpoints for the OrderGateway
//!
//! This module provides the REST endpoints for login and session status,
//! quote calculation, the current month's records and their spreadsheet
//! download, plus health and static file serving.

use crate::auth::{extract_token, SessionManager};
use crate::error::{reject, ApiRejection, GatewayError};
use crate::messages::{
    AuthStatusResponse, CalculateRequest, ErrorResponse, HealthResponse, LoginRequest,
    LoginResponse, QuoteResponse, StoredQuoteResponse,
};
use order_export::{export_orders, MONTHLY_EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
use order_store::{current_month_bounds, NewOrder, OrderStore, StoredOrder};
use pricing_engine::UnknownOptionPolicy;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::http::{header, Response, StatusCode};
use warp::{Filter, Rejection, Reply};

/// Shared state handed to every handler
pub struct GatewayState {
    pub store: Arc<dyn OrderStore>,
    pub sessions: Arc<SessionManager>,
    pub unknown_options: UnknownOptionPolicy,
}

impl GatewayState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        sessions: Arc<SessionManager>,
        unknown_options: UnknownOptionPolicy,
    ) -> Self {
        Self { store, sessions, unknown_options }
    }
}

fn with_state(
    state: Arc<GatewayState>,
) -> impl Filter<Extract = (Arc<GatewayState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Session token from the bearer header or the session cookie, if any
fn session_token() -> impl Filter<Extract = (Option<String>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional(crate::SESSION_COOKIE))
        .map(|authorization: Option<String>, cookie: Option<String>| {
            extract_token(authorization.as_deref(), cookie.as_deref())
        })
}

/// Reject the request unless the caller holds a live session
fn require_session(
    state: Arc<GatewayState>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    session_token()
        .and(with_state(state))
        .and_then(|token: Option<String>, state: Arc<GatewayState>| async move {
            if state.sessions.is_authenticated(token.as_deref()).await {
                Ok(())
            } else {
                Err(reject(GatewayError::Authentication("Authentication required".to_string())))
            }
        })
        .untuple_one()
}

/// Open a session for valid credentials
pub async fn login(
    request: LoginRequest,
    state: Arc<GatewayState>,
) -> Result<warp::reply::Response, Rejection> {
    match state.sessions.login(&request).await {
        Ok(token) => {
            let cookie = format!("{}={}; HttpOnly; Path=/; SameSite=Strict", crate::SESSION_COOKIE, token);
            let body = LoginResponse { authenticated: true, token: Some(token) };
            Ok(warp::reply::with_header(warp::reply::json(&body), header::SET_COOKIE, cookie)
                .into_response())
        }
        Err(_) => {
            let body = LoginResponse { authenticated: false, token: None };
            Ok(warp::reply::with_status(warp::reply::json(&body), StatusCode::UNAUTHORIZED)
                .into_response())
        }
    }
}

/// Drop the caller's session
pub async fn logout(
    token: Option<String>,
    state: Arc<GatewayState>,
) -> Result<impl warp::Reply, Rejection> {
    if let Some(token) = token {
        state.sessions.remove_session(&token).await;
    }
    let expired = format!("{}=; HttpOnly; Path=/; Max-Age=0", crate::SESSION_COOKIE);
    Ok(warp::reply::with_header(
        warp::reply::json(&AuthStatusResponse { authenticated: false }),
        header::SET_COOKIE,
        expired,
    ))
}

/// Report whether the caller is authenticated
pub async fn auth_status(
    token: Option<String>,
    state: Arc<GatewayState>,
) -> Result<impl warp::Reply, Rejection> {
    let authenticated = state.sessions.is_authenticated(token.as_deref()).await;
    Ok(warp::reply::json(&AuthStatusResponse { authenticated }))
}

/// Validate and price an order, storing it when asked to
pub async fn calculate(
    request: CalculateRequest,
    state: Arc<GatewayState>,
) -> Result<warp::reply::Response, Rejection> {
    let (spec, store) = request.into_parts();

    let quote = pricing_engine::quote(&spec, state.unknown_options).map_err(|e| {
        tracing::debug!("Refused quote: {}", e);
        reject(e.into())
    })?;

    if !store {
        return Ok(warp::reply::json(&QuoteResponse::from(quote)).into_response());
    }

    let stored = state.store.insert(NewOrder::new(spec, quote)).await.map_err(|e| {
        tracing::error!("Failed to store order: {}", e);
        reject(e.into())
    })?;

    tracing::info!("Stored order {} (total {:.2}, {:.2} g)", stored.id, stored.price, stored.weight);

    let body = StoredQuoteResponse {
        id: stored.id,
        total_price: stored.price,
        weight: stored.weight,
        date: stored.date,
    };
    Ok(warp::reply::json(&body).into_response())
}

async fn orders_this_month(state: &GatewayState) -> Result<Vec<StoredOrder>, Rejection> {
    let (start, end) = current_month_bounds();
    state.store.query_by_date_range(start, end).await.map_err(|e| {
        tracing::error!("Failed to load records for {} to {}: {}", start, end, e);
        reject(e.into())
    })
}

/// All orders stored during the current month
pub async fn get_records_this_month(state: Arc<GatewayState>) -> Result<impl warp::Reply, Rejection> {
    let orders = orders_this_month(&state).await?;
    Ok(warp::reply::json(&orders))
}

/// The current month's orders as an `.xlsx` download
pub async fn generate_excel(state: Arc<GatewayState>) -> Result<impl warp::Reply, Rejection> {
    let orders = orders_this_month(&state).await?;
    let bytes = export_orders(&orders).map_err(|e| {
        tracing::error!("Failed to build spreadsheet: {}", e);
        reject(e.into())
    })?;

    Response::builder()
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{MONTHLY_EXPORT_FILE_NAME}\""),
        )
        .body(bytes)
        .map_err(|e| reject(GatewayError::System(e.to_string())))
}

/// Liveness plus the stored order count
pub async fn health(state: Arc<GatewayState>) -> Result<impl warp::Reply, Rejection> {
    let orders = state.store.count().await.map_err(|e| reject(e.into()))?;
    Ok(warp::reply::json(&HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        orders,
    }))
}

/// Convert rejections into JSON error bodies
pub async fn handle_rejection(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, code, message) = if let Some(api) = err.find::<ApiRejection>() {
        (api.status, api.code, api.message.clone())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "BAD_REQUEST", format!("Invalid request body: {e}"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", "Request body too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "LENGTH_REQUIRED", "Content-Length required".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE", "Expected a JSON body".to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Method not allowed".to_string())
    } else {
        tracing::warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error".to_string())
    };

    let body = ErrorResponse { error: message, code: code.to_string() };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Create REST API routes
pub fn create_routes(
    state: Arc<GatewayState>,
    public_dir: PathBuf,
    max_body_bytes: u64,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let state_filter = with_state(state.clone());

    // Login endpoint
    let login_route = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json::<LoginRequest>())
        .and(state_filter.clone())
        .and_then(login);

    // Logout endpoint
    let logout_route = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(session_token())
        .and(state_filter.clone())
        .and_then(logout);

    // Session status endpoint
    let auth_status_route = warp::path("authStatus")
        .and(warp::path::end())
        .and(warp::get())
        .and(session_token())
        .and(state_filter.clone())
        .and_then(auth_status);

    // Quote endpoint, protected
    let calculate_route = warp::path("calculate")
        .and(warp::path::end())
        .and(warp::post())
        .and(require_session(state))
        .and(warp::body::content_length_limit(max_body_bytes))
        .and(warp::body::json::<CalculateRequest>())
        .and(state_filter.clone())
        .and_then(calculate);

    // Monthly records endpoint
    let records_route = warp::path("recordsThisMonth")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_records_this_month);

    // Spreadsheet download endpoint
    let excel_route = warp::path("generateExcel")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(generate_excel);

    // Health check endpoint
    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter)
        .and_then(health);

    // Browser form and assets
    let static_files = warp::fs::dir(public_dir);

    // Combine all routes
    login_route
        .or(logout_route)
        .or(auth_status_route)
        .or(calculate_route)
        .or(records_route)
        .or(excel_route)
        .or(health_route)
        .or(static_files)
        .recover(handle_rejection)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type", "authorization"])
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        )
        .with(warp::trace::request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use chrono::{Datelike, Days, TimeZone, Utc};
    use order_store::InMemoryOrderStore;
    use pricing_engine::{price, HandAttachment, OrderSpec, PrintingMethod, ProductType};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_state(required: bool, policy: UnknownOptionPolicy) -> Arc<GatewayState> {
        let sessions = SessionManager::new(AuthConfig {
            required,
            username: Some("clerk".to_string()),
            password: Some("s3cret".to_string()),
            session_ttl_secs: 3600,
        });
        Arc::new(GatewayState::new(Arc::new(InMemoryOrderStore::new()), Arc::new(sessions), policy))
    }

    fn routes(
        state: Arc<GatewayState>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
        create_routes(state, PathBuf::from("./does-not-exist"), 16 * 1024)
    }

    fn reference_order(store: bool) -> Value {
        json!({
            "width": 10, "height": 5, "bottom_space": 2, "quantity": 3,
            "type": "type2", "printing_method": "method1", "color_count": 2,
            "hand_attachment": "attachment1", "store": store
        })
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_calculate_without_store() {
        let state = create_test_state(false, UnknownOptionPolicy::PriceAsZero);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&reference_order(false))
            .reply(&routes(state.clone()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.body());
        assert!((body["totalPrice"].as_f64().unwrap() - 110.4).abs() < 1e-9);
        assert_eq!(body["weight"], 9800.0);
        assert!(body.get("id").is_none());
        assert_eq!(state.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_calculate_with_store() {
        let state = create_test_state(false, UnknownOptionPolicy::PriceAsZero);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&reference_order(true))
            .reply(&routes(state.clone()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.body());
        assert_eq!(body["id"], 1);
        assert_eq!(body["weight"], 9800.0);
        assert!(body["date"].as_str().unwrap().ends_with('Z'));
        assert_eq!(state.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_calculate_validation_errors() {
        let state = create_test_state(false, UnknownOptionPolicy::PriceAsZero);
        let filter = routes(state.clone());

        let mut order = reference_order(true);
        order["quantity"] = json!(0);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response.body())["error"], "Quantity must be greater than 0");

        let mut order = reference_order(true);
        order["printing_method"] = json!("none");
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response.body())["error"], "Color count and printing method mismatch");

        // Nothing was stored for refused orders
        assert_eq!(state.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let state = create_test_state(false, UnknownOptionPolicy::PriceAsZero);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .header("content-type", "application/json")
            .body("{\"width\": \"wide\"}")
            .reply(&routes(state))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response.body())["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_type_priced_as_zero() {
        let mut order = reference_order(false);
        order.as_object_mut().unwrap().remove("type");

        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&routes(create_test_state(false, UnknownOptionPolicy::PriceAsZero)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        // (0 + 5 + 3 + 4) * 3 * 1.15
        assert!((body_json(response.body())["totalPrice"].as_f64().unwrap() - 41.4).abs() < 1e-9);

        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&routes(create_test_state(false, UnknownOptionPolicy::Reject)))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response.body())["code"], "UNKNOWN_OPTION");
    }

    #[tokio::test]
    async fn test_unknown_option_policy() {
        let mut order = reference_order(false);
        order["type"] = json!("crate");

        let permissive = create_test_state(false, UnknownOptionPolicy::PriceAsZero);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&routes(permissive))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        // (0 + 5 + 3 + 4) * 3 * 1.15
        assert!((body_json(response.body())["totalPrice"].as_f64().unwrap() - 41.4).abs() < 1e-9);

        let strict = create_test_state(false, UnknownOptionPolicy::Reject);
        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&order)
            .reply(&routes(strict))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response.body())["code"], "UNKNOWN_OPTION");
    }

    #[tokio::test]
    async fn test_calculate_requires_session() {
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let filter = routes(state);

        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .json(&reference_order(false))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response.body())["error"], "Authentication required");

        let response = warp::test::request()
            .method("POST")
            .path("/login")
            .json(&json!({ "username": "clerk", "password": "s3cret" }))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let token = body_json(response.body())["token"].as_str().unwrap().to_string();

        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .header("authorization", format!("Bearer {token}"))
            .json(&reference_order(false))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .method("POST")
            .path("/calculate")
            .header("cookie", format!("session={token}"))
            .json(&reference_order(false))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_and_status() {
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let filter = routes(state);

        let response = warp::test::request()
            .method("POST")
            .path("/login")
            .json(&json!({ "username": "clerk", "password": "nope" }))
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response.body()), json!({ "authenticated": false }));

        let response = warp::test::request().path("/authStatus").reply(&filter).await;
        assert_eq!(body_json(response.body()), json!({ "authenticated": false }));

        let response = warp::test::request()
            .method("POST")
            .path("/login")
            .json(&json!({ "username": "clerk", "password": "s3cret" }))
            .reply(&filter)
            .await;
        let token = body_json(response.body())["token"].as_str().unwrap().to_string();

        let response = warp::test::request()
            .path("/authStatus")
            .header("authorization", format!("Bearer {token}"))
            .reply(&filter)
            .await;
        assert_eq!(body_json(response.body()), json!({ "authenticated": true }));

        warp::test::request()
            .method("POST")
            .path("/logout")
            .header("authorization", format!("Bearer {token}"))
            .reply(&filter)
            .await;

        let response = warp::test::request()
            .path("/authStatus")
            .header("authorization", format!("Bearer {token}"))
            .reply(&filter)
            .await;
        assert_eq!(body_json(response.body()), json!({ "authenticated": false }));
    }

    async fn seed_month_boundary(state: &GatewayState) -> StoredOrder {
        let spec = OrderSpec {
            width: 10.0,
            height: 5.0,
            bottom_space: 2.0,
            quantity: 1,
            product_type: "type1".into(),
            printing_method: "none".into(),
            color_count: 0,
            hand_attachment: "none".into(),
        };
        let quote = price(&spec);

        let today = Utc::now().date_naive();
        let first_day = today.with_day(1).unwrap();
        let day_before = first_day - Days::new(1);

        let first_at = Utc.from_utc_datetime(&first_day.and_hms_opt(0, 0, 0).unwrap());
        let before_at = Utc.from_utc_datetime(&day_before.and_hms_opt(12, 0, 0).unwrap());

        state.store.insert_at(NewOrder::new(spec.clone(), quote), before_at).await.unwrap();
        state.store.insert_at(NewOrder::new(spec, quote), first_at).await.unwrap()
    }

    #[tokio::test]
    async fn test_records_this_month() {
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let included = seed_month_boundary(&state).await;

        let response = warp::test::request().path("/recordsThisMonth").reply(&routes(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response.body());
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], included.id);
        assert_eq!(records[0]["type"], "type1");
        assert!((records[0]["price"].as_f64().unwrap() - 11.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_generate_excel() {
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        seed_month_boundary(&state).await;

        let response = warp::test::request().path("/generateExcel").reply(&routes(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("orders_this_month.xlsx"));
        assert_eq!(&response.body()[..2], b"PK");
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let filter = routes(state);

        let response = warp::test::request().path("/health").reply(&filter).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response.body());
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["orders"], 0);

        let response = warp::test::request().path("/nowhere").reply(&filter).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_index() {
        let public_dir = TempDir::new().unwrap();
        std::fs::write(public_dir.path().join("index.html"), "<h1>Quote</h1>").unwrap();

        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let filter = create_routes(state, public_dir.path().to_path_buf(), 16 * 1024);

        let response = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"<h1>Quote</h1>");
    }

    #[tokio::test]
    async fn test_shipped_form_offers_every_priced_option() {
        let public_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../public");
        let state = create_test_state(true, UnknownOptionPolicy::PriceAsZero);
        let filter = create_routes(state, public_dir, 16 * 1024);

        let response = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = String::from_utf8_lossy(response.body()).to_string();

        let types = (1..=5).map(|n| format!("type{n}"));
        let methods = std::iter::once("none".to_string()).chain((1..=5).map(|n| format!("method{n}")));
        let attachments = (1..=3).map(|n| format!("attachment{n}"));

        for value in types {
            assert!(ProductType::from(value.as_str()).is_recognized());
            assert!(page.contains(&format!("value=\"{value}\"")), "{value}");
        }
        for value in methods {
            assert!(PrintingMethod::from(value.as_str()).is_recognized());
            assert!(page.contains(&format!("value=\"{value}\"")), "{value}");
        }
        for value in attachments {
            assert!(HandAttachment::from(value.as_str()).is_recognized());
            assert!(page.contains(&format!("value=\"{value}\"")), "{value}");
        }
    }
}
