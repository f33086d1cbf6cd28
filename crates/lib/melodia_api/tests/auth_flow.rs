//! End-to-end auth flows against a real database: signup, login,
//! logout, password change and the CSRF handshake.

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::response::Response;
use sqlx::PgPool;
use tower::ServiceExt;

use melodia_api::config::ApiConfig;
use melodia_api::{AppState, router};

const ACCESS_SECRET: &str = "test-access-secret";
const CSRF_SECRET: &str = "test-csrf-secret";

fn app(pool: PgPool) -> Router {
    router(AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            access_secret: ACCESS_SECRET.into(),
            csrf_secret: CSRF_SECRET.into(),
            max_body_bytes: 1024 * 1024,
            db_max_connections: 5,
        },
    })
}

fn signup_body(username: &str, email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": email,
        "password": password,
        "firstName": "Yaroslav",
        "lastName": "Tri",
        "sex": "M",
        "birthDate": "2000-06-15",
    })
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("X-ACCESS-Token={cookie}"))
        .body(Body::empty())
        .unwrap()
}

/// Pulls the access token value out of the `Set-Cookie` header.
fn access_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie present")
        .to_str()
        .unwrap();
    let pair = raw.split(';').next().unwrap();
    pair.strip_prefix("X-ACCESS-Token=")
        .expect("access cookie")
        .to_string()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn sign_up(app: &Router, username: &str, email: &str, password: &str) -> u32 {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/signup",
            &signup_body(username, email, password),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["id"].as_u64().unwrap() as u32
}

async fn login(app: &Router, username: &str, password: &str) -> (u32, String) {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = access_cookie(&resp);
    let id = body_json(resp).await["id"].as_u64().unwrap() as u32;
    (id, token)
}

async fn fetch_csrf(app: &Router, cookie: &str) -> String {
    let resp = app
        .clone()
        .oneshot(get_with_cookie("/api/csrf", cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["csrf"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn signup_then_login_then_authed_call(pool: PgPool) {
    let app = app(pool);

    let id = sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    let (login_id, cookie) = login(&app, "yarik_tri", "Love1234").await;
    assert_eq!(login_id, id);

    let resp = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/", &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["auth"], true);
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn login_with_wrong_password_sets_no_cookie(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;

    let resp = app
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({"username": "yarik_tri", "password": "Wrong1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(resp).await["message"], "password mismatch");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn login_with_unknown_username_reports_user_not_found(pool: PgPool) {
    let app = app(pool);
    let resp = app
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({"username": "nobody_here", "password": "Love1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "user not found");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn duplicate_signup_is_rejected(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;

    let resp = app
        .oneshot(post_json(
            "/api/auth/signup",
            &signup_body("yarik_tri", "other@example.com", "Love1234"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "user already exists");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn malformed_body_is_rejected(pool: PgPool) {
    let app = app(pool);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"username\": 42}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "incorrect input body");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn logout_invalidates_the_access_token(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    let (_, cookie) = login(&app, "yarik_tri", "Love1234").await;

    let resp = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("X-ACCESS-Token=;"));

    // Replaying the old token fails the version check.
    let resp = app
        .oneshot(get_with_cookie("/api/auth/", &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "auth data check failed");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn change_password_rotates_credentials_and_token(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    let (_, old_cookie) = login(&app, "yarik_tri", "Love1234").await;
    let csrf = fetch_csrf(&app, &old_cookie).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/changepass")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, format!("X-ACCESS-Token={old_cookie}"))
                .header("X-CSRF-Token", &csrf)
                .body(Body::from(
                    serde_json::json!({
                        "oldPassword": "Love1234",
                        "newPassword": "Hate5678",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let new_cookie = access_cookie(&resp);
    assert_ne!(new_cookie, old_cookie);

    // The pre-change token is dead, the fresh one works.
    let resp = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/", &old_cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/", &new_cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Old password no longer logs in, new one does.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({"username": "yarik_tri", "password": "Love1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    login(&app, "yarik_tri", "Hate5678").await;
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn change_password_requires_csrf_token(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    let (_, cookie) = login(&app, "yarik_tri", "Love1234").await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/changepass")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, format!("X-ACCESS-Token={cookie}"))
                .body(Body::from(
                    serde_json::json!({
                        "oldPassword": "Love1234",
                        "newPassword": "Hate5678",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "invalid CSRF token");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn csrf_token_is_bound_to_the_session_user(pool: PgPool) {
    let app = app(pool);
    sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    sign_up(&app, "other_one", "other@example.com", "Love1234").await;
    let (_, cookie) = login(&app, "yarik_tri", "Love1234").await;
    let (_, other_cookie) = login(&app, "other_one", "Love1234").await;
    let other_csrf = fetch_csrf(&app, &other_cookie).await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/changepass")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, format!("X-ACCESS-Token={cookie}"))
                .header("X-CSRF-Token", &other_csrf)
                .body(Body::from(
                    serde_json::json!({
                        "oldPassword": "Love1234",
                        "newPassword": "Hate5678",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "invalid CSRF token");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn csrf_endpoint_requires_a_session(pool: PgPool) {
    let app = app(pool);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/csrf")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "unauthenticated");
}

#[sqlx::test(migrations = "../melodia_core/migrations")]
async fn profile_is_visible_to_its_owner_only(pool: PgPool) {
    let app = app(pool);
    let id = sign_up(&app, "yarik_tri", "yarik@example.com", "Love1234").await;
    let other = sign_up(&app, "other_one", "other@example.com", "Love1234").await;
    let (_, cookie) = login(&app, "yarik_tri", "Love1234").await;

    let resp = app
        .clone()
        .oneshot(get_with_cookie(&format!("/api/users/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["username"], "yarik_tri");
    assert_eq!(body["birthDate"], "2000-06-15");
    assert!(body.get("passwordHash").is_none());

    let resp = app
        .oneshot(get_with_cookie(&format!("/api/users/{other}"), &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["message"], "forbidden");
}
