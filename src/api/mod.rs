pub mod auth;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{test_hasher, AuthService, SessionCarrier};
    use crate::config::{Config, SessionConfig};
    use crate::db::UserResponse;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(
            store.clone(),
            store,
            test_hasher(),
            SessionCarrier::new(&SessionConfig::default()),
        );
        create_router(Arc::new(AppState::new(Config::default(), auth)))
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Turn Set-Cookie headers into the Cookie header a browser would send back
    fn cookie_header(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    async fn register(app: &Router, email: &str, password: &str) -> Response {
        app.clone()
            .oneshot(json_request(
                "/api/auth/register",
                serde_json::json!({
                    "email": email,
                    "name": "Ada",
                    "surname": "Lovelace",
                    "password": password,
                    "repeat_password": password,
                }),
            ))
            .await
            .unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> Response {
        app.clone()
            .oneshot(json_request(
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            ))
            .await
            .unwrap()
    }

    async fn me(app: &Router, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri("/api/auth/me");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = app();

        let response = register(&app, "a@b.com", "secret").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let registered = body_json(response).await;
        assert!(registered.get("password_hash").is_none());

        let response = login(&app, "a@b.com", "secret").await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_header(&response);
        assert!(cookie.contains("id="));
        assert!(cookie.contains("token="));

        let response = me(&app, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.id, registered["id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_login_cookie_attributes() {
        let app = app();
        register(&app, "a@b.com", "secret").await;

        let response = login(&app, "a@b.com", "secret").await;
        let set_cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(set_cookies.len(), 2);
        for cookie in set_cookies {
            assert!(cookie.contains("Path=/"));
            assert!(cookie.contains("Expires="));
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password_sets_no_cookies() {
        let app = app();
        register(&app, "a@b.com", "secret").await;

        let response = login(&app, "a@b.com", "nope").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let response = login(&app(), "nobody@b.com", "secret").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_register_validation_and_conflict() {
        let app = app();

        let response = register(&app, "not-an-email", "secret").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(body["error"]["details"]["email"].is_array());

        assert_eq!(register(&app, "a@b.com", "secret").await.status(), StatusCode::CREATED);
        assert_eq!(register(&app, "a@b.com", "secret").await.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let app = app();
        assert_eq!(me(&app, None).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            me(&app, Some("id=u1; token=forged")).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
