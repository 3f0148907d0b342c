use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{admin, auth, categories, meals, orders, providers, restaurants, reviews};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(meals::router())
                .merge(reviews::router())
                .merge(categories::router())
                .merge(orders::router())
                .merge(providers::router())
                .merge(restaurants::router())
                .merge(admin::router()),
        )
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { ApiError::not_found("Route not found") })
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::FromRef,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::dto::JwtKeys;
    use crate::auth::repo_types::Role;

    fn token(state: &AppState, role: Role) -> String {
        JwtKeys::from_ref(state)
            .sign_access(Uuid::new_v4(), role)
            .unwrap()
    }

    async fn call(
        method: Method,
        uri: &str,
        role: Option<Role>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        call_raw(method, uri, role, body.map(|b| b.to_string())).await
    }

    async fn call_raw(
        method: Method,
        uri: &str,
        role: Option<Role>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let state = AppState::fake();
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(&state, role)));
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = build_app(state).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, _) = call(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_uses_envelope() {
        let (status, body) = call(Method::GET, "/api/nowhere", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        for (method, uri) in [
            (Method::GET, "/api/orders"),
            (Method::GET, "/api/auth/me"),
            (Method::GET, "/api/provider/stats"),
            (Method::GET, "/api/admin/stats"),
        ] {
            let (status, body) = call(method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let cases = [
            (Method::GET, "/api/admin/stats", Role::Customer),
            (Method::GET, "/api/admin/users", Role::Provider),
            (Method::GET, "/api/provider/orders", Role::Customer),
            (Method::GET, "/api/orders", Role::Provider),
        ];
        for (method, uri, role) in cases {
            let (status, body) = call(method, uri, Some(role), None).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn providers_cannot_place_orders() {
        let body = json!({ "items": [], "totalPrice": 0, "deliveryAddress": "x" });
        let (status, _) = call(Method::POST, "/api/orders", Some(Role::Provider), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let body = json!({ "items": [], "totalPrice": 0, "deliveryAddress": "12 Market Street" });
        let (status, body) = call(Method::POST, "/api/orders", Some(Role::Customer), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn out_of_range_review_is_rejected() {
        let body = json!({ "mealId": Uuid::new_v4(), "rating": 9 });
        let (status, _) = call(Method::POST, "/api/reviews", Some(Role::Customer), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_meal_filter_is_rejected() {
        let (status, _) = call(Method::GET, "/api/meals?minPrice=cheap", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(Method::GET, "/api/meals?minPrice=20&maxPrice=5", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_role_filter_is_rejected() {
        let (status, _) = call(Method::GET, "/api/admin/users?role=chef", Some(Role::Admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_uses_envelope() {
        let (status, body) = call_raw(
            Method::POST,
            "/api/auth/login",
            None,
            Some(r#"{"email":1"#.into()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn wrong_field_type_uses_envelope() {
        let body = json!({ "mealId": Uuid::new_v4(), "rating": "five" });
        let (status, body) = call(Method::POST, "/api/reviews", Some(Role::Customer), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_id_uses_envelope() {
        for uri in ["/api/meals/not-a-uuid", "/api/categories/42"] {
            let (status, body) = call(Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn repeated_category_keys_are_parsed() {
        let uri = format!("/api/meals?categoryId={}&categoryId=pizza", Uuid::new_v4());
        let (status, body) = call(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "categoryId must be a UUID");
    }

    #[tokio::test]
    async fn customers_cannot_manage_menus() {
        let body = json!({ "name": "Soup", "price": 4.5, "categoryId": Uuid::new_v4() });
        let (status, body) = call(Method::POST, "/api/provider/meals", Some(Role::Customer), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }
}
