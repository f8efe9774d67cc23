//! End-to-end tests for authentication, the internal filter and proxied routes.

use axum::http::StatusCode;
use booking_gateway::auth::Role;
use booking_gateway::config::schema::{AuthRequirementConfig, HandlerConfig, PathMatch};
use booking_gateway::config::{RouteConfig, ServiceName};
use serde_json::Value;

mod common;

use common::*;

async fn json_of(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}

#[tokio::test]
async fn ping_answers_pong() {
    let gateway = spawn_gateway(test_config().await).await;
    let response = reqwest::get(gateway.at("/ping")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_of(response).await;
    assert_eq!(body["message"], "pong");
    assert_eq!(body["service"], "API Gateway");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let gateway = spawn_gateway(test_config().await).await;
    let response = reqwest::get(gateway.at("/api/nothing-here")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(response).await["message"], "No matching route found");
}

#[tokio::test]
async fn protected_route_requires_authorization_header() {
    let tours = start_http_backend(200, "[]").await;
    let mut config = test_config().await;
    config.services.tour = tours.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::get(gateway.at("/api/tours")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(response).await["message"], "Missing Authorization header");
    assert_eq!(tours.hits(), 0);
}

#[tokio::test]
async fn malformed_authorization_header() {
    let gateway = spawn_gateway(test_config().await).await;
    let response = reqwest::Client::new()
        .get(gateway.at("/api/tours"))
        .header("authorization", "Token abc")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_role_is_forbidden() {
    let gateway = spawn_gateway(test_config().await).await;
    let response = reqwest::Client::new()
        .get(gateway.at("/api/tours"))
        .bearer_auth(token_without_role("ana"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_of(response).await["message"],
        "Invalid token: missing required fields (username and role)"
    );
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_forbidden() {
    let gateway = spawn_gateway(test_config().await).await;
    let client = reqwest::Client::new();

    for token in [expired_token("ana", Role::Guide), foreign_token("ana", Role::Guide)] {
        let response = client
            .get(gateway.at("/api/tours"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_of(response).await["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn login_and_register_are_public() {
    let auth = start_http_backend(200, r#"{"token":"t"}"#).await;
    let mut config = test_config().await;
    config.services.auth = auth.url();
    let gateway = spawn_gateway(config).await;
    let client = reqwest::Client::new();

    for (path, upstream) in [("/api/auth/login", "/login"), ("/api/auth/register", "/register")] {
        let response = client
            .post(gateway.at(path))
            .json(&serde_json::json!({ "username": "ana", "password": "pw" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let seen = auth.last();
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.target, upstream);
        assert!(seen.body.contains("\"username\":\"ana\""));
    }
    assert_eq!(auth.hits(), 2);
}

#[tokio::test]
async fn internal_paths_never_reach_a_backend() {
    let auth = start_http_backend(200, "{}").await;
    let stakeholder = start_http_backend(200, "{}").await;
    let mut config = test_config().await;
    config.services.auth = auth.url();
    config.services.stakeholder = stakeholder.url();
    let gateway = spawn_gateway(config).await;
    let client = reqwest::Client::new();

    for path in [
        "/api/auth/internal/users",
        "/api/stakeholder/internal",
        "/api/stakeholder/%69nternal/x",
        "/api/stakeholder/internal%2Fuser",
        "/api/auth/x%2Finternal",
    ] {
        let response = client
            .get(gateway.at(path))
            .header("authorization", bearer("ana", Role::Admin))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", path);
        let body = json_of(response).await;
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["message"], "Internal routes are not accessible externally");
    }
    assert_eq!(auth.hits(), 0);
    assert_eq!(stakeholder.hits(), 0);

    let response = client
        .post(gateway.at("/api/stakeholder/internal%2Fuser"))
        .body("{}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(stakeholder.hits(), 0);
}

#[tokio::test]
async fn tours_path_and_query_are_rewritten() {
    let tours = start_http_backend(200, r#"{"id":42}"#).await;
    let mut config = test_config().await;
    config.services.tour = tours.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::Client::new()
        .get(gateway.at("/api/tours/42?x=1"))
        .header("authorization", bearer("ana", Role::Guide))
        .header("x-username", "mallory")
        .header("x-user-role", "admin")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await["id"], 42);

    let seen = tours.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/42?x=1");
    assert_eq!(seen.header("x-username"), Some("ana"));
    assert_eq!(seen.header("x-user-role"), Some("guide"));
    assert_eq!(seen.header("host"), Some(tours.addr.to_string().as_str()));
}

#[tokio::test]
async fn method_is_preserved_and_prefix_root_becomes_slash() {
    let reviews = start_http_backend(200, "{}").await;
    let mut config = test_config().await;
    config.services.review = reviews.url();
    let gateway = spawn_gateway(config).await;
    let client = reqwest::Client::new();

    client
        .delete(gateway.at("/api/reviews/7"))
        .header("authorization", bearer("ana", Role::Tourist))
        .send()
        .await
        .unwrap();
    let seen = reviews.last();
    assert_eq!((seen.method.as_str(), seen.target.as_str()), ("DELETE", "/7"));

    client
        .get(gateway.at("/api/reviews"))
        .header("authorization", bearer("ana", Role::Tourist))
        .send()
        .await
        .unwrap();
    assert_eq!(reviews.last().target, "/");
}

#[tokio::test]
async fn stakeholder_profile_update_is_rewritten() {
    let stakeholder = start_http_backend(200, "{}").await;
    let mut config = test_config().await;
    config.services.stakeholder = stakeholder.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::Client::new()
        .put(gateway.at("/api/stakeholder/profile"))
        .header("authorization", bearer("ana", Role::Guide))
        .json(&serde_json::json!({ "name": "Ana" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let seen = stakeholder.last();
    assert_eq!((seen.method.as_str(), seen.target.as_str()), ("PUT", "/profile"));
    assert_eq!(seen.header("x-username"), Some("ana"));
}

#[tokio::test]
async fn public_stakeholder_routes_carry_no_identity() {
    let stakeholder = start_http_backend(201, "{}").await;
    let mut config = test_config().await;
    config.services.stakeholder = stakeholder.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::Client::new()
        .post(gateway.at("/api/stakeholder/create"))
        .header("x-username", "mallory")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let seen = stakeholder.last();
    assert_eq!(seen.target, "/create");
    assert_eq!(seen.header("x-username"), None);
}

#[tokio::test]
async fn upstream_status_is_relayed_verbatim() {
    let followers = start_http_backend(404, r#"{"error":"no such user"}"#).await;
    let mut config = test_config().await;
    config.services.follower = followers.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::Client::new()
        .get(gateway.at("/api/followers/ghost"))
        .header("authorization", bearer("ana", Role::Tourist))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(response).await["error"], "no such user");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let gateway = spawn_gateway(test_config().await).await;
    let response = reqwest::Client::new()
        .get(gateway.at("/api/purchases/cart"))
        .header("authorization", bearer("ana", Role::Tourist))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn anonymous_blog_list_is_proxied() {
    let blogs = start_http_backend(200, "[]").await;
    let mut config = test_config().await;
    config.services.blog = blogs.url();
    let gateway = spawn_gateway(config).await;
    let client = reqwest::Client::new();

    let response = client.get(gateway.at("/api/blogs")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(blogs.last().target, "/");

    // A token that is present must be valid.
    let response = client
        .get(gateway.at("/api/blogs"))
        .bearer_auth(foreign_token("ana", Role::Tourist))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(blogs.hits(), 1);
}

#[tokio::test]
async fn blog_comments_are_public() {
    let blogs = start_http_backend(200, "[]").await;
    let mut config = test_config().await;
    config.services.blog = blogs.url();
    let gateway = spawn_gateway(config).await;

    let response = reqwest::get(gateway.at("/api/blogs/comments?blog=3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(blogs.last().target, "/comments?blog=3");
}

#[tokio::test]
async fn role_gated_route_rejects_other_roles_before_upstream() {
    let tours = start_http_backend(200, "{}").await;
    let mut config = test_config().await;
    config.services.tour = tours.url();
    config.routes.push(RouteConfig {
        name: "admin-reports".to_string(),
        methods: vec!["GET".to_string()],
        path: "/api/admin/reports".to_string(),
        path_match: PathMatch::Prefix,
        auth: AuthRequirementConfig::Role(Role::Admin),
        handler: HandlerConfig::Proxy {
            service: ServiceName::Tour,
            strip: None,
            rewrite: "/reports".to_string(),
        },
        priority: 0,
    });
    let gateway = spawn_gateway(config).await;
    let client = reqwest::Client::new();

    let response = client
        .get(gateway.at("/api/admin/reports/daily"))
        .header("authorization", bearer("tom", Role::Tourist))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(tours.hits(), 0);

    let response = client
        .get(gateway.at("/api/admin/reports/daily"))
        .header("authorization", bearer("root", Role::Admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(tours.last().target, "/reports/daily");
    assert_eq!(tours.last().header("x-user-role"), Some("admin"));
}
