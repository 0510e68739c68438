//! Integration tests for the nextclerk service.
//!
//! This suite drives the full router, gate included, against a mocked
//! identity provider:
//! 1. A `wiremock` server answers the provider's backend API.
//! 2. The real HTTP provider client is pointed at it.
//! 3. Requests go through `tower::ServiceExt::oneshot`, exactly as the
//!    listener would dispatch them.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, LOCATION},
        Method, Request, Response, StatusCode,
    },
    Router,
};
use nextclerk::{
    identity::HttpIdentityProvider,
    nextclerk::{gate::AccessPolicy, router, AppState, SiteConfig},
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const PUBLIC_URL: &str = "https://www.example.com";
const ACCOUNTS_URL: &str = "https://accounts.example.com";
const SECRET_KEY: &str = "sk_test_integration";
const TOKEN: &str = "token_ada";
const PUBLIC_PATHS: [&str; 5] = ["/", "/profile", "/dashboard", "/sign-in", "/sign-up"];

fn user_payload(first_name: &str, last_name: &str) -> Value {
    json!({
        "id": "user_ada",
        "first_name": first_name,
        "last_name": last_name,
        "image_url": "",
        "primary_email_address_id": "idn_primary",
        "email_addresses": [
            { "id": "idn_other", "email_address": "other@example.com" },
            { "id": "idn_primary", "email_address": "ada@example.com" }
        ],
        "created_at": 1_700_000_000_000_i64,
        "last_sign_in_at": 1_710_000_000_000_i64
    })
}

struct TestContext {
    provider: MockServer,
}

impl TestContext {
    async fn new() -> Self {
        let provider = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/sessions/verify"))
            .and(header("authorization", format!("Bearer {SECRET_KEY}").as_str()))
            .and(body_json(json!({ "token": TOKEN })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sess_ada",
                "user_id": "user_ada",
                "status": "active"
            })))
            .mount(&provider)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/sessions/verify"))
            .respond_with(ResponseTemplate::new(401))
            .with_priority(10)
            .mount(&provider)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/users/user_ada"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_payload("Ada", "Lovelace")))
            .mount(&provider)
            .await;

        Self { provider }
    }

    fn app(&self, policy: AccessPolicy) -> Result<Router> {
        let secret_key = SecretString::from(SECRET_KEY.to_string());
        let client = HttpIdentityProvider::new(&self.provider.uri(), secret_key)?;
        let site = SiteConfig::new(Url::parse(PUBLIC_URL)?, Url::parse(ACCOUNTS_URL)?)
            .with_policy(policy);
        Ok(router(Arc::new(AppState::new(site, Arc::new(client)))))
    }

    async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.app(AccessPolicy::default())?.oneshot(request).await?)
    }
}

fn get(uri: &str, signed_in: bool) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if signed_in {
        builder = builder.header("Cookie", format!("__session={TOKEN}"));
    }
    Ok(builder.body(Body::empty())?)
}

fn post_form(uri: &str, form: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Cookie", format!("__session={TOKEN}"))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))?)
}

fn location(response: &Response<Body>) -> Result<Url> {
    let value = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(Url::parse(value)?)
}

async fn body_text(response: Response<Body>) -> Result<String> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(body.to_vec())?)
}

#[tokio::test]
async fn public_paths_pass_through_without_session() -> Result<()> {
    let ctx = TestContext::new().await;

    for public in PUBLIC_PATHS {
        let response = ctx.send(get(public, false)?).await?;
        let status = response.status();
        if status == StatusCode::TEMPORARY_REDIRECT {
            // sign-in and sign-up hand off to the hosted pages, never back to the gate
            let target = location(&response)?;
            assert_eq!(target.host_str(), Some("accounts.example.com"), "{public}");
        } else {
            assert_eq!(status, StatusCode::OK, "{public}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn protected_paths_redirect_with_original_url() -> Result<()> {
    let ctx = TestContext::new().await;

    for protected in ["/settings", "/api/me", "/profile/security?tab=2", "/billing/"] {
        let response = ctx.send(get(protected, false)?).await?;
        assert_eq!(
            response.status(),
            StatusCode::TEMPORARY_REDIRECT,
            "{protected}"
        );

        let target = location(&response)?;
        assert_eq!(target.host_str(), Some("www.example.com"));
        assert_eq!(target.path(), "/sign-in");
        let redirect = target
            .query_pairs()
            .find(|(k, _)| k == "redirect_url")
            .map(|(_, v)| v.into_owned());
        assert_eq!(
            redirect,
            Some(format!("{PUBLIC_URL}{protected}")),
            "{protected}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn signed_in_root_redirects_to_dashboard() -> Result<()> {
    let ctx = TestContext::new().await;

    let response = ctx.send(get("/", true)?).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response)?.as_str(), format!("{PUBLIC_URL}/dashboard"));
    Ok(())
}

#[tokio::test]
async fn signed_in_public_paths_pass_through() -> Result<()> {
    let ctx = TestContext::new().await;

    let response = ctx.send(get("/dashboard", true)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Welcome back, Ada!"));

    let response = ctx.send(get("/profile", true)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("ada@example.com"));
    assert!(page.contains("Member since: 2023-11-14"));
    assert!(page.contains("Last sign-in: 2024-03-09"));
    Ok(())
}

#[tokio::test]
async fn unknown_token_counts_as_signed_out() -> Result<()> {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .uri("/")
        .header("Cookie", "__session=stale")
        .body(Body::empty())?;
    let response = ctx.send(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn provider_outage_counts_as_signed_out() -> Result<()> {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/verify"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&provider)
        .await;
    let ctx = TestContext { provider };

    let response = ctx.send(get("/settings", true)?).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response)?.path(), "/sign-in");
    Ok(())
}

#[tokio::test]
async fn strict_policy_gates_signed_in_views() -> Result<()> {
    let ctx = TestContext::new().await;

    let response = ctx
        .app(AccessPolicy::strict())?
        .oneshot(get("/profile", false)?)
        .await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response)?.path(), "/sign-in");
    Ok(())
}

#[tokio::test]
async fn profile_update_sends_only_names() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/users/user_ada"))
        .and(body_json(json!({ "first_name": "Grace", "last_name": "Hopper" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_payload("Grace", "Hopper")))
        .expect(1)
        .mount(&ctx.provider)
        .await;

    let response = ctx
        .send(post_form(
            "/profile",
            "first_name=Grace&last_name=Hopper&email=mallory%40example.com",
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("Profile updated successfully!"));
    assert!(page.contains("Grace Hopper"));
    assert!(page.contains(r#"<input id="email" type="email" value="ada@example.com" disabled>"#));
    Ok(())
}

#[tokio::test]
async fn profile_update_failure_keeps_edit_mode() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/users/user_ada"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{ "message": "first_name is invalid" }]
        })))
        .mount(&ctx.provider)
        .await;

    let response = ctx
        .send(post_form("/profile", "first_name=Grace&last_name=Hopper")?)
        .await?;

    let page = body_text(response).await?;
    assert!(page.contains("Failed to update profile. Please try again."));
    assert!(page.contains("Save changes"));
    assert!(!page.contains("first_name is invalid"));
    Ok(())
}

#[tokio::test]
async fn password_mismatch_never_reaches_provider() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/users/user_ada/verify_password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.provider)
        .await;

    let response = ctx
        .send(post_form(
            "/profile/password",
            "current_password=old-secret&new_password=new-secret-1&confirm_password=new-secret-2",
        )?)
        .await?;

    let page = body_text(response).await?;
    assert!(page.contains("New passwords do not match!"));
    Ok(())
}

#[tokio::test]
async fn password_change_verifies_then_updates() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/users/user_ada/verify_password"))
        .and(body_json(json!({ "password": "old-secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "verified": true })))
        .expect(1)
        .mount(&ctx.provider)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/users/user_ada"))
        .and(body_json(json!({ "password": "new-secret-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_payload("Ada", "Lovelace")))
        .expect(1)
        .mount(&ctx.provider)
        .await;

    let response = ctx
        .send(post_form(
            "/profile/password",
            "current_password=old-secret&new_password=new-secret-1&confirm_password=new-secret-1",
        )?)
        .await?;

    let page = body_text(response).await?;
    assert!(page.contains("Password updated successfully!"));
    assert!(!page.contains(r#"action="/profile/password""#));
    Ok(())
}

#[tokio::test]
async fn signed_out_password_post_returns_to_open_form() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/users/user_ada"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.provider)
        .await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/profile/password")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "current_password=old-secret&new_password=new-secret-1&confirm_password=new-secret-1",
        ))?;
    let response = ctx.send(request).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let sign_in = location(&response)?;
    assert_eq!(sign_in.path(), "/sign-in");

    // the hosted page receives the same return URL
    let response = ctx.send(get(sign_in.as_str(), false)?).await?;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let hosted = location(&response)?;
    let redirect = hosted
        .query_pairs()
        .find(|(k, _)| k == "redirect_url")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    assert_eq!(redirect, format!("{PUBLIC_URL}/profile/password"));

    // back from sign-in, the browser issues a GET
    let response = ctx.send(get("/profile/password", true)?).await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let open_form = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(open_form, "/profile?password=true");

    let page = body_text(ctx.send(get(&open_form, true)?).await?).await?;
    assert!(page.contains(r#"action="/profile/password""#));
    Ok(())
}

#[tokio::test]
async fn api_me_returns_user() -> Result<()> {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .uri("/api/me")
        .header("Authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())?;
    let response = ctx.send(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let payload: Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(payload.get("email").and_then(Value::as_str), Some("ada@example.com"));
    assert_eq!(payload.get("image_url"), Some(&Value::Null));
    Ok(())
}

#[tokio::test]
async fn sign_out_revokes_session() -> Result<()> {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/v1/sessions/sess_ada/revoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sess_ada",
            "status": "revoked"
        })))
        .expect(1)
        .mount(&ctx.provider)
        .await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sign-out")
        .header("Cookie", format!("__session={TOKEN}"))
        .body(Body::empty())?;
    let response = ctx.send(request).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok(())
}

#[tokio::test]
async fn health_is_ungated() -> Result<()> {
    let ctx = TestContext::new().await;

    let response = ctx.send(get("/health", false)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}
