use anyhow::{Result, anyhow};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::{net::TcpListener, sync::Arc, time::Duration};
use userctl::api::{Api, Credentials};
use userctl::cli::commands::client::DEFAULT_TOKEN;
use userctl::client::{
    AuthScheme, Error, Invoker, RetryPolicy, StatusPolicy,
    token::StaticToken,
};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn invoker(uri: &str) -> Result<Invoker> {
    Ok(Invoker::builder(uri)
        .token_provider(Arc::new(StaticToken::new(SecretString::from(
            DEFAULT_TOKEN.to_string(),
        ))))
        .build()?)
}

fn default_credentials() -> Credentials {
    Credentials::new("miguel", SecretString::from("123".to_string()))
}

#[tokio::test]
async fn login_returns_backend_body() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let api = Api::new(invoker(&server.uri())?);
    let response = api.login_raw(&default_credentials()).await?;

    assert_eq!(response, json!({"ok": true}));
    Ok(())
}

#[tokio::test]
async fn list_users_preserves_order() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"name": "a"}, {"name": "b"}])),
        )
        .mount(&server)
        .await;

    let api = Api::new(invoker(&server.uri())?);
    let response = api.list_users().await?;

    assert_eq!(response, json!([{"name": "a"}, {"name": "b"}]));
    Ok(())
}

#[tokio::test]
async fn login_sends_default_credentials_as_json() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"name": "miguel", "password": "123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = Api::new(invoker(&server.uri())?);
    api.login_raw(&default_credentials()).await?;

    Ok(())
}

#[tokio::test]
async fn both_requests_carry_fixed_token() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app/login"))
        .and(header("Authorization", DEFAULT_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .and(header("Authorization", DEFAULT_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = Api::new(invoker(&server.uri())?);
    api.login_raw(&default_credentials()).await?;
    api.list_users().await?;

    Ok(())
}

#[tokio::test]
async fn get_sends_no_content_type() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    invoker(&server.uri())?.get("/users/all").await?;

    let requests = server
        .received_requests()
        .await
        .ok_or_else(|| anyhow!("wiremock request recording is disabled"))?;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("content-type").is_none());
    assert!(requests[0].body.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_network_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    // Reserve a port, then free it so nothing is listening there.
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();

    let api = Api::new(invoker(&format!("http://127.0.0.1:{port}"))?);
    let err = api
        .login_raw(&default_credentials())
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(err, Error::Network(_)), "got {err:?}");
    assert!(err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn non_json_body_is_decode_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = invoker(&server.uri())?
        .get("/users/all")
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    assert!(!err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn strict_policy_rejects_error_status() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT invalid"))
        .mount(&server)
        .await;

    let err = invoker(&server.uri())?
        .get("/users/all")
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(err.to_string().contains("JWT invalid"));
    assert!(!err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn permissive_policy_decodes_error_status() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/all"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let invoker = Invoker::builder(&server.uri())
        .status_policy(StatusPolicy::Permissive)
        .build()?;

    let response = invoker.get("/users/all").await?;
    assert_eq!(response, json!({"error": "boom"}));
    Ok(())
}

#[tokio::test]
async fn retries_transient_server_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pong!"})))
        .mount(&server)
        .await;

    let invoker = Invoker::builder(&server.uri())
        .retry(RetryPolicy::new(2).with_base(Duration::from_millis(1)))
        .build()?;

    let health = Api::new(invoker).ping().await?;
    assert_eq!(health.status, "pong!");

    let requests = server
        .received_requests()
        .await
        .ok_or_else(|| anyhow!("wiremock request recording is disabled"))?;
    assert_eq!(requests.len(), 2);
    Ok(())
}

#[tokio::test]
async fn no_retry_by_default() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = invoker(&server.uri())?
        .get("/ping")
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    Ok(())
}

#[tokio::test]
async fn bearer_scheme_and_custom_headers() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/1"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("X-Client", "userctl-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = Invoker::builder(&server.uri())
        .token_provider(Arc::new(StaticToken::new(SecretString::from(
            "abc".to_string(),
        ))))
        .auth_scheme(AuthScheme::Bearer)
        .build()?;

    let response = invoker
        .invoke(
            Method::PUT,
            "/users/1",
            Some(&json!({"name": "b"})),
            &[("X-Client".to_string(), "userctl-test".to_string())],
        )
        .await?;

    assert_eq!(response, json!({"updated": true}));
    Ok(())
}

#[tokio::test]
async fn caller_headers_replace_defaults() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_logged_out": true})))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = Invoker::builder(&server.uri())
        .token_provider(Arc::new(StaticToken::new(SecretString::from(
            "tok".to_string(),
        ))))
        .build()?;

    invoker
        .invoke(
            Method::POST,
            "/session/logout",
            Some(&json!({"id": 1})),
            &[
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "other".to_string()),
            ],
        )
        .await?;

    let requests = server
        .received_requests()
        .await
        .ok_or_else(|| anyhow!("wiremock request recording is disabled"))?;
    let headers = &requests[0].headers;

    let content_types: Vec<_> = headers.get_all("content-type").iter().collect();
    assert_eq!(content_types, vec!["application/json"]);

    let authorizations: Vec<_> = headers.get_all("authorization").iter().collect();
    assert_eq!(authorizations, vec!["other"]);

    assert_eq!(headers.get_all("x-request-id").iter().count(), 1);
    Ok(())
}

#[tokio::test]
async fn invalid_header_name_is_rejected_before_sending() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    let err = invoker(&server.uri())?
        .invoke(
            Method::GET,
            "/users/all",
            None::<&Value>,
            &[("bad header".to_string(), "x".to_string())],
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("expected error"))?;

    assert!(matches!(err, Error::Header(_)), "got {err:?}");

    let requests = server
        .received_requests()
        .await
        .ok_or_else(|| anyhow!("wiremock request recording is disabled"))?;
    assert!(requests.is_empty());
    Ok(())
}
