use anyhow::Result;
use reqwest::StatusCode;
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_SECURITY_POLICY, ORIGIN,
    X_CONTENT_TYPE_OPTIONS,
};

use crate::helpers::spawn_app;

#[tokio::test]
async fn root_returns_a_welcome_message() -> Result<()> {
    let app = spawn_app().await?;

    let response = app.get_root().await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await?;
    assert!(!body.is_empty());
    assert_eq!(body, "Welcome to the Referral App");

    Ok(())
}

#[tokio::test]
async fn responses_carry_security_headers_and_a_request_id() -> Result<()> {
    let app = spawn_app().await?;

    let response = app.get_root().await?;
    let headers = response.headers();

    let csp = headers
        .get(CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(csp.starts_with("default-src 'self';"));
    assert!(csp.contains("font-src 'self' https://fonts.gstatic.com"));
    assert_eq!(
        headers.get(X_CONTENT_TYPE_OPTIONS).map(|v| v.as_bytes()),
        Some(b"nosniff".as_slice())
    );
    assert!(headers.get("x-request-id").is_some());

    Ok(())
}

#[tokio::test]
async fn cross_origin_preflight_is_allowed_from_any_origin() -> Result<()> {
    let app = spawn_app().await?;

    let response = app
        .api_client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/submit-referral", app.address),
        )
        .header(ORIGIN, "https://some-frontend.example")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.as_bytes()),
        Some(b"*".as_slice())
    );

    Ok(())
}
