use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

const CONTENT_SECURITY_POLICY: &str = concat!(
    "default-src 'self';",
    "base-uri 'self';",
    "font-src 'self' https://fonts.gstatic.com;",
    "form-action 'self';",
    "frame-ancestors 'self';",
    "img-src 'self' data:;",
    "object-src 'none';",
    "script-src 'self';",
    "script-src-attr 'none';",
    "style-src 'self' https://fonts.googleapis.com;",
    "connect-src 'self';",
    "upgrade-insecure-requests",
);

pub const SECURITY_HEADERS: [(&str, &str); 12] = [
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Adds the hardening headers to every response that does not already carry
/// them, and allows cross-origin requests from anywhere.
pub fn security_layer(router: Router) -> Router {
    let router = SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        });

    router.layer(CorsLayer::permissive())
}
