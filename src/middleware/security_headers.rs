// Security headers middleware
// Adds nosniff, frame denial, CSP, and referrer policy to every response.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use axum::http::HeaderValue;

pub async fn security_headers_middleware(
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    // X-Content-Type-Options: Prevent MIME type sniffing
    headers.insert(
        axum::http::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff")
    );

    // X-Frame-Options: Prevent clickjacking
    headers.insert(
        axum::http::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY")
    );

    // Content-Security-Policy: pure JSON API, nothing should load resources
    headers.insert(
        axum::http::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'")
    );

    // Referrer-Policy: Control referrer information
    headers.insert(
        axum::http::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin")
    );

    // Note: Strict-Transport-Security (HSTS) should only be added when HTTPS
    // is enabled, which is handled by the reverse proxy in this deployment.

    response
}
