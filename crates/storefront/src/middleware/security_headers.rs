//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! The policy is locked down except where the widgets need it: the gallery
//! shows images from any `http:` or `https:` host and the page loads htmx
//! from unpkg.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Content Security Policy applied to every response.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'self' https://unpkg.com; \
     style-src 'self'; \
     img-src 'self' http: https: data:; \
     connect-src 'self'; \
     frame-src 'none'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: no-referrer`
/// - `Content-Security-Policy` (see [`CONTENT_SECURITY_POLICY_VALUE`])
/// - `Permissions-Policy` denying sensitive features
/// - `Cache-Control: no-store, max-age=0`
/// - `Cross-Origin-Opener-Policy: same-origin`
/// - `Cross-Origin-Embedder-Policy: credentialless`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), \
             display-capture=(), \
             geolocation=(), \
             microphone=(), \
             payment=(), \
             publickey-credentials-get=(), \
             usb=()",
        ),
    );

    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn directive(name: &str) -> Vec<&'static str> {
        CONTENT_SECURITY_POLICY_VALUE
            .split(';')
            .map(str::trim)
            .find_map(|d| d.strip_prefix(name))
            .unwrap()
            .split_whitespace()
            .collect()
    }

    #[test]
    fn test_gallery_images_load_from_any_web_host() {
        let sources = directive("img-src ");
        assert!(sources.contains(&"http:"));
        assert!(sources.contains(&"https:"));
    }

    #[test]
    fn test_scripts_limited_to_self_and_htmx_cdn() {
        assert_eq!(directive("script-src "), vec!["'self'", "https://unpkg.com"]);
    }

    #[test]
    fn test_policy_is_a_valid_header_value() {
        assert!(HeaderValue::from_str(CONTENT_SECURITY_POLICY_VALUE).is_ok());
    }
}
