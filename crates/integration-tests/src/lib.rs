//! Integration tests for the Caprichos storefront.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, so no
//! server or network is needed:
//!
//! ```bash
//! cargo test -p caprichos-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - health, page mounting, page id handling, headers
//! - `storefront_gallery` - image gallery fragments and notices
//! - `storefront_register` - registration validation, submit and reset
//! - `storefront_catalog` - product catalog

#![allow(clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use caprichos_storefront::{app, config::StorefrontConfig, pages::PAGE_ID_HEADER, state::AppState};
use tower::ServiceExt;

/// Upper bound on response bodies read by tests.
const BODY_LIMIT: usize = 1024 * 1024;

/// The storefront router plus request helpers.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::with_config(StorefrontConfig::default())
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self {
            router: app(AppState::new(config)),
        }
    }

    /// Send a request and collect the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// POST a url-encoded form, with `x-page-id` when `page_id` is given.
    pub async fn post(&self, uri: &str, page_id: Option<&str>, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();

        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        if let Some(page_id) = page_id {
            request = request.header(PAGE_ID_HEADER, page_id);
        }

        self.send(request.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    /// Load the store page and return its page id with the response.
    pub async fn open_page(&self) -> (String, TestResponse) {
        let response = self.get("/").await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        let page_id = page_id(&response.body).expect("store page carries a page id");
        (page_id, response)
    }

    /// A page-bound client for the page just loaded.
    pub async fn page(&self) -> TestPage {
        let (id, _) = self.open_page().await;
        TestPage {
            app: self.clone(),
            id,
        }
    }
}

/// One mounted store page.
pub struct TestPage {
    app: TestApp,
    pub id: String,
}

impl TestPage {
    pub async fn post(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.app.post(uri, Some(&self.id), form).await
    }
}

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Whether htmx was told to skip the main swap.
    #[must_use]
    pub fn skips_swap(&self) -> bool {
        self.header("hx-reswap") == Some("none")
    }

    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.body.matches(needle).count()
    }
}

/// Extract the page id from a rendered store page.
#[must_use]
pub fn page_id(html: &str) -> Option<String> {
    attribute_values(html, "data-page-id").into_iter().next()
}

/// Every value of `attr="..."` in `html`, in document order.
#[must_use]
pub fn attribute_values(html: &str, attr: &str) -> Vec<String> {
    let marker = format!("{attr}=\"");
    html.split(marker.as_str())
        .skip(1)
        .filter_map(|rest| rest.split_once('"').map(|(value, _)| value.to_string()))
        .collect()
}

/// Image ids in a rendered gallery, in display order.
#[must_use]
pub fn image_ids(html: &str) -> Vec<String> {
    attribute_values(html, "hx-post")
        .into_iter()
        .filter_map(|path| {
            path.strip_prefix("/gallery/images/")
                .and_then(|rest| rest.strip_suffix("/select"))
                .map(str::to_string)
        })
        .collect()
}
