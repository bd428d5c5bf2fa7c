//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Store page (mounts a fresh page)
//! GET  /health                        - Health check
//!
//! # Gallery (HTMX fragments)
//! POST /gallery/images                - Add image (form: url)
//! POST /gallery/images/{id}/select    - Select image
//! POST /gallery/images/{id}/broken    - Image failed to load
//! POST /gallery/remove-selected       - Remove the selected image
//!
//! # Registration (HTMX fragments)
//! POST /register/fields/{field}       - Field input or blur (form: value)
//! POST /register/submit               - Submit
//! POST /register/reset                - Reset (404 without a reset button)
//!
//! # Catalog (HTMX fragments)
//! POST /catalog/products/random       - Add a random product
//! ```
//!
//! Every POST needs the `x-page-id` header (see [`crate::pages`]). Widget
//! failures come back as 200 responses carrying out-of-band notices.

pub mod catalog;
pub mod gallery;
pub mod home;
pub mod register;

use askama::Template;
use axum::{
    Router,
    http::HeaderValue,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use caprichos_core::Notice;

use crate::error::Result;
use crate::state::AppState;

/// Response header telling htmx to skip the main swap.
pub const HX_RESWAP: &str = "hx-reswap";

/// Create the gallery routes router.
pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/images", post(gallery::add_image))
        .route("/images/{id}/select", post(gallery::select_image))
        .route("/images/{id}/broken", post(gallery::image_broken))
        .route("/remove-selected", post(gallery::remove_selected))
}

/// Create the registration routes router.
pub fn register_routes() -> Router<AppState> {
    Router::new()
        .route("/fields/{field}", post(register::field))
        .route("/submit", post(register::submit))
        .route("/reset", post(register::reset))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/products/random", post(catalog::add_random_product))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/gallery", gallery_routes())
        .nest("/register", register_routes())
        .nest("/catalog", catalog_routes())
}

// =============================================================================
// Fragments
// =============================================================================

/// A notice as the toast template shows it.
pub struct NoticeView {
    pub message: String,
    pub severity: &'static str,
    pub dismiss_ms: u64,
}

impl From<&Notice> for NoticeView {
    fn from(notice: &Notice) -> Self {
        Self {
            message: notice.message.clone(),
            severity: notice.severity.as_str(),
            dismiss_ms: notice.dismiss_after_ms(),
        }
    }
}

/// Toasts appended out of band to `#notices`.
#[derive(Template)]
#[template(path = "partials/notices.html")]
pub struct NoticesTemplate {
    pub notices: Vec<NoticeView>,
}

/// Build an HTMX response from an optional main fragment plus notices.
///
/// Without a main fragment the response carries `HX-Reswap: none`, so the
/// widget stays as it is and only the toasts are swapped in.
///
/// # Errors
///
/// `AppError::Template` if either template fails to render.
pub fn fragment<T: Template>(body: Option<&T>, notices: &[Notice]) -> Result<Response> {
    let mut html = match body {
        Some(template) => template.render()?,
        None => String::new(),
    };

    if !notices.is_empty() {
        let toasts = NoticesTemplate {
            notices: notices.iter().map(NoticeView::from).collect(),
        };
        html.push_str(&toasts.render()?);
    }

    let mut response = Html(html).into_response();
    if body.is_none() {
        response
            .headers_mut()
            .insert(HX_RESWAP, HeaderValue::from_static("none"));
    }
    Ok(response)
}
