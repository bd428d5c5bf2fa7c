//! Gallery route handlers.
//!
//! Each handler returns the re-rendered gallery section when the widget
//! rendered, otherwise just the notices it raised.

use askama::Template;
use axum::{Form, extract::Path, response::Response};
use caprichos_core::{GalleryView, ImageId};
use serde::Deserialize;
use tracing::instrument;

use super::fragment;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::pages::{CurrentPage, StorePage};

/// Gallery section fragment.
#[derive(Template)]
#[template(path = "partials/gallery.html")]
pub struct GalleryTemplate {
    pub gallery: GalleryView,
}

/// Add image form data.
#[derive(Debug, Deserialize)]
pub struct AddImageForm {
    #[serde(default)]
    pub url: String,
}

/// Respond with whatever the gallery rendered after `mark`.
fn respond(page: &StorePage, mark: u64) -> Result<Response> {
    let template = page
        .gallery
        .as_ref()
        .and_then(|gallery| gallery.surface().rendered_since(mark))
        .cloned()
        .map(|gallery| GalleryTemplate { gallery });
    fragment(template.as_ref(), &page.drain_notices())
}

/// Add an image (HTMX).
#[instrument(skip_all, fields(page_id = %page.id))]
pub async fn add_image(page: CurrentPage, Form(form): Form<AddImageForm>) -> Result<Response> {
    page.with(|page| {
        let gallery = page.gallery_mut()?;
        let mark = gallery.surface().render_count();

        match gallery.add_image(&form.url) {
            Ok(id) => {
                tracing::info!(image_id = %id, images = gallery.gallery().len(), "Image added");
                add_breadcrumb("gallery", "Image added", Some(&[("image_id", id.to_string().as_str())]));
            }
            Err(err) => tracing::debug!(error = %err, "Image rejected"),
        }

        respond(page, mark)
    })
}

/// Select an image (HTMX).
#[instrument(skip_all, fields(page_id = %page.id, image_id = %id))]
pub async fn select_image(page: CurrentPage, Path(id): Path<ImageId>) -> Result<Response> {
    page.with(|page| {
        let gallery = page.gallery_mut()?;
        let mark = gallery.surface().render_count();

        gallery
            .select_image(id)
            .map_err(|err| AppError::NotFound(err.to_string()))?;
        tracing::debug!("Image selected");

        respond(page, mark)
    })
}

/// Swap a failed image for its placeholder (posted by `store.js`).
#[instrument(skip_all, fields(page_id = %page.id, image_id = %id))]
pub async fn image_broken(page: CurrentPage, Path(id): Path<ImageId>) -> Result<Response> {
    page.with(|page| {
        let gallery = page.gallery_mut()?;
        let mark = gallery.surface().render_count();

        gallery
            .image_load_failed(id)
            .map_err(|err| AppError::NotFound(err.to_string()))?;
        tracing::info!("Image failed to load");

        respond(page, mark)
    })
}

/// Remove the selected image (HTMX).
#[instrument(skip_all, fields(page_id = %page.id))]
pub async fn remove_selected(page: CurrentPage) -> Result<Response> {
    page.with(|page| {
        let gallery = page.gallery_mut()?;
        let mark = gallery.surface().render_count();

        match gallery.remove_selected() {
            Ok(item) => tracing::info!(image_id = %item.id, "Image removed"),
            Err(err) => tracing::debug!(error = %err, "Nothing removed"),
        }

        respond(page, mark)
    })
}
