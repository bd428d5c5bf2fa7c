//! Catalog route handlers.

use askama::Template;
use axum::response::Response;
use caprichos_core::CatalogView;
use tracing::instrument;

use super::fragment;
use crate::error::Result;
use crate::pages::CurrentPage;

/// Catalog section fragment.
#[derive(Template)]
#[template(path = "partials/catalog.html")]
pub struct CatalogTemplate {
    pub catalog: CatalogView,
}

/// Append a random product and re-render the list (HTMX).
#[instrument(skip_all, fields(page_id = %page.id))]
pub async fn add_random_product(page: CurrentPage) -> Result<Response> {
    page.with(|page| {
        let catalog = page.catalog_mut()?;
        let id = catalog.add_random_product(&mut rand::rng());
        tracing::info!(product_id = %id, products = catalog.catalog().len(), "Product added");

        let template = CatalogTemplate {
            catalog: catalog.view(),
        };
        fragment(Some(&template), &page.drain_notices())
    })
}
