//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use caprichos_core::{
    CatalogController, CatalogView, FormValidator, FormView, GalleryController, GalleryView,
};
use tracing::instrument;

use crate::filters;
use crate::pages::StorePage;
use crate::state::AppState;

/// Store page template.
///
/// A widget that failed to mount is `None` and its section is left out.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Id the page sends back in `x-page-id`.
    pub page_id: String,
    pub gallery: Option<GalleryView>,
    pub form: Option<FormView>,
    pub catalog: Option<CatalogView>,
}

/// Display the store page with freshly mounted widgets.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let page = StorePage::mount(state.store_config(), state.layout());

    let gallery = page.gallery.as_ref().map(GalleryController::view);
    let form = page.form.as_ref().map(FormValidator::view);
    let catalog = page.catalog.as_ref().map(CatalogController::view);

    let page_id = state.pages().insert(page).await;
    tracing::info!(%page_id, live_pages = state.pages().len(), "Page created");

    HomeTemplate {
        page_id: page_id.to_string(),
        gallery,
        form,
        catalog,
    }
}
