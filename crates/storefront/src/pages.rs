//! Per-page widget state.
//!
//! Every `GET /` mounts a fresh [`StorePage`] (gallery, registration form,
//! catalog and their shared notice queue) and stores it under a random
//! [`PageId`]. The page carries the id back on every HTMX request in the
//! `x-page-id` header, set via `hx-headers` on `<body>`.
//!
//! Pages live in a `moka` cache with a time-to-idle, so abandoned tabs cost
//! nothing once they go quiet. Each page sits behind a `std::sync::Mutex`
//! that handlers lock for their whole synchronous body and never across an
//! `.await`.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use caprichos_core::catalog::CATALOG_ELEMENTS;
use caprichos_core::form::{FORM_ELEMENTS, RESET_BUTTON};
use caprichos_core::gallery::GALLERY_ELEMENTS;
use caprichos_core::{
    Catalog, CatalogController, CatalogView, FormValidator, FormView, GalleryController,
    GalleryView, Notice, NoticeQueue, RuleSet, StoreConfig,
};
use moka::future::Cache;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::surface::HtmxSurface;

/// Header carrying the page id on HTMX requests.
pub const PAGE_ID_HEADER: &str = "x-page-id";

/// Notice queue shared by the widgets of one page.
pub type PageNotices = Arc<NoticeQueue>;
pub type PageGallery = GalleryController<HtmxSurface<GalleryView>, PageNotices>;
pub type PageForm = FormValidator<HtmxSurface<FormView>, PageNotices>;
pub type PageCatalog = CatalogController<HtmxSurface<CatalogView>, PageNotices>;

// =============================================================================
// Page Id
// =============================================================================

/// Identifier of one live page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(Uuid);

impl PageId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Element ids present in the rendered store page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    elements: Vec<&'static str>,
}

impl PageLayout {
    /// The store page, with or without the registration reset button.
    #[must_use]
    pub fn standard(reset_button: bool) -> Self {
        let mut elements: Vec<&'static str> = GALLERY_ELEMENTS
            .iter()
            .chain(FORM_ELEMENTS.iter())
            .chain(CATALOG_ELEMENTS.iter())
            .copied()
            .collect();
        if reset_button {
            elements.push(RESET_BUTTON);
        }
        Self { elements }
    }

    /// The same layout minus one element.
    #[must_use]
    pub fn without(mut self, element: &str) -> Self {
        self.elements.retain(|e| *e != element);
        self
    }

    fn surface<V>(&self) -> HtmxSurface<V> {
        HtmxSurface::new(self.elements.iter().copied())
    }
}

// =============================================================================
// Store Page
// =============================================================================

/// The three widgets of one page load.
///
/// A widget whose elements are missing from the layout is left unmounted;
/// the other two work normally.
pub struct StorePage {
    pub gallery: Option<PageGallery>,
    pub form: Option<PageForm>,
    pub catalog: Option<PageCatalog>,
    notices: PageNotices,
}

impl StorePage {
    /// Mount every widget onto `layout`.
    #[must_use]
    pub fn mount(config: &StoreConfig, layout: &PageLayout) -> Self {
        let notices = Arc::new(NoticeQueue::with_dismiss_after(config.notices.dismiss_after));

        let gallery =
            GalleryController::mount(layout.surface(), Arc::clone(&notices), config.gallery.clone())
                .inspect_err(|e| tracing::warn!(error = %e, "Gallery not mounted"))
                .ok();
        let form = FormValidator::mount(
            layout.surface(),
            Arc::clone(&notices),
            RuleSet::from_config(&config.validation),
        )
        .inspect_err(|e| tracing::warn!(error = %e, "Registration form not mounted"))
        .ok();
        let catalog = CatalogController::mount(layout.surface(), Arc::clone(&notices), Catalog::seeded())
            .inspect_err(|e| tracing::warn!(error = %e, "Catalog not mounted"))
            .ok();

        Self {
            gallery,
            form,
            catalog,
            notices,
        }
    }

    /// # Errors
    ///
    /// `AppError::NotFound` if the gallery is not mounted on this page.
    pub fn gallery_mut(&mut self) -> Result<&mut PageGallery, AppError> {
        self.gallery
            .as_mut()
            .ok_or_else(|| AppError::NotFound("gallery".to_string()))
    }

    /// # Errors
    ///
    /// `AppError::NotFound` if the form is not mounted on this page.
    pub fn form_mut(&mut self) -> Result<&mut PageForm, AppError> {
        self.form
            .as_mut()
            .ok_or_else(|| AppError::NotFound("registration form".to_string()))
    }

    /// # Errors
    ///
    /// `AppError::NotFound` if the catalog is not mounted on this page.
    pub fn catalog_mut(&mut self) -> Result<&mut PageCatalog, AppError> {
        self.catalog
            .as_mut()
            .ok_or_else(|| AppError::NotFound("catalog".to_string()))
    }

    /// Notices raised since the last drain.
    #[must_use]
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }
}

// =============================================================================
// Page Store
// =============================================================================

/// Shared handle to one page's state.
pub type SharedPage = Arc<Mutex<StorePage>>;

/// Live pages keyed by id, dropped after sitting idle.
#[derive(Clone)]
pub struct PageStore {
    pages: Cache<PageId, SharedPage>,
}

impl PageStore {
    #[must_use]
    pub fn new(max_pages: u64, time_to_idle: Duration) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(max_pages)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    /// Store `page` under a fresh id.
    pub async fn insert(&self, page: StorePage) -> PageId {
        let id = PageId::new();
        self.pages.insert(id, Arc::new(Mutex::new(page))).await;
        id
    }

    pub async fn get(&self, id: PageId) -> Option<SharedPage> {
        self.pages.get(&id).await
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.pages.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// The page addressed by the request's `x-page-id` header.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(page: CurrentPage) -> Result<Response> {
///     page.with(|page| { /* mutate widgets */ })
/// }
/// ```
pub struct CurrentPage {
    pub id: PageId,
    page: SharedPage,
}

impl CurrentPage {
    /// Run `f` with the page locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut StorePage) -> R) -> R {
        let mut page = self.page.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }
}

impl FromRequestParts<AppState> for CurrentPage {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PAGE_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("missing {PAGE_ID_HEADER} header")))?;

        let id = raw
            .to_str()
            .ok()
            .and_then(|value| value.parse::<PageId>().ok())
            .ok_or_else(|| AppError::BadRequest(format!("malformed {PAGE_ID_HEADER} header")))?;

        let Some(page) = state.pages().get(id).await else {
            tracing::info!(page_id = %id, "Request for expired page");
            return Err(AppError::PageExpired);
        };

        Ok(Self { id, page })
    }
}
