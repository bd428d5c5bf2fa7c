//! Image gallery widget.
//!
//! [`Gallery`] is the data model: an insertion-ordered list of image URLs
//! with at most one selected entry. [`GalleryController`] mounts a gallery
//! onto a [`Surface`], turns model errors into notices and keeps the
//! purely presentational state (entrance flag, broken images).

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::GalleryConfig;
use crate::notice::{Notice, Notifier};
use crate::surface::{Binding, EventKind, MountError, Surface, require_elements};
use crate::types::ImageId;

/// Element ids the gallery needs on its surface.
pub const GALLERY_ELEMENTS: [&str; 4] = ["gallery", "addImageBtn", "removeImageBtn", "imageUrl"];

/// Why a gallery operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("Please enter a valid URL.")]
    EmptyUrl,

    #[error("A maximum of {max} images is allowed.")]
    AtCapacity { max: usize },

    #[error("Please enter a valid image URL (jpg, png, gif, webp).")]
    UnsupportedImage { url: String },

    #[error("No image is selected for removal.")]
    NoSelection,

    #[error("image {0} is not in the gallery")]
    UnknownImage(ImageId),
}

impl GalleryError {
    /// The banner to show for this error, if the user should see one.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::EmptyUrl | Self::AtCapacity { .. } | Self::NoSelection => {
                Some(Notice::warning(self.to_string()))
            }
            Self::UnsupportedImage { .. } => Some(Notice::error(self.to_string())),
            Self::UnknownImage(_) => None,
        }
    }
}

/// An image in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub id: ImageId,
    pub url: String,
}

/// Gallery data model.
#[derive(Debug, Clone)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    selected: Option<ImageId>,
    next_id: ImageId,
    config: GalleryConfig,
}

impl Gallery {
    #[must_use]
    pub const fn new(config: GalleryConfig) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            next_id: ImageId::new(1),
            config,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.config
            .max_images
            .is_some_and(|max| self.items.len() >= max)
    }

    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.config.max_images
    }

    #[must_use]
    pub const fn selected(&self) -> Option<ImageId> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, id: ImageId) -> bool {
        self.selected == Some(id)
    }

    #[must_use]
    pub fn get(&self, id: ImageId) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Append an image.
    ///
    /// The URL is trimmed first. Checks run in order: blank, capacity,
    /// extension.
    ///
    /// # Errors
    ///
    /// [`GalleryError::EmptyUrl`], [`GalleryError::AtCapacity`] or
    /// [`GalleryError::UnsupportedImage`]; the gallery is unchanged.
    pub fn add(&mut self, url: &str) -> Result<ImageId, GalleryError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(GalleryError::EmptyUrl);
        }

        if let Some(max) = self.config.max_images
            && self.items.len() >= max
        {
            return Err(GalleryError::AtCapacity { max });
        }

        if let Some(allowed) = &self.config.allowed_extensions
            && !has_image_extension(url, allowed)
        {
            return Err(GalleryError::UnsupportedImage {
                url: url.to_owned(),
            });
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.items.push(GalleryItem {
            id,
            url: url.to_owned(),
        });
        Ok(id)
    }

    /// Make `id` the only selected image. Reselecting keeps it selected.
    ///
    /// # Errors
    ///
    /// [`GalleryError::UnknownImage`] if `id` is not in the gallery.
    pub fn select(&mut self, id: ImageId) -> Result<(), GalleryError> {
        if self.get(id).is_none() {
            return Err(GalleryError::UnknownImage(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Remove the selected image and clear the selection.
    ///
    /// # Errors
    ///
    /// [`GalleryError::NoSelection`] if nothing is selected.
    pub fn remove_selected(&mut self) -> Result<GalleryItem, GalleryError> {
        let id = self.selected.take().ok_or(GalleryError::NoSelection)?;
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(GalleryError::UnknownImage(id))?;
        Ok(self.items.remove(index))
    }
}

/// Whether `url` is an absolute URL whose path ends in an allowed extension.
fn has_image_extension(url: &str, allowed: &[String]) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        let path = parsed.path().to_ascii_lowercase();
        allowed.iter().any(|ext| path.ends_with(ext.as_str()))
    })
}

/// One rendered gallery entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItemView {
    pub id: ImageId,
    pub url: String,
    pub selected: bool,
    /// The image failed to load; show the placeholder instead.
    pub broken: bool,
    /// Added by the last action; plays the entrance transition.
    pub entering: bool,
}

/// Everything the gallery region displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub items: Vec<GalleryItemView>,
    /// Current text of the URL input.
    pub url_input: String,
    pub capacity: Option<usize>,
    pub has_selection: bool,
}

/// Gallery widget bound to a surface and a notifier.
pub struct GalleryController<S, N> {
    gallery: Gallery,
    surface: S,
    notifier: N,
    url_input: String,
    broken: BTreeSet<ImageId>,
    entering: Option<ImageId>,
}

impl<S, N> GalleryController<S, N>
where
    S: Surface<GalleryView>,
    N: Notifier,
{
    /// Mount a gallery onto `surface` and render it empty.
    ///
    /// # Errors
    ///
    /// [`MountError`] if any of [`GALLERY_ELEMENTS`] is missing.
    pub fn mount(mut surface: S, notifier: N, config: GalleryConfig) -> Result<Self, MountError> {
        require_elements::<GalleryView, _>(&surface, "gallery", &GALLERY_ELEMENTS)?;

        surface.subscribe(Binding::new("addImageBtn", EventKind::Click));
        surface.subscribe(Binding::new("imageUrl", EventKind::Submit));
        surface.subscribe(Binding::new("removeImageBtn", EventKind::Click));
        surface.subscribe(Binding::new("gallery", EventKind::Click));
        surface.subscribe(Binding::new("gallery", EventKind::LoadError));

        let mut controller = Self {
            gallery: Gallery::new(config),
            surface,
            notifier,
            url_input: String::new(),
            broken: BTreeSet::new(),
            entering: None,
        };
        controller.render();
        Ok(controller)
    }

    #[must_use]
    pub const fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Add the image at `url`.
    ///
    /// On success the URL input is cleared; on failure it keeps `url` so
    /// the user can correct it, and a notice explains why.
    ///
    /// # Errors
    ///
    /// The [`GalleryError`] that refused the image.
    pub fn add_image(&mut self, url: &str) -> Result<ImageId, GalleryError> {
        let result = self.gallery.add(url);
        match &result {
            Ok(id) => {
                self.url_input.clear();
                self.entering = Some(*id);
            }
            Err(err) => {
                url.clone_into(&mut self.url_input);
                self.report(err);
            }
        }
        self.render();
        result
    }

    /// Select the clicked image.
    ///
    /// # Errors
    ///
    /// [`GalleryError::UnknownImage`] for an id that is not displayed.
    pub fn select_image(&mut self, id: ImageId) -> Result<(), GalleryError> {
        self.gallery.select(id)?;
        self.render();
        Ok(())
    }

    /// Remove the selected image.
    ///
    /// # Errors
    ///
    /// [`GalleryError::NoSelection`] (also shown as a warning).
    pub fn remove_selected(&mut self) -> Result<GalleryItem, GalleryError> {
        match self.gallery.remove_selected() {
            Ok(item) => {
                self.broken.remove(&item.id);
                self.render();
                Ok(item)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Show the error placeholder for an image that failed to load.
    ///
    /// Only the presentation changes; the image stays in the gallery.
    ///
    /// # Errors
    ///
    /// [`GalleryError::UnknownImage`] for an id that is not displayed.
    pub fn image_load_failed(&mut self, id: ImageId) -> Result<(), GalleryError> {
        if self.gallery.get(id).is_none() {
            return Err(GalleryError::UnknownImage(id));
        }
        if self.broken.insert(id) {
            self.render();
        }
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> GalleryView {
        GalleryView {
            items: self
                .gallery
                .items()
                .iter()
                .map(|item| GalleryItemView {
                    id: item.id,
                    url: item.url.clone(),
                    selected: self.gallery.is_selected(item.id),
                    broken: self.broken.contains(&item.id),
                    entering: self.entering == Some(item.id),
                })
                .collect(),
            url_input: self.url_input.clone(),
            capacity: self.gallery.capacity(),
            has_selection: self.gallery.selected().is_some(),
        }
    }

    fn render(&mut self) {
        let view = self.view();
        self.surface.render(&view);
        self.entering = None;
    }

    fn report(&self, err: &GalleryError) {
        if let Some(notice) = err.notice() {
            self.notifier.notify(notice);
        }
    }
}
