//! Caprichos Core - Storefront widget state and shared types.
//!
//! This crate holds the three storefront widgets and everything they share:
//! - [`gallery`] - Image gallery with single selection and a size cap
//! - [`form`] - Registration form with per-field rules and a submit gate
//! - [`catalog`] - Append-only product list with a random generator
//!
//! # Architecture
//!
//! The core crate contains no I/O and no logging. Widgets render into a
//! [`surface::Surface`] and report to a [`notice::Notifier`], both injected
//! at construction, so the storefront binds them to HTMX while tests use
//! in-memory doubles.
//!
//! # Modules
//!
//! - [`config`] - Profiles and per-widget limits
//! - [`notice`] - Transient banners and the notifier seam
//! - [`surface`] - Element presence, event bindings and rendering
//! - [`types`] - Newtype wrappers for ids, prices, sizes and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod form;
pub mod gallery;
pub mod notice;
pub mod surface;
pub mod types;

pub use catalog::{Catalog, CatalogController, CatalogView, ProductGenerator, ProductRecord};
pub use config::{GalleryConfig, NoticeConfig, PasswordPolicy, Profile, StoreConfig, ValidationConfig};
pub use form::{Field, FieldError, FormValidator, FormView, RuleSet, SubmitError, ValidationState};
pub use gallery::{Gallery, GalleryController, GalleryError, GalleryView};
pub use notice::{Notice, NoticeQueue, Notifier, Severity};
pub use surface::{Binding, EventKind, MemorySurface, MountError, Surface};
pub use types::*;
