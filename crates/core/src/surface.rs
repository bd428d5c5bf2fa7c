//! Rendering surface abstraction.
//!
//! A widget never touches a document directly. It is mounted onto a
//! [`Surface`] that can tell whether an element exists, wire an event on an
//! element back to the widget, and display the widget's current view
//! model. The storefront implements this over HTMX fragments; tests use
//! [`MemorySurface`].

use std::collections::BTreeSet;

use thiserror::Error;

/// Kind of user event a widget listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Click,
    Input,
    Blur,
    Submit,
    LoadError,
}

/// An event subscription: "call me when `event` fires on `element`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding {
    pub element: &'static str,
    pub event: EventKind,
}

impl Binding {
    #[must_use]
    pub const fn new(element: &'static str, event: EventKind) -> Self {
        Self { element, event }
    }
}

/// A widget could not be mounted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("required element #{element} is missing from the {widget} surface")]
    MissingElement {
        widget: &'static str,
        element: &'static str,
    },
}

/// Where a widget renders and receives events.
pub trait Surface<V> {
    /// Whether the element with this id exists on the surface.
    fn contains(&self, element: &str) -> bool;

    /// Route `binding.event` on `binding.element` to the widget.
    fn subscribe(&mut self, binding: Binding);

    /// Replace the displayed state with `view`.
    fn render(&mut self, view: &V);
}

/// Check that every required element is present.
///
/// # Errors
///
/// Returns [`MountError::MissingElement`] naming the first absent element.
pub fn require_elements<V, S: Surface<V> + ?Sized>(
    surface: &S,
    widget: &'static str,
    elements: &[&'static str],
) -> Result<(), MountError> {
    match elements.iter().find(|element| !surface.contains(element)) {
        Some(&element) => Err(MountError::MissingElement { widget, element }),
        None => Ok(()),
    }
}

/// In-memory surface that records subscriptions and keeps every rendered
/// view.
#[derive(Debug, Clone)]
pub struct MemorySurface<V> {
    elements: BTreeSet<String>,
    bindings: BTreeSet<Binding>,
    renders: Vec<V>,
}

impl<V> MemorySurface<V> {
    /// Surface holding exactly the given element ids.
    #[must_use]
    pub fn with_elements<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            bindings: BTreeSet::new(),
            renders: Vec::new(),
        }
    }

    /// Remove an element, e.g. to simulate a page without it.
    #[must_use]
    pub fn without(mut self, element: &str) -> Self {
        self.elements.remove(element);
        self
    }

    #[must_use]
    pub fn is_subscribed(&self, element: &str, event: EventKind) -> bool {
        self.bindings
            .iter()
            .any(|binding| binding.element == element && binding.event == event)
    }

    #[must_use]
    pub const fn bindings(&self) -> &BTreeSet<Binding> {
        &self.bindings
    }

    /// The most recently rendered view.
    #[must_use]
    pub fn last(&self) -> Option<&V> {
        self.renders.last()
    }

    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders.len()
    }
}

impl<V: Clone> Surface<V> for MemorySurface<V> {
    fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    fn subscribe(&mut self, binding: Binding) {
        self.bindings.insert(binding);
    }

    fn render(&mut self, view: &V) {
        self.renders.push(view.clone());
    }
}
