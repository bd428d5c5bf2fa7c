//! Server-side surface for HTMX pages.
//!
//! Each widget on a page gets an [`HtmxSurface`] listing the element ids the
//! page template renders. Rendering just keeps the latest view model; route
//! handlers turn it into an HTML fragment when the render count moved during
//! the request.

use std::collections::BTreeSet;

use caprichos_core::{Binding, EventKind, Surface};

/// Surface backed by the element ids of a server-rendered page.
#[derive(Debug, Clone)]
pub struct HtmxSurface<V> {
    elements: BTreeSet<&'static str>,
    bindings: BTreeSet<Binding>,
    current: Option<V>,
    renders: u64,
}

impl<V> HtmxSurface<V> {
    #[must_use]
    pub fn new(elements: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
            bindings: BTreeSet::new(),
            current: None,
            renders: 0,
        }
    }

    /// Whether the widget asked for `event` on `element`.
    ///
    /// Routes for events nobody subscribed to answer 404.
    #[must_use]
    pub fn is_subscribed(&self, element: &str, event: EventKind) -> bool {
        self.bindings
            .iter()
            .any(|binding| binding.element == element && binding.event == event)
    }

    /// The most recently rendered view.
    #[must_use]
    pub const fn current(&self) -> Option<&V> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn render_count(&self) -> u64 {
        self.renders
    }

    /// The current view if anything rendered after `mark` was taken.
    #[must_use]
    pub fn rendered_since(&self, mark: u64) -> Option<&V> {
        if self.renders > mark {
            self.current.as_ref()
        } else {
            None
        }
    }
}

impl<V: Clone> Surface<V> for HtmxSurface<V> {
    fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    fn subscribe(&mut self, binding: Binding) {
        self.bindings.insert(binding);
    }

    fn render(&mut self, view: &V) {
        self.current = Some(view.clone());
        self.renders += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_since_tracks_new_renders() {
        let mut surface: HtmxSurface<u8> = HtmxSurface::new(["a"]);
        assert!(surface.current().is_none());

        surface.render(&1);
        let mark = surface.render_count();
        assert!(surface.rendered_since(mark).is_none());

        surface.render(&2);
        assert_eq!(surface.rendered_since(mark), Some(&2));
        assert_eq!(surface.current(), Some(&2));
    }

    #[test]
    fn test_subscriptions() {
        let mut surface: HtmxSurface<()> = HtmxSurface::new(["resetButton"]);
        assert!(surface.contains("resetButton"));
        assert!(!surface.contains("submitButton"));

        surface.subscribe(Binding::new("resetButton", EventKind::Click));
        assert!(surface.is_subscribed("resetButton", EventKind::Click));
        assert!(!surface.is_subscribed("resetButton", EventKind::Submit));
    }
}
