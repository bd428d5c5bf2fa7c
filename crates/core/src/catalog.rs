//! Product catalog widget.
//!
//! An append-only list of garments seeded with three fixed products. New
//! products come from [`ProductGenerator`], which takes the RNG as an
//! argument so tests can seed it.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use crate::notice::Notifier;
use crate::surface::{Binding, EventKind, MountError, Surface, require_elements};
use crate::types::{CurrencyCode, Price, ProductId, Size};

/// Element ids the catalog needs on its surface.
pub const CATALOG_ELEMENTS: [&str; 2] = ["product-list", "add-product"];

/// Entrance delay added per list position.
pub const ENTRANCE_STEP_MS: u64 = 100;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub size: Size,
    pub price: Price,
}

/// Append-only product list.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    next_id: ProductId,
}

impl Catalog {
    /// An empty catalog.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            next_id: ProductId::new(1),
        }
    }

    /// The catalog every page starts with.
    #[must_use]
    pub fn seeded() -> Self {
        let mut catalog = Self::empty();
        catalog.push("Elegant Dress", Size::M, 3999);
        catalog.push("Casual Blouse", Size::S, 1999);
        catalog.push("Classic Jeans", Size::L, 4999);
        catalog
    }

    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a product priced in US cents and return its id.
    pub fn push(&mut self, name: impl Into<String>, size: Size, cents: i64) -> ProductId {
        let id = self.next_id;
        self.next_id = id.next();
        self.records.push(ProductRecord {
            id,
            name: name.into(),
            size,
            price: Price::from_cents(cents, CurrencyCode::USD),
        });
        id
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Garment kinds the generator picks from.
pub const GARMENT_TYPES: [&str; 5] = ["Dress", "Blouse", "Jeans", "Skirt", "Top"];

/// Colors the generator picks from.
pub const COLORS: [&str; 5] = ["Black", "White", "Blue", "Pink", "Green"];

/// A freshly sampled product, not yet in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProduct {
    pub name: String,
    pub size: Size,
    pub cents: i64,
}

/// Samples random garments.
///
/// Type, color and size are picked independently and uniformly. The price
/// is a uniform whole number of cents in `min_cents..=max_cents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductGenerator {
    pub min_cents: i64,
    pub max_cents: i64,
}

impl ProductGenerator {
    /// $20.00 to $70.00.
    pub const DEFAULT: Self = Self {
        min_cents: 2000,
        max_cents: 7000,
    };

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedProduct {
        let garment = GARMENT_TYPES.choose(rng).copied().unwrap_or("Dress");
        let color = COLORS.choose(rng).copied().unwrap_or("Black");
        let size = Size::ALL.choose(rng).copied().unwrap_or_default();
        GeneratedProduct {
            name: format!("{color} {garment}"),
            size,
            cents: rng.random_range(self.min_cents..=self.max_cents),
        }
    }
}

impl Default for ProductGenerator {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One rendered catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntryView {
    pub id: ProductId,
    pub name: String,
    pub size: Size,
    /// Currency-formatted, e.g. `$39.99`.
    pub price: String,
    /// Entrance animation delay.
    pub delay_ms: u64,
}

/// Everything the catalog region displays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CatalogView {
    pub entries: Vec<CatalogEntryView>,
}

impl CatalogView {
    /// View of `records`, in order.
    #[must_use]
    pub fn of(records: &[ProductRecord]) -> Self {
        Self {
            entries: records
                .iter()
                .zip(0u64..)
                .map(|(record, index)| CatalogEntryView {
                    id: record.id,
                    name: record.name.clone(),
                    size: record.size,
                    price: record.price.to_string(),
                    delay_ms: index.saturating_mul(ENTRANCE_STEP_MS),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog widget bound to a surface.
///
/// Nothing in the catalog fails once it is mounted; the notifier is the
/// page's shared channel, exposed for hosts that announce additions.
pub struct CatalogController<S, N> {
    catalog: Catalog,
    generator: ProductGenerator,
    surface: S,
    notifier: N,
}

impl<S, N> CatalogController<S, N>
where
    S: Surface<CatalogView>,
    N: Notifier,
{
    /// Mount `catalog` onto `surface` and render it.
    ///
    /// # Errors
    ///
    /// [`MountError`] if any of [`CATALOG_ELEMENTS`] is missing.
    pub fn mount(mut surface: S, notifier: N, catalog: Catalog) -> Result<Self, MountError> {
        require_elements::<CatalogView, _>(&surface, "catalog", &CATALOG_ELEMENTS)?;
        surface.subscribe(Binding::new("add-product", EventKind::Click));

        let mut controller = Self {
            catalog,
            generator: ProductGenerator::DEFAULT,
            surface,
            notifier,
        };
        controller.refresh();
        Ok(controller)
    }

    /// Use a different generator for [`Self::add_random_product`].
    #[must_use]
    pub fn with_generator(mut self, generator: ProductGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Replace the displayed list with `records`, in order.
    pub fn render(&mut self, records: &[ProductRecord]) {
        self.surface.render(&CatalogView::of(records));
    }

    /// Append a random product and re-render the whole list.
    pub fn add_random_product<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ProductId {
        let product = self.generator.generate(rng);
        let id = self.catalog.push(product.name, product.size, product.cents);
        self.refresh();
        id
    }

    #[must_use]
    pub fn view(&self) -> CatalogView {
        CatalogView::of(self.catalog.records())
    }

    fn refresh(&mut self) {
        let view = self.view();
        self.surface.render(&view);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;

    use super::*;
    use crate::notice::NoticeQueue;
    use crate::surface::MemorySurface;

    type TestController = CatalogController<MemorySurface<CatalogView>, Arc<NoticeQueue>>;

    fn mount(catalog: Catalog) -> TestController {
        let surface = MemorySurface::with_elements(CATALOG_ELEMENTS);
        CatalogController::mount(surface, Arc::new(NoticeQueue::new()), catalog).unwrap()
    }

    #[test]
    fn test_seeded_catalog() {
        let controller = mount(Catalog::seeded());
        let view = controller.surface().last().unwrap();

        let rows: Vec<_> = view
            .entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.size, entry.price.as_str(), entry.delay_ms))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Elegant Dress", Size::M, "$39.99", 0),
                ("Casual Blouse", Size::S, "$19.99", 100),
                ("Classic Jeans", Size::L, "$49.99", 200),
            ]
        );
    }

    #[test]
    fn test_mount_requires_elements() {
        let surface = MemorySurface::with_elements(CATALOG_ELEMENTS).without("product-list");
        let result = CatalogController::mount(surface, NoticeQueue::new(), Catalog::seeded());
        assert!(matches!(
            result,
            Err(MountError::MissingElement {
                element: "product-list",
                ..
            })
        ));
    }

    #[test]
    fn test_render_empty_sequence() {
        let mut controller = mount(Catalog::seeded());
        controller.render(&[]);
        assert!(controller.surface().last().unwrap().is_empty());
    }

    #[test]
    fn test_render_replaces_list() {
        let mut controller = mount(Catalog::seeded());
        let first = controller.catalog().records()[..1].to_vec();
        controller.render(&first);
        assert_eq!(controller.surface().last().unwrap().len(), 1);
    }

    #[test]
    fn test_add_random_product_appends_one() {
        let mut controller = mount(Catalog::seeded());
        let mut rng = StdRng::seed_from_u64(7);

        let before = controller.surface().last().unwrap().len();
        let id = controller.add_random_product(&mut rng);
        let record = controller.catalog().records().last().unwrap();
        let view = controller.surface().last().unwrap();

        assert_eq!(view.len(), before + 1);
        let entry = view.entries.last().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(entry.id, id);
        assert_eq!(entry.delay_ms, 300);
        assert!(Size::ALL.contains(&record.size));
        assert!(record.price.amount >= Decimal::new(2000, 2));
        assert!(record.price.amount <= Decimal::new(7000, 2));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut controller = mount(Catalog::seeded());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..5 {
            controller.add_random_product(&mut rng);
        }
        let mut ids: Vec<_> = controller.catalog().records().iter().map(|r| r.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_generator_is_deterministic_with_seed() {
        let generator = ProductGenerator::default();
        let a = generator.generate(&mut StdRng::seed_from_u64(42));
        let b = generator.generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_generated_product_in_bounds(seed in any::<u64>()) {
            let product = ProductGenerator::default().generate(&mut StdRng::seed_from_u64(seed));

            prop_assert!((2000..=7000).contains(&product.cents));
            prop_assert!(Size::ALL.contains(&product.size));

            let (color, garment) = product.name.split_once(' ').unwrap();
            prop_assert!(COLORS.contains(&color));
            prop_assert!(GARMENT_TYPES.contains(&garment));
        }
    }
}
