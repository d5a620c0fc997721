use crate::assets::AssetCache;
use crate::fit::{ContentLayout, DisplayOptions, FitParams, TextMeasurer, layout_slices};
use crate::geometry::Point;
use crate::item::{ImageRef, Item};
use crate::render::{Scene, WheelTheme};
use crate::spin::{SpinConfig, SpinError, SpinResolver, Tick};
use rand::Rng;
use rand_pcg::Pcg64;

#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    Frame { angle: f64 },
    /// Fired exactly once per completed spin.
    Settled { index: usize, item: Item },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutKey {
    radius: f64,
    items_version: u64,
    assets_version: u64,
    display: DisplayOptions,
}

/// Owns the active item list, the cached slice layouts and the spin state machine.
pub struct Wheel<R = Pcg64> {
    items: Vec<Item>,
    items_version: u64,
    deferred_items: Option<Vec<Item>>,
    display: DisplayOptions,
    fit: FitParams,
    resolver: SpinResolver<R>,
    layout: Option<(LayoutKey, Vec<Option<ContentLayout>>)>,
    highlight: Option<usize>,
}

impl Wheel<Pcg64> {
    pub fn new(items: Vec<Item>, display: DisplayOptions, spin: SpinConfig) -> Self {
        Self::with_resolver(items, display, SpinResolver::new(spin))
    }
}

impl<R: Rng> Wheel<R> {
    pub fn with_resolver(
        items: Vec<Item>,
        display: DisplayOptions,
        resolver: SpinResolver<R>,
    ) -> Self {
        warn_malformed_accents(&items);
        Self {
            items,
            items_version: 0,
            deferred_items: None,
            display,
            fit: FitParams::default(),
            resolver,
            layout: None,
            highlight: None,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn rotation(&self) -> f64 {
        self.resolver.angle()
    }

    pub fn pointer_angle(&self) -> f64 {
        self.resolver.pointer_angle()
    }

    pub fn is_spinning(&self) -> bool {
        self.resolver.is_spinning()
    }

    /// Slice that won the last spin, until the next one starts or the list changes.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn image_refs(&self) -> impl Iterator<Item = &ImageRef> {
        self.items.iter().filter_map(Item::image_ref)
    }

    /// Replaces the active list. While spinning the new list is held back until the spin settles,
    /// so the outcome is always read from the list the spin started with. Returns whether the list
    /// was applied immediately.
    pub fn set_items(&mut self, items: Vec<Item>) -> bool {
        if self.resolver.is_spinning() {
            log::debug!("Deferring item update until the spin settles");
            self.deferred_items = Some(items);
            return false;
        }
        self.apply_items(items);
        true
    }

    fn apply_items(&mut self, items: Vec<Item>) {
        warn_malformed_accents(&items);
        self.items = items;
        self.items_version += 1;
        self.highlight = None;
    }

    pub fn set_display(&mut self, display: DisplayOptions) {
        self.display = display;
    }

    pub fn set_fit_params(&mut self, fit: FitParams) {
        self.fit = fit;
        self.layout = None;
    }

    pub fn set_spin_config(&mut self, config: SpinConfig) {
        self.resolver.set_config(config);
    }

    pub fn request_spin(&mut self) -> Result<(), SpinError> {
        self.resolver.request_spin(self.items.len()).inspect_err(|e| {
            log::debug!("Spin rejected: {}", e);
        })?;
        self.highlight = None;
        log::info!("Spinning {} items", self.items.len());
        Ok(())
    }

    /// Advances the spin to `now_ms`. Returns nothing while idle.
    pub fn advance(&mut self, now_ms: f64) -> Option<WheelEvent> {
        match self.resolver.tick(now_ms) {
            Tick::Idle => None,
            Tick::Frame { angle } => Some(WheelEvent::Frame { angle }),
            Tick::Settled(settlement) => {
                let item = self.items.get(settlement.index).cloned().unwrap_or_default();
                log::info!("Settled on #{} '{}'", settlement.index, item.label());
                self.highlight = Some(settlement.index);
                if let Some(items) = self.deferred_items.take() {
                    self.apply_items(items);
                }
                Some(WheelEvent::Settled {
                    index: settlement.index,
                    item,
                })
            }
        }
    }

    /// Recomputes slice layouts if the radius, items, display toggles or loaded assets changed.
    /// Returns whether a relayout happened.
    pub fn refresh_layout<T>(
        &mut self,
        radius: f64,
        assets: &AssetCache<T>,
        measurer: &dyn TextMeasurer,
    ) -> bool {
        let key = LayoutKey {
            radius,
            items_version: self.items_version,
            assets_version: assets.version(),
            display: self.display,
        };
        if self.layout.as_ref().is_some_and(|(k, _)| *k == key) {
            return false;
        }
        log::debug!("Relayout: {} slices at radius {:.1}", self.items.len(), radius);
        let layouts = layout_slices(
            &self.items,
            radius,
            self.display,
            |r| assets.is_loaded(r),
            &self.fit,
            measurer,
        );
        self.layout = Some((key, layouts));
        true
    }

    pub fn layouts(&self) -> &[Option<ContentLayout>] {
        self.layout.as_ref().map_or(&[], |(_, l)| l.as_slice())
    }

    pub fn scene<'a, T>(
        &'a self,
        assets: &'a AssetCache<T>,
        center: Point,
        radius: f64,
        theme: WheelTheme,
    ) -> Scene<'a, T> {
        Scene {
            items: &self.items,
            layouts: self.layouts(),
            assets,
            center,
            radius,
            rotation: self.rotation(),
            pointer: self.pointer_angle(),
            highlight: self.highlight,
            theme,
        }
    }
}

/// Reports bad accents once per applied list; drawing falls back silently.
fn warn_malformed_accents(items: &[Item]) {
    for item in items {
        if let Some(raw) = item.malformed_accent() {
            log::warn!("Ignoring malformed accent color '{}' on '{}'", raw, item.label());
        }
    }
}
