use super::{CANVAS_MARGIN, HISTORY_LINES};
use crate::config::Config;
use gdk_pixbuf::Pixbuf;
use rota_core::assets::AssetCache;
use rota_core::history::{History, KeyValueStore};
use rota_core::item::ImageRef;
use rota_core::spin::SpinError;
use rota_core::{Item, Wheel, WheelEvent};

/// Everything the draw function and the tick callback share with the component.
pub struct WheelState<I = Pixbuf> {
    pub wheel: Wheel,
    pub assets: AssetCache<I>,
    pub history: History<Box<dyn KeyValueStore>>,
    /// Radius committed after the last settled resize. Zero until the first one.
    pub radius: f64,
}

impl<I> WheelState<I> {
    pub fn new(config: &Config, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            wheel: Wheel::new(config.active_items(), config.display, config.spin.clone()),
            assets: AssetCache::new(),
            history: History::load(store, config.history.capacity),
            radius: 0.0,
        }
    }

    /// Applies a reloaded config. Callers hold reloads back while a spin is running.
    pub fn apply_config(&mut self, config: &Config) {
        self.wheel.set_display(config.display);
        self.wheel.set_spin_config(config.spin.clone());
        self.wheel.set_items(config.active_items());
    }

    pub fn commit_size(&mut self, width: f64, height: f64) {
        self.radius = radius_for(width, height);
    }

    /// Image references not requested yet, now marked pending.
    pub fn request_images(&mut self) -> Vec<ImageRef> {
        self.assets.request_all(self.wheel.image_refs())
    }

    pub fn spin(&mut self) -> Result<(), SpinError> {
        self.wheel.request_spin()
    }

    pub fn advance(&mut self, now_ms: f64) -> Option<WheelEvent> {
        self.wheel.advance(now_ms)
    }

    pub fn record(&mut self, item: Item) {
        if let Err(e) = self.history.record(item) {
            log::error!("Failed to persist history: {}", e);
        }
    }

    pub fn clear_history(&mut self) {
        match self.history.clear() {
            Ok(()) => log::info!("History cleared"),
            Err(e) => log::error!("Failed to clear history: {}", e),
        }
    }

    pub fn history_text(&self) -> String {
        if self.history.is_empty() {
            return "No spins yet".to_string();
        }
        self.history
            .entries()
            .take(HISTORY_LINES)
            .map(|e| format!("#{:<4} {}", e.order + 1, e.item.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn radius_for(width: f64, height: f64) -> f64 {
    (width.min(height) / 2.0 * CANVAS_MARGIN).max(0.0)
}
