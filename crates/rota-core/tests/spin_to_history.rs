use palette::{Srgb, Srgba};
use rota_core::assets::AssetCache;
use rota_core::fit::{DisplayOptions, TextMeasurer, TextStyle};
use rota_core::geometry::{Point, SliceGeometry, normalize_angle, signed_delta};
use rota_core::history::{History, HistoryEntry, MemoryStore};
use rota_core::item::Item;
use rota_core::render::{Painter, WheelTheme};
use rota_core::spin::{SpinConfig, SpinError, screen_angle};
use rota_core::{GroupFilter, Wheel, WheelEvent};
use std::convert::Infallible;

struct Monospace;

impl TextMeasurer for Monospace {
    fn text_width(&self, text: &str, font_size: f64, _: TextStyle) -> f64 {
        text.chars().count() as f64 * font_size * 0.6
    }
}

/// Remembers the sector the highlight outline was drawn around.
#[derive(Default)]
struct HighlightRecorder {
    highlighted: Option<(f64, f64)>,
}

impl Painter for HighlightRecorder {
    type Image = ();
    type Error = Infallible;

    fn fill_sector(
        &mut self,
        _: Point,
        _: f64,
        _: f64,
        _: f64,
        _: Srgb<f64>,
    ) -> Result<(), Infallible> {
        Ok(())
    }

    fn stroke_sector(
        &mut self,
        _: Point,
        _: f64,
        start: f64,
        end: f64,
        _: f64,
        _: Srgba<f64>,
    ) -> Result<(), Infallible> {
        self.highlighted = Some((start, end));
        Ok(())
    }

    fn fill_circle(&mut self, _: Point, _: f64, _: Srgba<f64>) -> Result<(), Infallible> {
        Ok(())
    }

    fn stroke_circle(
        &mut self,
        _: Point,
        _: f64,
        _: f64,
        _: Srgba<f64>,
    ) -> Result<(), Infallible> {
        Ok(())
    }

    fn fill_triangle(&mut self, _: [Point; 3], _: Srgba<f64>) -> Result<(), Infallible> {
        Ok(())
    }

    fn push_sector_clip(&mut self, _: Point, _: f64, _: f64, _: f64) -> Result<(), Infallible> {
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn draw_text(
        &mut self,
        _: &str,
        _: Point,
        _: f64,
        _: TextStyle,
        _: Srgb<f64>,
    ) -> Result<(), Infallible> {
        Ok(())
    }

    fn draw_image(&mut self, _: &(), _: Point, _: f64) -> Result<(), Infallible> {
        Ok(())
    }
}

fn league() -> Vec<Item> {
    vec![
        Item::named("Celtic").with_subtitle("Glasgow").with_group("scotland"),
        Item::named("Rangers").with_subtitle("Glasgow").with_group("scotland"),
        Item::named("Benfica").with_subtitle("Lisbon").with_group("portugal"),
        Item::named("Porto").with_group("portugal"),
        Item::named("Braga").with_group("Portugal"),
        Item::named("Free agent"),
    ]
}

fn spin_to_rest(wheel: &mut Wheel) -> (usize, Item) {
    wheel.request_spin().unwrap();
    let mut now = 1_000.0;
    let mut frames = 0;
    loop {
        match wheel.advance(now) {
            Some(WheelEvent::Frame { .. }) => frames += 1,
            Some(WheelEvent::Settled { index, item }) => {
                assert!(frames > 0);
                return (index, item);
            }
            None => panic!("wheel went idle before settling"),
        }
        now += 1000.0 / 60.0;
    }
}

#[test]
fn test_filtered_spins_are_recorded() {
    let filter = GroupFilter::new(["PORTUGAL"]);
    let active = filter.active_items(&league());
    assert_eq!(active.len(), 3);

    let spin = SpinConfig {
        duration_ms: 1200,
        seed: Some(2024),
        ..SpinConfig::default()
    };
    let mut wheel = Wheel::new(active.clone(), DisplayOptions::default(), spin);
    let mut history = History::load(MemoryStore::default(), 4);
    let assets: AssetCache<()> = AssetCache::new();
    wheel.refresh_layout(240.0, &assets, &Monospace);

    for _ in 0..6 {
        let (index, item) = spin_to_rest(&mut wheel);
        assert_eq!(item, active[index]);
        history.record(item).unwrap();

        // The winning slice's bisector sits exactly under the pointer.
        let count = wheel.items().len();
        let slice = SliceGeometry::new(index, count);
        let pointer = wheel.pointer_angle();
        let bisector = screen_angle(slice.bisector(), pointer, wheel.rotation(), count);
        assert!(signed_delta(bisector, pointer).abs() < 1e-9);

        let mut recorder = HighlightRecorder::default();
        let scene = wheel.scene(&assets, Point::new(250.0, 250.0), 240.0, WheelTheme::default());
        scene.draw(&mut recorder).unwrap();
        let (start, end) = recorder.highlighted.unwrap();
        let mid = normalize_angle((start + end) / 2.0);
        assert!(signed_delta(mid, pointer).abs() < 1e-9);
    }

    assert_eq!(history.len(), 4);
    let orders: Vec<_> = history.entries().map(|e| e.order).collect();
    assert_eq!(orders, vec![5, 4, 3, 2]);
    let in_portugal = |e: &HistoryEntry| {
        e.item
            .group
            .as_ref()
            .is_some_and(|g| g.eq_ignore_ascii_case("portugal"))
    };
    assert!(history.entries().all(in_portugal));
}

#[test]
fn test_same_seed_same_outcomes() {
    let run = || {
        let spin = SpinConfig {
            duration_ms: 300,
            seed: Some(77),
            ..SpinConfig::default()
        };
        let mut wheel = Wheel::new(league(), DisplayOptions::default(), spin);
        (0..5).map(|_| spin_to_rest(&mut wheel).0).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_unknown_filter_leaves_wheel_empty() {
    let active = GroupFilter::new(["iceland"]).active_items(&league());
    let mut wheel = Wheel::new(active, DisplayOptions::default(), SpinConfig::default());
    assert_eq!(wheel.request_spin(), Err(SpinError::EmptyWheel));
    assert_eq!(wheel.advance(0.0), None);
}
