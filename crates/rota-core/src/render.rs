use crate::assets::AssetCache;
use crate::color::text_color_for;
use crate::fit::{BlockKind, ContentLayout, TextStyle};
use crate::geometry::{Point, SliceGeometry, slice_width};
use crate::item::Item;
use crate::spin::screen_angle;
use palette::{Srgb, Srgba};
use std::iter::zip;

/// Drawing surface the wheel is painted onto. Angles are screen angles, y pointing down.
pub trait Painter {
    type Image;
    type Error;

    fn fill_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        color: Srgb<f64>,
    ) -> Result<(), Self::Error>;

    fn stroke_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Srgba<f64>)
    -> Result<(), Self::Error>;

    fn stroke_circle(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    fn fill_triangle(&mut self, points: [Point; 3], color: Srgba<f64>) -> Result<(), Self::Error>;

    /// Restricts painting to a sector until the matching [`Painter::pop_clip`].
    fn push_sector_clip(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
    ) -> Result<(), Self::Error>;

    fn pop_clip(&mut self) -> Result<(), Self::Error>;

    /// Draws upright text centered on `center`.
    fn draw_text(
        &mut self,
        text: &str,
        center: Point,
        font_size: f64,
        style: TextStyle,
        color: Srgb<f64>,
    ) -> Result<(), Self::Error>;

    /// Draws an upright square image centered on `center`.
    fn draw_image(&mut self, image: &Self::Image, center: Point, edge: f64)
    -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelTheme {
    pub hub: Srgba<f64>,
    pub rim: Srgba<f64>,
    pub pointer: Srgba<f64>,
    pub highlight: Srgba<f64>,
}

impl Default for WheelTheme {
    fn default() -> Self {
        Self {
            hub: Srgba::new(0.12, 0.12, 0.14, 1.0),
            rim: Srgba::new(0.9, 0.9, 0.92, 1.0),
            pointer: Srgba::new(0.92, 0.26, 0.21, 1.0),
            highlight: Srgba::new(1.0, 1.0, 1.0, 0.9),
        }
    }
}

pub const HUB_FRACTION: f64 = 0.12;
pub const RIM_WIDTH_FRACTION: f64 = 0.015;
const POINTER_DEPTH: f64 = 0.09;
const POINTER_HALF_WIDTH: f64 = 0.045;

/// Everything needed to paint one frame.
pub struct Scene<'a, T> {
    pub items: &'a [Item],
    pub layouts: &'a [Option<ContentLayout>],
    pub assets: &'a AssetCache<T>,
    pub center: Point,
    pub radius: f64,
    pub rotation: f64,
    pub pointer: f64,
    pub highlight: Option<usize>,
    pub theme: WheelTheme,
}

struct SliceRenderer<'a, T> {
    item: &'a Item,
    slice: SliceGeometry,
    layout: Option<&'a ContentLayout>,
    assets: &'a AssetCache<T>,
    center: Point,
    radius: f64,
    start: f64,
}

impl<'a, T> SliceRenderer<'a, T> {
    fn draw<P>(&self, painter: &mut P) -> Result<(), P::Error>
    where
        P: Painter<Image = T>,
    {
        let end = self.start + self.slice.width();
        painter.fill_sector(self.center, self.radius, self.start, end, self.item.accent())?;

        let Some(layout) = self.layout else {
            return Ok(());
        };
        painter.push_sector_clip(self.center, self.radius, self.start, end)?;
        let drawn = self.draw_content(painter, layout);
        // always unwind the clip, even if a block failed
        let popped = painter.pop_clip();
        drawn.and(popped)
    }

    fn draw_content<P>(&self, painter: &mut P, layout: &ContentLayout) -> Result<(), P::Error>
    where
        P: Painter<Image = T>,
    {
        let bisector = self.start + self.slice.width() / 2.0;
        let anchor = self.center.polar_offset(bisector, layout.anchor);
        let foreground = text_color_for(self.item.accent()).color();

        for block in &layout.blocks {
            let at = Point::new(anchor.x, anchor.y + block.offset_y);
            match block.kind {
                BlockKind::Image => {
                    // not loaded (or evicted) since layout: skip this frame
                    if let Some(img) = self.item.image_ref().and_then(|r| self.assets.get(r)) {
                        painter.draw_image(img, at, block.size)?;
                    }
                }
                BlockKind::Name => {
                    if let Some(name) = self.item.display_name() {
                        painter.draw_text(name, at, block.size, TextStyle::Title, foreground)?;
                    }
                }
                BlockKind::Subtitle => {
                    if let Some(sub) = self.item.subtitle_text() {
                        painter.draw_text(sub, at, block.size, TextStyle::Subtitle, foreground)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T> Scene<'_, T> {
    pub fn draw<P>(&self, painter: &mut P) -> Result<(), P::Error>
    where
        P: Painter<Image = T>,
    {
        let count = self.items.len();
        if count == 0 {
            painter.fill_circle(self.center, self.radius, self.theme.hub)?;
            return self.draw_frame(painter);
        }

        let no_layout = std::iter::repeat(None);
        let layouts = self.layouts.iter().map(Option::as_ref).chain(no_layout);
        for ((item, slice), layout) in zip(zip(self.items, SliceGeometry::all(count)), layouts) {
            SliceRenderer {
                item,
                slice,
                layout,
                assets: self.assets,
                center: self.center,
                radius: self.radius,
                start: screen_angle(slice.start_angle, self.pointer, self.rotation, count),
            }
            .draw(painter)?;
        }

        if let Some(idx) = self.highlight.filter(|&i| i < count) {
            let start = screen_angle(
                SliceGeometry::new(idx, count).start_angle,
                self.pointer,
                self.rotation,
                count,
            );
            painter.stroke_sector(
                self.center,
                self.radius,
                start,
                start + slice_width(count),
                self.radius * RIM_WIDTH_FRACTION * 1.5,
                self.theme.highlight,
            )?;
        }

        self.draw_frame(painter)
    }

    fn draw_frame<P>(&self, painter: &mut P) -> Result<(), P::Error>
    where
        P: Painter<Image = T>,
    {
        painter.stroke_circle(
            self.center,
            self.radius,
            self.radius * RIM_WIDTH_FRACTION,
            self.theme.rim,
        )?;
        painter.fill_circle(self.center, self.radius * HUB_FRACTION, self.theme.hub)?;
        self.draw_pointer(painter)
    }

    fn draw_pointer<P>(&self, painter: &mut P) -> Result<(), P::Error>
    where
        P: Painter<Image = T>,
    {
        let p = self.pointer;
        let tip = self.center.polar_offset(p, self.radius * (1.0 - POINTER_DEPTH));
        let base = self.center.polar_offset(p, self.radius * (1.0 + POINTER_DEPTH / 2.0));
        let half = self.radius * POINTER_HALF_WIDTH;
        let (px, py) = (-p.sin() * half, p.cos() * half);
        painter.fill_triangle(
            [
                tip,
                Point::new(base.x + px, base.y + py),
                Point::new(base.x - px, base.y - py),
            ],
            self.theme.pointer,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fit::tests::FixedAdvance;
    use crate::fit::{DisplayOptions, FitParams, layout_slices};
    use crate::geometry::normalize_angle;
    use crate::item::ImageRef;
    use crate::spin::Pointer;
    use std::f64::consts::TAU;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Sector {
            start: f64,
            end: f64,
            color: Srgb<f64>,
        },
        Highlight { start: f64 },
        Circle,
        Ring,
        Triangle { tip: Point },
        Clip { start: f64, end: f64 },
        Unclip,
        Text {
            text: String,
            at: Point,
            color: Srgb<f64>,
        },
        Image {
            id: u32,
            at: Point,
            edge: f64,
        },
    }

    #[derive(Default)]
    pub(crate) struct RecordingPainter {
        pub ops: Vec<Op>,
    }

    impl Painter for RecordingPainter {
        type Image = u32;
        type Error = std::convert::Infallible;

        fn fill_sector(
            &mut self,
            _: Point,
            _: f64,
            start: f64,
            end: f64,
            color: Srgb<f64>,
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::Sector { start, end, color });
            Ok(())
        }

        fn stroke_sector(
            &mut self,
            _: Point,
            _: f64,
            start: f64,
            _: f64,
            _: f64,
            _: Srgba<f64>,
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::Highlight { start });
            Ok(())
        }

        fn fill_circle(&mut self, _: Point, _: f64, _: Srgba<f64>) -> Result<(), Self::Error> {
            self.ops.push(Op::Circle);
            Ok(())
        }

        fn stroke_circle(
            &mut self,
            _: Point,
            _: f64,
            _: f64,
            _: Srgba<f64>,
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::Ring);
            Ok(())
        }

        fn fill_triangle(&mut self, points: [Point; 3], _: Srgba<f64>) -> Result<(), Self::Error> {
            self.ops.push(Op::Triangle { tip: points[0] });
            Ok(())
        }

        fn push_sector_clip(
            &mut self,
            _: Point,
            _: f64,
            start: f64,
            end: f64,
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::Clip { start, end });
            Ok(())
        }

        fn pop_clip(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Unclip);
            Ok(())
        }

        fn draw_text(
            &mut self,
            text: &str,
            at: Point,
            _: f64,
            _: TextStyle,
            color: Srgb<f64>,
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::Text {
                text: text.to_string(),
                at,
                color,
            });
            Ok(())
        }

        fn draw_image(&mut self, image: &u32, at: Point, edge: f64) -> Result<(), Self::Error> {
            self.ops.push(Op::Image {
                id: *image,
                at,
                edge,
            });
            Ok(())
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item::named("Celtic").with_color("#018749").with_subtitle("Glasgow"),
            Item::named("Rangers").with_color("#FFFFFF"),
            Item::named("Hearts").with_image("hearts.png"),
            Item::default().with_color("garbage"),
        ]
    }

    fn record(
        items: &[Item],
        assets: &AssetCache<u32>,
        rotation: f64,
        highlight: Option<usize>,
    ) -> Vec<Op> {
        let radius = 300.0;
        let layouts = layout_slices(
            items,
            radius,
            DisplayOptions::default(),
            |_| true,
            &FitParams::default(),
            &FixedAdvance(0.6),
        );
        let scene = Scene {
            items,
            layouts: &layouts,
            assets,
            center: Point::new(400.0, 400.0),
            radius,
            rotation,
            pointer: Pointer::Top.angle(),
            highlight,
            theme: WheelTheme::default(),
        };
        let mut painter = RecordingPainter::default();
        scene.draw(&mut painter).unwrap();
        painter.ops
    }

    #[test]
    fn test_sectors_cover_circle_with_accents() {
        let items = items();
        let ops = record(&items, &AssetCache::new(), 1.234, None);
        let sectors: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                Op::Sector { start, end, color } => Some((*start, *end, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(sectors.len(), 4);
        let total: f64 = sectors.iter().map(|(s, e, _)| e - s).sum();
        assert!((total - TAU).abs() < 1e-9);
        for pair in sectors.windows(2) {
            assert!((normalize_angle(pair[0].1) - pair[1].0).abs() < 1e-9);
        }
        assert_eq!(sectors[1].2, Srgb::new(1.0, 1.0, 1.0));
        assert_eq!(sectors[3].2, items[3].accent());
        assert_eq!(sectors[3].2, crate::color::DEFAULT_ACCENT.into_format());
    }

    #[test]
    fn test_content_is_clipped_to_its_sector() {
        let items = items();
        let ops = record(&items, &AssetCache::new(), 0.5, None);
        let mut clip: Option<(f64, f64)> = None;
        let mut texts = 0;
        for op in &ops {
            match op {
                Op::Clip { start, end } => {
                    assert!(clip.is_none(), "nested clip");
                    clip = Some((*start, *end));
                }
                Op::Unclip => {
                    assert!(clip.take().is_some());
                }
                Op::Text { at, .. } | Op::Image { at, .. } => {
                    let (start, end) = clip.expect("content painted outside a clip");
                    let angle = (at.y - 400.0).atan2(at.x - 400.0);
                    let mid = (start + end) / 2.0;
                    // stack is centered on the bisector; offsets stay well inside the slice
                    let off = crate::geometry::signed_delta(mid, angle).abs();
                    assert!(off < (end - start) / 2.0, "{off}");
                    texts += 1;
                }
                _ => {}
            }
        }
        assert!(clip.is_none());
        assert_eq!(texts, 4);
    }

    #[test]
    fn test_text_contrast_follows_accent() {
        let items = items();
        let ops = record(&items, &AssetCache::new(), 0.0, None);
        let color_of = |name: &str| {
            ops.iter()
                .find_map(|op| match op {
                    Op::Text { text, color, .. } if text == name => Some(*color),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(color_of("Rangers"), crate::color::Foreground::Dark.color());
        assert_eq!(color_of("Hearts"), crate::color::Foreground::Light.color());
    }

    #[test]
    fn test_image_drawn_only_once_loaded() {
        let items = items();
        let mut assets = AssetCache::new();
        let hearts = ImageRef::new("hearts.png");
        assets.request(&hearts);

        let pending = record(&items, &assets, 0.0, None);
        assert!(!pending.iter().any(|op| matches!(op, Op::Image { .. })));

        assets.complete(hearts, Ok(42));
        let loaded = record(&items, &assets, 0.0, None);
        let image = loaded.iter().find_map(|op| match op {
            Op::Image { id, edge, .. } => Some((*id, *edge)),
            _ => None,
        });
        let (id, edge) = image.unwrap();
        assert_eq!(id, 42);
        assert!(edge > 0.0);
    }

    #[test]
    fn test_first_slice_centered_under_pointer_at_rest() {
        let items = items();
        let ops = record(&items, &AssetCache::new(), 0.0, Some(0));
        let Some(Op::Text { at, .. }) = ops.iter().find(|op| matches!(op, Op::Text { .. })) else {
            panic!("no text");
        };
        // name of slice 0 sits straight above the center
        assert!((at.x - 400.0).abs() < 1e-9);
        assert!(at.y < 400.0);

        let tip = ops.iter().find_map(|op| match op {
            Op::Triangle { tip } => Some(*tip),
            _ => None,
        });
        let tip = tip.unwrap();
        assert!((tip.x - 400.0).abs() < 1e-9 && tip.y < 400.0 - 200.0);
        assert!(ops.iter().any(|op| matches!(op, Op::Highlight { .. })));
    }

    #[test]
    fn test_empty_scene_draws_frame_only() {
        let ops = record(&[], &AssetCache::new(), 0.0, Some(3));
        assert!(!ops.iter().any(|op| matches!(op, Op::Sector { .. } | Op::Highlight { .. })));
        assert!(ops.iter().any(|op| matches!(op, Op::Triangle { .. })));
    }
}
