use super::wheel::IMAGE_LOAD_EDGE;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::{Srgb, Srgba};
use rota_core::assets::{AssetError, AssetLoader};
use rota_core::fit::{TextMeasurer, TextStyle};
use rota_core::geometry::Point;
use rota_core::item::ImageRef;
use rota_core::render::Painter;
use std::path::{Path, PathBuf};

const FONT_FAMILY: &str = "Sans";

fn select_font(cr: &Context, font_size: f64, style: TextStyle) {
    let weight = match style {
        TextStyle::Title => cairo::FontWeight::Bold,
        TextStyle::Subtitle => cairo::FontWeight::Normal,
    };
    cr.select_font_face(FONT_FAMILY, cairo::FontSlant::Normal, weight);
    cr.set_font_size(font_size);
}

/// Paints wheel scenes onto a cairo context.
pub struct CairoPainter<'a> {
    cr: &'a Context,
}

impl<'a> CairoPainter<'a> {
    pub fn new(cr: &'a Context) -> Self {
        Self { cr }
    }

    fn sector_path(&self, center: Point, radius: f64, start: f64, end: f64) {
        self.cr.new_path();
        self.cr.move_to(center.x, center.y);
        self.cr.arc(center.x, center.y, radius, start, end);
        self.cr.close_path();
    }

    fn set_rgba(&self, color: Srgba<f64>) {
        let (r, g, b, a) = color.into_components();
        self.cr.set_source_rgba(r, g, b, a);
    }
}

impl Painter for CairoPainter<'_> {
    type Image = Pixbuf;
    type Error = cairo::Error;

    fn fill_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        color: Srgb<f64>,
    ) -> Result<(), cairo::Error> {
        let (r, g, b) = color.into_components();
        self.cr.set_source_rgb(r, g, b);
        self.sector_path(center, radius, start, end);
        self.cr.fill()
    }

    fn stroke_sector(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        self.set_rgba(color);
        self.cr.set_line_width(width);
        self.cr.set_line_join(cairo::LineJoin::Round);
        self.sector_path(center, radius, start, end);
        self.cr.stroke()
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        self.set_rgba(color);
        self.cr.new_path();
        self.cr.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
        self.cr.fill()
    }

    fn stroke_circle(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        self.set_rgba(color);
        self.cr.set_line_width(width);
        self.cr.new_path();
        self.cr.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
        self.cr.stroke()
    }

    fn fill_triangle(&mut self, points: [Point; 3], color: Srgba<f64>) -> Result<(), cairo::Error> {
        self.set_rgba(color);
        self.cr.new_path();
        self.cr.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            self.cr.line_to(p.x, p.y);
        }
        self.cr.close_path();
        self.cr.fill()
    }

    fn push_sector_clip(
        &mut self,
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
    ) -> Result<(), cairo::Error> {
        self.cr.save()?;
        self.sector_path(center, radius, start, end);
        self.cr.clip();
        Ok(())
    }

    fn pop_clip(&mut self) -> Result<(), cairo::Error> {
        self.cr.restore()
    }

    fn draw_text(
        &mut self,
        text: &str,
        center: Point,
        font_size: f64,
        style: TextStyle,
        color: Srgb<f64>,
    ) -> Result<(), cairo::Error> {
        let (r, g, b) = color.into_components();
        self.cr.set_source_rgb(r, g, b);
        select_font(self.cr, font_size, style);
        let ext = self.cr.text_extents(text)?;
        self.cr.move_to(
            center.x - (ext.width() / 2.0 + ext.x_bearing()),
            center.y - (ext.height() / 2.0 + ext.y_bearing()),
        );
        self.cr.show_text(text)
    }

    fn draw_image(
        &mut self,
        pixbuf: &Pixbuf,
        center: Point,
        edge: f64,
    ) -> Result<(), cairo::Error> {
        let (w, h) = (pixbuf.width() as f64, pixbuf.height() as f64);
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        // fit the longer side into the square
        let scale = edge / w.max(h);
        self.cr.save()?;
        self.cr.translate(center.x - w * scale / 2.0, center.y - h * scale / 2.0);
        self.cr.scale(scale, scale);
        self.cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        self.cr.paint()?;
        self.cr.restore()
    }
}

/// Measures text with the same font selection the painter uses.
pub struct CairoMeasurer<'a> {
    cr: &'a Context,
}

impl<'a> CairoMeasurer<'a> {
    pub fn new(cr: &'a Context) -> Self {
        Self { cr }
    }
}

impl TextMeasurer for CairoMeasurer<'_> {
    fn text_width(&self, text: &str, font_size: f64, style: TextStyle) -> f64 {
        if self.cr.save().is_err() {
            return estimate_width(text, font_size);
        }
        select_font(self.cr, font_size, style);
        let width = self
            .cr
            .text_extents(text)
            .map(|ext| ext.width())
            .unwrap_or_else(|_| estimate_width(text, font_size));
        let _ = self.cr.restore();
        width
    }
}

fn estimate_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.6
}

/// Loads item images from disk. Relative references resolve against `base`.
#[derive(Debug, Clone)]
pub struct PixbufLoader {
    base: PathBuf,
}

impl PixbufLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve(&self, image: &ImageRef) -> PathBuf {
        let path = Path::new(image.as_str());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl AssetLoader for PixbufLoader {
    type Image = Pixbuf;

    fn load(&self, image: &ImageRef) -> Result<Pixbuf, AssetError> {
        let path = self.resolve(image);
        if !path.exists() {
            return Err(AssetError::NotFound(image.clone()));
        }
        Pixbuf::from_file_at_scale(&path, IMAGE_LOAD_EDGE, IMAGE_LOAD_EDGE, true)
            .map_err(|e| AssetError::Decode(image.clone(), e.to_string()))
    }
}
