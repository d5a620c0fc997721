//! Content fitting for a single wheel slice.
//!
//! A slice may show up to three stacked blocks (image, name, subtitle). Only width is contended:
//! the stack is centered on one radial anchor and its widest block has to fit across the sector's
//! chord at that anchor. Sizes start proportional to the wheel radius and are shrunk in a fixed
//! order (per-text shrink, move the anchor outward, uniform scale) until they fit.

use crate::geometry::{chord_width_at, radius_for_width, slice_width};
use crate::item::{ImageRef, Item};
use serde::{Deserialize, Serialize};

/// Widths within this many pixels of the limit count as fitting.
pub const FIT_TOLERANCE: f64 = 1e-6;

const MAX_SCALE_PASSES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Subtitle,
}

/// Measures rendered text. The desktop app measures with cairo, tests use fixed advances.
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font_size: f64, style: TextStyle) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Image,
    Name,
    Subtitle,
}

/// Which block types the user wants on the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub images: bool,
    pub names: bool,
    pub subtitles: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            images: true,
            names: true,
            subtitles: true,
        }
    }
}

/// Content bundle for one slice, after display toggles and asset availability are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentRequest<'a> {
    pub image: bool,
    pub name: Option<&'a str>,
    pub subtitle: Option<&'a str>,
}

impl<'a> ContentRequest<'a> {
    pub fn for_item(
        item: &'a Item,
        display: DisplayOptions,
        image_ready: impl Fn(&ImageRef) -> bool,
    ) -> Self {
        Self {
            image: display.images && item.image_ref().is_some_and(image_ready),
            name: item.display_name().filter(|_| display.names),
            subtitle: item.subtitle_text().filter(|_| display.subtitles),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.image && self.name.is_none() && self.subtitle.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitParams {
    /// Innermost usable radius, as a fraction of the wheel radius (keeps clear of the hub).
    pub r_min: f64,
    /// Outermost usable radius, as a fraction of the wheel radius (keeps clear of the rim).
    pub r_max: f64,
    pub anchor_fraction: f64,
    pub padding: f64,
    pub image_factor: f64,
    pub name_factor: f64,
    pub subtitle_factor: f64,
    pub min_image: f64,
    pub min_name_font: f64,
    pub min_subtitle_font: f64,
    pub font_step: f64,
    pub max_shrink_steps: usize,
    pub gap_factor: f64,
    pub line_height: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            r_min: 0.22,
            r_max: 0.92,
            anchor_fraction: 0.66,
            padding: 6.0,
            image_factor: 0.12,
            name_factor: 0.06,
            subtitle_factor: 0.045,
            min_image: 12.0,
            min_name_font: 9.0,
            min_subtitle_font: 8.0,
            font_step: 0.5,
            max_shrink_steps: 256,
            gap_factor: 0.012,
            line_height: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    /// Font size for text blocks, edge length for the image block.
    pub size: f64,
    pub width: f64,
    pub height: f64,
    /// Vertical offset of the block's center from the anchor point, in screen pixels.
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentLayout {
    /// Distance from the wheel center to the middle of the stack.
    pub anchor: f64,
    /// Chord width available at `anchor`.
    pub max_width: f64,
    /// Uniform factor applied in the last resort pass, 1.0 when it was not needed.
    pub scale: f64,
    pub total_height: f64,
    pub blocks: Vec<ContentBlock>,
}

impl ContentLayout {
    pub fn widest(&self) -> f64 {
        self.blocks.iter().map(|b| b.width).fold(0.0, f64::max)
    }

    pub fn block(&self, kind: BlockKind) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.kind == kind)
    }
}

struct Draft<'a> {
    kind: BlockKind,
    text: &'a str,
    size: f64,
    min: f64,
}

impl Draft<'_> {
    fn width(&self, measurer: &dyn TextMeasurer) -> f64 {
        match self.kind {
            BlockKind::Image => self.size,
            BlockKind::Name => measurer.text_width(self.text, self.size, TextStyle::Title),
            BlockKind::Subtitle => measurer.text_width(self.text, self.size, TextStyle::Subtitle),
        }
    }

    fn height(&self, line_height: f64) -> f64 {
        match self.kind {
            BlockKind::Image => self.size,
            _ => self.size * line_height,
        }
    }

    fn shrink_to(&mut self, max_w: f64, params: &FitParams, measurer: &dyn TextMeasurer) {
        let mut steps = 0;
        while self.size > self.min
            && steps < params.max_shrink_steps
            && exceeds(self.width(measurer), max_w)
        {
            self.size = (self.size - params.font_step).max(self.min);
            steps += 1;
        }
    }
}

fn exceeds(width: f64, max_w: f64) -> bool {
    width - max_w > FIT_TOLERANCE
}

fn widest(drafts: &[Draft<'_>], measurer: &dyn TextMeasurer) -> f64 {
    drafts
        .iter()
        .map(|d| d.width(measurer))
        .fold(0.0, f64::max)
}

fn initial_drafts<'a>(
    request: &ContentRequest<'a>,
    radius: f64,
    params: &FitParams,
) -> Vec<Draft<'a>> {
    let mut drafts = Vec::with_capacity(3);
    if request.image {
        drafts.push(Draft {
            kind: BlockKind::Image,
            text: "",
            size: (radius * params.image_factor).max(params.min_image),
            min: params.min_image,
        });
    }
    if let Some(name) = request.name.filter(|s| !s.is_empty()) {
        drafts.push(Draft {
            kind: BlockKind::Name,
            text: name,
            size: (radius * params.name_factor).max(params.min_name_font),
            min: params.min_name_font,
        });
    }
    if let Some(subtitle) = request.subtitle.filter(|s| !s.is_empty()) {
        drafts.push(Draft {
            kind: BlockKind::Subtitle,
            text: subtitle,
            size: (radius * params.subtitle_factor).max(params.min_subtitle_font),
            min: params.min_subtitle_font,
        });
    }
    drafts
}

/// Sizes and places a slice's content so the widest block fits across the sector at the anchor.
///
/// Returns `None` when nothing is requested; the slice then shows only its background.
pub fn fit_content(
    radius: f64,
    angular_width: f64,
    request: &ContentRequest<'_>,
    params: &FitParams,
    measurer: &dyn TextMeasurer,
) -> Option<ContentLayout> {
    let mut drafts = initial_drafts(request, radius, params);
    if drafts.is_empty() {
        return None;
    }

    let hi = (params.r_max * radius).max(0.0);
    let lo = (params.r_min * radius).clamp(0.0, hi);
    let mut anchor = (params.anchor_fraction * hi).clamp(lo, hi);
    let mut max_w = chord_width_at(anchor, angular_width, params.padding);

    for draft in drafts.iter_mut().filter(|d| d.kind != BlockKind::Image) {
        draft.shrink_to(max_w, params, measurer);
    }

    let w = widest(&drafts, measurer);
    if exceeds(w, max_w) {
        anchor = radius_for_width(w, angular_width, params.padding)
            .max(anchor)
            .min(hi);
        max_w = chord_width_at(anchor, angular_width, params.padding);
    }

    let mut scale = 1.0;
    let w = widest(&drafts, measurer);
    if exceeds(w, max_w) {
        let s = max_w / w;
        for draft in &mut drafts {
            draft.size = (draft.size * s).max(draft.min);
        }
        scale *= s;

        // floors can keep the stack too wide; containment wins over readability
        for _ in 0..MAX_SCALE_PASSES {
            let w = widest(&drafts, measurer);
            if !exceeds(w, max_w) {
                break;
            }
            let s = max_w / w;
            for draft in &mut drafts {
                draft.size *= s;
            }
            scale *= s;
        }
    }

    Some(stack(&drafts, anchor, max_w, scale, radius, params, measurer))
}

fn stack(
    drafts: &[Draft<'_>],
    anchor: f64,
    max_w: f64,
    scale: f64,
    radius: f64,
    params: &FitParams,
    measurer: &dyn TextMeasurer,
) -> ContentLayout {
    let gap = params.gap_factor * radius * scale;
    let heights: Vec<f64> = drafts.iter().map(|d| d.height(params.line_height)).collect();
    let total_height =
        heights.iter().sum::<f64>() + gap * drafts.len().saturating_sub(1) as f64;

    let mut y = -total_height / 2.0;
    let blocks = drafts
        .iter()
        .zip(&heights)
        .map(|(d, &h)| {
            let block = ContentBlock {
                kind: d.kind,
                size: d.size,
                width: d.width(measurer),
                height: h,
                offset_y: y + h / 2.0,
            };
            y += h + gap;
            block
        })
        .collect();

    ContentLayout {
        anchor,
        max_width: max_w,
        scale,
        total_height,
        blocks,
    }
}

/// Fits every slice of a wheel with `items.len()` equal sectors.
pub fn layout_slices(
    items: &[Item],
    radius: f64,
    display: DisplayOptions,
    image_ready: impl Fn(&ImageRef) -> bool,
    params: &FitParams,
    measurer: &dyn TextMeasurer,
) -> Vec<Option<ContentLayout>> {
    let width = slice_width(items.len());
    items
        .iter()
        .map(|item| {
            let request = ContentRequest::for_item(item, display, &image_ready);
            fit_content(radius, width, &request, params, measurer)
        })
        .collect()
}
