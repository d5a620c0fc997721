use std::f64::consts::{PI, TAU};

/// Narrowest usable width ever reported for content inside a sector, in pixels.
pub const MIN_CHORD_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point at `distance` from `self` in screen direction `angle` (y grows downward).
    pub fn polar_offset(&self, angle: f64, distance: f64) -> Self {
        Self::new(
            self.x + distance * angle.cos(),
            self.y + distance * angle.sin(),
        )
    }
}

/// Folds any angle into `[0, 2π)`.
///
/// Rotation accumulates without bound while spinning, so every comparison or index lookup goes
/// through here first.
pub fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

/// Shortest signed rotation that takes `from` onto `to`, in `(-π, π]`.
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let d = normalize_angle(to - from);
    if d > PI { d - TAU } else { d }
}

/// Angular width of one slice when `count` items share the wheel.
pub fn slice_width(count: usize) -> f64 {
    TAU / count.max(1) as f64
}

/// Usable straight-line width for content centered at `radius` inside a sector `angular_width`
/// wide, after removing `padding`.
///
/// Sectors of half the circle or more have no chord limit, so the width is unbounded.
pub fn chord_width_at(radius: f64, angular_width: f64, padding: f64) -> f64 {
    if angular_width >= PI {
        return f64::INFINITY;
    }
    let raw = 2.0 * radius.max(0.0) * (angular_width / 2.0).tan() - padding;
    raw.max(MIN_CHORD_WIDTH)
}

/// Smallest radius at which a block `width` wide (plus padding) fits across the sector.
pub fn radius_for_width(width: f64, angular_width: f64, padding: f64) -> f64 {
    if angular_width >= PI {
        return 0.0;
    }
    (width + padding) / (2.0 * (angular_width / 2.0).tan())
}

/// Index of the slice containing a wheel-local angle.
pub fn slice_at(local_angle: f64, count: usize) -> usize {
    let count = count.max(1);
    let idx = (normalize_angle(local_angle) / slice_width(count)).floor() as usize;
    idx % count
}

/// Bounds of one slice in wheel-local coordinates. Never stored, always derived from the index and
/// the active item count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceGeometry {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl SliceGeometry {
    pub fn new(index: usize, count: usize) -> Self {
        let width = slice_width(count);
        Self {
            index,
            start_angle: index as f64 * width,
            end_angle: (index + 1) as f64 * width,
        }
    }

    pub fn all(count: usize) -> impl Iterator<Item = Self> {
        (0..count).map(move |i| Self::new(i, count))
    }

    pub fn width(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn bisector(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Half-open containment test on an already normalized angle.
    pub fn contains(&self, local_angle: f64) -> bool {
        local_angle >= self.start_angle && local_angle < self.end_angle
    }
}
