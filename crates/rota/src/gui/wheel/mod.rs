pub mod model;
pub mod view;

pub use model::WheelState;
pub use view::draw;

pub const RESIZE_DEBOUNCE_MS: u64 = 150;
pub const HISTORY_LINES: usize = 8;
pub const IMAGE_LOAD_EDGE: i32 = 256;
pub const CANVAS_MARGIN: f64 = 0.9; // wheel diameter relative to the shorter canvas side
