pub mod assets;
pub mod color;
pub mod fit;
pub mod geometry;
pub mod history;
pub mod item;
mod macros;
pub mod render;
pub mod spin;
pub mod wheel;

pub use item::{GroupFilter, Item};
pub use spin::{SpinError, SpinResolver};
pub use wheel::{Wheel, WheelEvent};
