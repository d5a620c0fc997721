use super::model::{WheelState, radius_for};
use crate::gui::painter::{CairoMeasurer, CairoPainter};
use cairo::Context;
use rota_core::geometry::Point;
use rota_core::render::WheelTheme;

pub fn draw(
    cr: &Context,
    state: &mut WheelState,
    width: f64,
    height: f64,
    theme: WheelTheme,
) -> Result<(), cairo::Error> {
    // nothing committed yet: use the current allocation
    if state.radius <= 0.0 {
        state.radius = radius_for(width, height);
    }
    let radius = state.radius;
    if radius <= 0.0 {
        return Ok(());
    }

    state
        .wheel
        .refresh_layout(radius, &state.assets, &CairoMeasurer::new(cr));

    let center = Point::new(width / 2.0, height / 2.0);
    state
        .wheel
        .scene(&state.assets, center, radius, theme)
        .draw(&mut CairoPainter::new(cr))
}
