use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;
use rota_core::render::WheelTheme;

/// Wheel chrome colors picked from the active GTK theme.
pub fn wheel_theme(context: &gtk::StyleContext) -> WheelTheme {
    let fallback = WheelTheme::default();
    WheelTheme {
        hub: lookup_color(context, "theme_bg_color", fallback.hub, Some(1.0)),
        rim: lookup_color(context, "theme_fg_color", fallback.rim, Some(0.85)),
        pointer: lookup_color(context, "accent_bg_color", fallback.pointer, None),
        highlight: lookup_color(
            context,
            "theme_selected_bg_color",
            fallback.highlight,
            Some(0.95),
        ),
    }
}

fn lookup_color(
    context: &gtk::StyleContext,
    name: &str,
    fallback: Srgba<f64>,
    alpha_override: Option<f64>,
) -> Srgba<f64> {
    context
        .lookup_color(name)
        .map(|c| {
            let (r, g, b, a) = (
                c.red() as f64,
                c.green() as f64,
                c.blue() as f64,
                c.alpha() as f64,
            );
            Srgba::new(r, g, b, alpha_override.unwrap_or(a))
        })
        .unwrap_or(fallback)
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.rota-drawing-area {
    background: none;
    background-color: transparent;
}
.rota-status {
    font-weight: bold;
    font-size: 1.2em;
}
.rota-history {
    font-family: monospace;
    opacity: 0.8;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
