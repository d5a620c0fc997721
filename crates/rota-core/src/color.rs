use palette::{LinSrgb, Srgb};

/// Accent used for slices whose color is missing or unparseable.
pub const DEFAULT_ACCENT: Srgb<u8> = Srgb::new(0x4a, 0x55, 0x68);

/// Luminance at or above which a slice gets dark text.
pub const LUMINANCE_THRESHOLD: f64 = 0.35;

const LIGHT_TEXT: Srgb<f64> = Srgb::new(0.98, 0.98, 0.98);
const DARK_TEXT: Srgb<f64> = Srgb::new(0.08, 0.08, 0.1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foreground {
    Light,
    Dark,
}

impl Foreground {
    pub fn color(self) -> Srgb<f64> {
        match self {
            Self::Light => LIGHT_TEXT,
            Self::Dark => DARK_TEXT,
        }
    }
}

/// Accepts `#rgb`, `#rrggbb` (hash optional) and CSS color names.
pub fn parse_color(raw: &str) -> Option<Srgb<u8>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<Srgb<u8>>()
        .ok()
        .or_else(|| palette::named::from_str(&s.to_ascii_lowercase()))
}

/// Resolves an optional accent string, falling back to [`DEFAULT_ACCENT`]. Does not log; see
/// [`is_malformed`].
pub fn accent_or_default(raw: Option<&str>) -> Srgb<f64> {
    raw.and_then(parse_color)
        .unwrap_or(DEFAULT_ACCENT)
        .into_format()
}

/// True for a non-blank accent that cannot be parsed.
pub fn is_malformed(raw: &str) -> bool {
    !raw.trim().is_empty() && parse_color(raw).is_none()
}

/// WCAG relative luminance: gamma-decoded channels weighted by the Rec. 709 luma coefficients.
pub fn relative_luminance(color: Srgb<f64>) -> f64 {
    let linear: LinSrgb<f64> = color.into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

pub fn text_color_for(color: Srgb<f64>) -> Foreground {
    if relative_luminance(color) >= LUMINANCE_THRESHOLD {
        Foreground::Dark
    } else {
        Foreground::Light
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Once;

    thread_local! {
        static WARNINGS: Cell<usize> = const { Cell::new(0) };
    }

    /// Counts warnings per thread, so parallel tests do not see each other's.
    struct CountingLogger;

    impl log::Log for CountingLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if record.level() == log::Level::Warn {
                WARNINGS.with(|w| w.set(w.get() + 1));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CountingLogger = CountingLogger;
    static INSTALL: Once = Once::new();

    /// Number of warnings logged on this thread while `f` runs.
    pub(crate) fn count_warnings(f: impl FnOnce()) -> usize {
        INSTALL.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Warn);
        });
        let before = WARNINGS.with(Cell::get);
        f();
        WARNINGS.with(Cell::get) - before
    }

    fn rgb(hex: &str) -> Srgb<f64> {
        parse_color(hex).unwrap().into_format()
    }

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#FF8800"), Some(Srgb::new(0xff, 0x88, 0x00)));
        assert_eq!(parse_color("ff8800"), Some(Srgb::new(0xff, 0x88, 0x00)));
        assert_eq!(parse_color("#fff"), Some(Srgb::new(0xff, 0xff, 0xff)));
        assert_eq!(parse_color(" Navy "), Some(Srgb::new(0, 0, 128)));
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_accent_fallback() {
        let default: Srgb<f64> = DEFAULT_ACCENT.into_format();
        assert_eq!(accent_or_default(None), default);
        assert_eq!(accent_or_default(Some("#zzzzzz")), default);
        assert_eq!(accent_or_default(Some("#000000")), Srgb::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_fallback_is_quiet() {
        let warnings = count_warnings(|| {
            for _ in 0..100 {
                accent_or_default(Some("garbage"));
            }
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_is_malformed() {
        assert!(is_malformed("garbage"));
        assert!(is_malformed("#12345"));
        assert!(!is_malformed("  "));
        assert!(!is_malformed("#fff"));
        assert!(!is_malformed("SeaGreen"));
    }

    #[test]
    fn test_luminance_extremes() {
        assert!((relative_luminance(rgb("#ffffff")) - 1.0).abs() < 1e-9);
        assert!(relative_luminance(rgb("#000000")).abs() < 1e-9);
        // mid grey is well below 0.5 once gamma-decoded
        let grey = relative_luminance(rgb("#808080"));
        assert!(grey > 0.2 && grey < 0.25, "{grey}");
    }

    #[test]
    fn test_text_color_for() {
        assert_eq!(text_color_for(rgb("#FFFFFF")), Foreground::Dark);
        assert_eq!(text_color_for(rgb("#000000")), Foreground::Light);
        assert_eq!(text_color_for(rgb("#FFD700")), Foreground::Dark);
        assert_eq!(text_color_for(rgb("#00008B")), Foreground::Light);
        assert_eq!(
            text_color_for(DEFAULT_ACCENT.into_format()),
            Foreground::Light
        );
    }

    #[test]
    fn test_text_color_for_is_pure() {
        for hex in ["#123456", "#abcdef", "#ff0000", "#00ff00", "#777777"] {
            let c = rgb(hex);
            let first = text_color_for(c);
            for _ in 0..8 {
                assert_eq!(text_color_for(c), first);
            }
        }
    }
}
