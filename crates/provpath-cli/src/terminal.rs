//! Terminal styling helpers.
//!
//! Color output honours `NO_COLOR` and `TERM=dumb`; the arrow used between
//! path steps falls back to ASCII unless the locale advertises UTF-8.

/// ANSI escape codes used by the text renderers.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Region names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Codes, tree lines, secondary details.
    pub const GRAY: &str = "\x1b[90m";
    /// Distances.
    pub const CYAN: &str = "\x1b[36m";
    /// Positive outcomes (connected, valid).
    pub const GREEN: &str = "\x1b[32m";
    /// Warnings in `validate-data`.
    pub const ORANGE: &str = "\x1b[38;5;208m";
    /// Negative outcomes.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, or empty strings when color is off.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub green: &'static str,
    pub orange: &'static str,
    pub red: &'static str,
    /// Separator between consecutive path steps.
    pub arrow: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            green: colors::GREEN,
            orange: colors::ORANGE,
            red: colors::RED,
            arrow: "→",
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            cyan: "",
            green: "",
            orange: "",
            red: "",
            arrow: "->",
        }
    }

    /// Palette for the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        let mut palette = if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        };
        palette.arrow = if supports_unicode() { "→" } else { "->" };
        palette
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be written.
#[must_use]
pub fn supports_color() -> bool {
    color_allowed(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn color_allowed(no_color: bool, term: Option<&str>) -> bool {
    !no_color && !term.is_some_and(|t| t.eq_ignore_ascii_case("dumb"))
}

/// Whether the locale advertises UTF-8.
#[must_use]
pub fn supports_unicode() -> bool {
    let lang = std::env::var("LANG").ok();
    let lc_all = std::env::var("LC_ALL").ok();
    unicode_locale(lc_all.as_deref()) || unicode_locale(lang.as_deref()) || cfg!(windows)
}

fn unicode_locale(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let upper = v.to_uppercase();
        upper.contains("UTF-8") || upper.contains("UTF8")
    })
}

/// Format a non-negative integer with thousands separators.
///
/// ```
/// # use provpath_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Kilometers with one decimal and grouped thousands, e.g. `1,137.8 km`.
#[must_use]
pub fn format_km(km: f64) -> String {
    let tenths = (km.max(0.0) * 10.0).round() as u64;
    format!("{}.{} km", format_with_separators(tenths / 10), tenths % 10)
}
