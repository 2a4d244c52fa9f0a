// SPDX-License-Identifier: MIT
//
// Terminal colors: the three things a cell's foreground or background can be.
//
//   Default      the terminal's own color; never overrides anything
//   Indexed(n)   a slot in the 256-color palette (0-15 are the ANSI colors)
//   Rgb(r,g,b)   24-bit TrueColor
//
// `Default` is a real value, not an absence. Style composition uses
// `is_default()` to decide whether an overlay color wins, so "unset" and
// "terminal default" are the same thing.
//
// Name lookup is a case-insensitive scan of a constant table.

use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color.
///
/// Compact (4 bytes) and `Copy`, so cells stay cheap to compare during
/// diffing.
///
/// # Examples
///
/// ```
/// use weft_term::color::Color;
///
/// assert!(Color::Default.is_default());
/// assert!(!Color::RED.is_default());
/// assert_eq!(Color::from(9), Color::RED);
/// assert_eq!(Color::from((255, 0, 0)), Color::Rgb(255, 0, 0));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's default color (SGR 39 / 49).
    #[default]
    Default,
    /// 256-color palette index.
    Indexed(u8),
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const MAROON: Self = Self::Indexed(1);
    pub const GREEN: Self = Self::Indexed(2);
    pub const OLIVE: Self = Self::Indexed(3);
    pub const NAVY: Self = Self::Indexed(4);
    pub const PURPLE: Self = Self::Indexed(5);
    pub const TEAL: Self = Self::Indexed(6);
    pub const SILVER: Self = Self::Indexed(7);
    pub const GREY: Self = Self::Indexed(8);
    pub const RED: Self = Self::Indexed(9);
    pub const LIME: Self = Self::Indexed(10);
    pub const YELLOW: Self = Self::Indexed(11);
    pub const BLUE: Self = Self::Indexed(12);
    pub const FUCHSIA: Self = Self::Indexed(13);
    pub const AQUA: Self = Self::Indexed(14);
    pub const WHITE: Self = Self::Indexed(15);

    /// Whether this is the terminal default (i.e. "unset").
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Render this color as a style-spec token that
    /// [`parse_style`](crate::style::parse_style) maps back to the same value.
    ///
    /// Palette colors 0–15 use their table name, other palette slots their
    /// number, and RGB colors lowercase `#rrggbb`.
    #[must_use]
    pub fn to_markup(self) -> String {
        match self {
            Self::Default => "default".to_owned(),
            Self::Indexed(idx) => color_name(self).map_or_else(|| idx.to_string(), str::to_owned),
            Self::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl From<u8> for Color {
    #[inline]
    fn from(idx: u8) -> Self {
        Self::Indexed(idx)
    }
}

impl From<(u8, u8, u8)> for Color {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Indexed(idx) => match color_name(*self) {
                Some(name) => write!(f, "Indexed({idx}:{name})"),
                None => write!(f, "Indexed({idx})"),
            },
            Self::Rgb(r, g, b) => write!(f, "Rgb({r}, {g}, {b})"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

// ─── Name Table ──────────────────────────────────────────────────────────────

/// Color names understood by the style parser.
///
/// The first entry for each index is its canonical name (used by
/// [`color_name`]); later entries are aliases.
const COLOR_TABLE: &[(&str, u8)] = &[
    ("black", 0),
    ("maroon", 1),
    ("green", 2),
    ("olive", 3),
    ("navy", 4),
    ("purple", 5),
    ("teal", 6),
    ("silver", 7),
    ("grey", 8),
    ("red", 9),
    ("lime", 10),
    ("yellow", 11),
    ("blue", 12),
    ("fuchsia", 13),
    ("aqua", 14),
    ("white", 15),
    // Aliases.
    ("gray", 8),
    ("magenta", 13),
    ("cyan", 14),
];

/// Look up a named color, ignoring ASCII case.
///
/// Only names are handled here; numeric, `#hex` and `rgb(...)` forms are
/// the style parser's business.
///
/// ```
/// use weft_term::color::{parse_color, Color};
///
/// assert_eq!(parse_color("Red"), Some(Color::RED));
/// assert_eq!(parse_color("gray"), parse_color("grey"));
/// assert_eq!(parse_color("#ff0000"), None);
/// ```
#[must_use]
pub fn parse_color(name: &str) -> Option<Color> {
    COLOR_TABLE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, idx)| Color::Indexed(idx))
}

/// Canonical table name for a color, if it has one.
#[must_use]
pub fn color_name(color: Color) -> Option<&'static str> {
    let Color::Indexed(idx) = color else {
        return None;
    };
    COLOR_TABLE
        .iter()
        .find(|&&(_, i)| i == idx)
        .map(|&(name, _)| name)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
