// SPDX-License-Identifier: MIT
//
// Style: foreground, background, decorations.
//
// A `Style` is always fully defined: "unset" is `Color::Default` and
// `Decoration::NONE`, never an `Option`. That keeps cells `Copy`, keeps
// diff comparison a plain `==`, and gives `combine` a simple rule:
//
//   colors override   overlay color wins unless it is Default
//   decorations add   base | overlay
//
// Folding a stack of overlays bottom-to-top with `combine` gives the same
// result as nesting markup tags outer-to-inner.
//
// The style-spec grammar (`"bold red on #003366"`) is parsed here. Named
// colors and decorations come from the tables in `color.rs` and
// `decoration.rs`; numeric, hex and `rgb(...)` colors are recognized only
// by this parser.

use std::fmt;
use std::str::FromStr;

use crate::color::{parse_color, Color};
use crate::decoration::{decoration_names, parse_decoration, Decoration};

// ─── Style ───────────────────────────────────────────────────────────────────

/// A complete cell style.
///
/// # Examples
///
/// ```
/// use weft_term::color::Color;
/// use weft_term::decoration::Decoration;
/// use weft_term::style::Style;
///
/// let base = Style::new().fg(Color::RED).decoration(Decoration::BOLD);
/// let overlay = Style::new().bg(Color::BLUE).decoration(Decoration::ITALIC);
/// let s = base.combine(overlay);
///
/// assert_eq!(s.fg, Color::RED);
/// assert_eq!(s.bg, Color::BLUE);
/// assert_eq!(s.decoration, Decoration::BOLD | Decoration::ITALIC);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground (text) color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Text decorations.
    pub decoration: Decoration,
}

impl Style {
    /// Default colors, no decorations. The identity for [`combine`](Self::combine).
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        decoration: Decoration::NONE,
    };

    /// Same as [`Style::PLAIN`].
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::PLAIN
    }

    /// Return a copy with the given foreground.
    #[inline]
    #[must_use]
    pub const fn fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    /// Return a copy with the given background.
    #[inline]
    #[must_use]
    pub const fn bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    /// Return a copy with the given decorations (replacing, not adding).
    #[inline]
    #[must_use]
    pub const fn decoration(self, decoration: Decoration) -> Self {
        Self { decoration, ..self }
    }

    /// Whether this is exactly [`Style::PLAIN`].
    #[inline]
    #[must_use]
    pub fn is_plain(self) -> bool {
        self == Self::PLAIN
    }

    /// Layer `overlay` on top of `self`.
    ///
    /// Colors from the overlay win unless they are [`Color::Default`];
    /// decorations accumulate.
    #[must_use]
    pub fn combine(self, overlay: Self) -> Self {
        Self {
            fg: if overlay.fg.is_default() { self.fg } else { overlay.fg },
            bg: if overlay.bg.is_default() { self.bg } else { overlay.bg },
            decoration: self.decoration | overlay.decoration,
        }
    }

    /// Fold `overlays` onto `self` in iteration order (first = outermost).
    #[must_use]
    pub fn combine_all<I>(self, overlays: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        overlays.into_iter().fold(self, Self::combine)
    }

    /// Render as a style-spec string that [`parse_style`] maps back to
    /// this exact style.
    ///
    /// ```
    /// use weft_term::style::{parse_style, Style};
    ///
    /// let s = parse_style("italic bold red on #102030").unwrap();
    /// assert_eq!(s.to_markup(), "bold italic red on #102030");
    /// assert_eq!(Style::PLAIN.to_markup(), "default");
    /// ```
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut parts: Vec<String> = decoration_names(self.decoration)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if !self.fg.is_default() {
            parts.push(self.fg.to_markup());
        }
        if !self.bg.is_default() {
            parts.push("on".to_owned());
            parts.push(self.bg.to_markup());
        }
        if parts.is_empty() {
            return "default".to_owned();
        }
        parts.join(" ")
    }
}

impl From<Color> for Style {
    /// A foreground-only style.
    #[inline]
    fn from(fg: Color) -> Self {
        Self::PLAIN.fg(fg)
    }
}

impl FromStr for Style {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_style(s)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Which color a style-spec token was heading for.
///
/// Tokens are foreground colors until the parser sees `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Foreground,
    Background,
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
        })
    }
}

/// What an unknown token could have been, for the error message.
const fn expected(slot: &ColorSlot) -> &'static str {
    match slot {
        ColorSlot::Foreground => "color or style",
        ColorSlot::Background => "color",
    }
}

/// A style-spec string could not be parsed.
///
/// `position` is the byte offset of the offending token in the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("could not find {what} '{token}' at position {position}", what = expected(.slot))]
    UnknownToken {
        token: String,
        position: usize,
        slot: ColorSlot,
    },

    #[error("a {slot} color has already been set (position {position})")]
    ColorAlreadySet { slot: ColorSlot, position: usize },

    #[error("invalid color '{token}' at position {position}: {reason}")]
    InvalidColor {
        token: String,
        position: usize,
        reason: &'static str,
    },
}

impl StyleError {
    /// Byte offset of the offending token.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::UnknownToken { position, .. }
            | Self::ColorAlreadySet { position, .. }
            | Self::InvalidColor { position, .. } => *position,
        }
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Parse a space-separated style spec.
///
/// Tokens, left to right:
///
/// - `default`: ignored
/// - `on`: later colors go to the background
/// - a decoration name: OR'd in
/// - otherwise a color: table name, `#rgb` / `#rrggbb`, `rgb(r,g,b)`, or
///   a palette index `0`–`255`
///
/// Empty segments (repeated spaces) are skipped, so `""` parses to
/// [`Style::PLAIN`].
///
/// # Errors
///
/// - [`StyleError::ColorAlreadySet`] when a slot gets a second color
/// - [`StyleError::InvalidColor`] for malformed hex / rgb / out-of-range numbers
/// - [`StyleError::UnknownToken`] for anything else unrecognized
///
/// ```
/// use weft_term::color::Color;
/// use weft_term::decoration::Decoration;
/// use weft_term::style::parse_style;
///
/// let s = parse_style("bold red on rgb(0,0,128)").unwrap();
/// assert_eq!(s.fg, Color::RED);
/// assert_eq!(s.bg, Color::Rgb(0, 0, 128));
/// assert_eq!(s.decoration, Decoration::BOLD);
///
/// assert!(parse_style("red blue").is_err());
/// ```
pub fn parse_style(text: &str) -> Result<Style, StyleError> {
    let mut fg: Option<Color> = None;
    let mut bg: Option<Color> = None;
    let mut decoration = Decoration::NONE;
    let mut slot = ColorSlot::Foreground;

    let mut position = 0;
    for token in text.split(' ') {
        let start = position;
        position += token.len() + 1;

        if token.is_empty() || token.eq_ignore_ascii_case("default") {
            continue;
        }
        if token.eq_ignore_ascii_case("on") {
            slot = ColorSlot::Background;
            continue;
        }
        if let Some(d) = parse_decoration(token) {
            decoration |= d;
            continue;
        }

        let color = parse_color_token(token, start, slot)?;
        let target = match slot {
            ColorSlot::Foreground => &mut fg,
            ColorSlot::Background => &mut bg,
        };
        if target.is_some() {
            return Err(StyleError::ColorAlreadySet {
                slot,
                position: start,
            });
        }
        *target = Some(color);
    }

    Ok(Style {
        fg: fg.unwrap_or_default(),
        bg: bg.unwrap_or_default(),
        decoration,
    })
}

/// Resolve one non-keyword, non-decoration token to a color.
fn parse_color_token(token: &str, position: usize, slot: ColorSlot) -> Result<Color, StyleError> {
    if let Some(color) = parse_color(token) {
        return Ok(color);
    }

    let invalid = |reason| StyleError::InvalidColor {
        token: token.to_owned(),
        position,
        reason,
    };

    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| invalid("expected #rgb or #rrggbb"));
    }

    if token.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rgb")) {
        return parse_rgb(&token[3..]).ok_or_else(|| invalid("expected rgb(r,g,b) with values 0-255"));
    }

    if is_integer(token) {
        return token
            .parse::<u8>()
            .map(Color::Indexed)
            .map_err(|_| invalid("color number must be between 0 and 255"));
    }

    Err(StyleError::UnknownToken {
        token: token.to_owned(),
        position,
        slot,
    })
}

/// `rgb`, `rrggbb` (without the `#`). The short form doubles each nibble.
fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let nibble = |i: usize| channel(&hex[i..=i]).map(|n| n * 17);
            Some(Color::Rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        _ => None,
    }
}

/// `(r,g,b)`: the part after the `rgb` prefix.
fn parse_rgb(rest: &str) -> Option<Color> {
    let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut channels = inner
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<u8>());

    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    if channels.next().is_some() {
        return None;
    }
    Some(Color::Rgb(r, g, b))
}

/// Optional minus sign followed by at least one ASCII digit.
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
