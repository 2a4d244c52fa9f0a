// SPDX-License-Identifier: MIT
//
// Cell: the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell: one symbol plus the style
// it is drawn with. The whole pipeline exists to produce, diff, and output
// these. Cells are owned by the buffer that contains them and are `Copy`,
// so the diff engine compares them with a plain `==`.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the symbol; the second is a continuation cell (symbol = '\0').
// The writer skips continuation cells when outputting characters but
// still applies their style for correct background fill.

use crate::color::Color;
use crate::decoration::Decoration;
use crate::style::Style;

/// Continuation marker: a cell with this symbol belongs to the preceding
/// wide character and produces no character output.
const CONTINUATION: char = '\0';

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// # Examples
///
/// ```
/// use weft_term::cell::Cell;
/// use weft_term::color::Color;
/// use weft_term::style::Style;
///
/// let cell = Cell::new('A').with_style(Style::from(Color::RED));
/// assert_eq!(cell.symbol, 'A');
/// assert_eq!(cell.style.fg, Color::RED);
/// assert!(Cell::default().is_empty());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Character to display. `'\0'` marks a wide-char continuation.
    pub symbol: char,
    /// Colors and decorations.
    pub style: Style,
}

impl Cell {
    /// An empty cell: space, plain style.
    pub const EMPTY: Self = Self {
        symbol: ' ',
        style: Style::PLAIN,
    };

    /// A cell with the given symbol and plain style.
    #[inline]
    #[must_use]
    pub const fn new(symbol: char) -> Self {
        Self {
            symbol,
            style: Style::PLAIN,
        }
    }

    /// A cell with symbol and style.
    #[inline]
    #[must_use]
    pub const fn styled(symbol: char, style: Style) -> Self {
        Self { symbol, style }
    }

    /// A continuation cell for the second column of a wide character.
    ///
    /// Carries the owner's style so the background fills both columns.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            symbol: CONTINUATION,
            style,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// Whether this is a continuation cell.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.symbol == CONTINUATION
    }

    /// Whether this cell is visually empty (space, plain style).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// The displayable character, or `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            Some(self.symbol)
        }
    }

    // ─── Mutations ────────────────────────────────────────────────────────

    /// Reset to [`Cell::EMPTY`].
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    /// Return a copy with the given symbol.
    #[inline]
    #[must_use]
    pub const fn with_symbol(self, symbol: char) -> Self {
        Self { symbol, ..self }
    }

    /// Return a copy with the given style.
    #[inline]
    #[must_use]
    pub const fn with_style(self, style: Style) -> Self {
        Self { style, ..self }
    }

    /// Return a copy with the given foreground.
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Color) -> Self {
        Self {
            style: self.style.fg(fg),
            ..self
        }
    }

    /// Return a copy with the given background.
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Color) -> Self {
        Self {
            style: self.style.bg(bg),
            ..self
        }
    }

    /// Return a copy with the given decorations.
    #[inline]
    #[must_use]
    pub const fn with_decoration(self, decoration: Decoration) -> Self {
        Self {
            style: self.style.decoration(decoration),
            ..self
        }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        write!(f, "Cell({:?}", self.symbol)?;
        if !self.style.fg.is_default() {
            write!(f, ", fg={:?}", self.style.fg)?;
        }
        if !self.style.bg.is_default() {
            write!(f, ", bg={:?}", self.style.bg)?;
        }
        if !self.style.decoration.is_empty() {
            write!(f, ", {:?}", self.style.decoration)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn cell_fits_in_16_bytes() {
        assert!(mem::size_of::<Cell>() <= 16);
    }

    #[test]
    fn cell_is_copy() {
        let a = Cell::EMPTY;
        let b = a;
        assert_eq!(a, b);
    }

    // ── Default / Empty ──────────────────────────────────────────────────

    #[test]
    fn default_cell_is_space_plain() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.symbol, ' ');
        assert_eq!(cell.style, Style::PLAIN);
    }

    #[test]
    fn styled_cell_is_not_empty() {
        assert!(!Cell::EMPTY.with_fg(Color::RED).is_empty());
        assert!(!Cell::EMPTY.with_bg(Color::RED).is_empty());
        assert!(!Cell::EMPTY.with_decoration(Decoration::BOLD).is_empty());
        assert!(!Cell::new('x').is_empty());
    }

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn styled_constructor() {
        let style = Style::new().fg(Color::YELLOW).bg(Color::NAVY);
        let cell = Cell::styled('Z', style);
        assert_eq!(cell.character(), Some('Z'));
        assert_eq!(cell.style, style);
    }

    #[test]
    fn builder_chain() {
        let cell = Cell::new('A')
            .with_fg(Color::Rgb(255, 0, 0))
            .with_bg(Color::Indexed(236))
            .with_decoration(Decoration::BOLD | Decoration::ITALIC);
        assert_eq!(cell.style.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.style.bg, Color::Indexed(236));
        assert!(cell.style.decoration.contains(Decoration::ITALIC));
    }

    #[test]
    fn with_symbol_keeps_style() {
        let cell = Cell::new('a').with_fg(Color::LIME).with_symbol('b');
        assert_eq!(cell.symbol, 'b');
        assert_eq!(cell.style.fg, Color::LIME);
    }

    // ── Continuation ─────────────────────────────────────────────────────

    #[test]
    fn continuation_carries_style() {
        let style = Style::new().bg(Color::TEAL);
        let cell = Cell::continuation(style);
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(cell.style, style);
    }

    #[test]
    fn regular_cell_is_not_continuation() {
        assert!(!Cell::new('日').is_continuation());
    }

    // ── Reset ────────────────────────────────────────────────────────────

    #[test]
    fn reset_clears_everything() {
        let mut cell = Cell::new('X').with_fg(Color::RED).with_decoration(Decoration::all());
        cell.reset();
        assert_eq!(cell, Cell::EMPTY);
    }

    // ── Debug ────────────────────────────────────────────────────────────

    #[test]
    fn debug_empty_cell() {
        assert_eq!(format!("{:?}", Cell::EMPTY), "Cell(' ')");
    }

    #[test]
    fn debug_styled_cell() {
        let cell = Cell::new('A').with_fg(Color::RED).with_decoration(Decoration::BOLD);
        let dbg = format!("{cell:?}");
        assert!(dbg.starts_with("Cell('A'"));
        assert!(dbg.contains("fg="));
        assert!(dbg.contains("BOLD"));
    }

    #[test]
    fn debug_continuation_cell() {
        let dbg = format!("{:?}", Cell::continuation(Style::PLAIN));
        assert_eq!(dbg, "Cell(continuation)");
    }
}
