// SPDX-License-Identifier: MIT
//
// Buffer: the 2D cell grid that every widget paints into.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are
//     contiguous, so the diff engine's left-to-right scan is linear.
//
//   - Writes take signed coordinates. Anything outside `[0,width)×[0,height)`
//     is dropped and reported as `false`; widgets routinely paint at the
//     edges of a shrinking terminal, and that must never fault.
//
//   - Wide characters (CJK, some emoji) occupy two columns. The first cell
//     holds the symbol; the second is a continuation cell. Text writes
//     create continuations, and any write that lands on half of a wide
//     character breaks the other half so no orphan reaches the terminal.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::color::Color;
use crate::rect::Rect;
use crate::style::Style;

// ─── Buffer ──────────────────────────────────────────────────────────────────

/// A rectangular grid of [`Cell`]s sized to the viewport.
///
/// # Examples
///
/// ```
/// use weft_term::buffer::Buffer;
///
/// let mut buf = Buffer::new(80, 24);
/// assert!(buf.set_symbol(5, 3, 'X'));
/// assert_eq!(buf.get(5, 3).unwrap().symbol, 'X');
///
/// // Out of bounds: dropped, never a panic.
/// assert!(!buf.set_symbol(80, 0, 'Y'));
/// assert!(!buf.set_symbol(-1, 0, 'Y'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with empty cells (space, plain style).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// The full buffer as a [`Rect`] at the origin.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    /// Whether `(x, y)` lies inside the buffer.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    /// Flat index of `(x, y)`, or `None` if out of bounds.
    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let x = u16::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u16::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index_of(x, y).map(|idx| &self.cells[idx])
    }

    /// Get a mutable cell, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index_of(x, y).map(|idx| &mut self.cells[idx])
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice, or `None` if `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y) * usize::from(self.width);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// The symbols of row `y` as a string, skipping continuation cells.
    /// Empty for rows out of bounds.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .unwrap_or_default()
            .iter()
            .filter_map(|cell| cell.character())
            .collect()
    }

    /// Iterate cells with their `(x, y)` coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let w = usize::from(self.width).max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            // x < width and y < height, both u16.
            ((i % w) as u16, (i / w) as u16, cell)
        })
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Overwrite the part of `rect` inside the buffer with `symbol` in `style`.
    pub fn clear_rect(&mut self, rect: Rect, symbol: char, style: Style) {
        let Some(r) = rect.intersect(self.area()) else {
            return;
        };
        let fill = Cell::styled(symbol, style);
        for y in r.y..r.bottom() {
            self.break_wide_char_at(r.x, y);
            self.break_wide_char_at(r.right() - 1, y);
            if let (Some(start), Some(end)) = (self.index_of(r.x, y), self.index_of(r.right() - 1, y))
            {
                self.cells[start..=end].fill(fill);
            }
        }
    }

    /// Resize the buffer. All prior content is lost.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    // ─── Point Writes ────────────────────────────────────────────────────

    /// Write a cell verbatim. No wide-char handling.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        let Some(slot) = self.get_mut(x, y) else {
            return false;
        };
        *slot = cell;
        true
    }

    /// Write a symbol, keeping the cell's current style.
    ///
    /// A wide symbol also claims the next column; if that column is
    /// outside the buffer a space is written instead.
    pub fn set_symbol(&mut self, x: i32, y: i32, symbol: char) -> bool {
        let Some(style) = self.get(x, y).map(|c| c.style) else {
            return false;
        };
        self.put_char(x, y, symbol, style, self.area())
    }

    /// Replace a cell's style, keeping its symbol.
    pub fn set_style(&mut self, x: i32, y: i32, style: Style) -> bool {
        self.update(x, y, |c| c.style = style)
    }

    /// Replace a cell's foreground color.
    pub fn set_foreground(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.update(x, y, |c| c.style.fg = color)
    }

    /// Replace a cell's background color.
    pub fn set_background(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.update(x, y, |c| c.style.bg = color)
    }

    fn update(&mut self, x: i32, y: i32, f: impl FnOnce(&mut Cell)) -> bool {
        self.get_mut(x, y).map(f).is_some()
    }

    // ─── Wide Character Cleanup ──────────────────────────────────────────

    /// Break any wide character that touches `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation, its owner at `x-1` becomes a space.
    /// - If `(x+1, y)` is a continuation, it is orphaned and cleared.
    fn break_wide_char_at(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index_of(x, y) else {
            return;
        };
        if self.cells[idx].is_continuation() {
            if let Some(prev) = self.index_of(x - 1, y) {
                self.cells[prev].symbol = ' ';
            }
        }
        if let Some(next) = self.index_of(x + 1, y) {
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    /// Place one character at `(x, y)` if it lies inside both the buffer
    /// and `clip`. Zero-width characters are never written.
    pub(crate) fn put_char(&mut self, x: i32, y: i32, ch: char, style: Style, clip: Rect) -> bool {
        let width = char_width(ch);
        if width == 0 || !clip.contains(x, y) || !self.in_bounds(x, y) {
            return false;
        }

        let wide = width == 2;
        let fits = !wide || (clip.contains(x + 1, y) && self.in_bounds(x + 1, y));

        self.break_wide_char_at(x, y);
        if wide && fits {
            self.break_wide_char_at(x + 1, y);
        }

        // A half-visible wide char is terminal garbage; show a space.
        let symbol = if fits { ch } else { ' ' };
        self.set(x, y, Cell::styled(symbol, style));
        if wide && fits {
            self.set(x + 1, y, Cell::continuation(style));
        }
        true
    }

    // ─── Text Painting ───────────────────────────────────────────────────

    /// Paint a single line of text starting at `(x, y)`.
    ///
    /// Characters are placed left to right. Wide characters occupy two
    /// columns; zero-width characters are skipped. Columns outside the
    /// buffer or outside `clip` are not written, but still advance the
    /// cursor, so text may start off-screen to the left.
    ///
    /// Returns the number of columns the text advanced before running past
    /// the right edge of the writable area.
    pub fn paint_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        style: Style,
        clip: Option<Rect>,
    ) -> u16 {
        let area = self.area();
        let Some(bounds) = clip.map_or(Some(area), |c| c.intersect(area)) else {
            return 0;
        };

        let mut col = x;
        for ch in text.chars() {
            if col >= bounds.right() {
                break;
            }
            let width = char_width(ch);
            if width == 0 {
                continue;
            }
            self.put_char(col, y, ch, style, bounds);
            col += i32::from(width);
        }

        u16::try_from(col - x).unwrap_or(u16::MAX)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Buffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// 0 for control characters, 2 for wide characters (CJK, some emoji),
/// 1 otherwise.
///
/// ```
/// use weft_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> u8 {
    match ch.width() {
        Some(0) | None => 0,
        Some(1) => 1,
        Some(_) => 2,
    }
}

/// Display width of a string in terminal columns.
///
/// ```
/// use weft_term::buffer::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("a中b"), 4);
/// ```
#[inline]
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(|ch| usize::from(char_width(ch))).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
