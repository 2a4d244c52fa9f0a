// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer: accumulates a whole frame's bytes in memory so the
//   backend receives it in a single write.
//
//   CellWriter: tracks the terminal's cursor position and current style
//   and skips redundant escape sequences. Two adjacent cells with the same
//   style cost exactly their UTF-8 bytes: no cursor move, no SGR.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::style::Style;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame of ANSI output.
///
/// Default capacity: 16 KB, enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a character as UTF-8.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // The backend owns real flushing.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that skips redundant escapes.
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)`,
///   since the terminal advances after each character.
/// - **Style**: emitted as one combined SGR sequence, only when it differs
///   from the last emitted style. The last style carries over between
///   frames; unknown state (after [`reset_state`](Self::reset_state))
///   starts the sequence with `0`.
/// - **Wide chars**: a continuation cell right after its owner produces
///   nothing; the terminal already drew both columns.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_style: Option<Style>,
    style_changes: usize,
    cursor_moves: usize,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_style: None,
            style_changes: 0,
            cursor_moves: 0,
        }
    }

    /// Forget cursor position, style, and counters. Call when the
    /// terminal's actual state is unknown.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Start a new frame: forget the cursor position and zero the
    /// counters, keeping the last emitted style.
    pub const fn begin_frame(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
        self.style_changes = 0;
        self.cursor_moves = 0;
    }

    /// Emit a full SGR reset. The terminal style is then known to be
    /// [`Style::PLAIN`].
    pub fn reset_style(&mut self, out: &mut OutputBuffer) {
        ansi::reset(out).ok();
        self.last_style = Some(Style::PLAIN);
        self.style_changes += 1;
    }

    /// SGR sequences emitted since the frame began.
    #[inline]
    #[must_use]
    pub const fn style_changes(&self) -> usize {
        self.style_changes
    }

    /// Cursor-position sequences emitted since the frame began.
    #[inline]
    #[must_use]
    pub const fn cursor_moves(&self) -> usize {
        self.cursor_moves
    }

    /// Render a single cell, emitting only the escapes it needs.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if cell.is_continuation() && self.last_y == yi && self.last_x == xi - 1 {
            // Drawn together with its owner.
            self.last_x = xi;
            return;
        }

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
            self.cursor_moves += 1;
        }

        self.apply_style(out, cell.style);

        // An orphan continuation gets a space so its background still shows.
        out.write_char(cell.character().unwrap_or(' '));

        self.last_x = xi;
        self.last_y = yi;
    }

    fn apply_style(&mut self, out: &mut OutputBuffer, style: Style) {
        if self.last_style == Some(style) {
            return;
        }
        ansi::style_change(out, self.last_style, style).ok();
        self.last_style = Some(style);
        self.style_changes += 1;
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::decoration::Decoration;

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
    }

    #[test]
    fn output_buffer_write_char_unicode() {
        let mut buf = OutputBuffer::new();
        buf.write_char('A');
        buf.write_char('中');
        buf.write_char('🔥');
        assert_eq!(buf.as_bytes(), "A中🔥".as_bytes());
    }

    #[test]
    fn output_buffer_clear_keeps_capacity() {
        let mut buf = OutputBuffer::new();
        write!(buf, "some data").unwrap();
        let cap = buf.buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), cap);
    }

    // ── CellWriter: helpers ────────────────────────────────────────────

    /// Render a sequence of cells; return the output and the writer.
    fn render_seq(cells: &[(u16, u16, Cell)]) -> (String, CellWriter) {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        for &(x, y, ref cell) in cells {
            writer.render_cell(&mut out, x, y, cell);
        }
        (String::from_utf8(out.as_bytes().to_vec()).unwrap(), writer)
    }

    // ── CellWriter: cursor ─────────────────────────────────────────────

    #[test]
    fn first_cell_moves_cursor_and_resets_style() {
        let (out, writer) = render_seq(&[(5, 3, Cell::new('A'))]);
        assert_eq!(out, "\x1b[4;6H\x1b[0mA");
        assert_eq!(writer.cursor_moves(), 1);
        assert_eq!(writer.style_changes(), 1);
    }

    #[test]
    fn sequential_cells_skip_cursor_move() {
        let (out, writer) = render_seq(&[
            (0, 0, Cell::new('A')),
            (1, 0, Cell::new('B')),
            (2, 0, Cell::new('C')),
        ]);
        assert_eq!(out, "\x1b[1;1H\x1b[0mABC");
        assert_eq!(writer.cursor_moves(), 1);
    }

    #[test]
    fn gaps_and_new_rows_move_cursor() {
        let (out, writer) = render_seq(&[
            (0, 0, Cell::new('A')),
            (5, 0, Cell::new('B')),
            (5, 1, Cell::new('C')),
        ]);
        assert_eq!(writer.cursor_moves(), 3);
        assert!(out.contains("\x1b[1;6HB"));
        assert!(out.contains("\x1b[2;6HC"));
    }

    // ── CellWriter: style ──────────────────────────────────────────────

    #[test]
    fn same_style_not_re_emitted() {
        let red = Style::new().fg(Color::Rgb(255, 0, 0));
        let (out, writer) = render_seq(&[
            (0, 0, Cell::styled('A', red)),
            (1, 0, Cell::styled('B', red)),
        ]);
        assert_eq!(out, "\x1b[1;1H\x1b[0;38;2;255;0;0mAB");
        assert_eq!(writer.style_changes(), 1);
    }

    #[test]
    fn style_change_is_one_sequence() {
        let a = Style::new().fg(Color::RED).decoration(Decoration::BOLD);
        let b = Style::new().bg(Color::BLUE).decoration(Decoration::ITALIC);
        let (out, writer) = render_seq(&[(0, 0, Cell::styled('a', a)), (1, 0, Cell::styled('b', b))]);
        assert_eq!(out, "\x1b[1;1H\x1b[0;1;91ma\x1b[22;3;39;104mb");
        assert_eq!(writer.style_changes(), 2);
    }

    #[test]
    fn reset_state_forgets_style() {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        writer.render_cell(&mut out, 0, 0, &Cell::new('x'));
        writer.reset_state();
        assert_eq!(writer.style_changes(), 0);
        out.clear();
        writer.render_cell(&mut out, 1, 0, &Cell::new('y'));
        assert_eq!(out.as_bytes(), b"\x1b[1;2H\x1b[0my");
    }

    #[test]
    fn style_carries_over_between_frames() {
        let red = Style::new().fg(Color::RED);
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        writer.render_cell(&mut out, 0, 0, &Cell::styled('a', red));

        writer.begin_frame();
        out.clear();
        writer.render_cell(&mut out, 1, 0, &Cell::styled('b', red));
        writer.render_cell(&mut out, 2, 0, &Cell::new('c'));
        assert_eq!(out.as_bytes(), b"\x1b[1;2Hb\x1b[39mc");
        assert_eq!(writer.style_changes(), 1);
        assert_eq!(writer.cursor_moves(), 1);
    }

    #[test]
    fn reset_style_is_counted_and_known_plain() {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        writer.reset_style(&mut out);
        writer.render_cell(&mut out, 0, 0, &Cell::new('x'));
        assert_eq!(out.as_bytes(), b"\x1b[0m\x1b[1;1Hx");
        assert_eq!(writer.style_changes(), 1);
    }

    // ── CellWriter: wide chars ─────────────────────────────────────────

    #[test]
    fn continuation_after_owner_is_silent() {
        let (out, writer) = render_seq(&[
            (0, 0, Cell::new('中')),
            (1, 0, Cell::continuation(Style::PLAIN)),
            (2, 0, Cell::new('x')),
        ]);
        assert_eq!(out, "\x1b[1;1H\x1b[0m中x");
        assert_eq!(writer.cursor_moves(), 1);
    }

    #[test]
    fn orphan_continuation_writes_space() {
        let bg = Style::new().bg(Color::TEAL);
        let (out, _) = render_seq(&[(4, 0, Cell::continuation(bg))]);
        assert_eq!(out, "\x1b[1;5H\x1b[0;46m ");
    }
}
