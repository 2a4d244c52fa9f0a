// SPDX-License-Identifier: MIT
//
// Differential renderer: the flush half of every frame.
//
// Instead of redrawing the whole screen each frame, the freshly painted
// buffer is compared against the previously emitted one and escape
// sequences are produced only for cells that changed.
//
// The pipeline per frame:
//
//   1. Widgets paint into the "current" buffer.
//   2. DiffRenderer::render() compares it with the "previous" buffer.
//   3. Changed cells go through CellWriter, which skips redundant cursor
//      moves and style sequences.
//   4. Everything lands in OutputBuffer; the caller hands those bytes to
//      the backend in one write.
//
// Optimizations:
//
//   - Row-level skip: unchanged rows are detected with one slice compare.
//   - A full redraw (first frame, resize, forced) clears the screen and
//     then diffs against an all-empty frame, so blank cells cost nothing.
//   - A frame with no changes produces zero bytes: no sync markers, no reset.
//   - The terminal's style carries over between frames, so a changed cell
//     costs at most one SGR. Only a full redraw starts from a reset.
//   - Synchronized output (DEC 2026) optionally wraps non-empty frames.

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from one frame's diff pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were written.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// SGR sequences emitted, the full-redraw reset included.
    pub style_changes: usize,
    /// Cursor-position sequences emitted.
    pub cursor_moves: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Turns a pair of frames into the minimal byte stream between them.
///
/// ```
/// use weft_term::buffer::Buffer;
/// use weft_term::diff::DiffRenderer;
///
/// let previous = Buffer::new(10, 2);
/// let mut current = previous.clone();
/// current.set_symbol(3, 1, 'X');
///
/// let mut diff = DiffRenderer::new();
/// let stats = diff.render(&previous, &current, false);
/// assert_eq!(stats.cells_rendered, 1);
/// assert!(!diff.output_bytes().is_empty());
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    synchronized: bool,
}

impl DiffRenderer {
    /// A renderer that wraps frames in synchronized-output markers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            synchronized: true,
        }
    }

    /// Enable or disable DEC 2026 frame wrapping.
    pub const fn set_synchronized_output(&mut self, enabled: bool) {
        self.synchronized = enabled;
    }

    /// Diff `current` against `previous` and build the frame's output.
    ///
    /// With `full_redraw`, or when the two buffers differ in size, the
    /// style is reset, the screen is cleared and `previous` is ignored.
    /// Otherwise the terminal is assumed to still show `previous` in the
    /// style this renderer last emitted. The output replaces
    /// whatever the last call produced; read it with
    /// [`output_bytes`](Self::output_bytes).
    pub fn render(&mut self, previous: &Buffer, current: &Buffer, full_redraw: bool) -> RenderStats {
        self.output.clear();

        let mut stats = RenderStats::default();
        let (width, height) = (current.width(), current.height());
        if width == 0 || height == 0 {
            return stats;
        }

        let full_redraw =
            full_redraw || previous.width() != width || previous.height() != height;

        if full_redraw {
            self.writer.reset_state();
        } else {
            self.writer.begin_frame();
        }

        if self.synchronized {
            ansi::begin_sync(&mut self.output).ok();
        }
        if full_redraw {
            self.writer.reset_style(&mut self.output);
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(row) = current.row(y) else { continue };
            let before = if full_redraw { None } else { previous.row(y) };

            if before == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            let old = |x: usize| before.map_or(Cell::EMPTY, |b| b[x]);

            for (x, cell) in (0..width).zip(row) {
                let i = usize::from(x);
                // A wide char is redrawn when either of its halves changed.
                let changed = *cell != old(i)
                    || row
                        .get(i + 1)
                        .is_some_and(|next| next.is_continuation() && *next != old(i + 1));

                if changed {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        if stats.cells_rendered == 0 && !full_redraw {
            self.output.clear();
            return stats;
        }

        if self.synchronized {
            ansi::end_sync(&mut self.output).ok();
        }

        stats.style_changes = self.writer.style_changes();
        stats.cursor_moves = self.writer.cursor_moves();
        stats.bytes_written = self.output.len();
        stats
    }

    /// The bytes produced by the last [`render`](Self::render).
    #[inline]
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }
}

impl Default for DiffRenderer {
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
    use crate::style::Style;

    /// Diff two frames; return (stats, output string).
    fn diff(previous: &Buffer, current: &Buffer, full: bool) -> (RenderStats, String) {
        let mut renderer = DiffRenderer::new();
        let stats = renderer.render(previous, current, full);
        let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        (stats, output)
    }

    /// SGR sequences in `output`: CSI sequences ending in `m`.
    fn sgr_count(output: &str) -> usize {
        output
            .split("\x1b[")
            .skip(1)
            .filter(|seq| {
                seq.find(|c: char| c.is_ascii_alphabetic())
                    .is_some_and(|end| seq.as_bytes()[end] == b'm')
            })
            .count()
    }

    // ── Full redraw ─────────────────────────────────────────────────────

    #[test]
    fn full_redraw_of_blank_frame_only_clears() {
        let frame = Buffer::new(10, 5);
        let (stats, output) = diff(&frame, &frame, true);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(output, "\x1b[?2026h\x1b[0m\x1b[2J\x1b[?2026l");
        assert_eq!(stats.style_changes, 1);
    }

    #[test]
    fn full_redraw_draws_non_blank_cells() {
        let mut frame = Buffer::new(4, 2);
        frame.paint_text(0, 1, "hi", Style::PLAIN, None);
        let (stats, output) = diff(&frame, &frame, true);
        assert_eq!(stats.cells_rendered, 2);
        // Plain cells need no SGR after the reset.
        assert!(output.contains("\x1b[2J\x1b[2;1Hhi"));
        assert_eq!(sgr_count(&output), 1);
    }

    #[test]
    fn size_mismatch_forces_full_redraw() {
        let small = Buffer::new(10, 5);
        let mut big = Buffer::new(20, 10);
        big.set_symbol(19, 9, 'z');
        let (stats, output) = diff(&small, &big, false);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 199);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn frame_has_sync_markers() {
        let prev = Buffer::new(3, 1);
        let mut cur = prev.clone();
        cur.set_symbol(0, 0, 'a');
        let (_, output) = diff(&prev, &cur, false);
        assert_eq!(output, "\x1b[?2026h\x1b[1;1H\x1b[0ma\x1b[?2026l");
    }

    #[test]
    fn sync_markers_can_be_disabled() {
        let prev = Buffer::new(3, 1);
        let mut cur = prev.clone();
        cur.set_symbol(2, 0, 'a');
        let mut renderer = DiffRenderer::new();
        renderer.set_synchronized_output(false);
        renderer.render(&prev, &cur, false);
        assert_eq!(renderer.output_bytes(), b"\x1b[1;3H\x1b[0ma");
    }

    // ── Identical frames ────────────────────────────────────────────────

    #[test]
    fn identical_frames_emit_nothing() {
        let mut frame = Buffer::new(10, 5);
        frame.paint_text(0, 0, "steady", Style::new().fg(Color::RED), None);
        let (stats, output) = diff(&frame, &frame, false);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(stats.style_changes, 0);
        assert_eq!(stats.bytes_written, 0);
        assert!(output.is_empty());
    }

    // ── Single change ───────────────────────────────────────────────────

    #[test]
    fn single_cell_change_is_one_write() {
        let prev = Buffer::new(10, 5);
        let mut cur = prev.clone();
        cur.set(7, 4, Cell::styled('Z', Style::new().decoration(Decoration::BOLD)));

        let (stats, output) = diff(&prev, &cur, false);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert_eq!(stats.style_changes, 1);
        assert_eq!(stats.cursor_moves, 1);
        assert_eq!(output.matches('Z').count(), 1);
        assert!(output.contains("\x1b[5;8H\x1b[0;1mZ"));
        assert_eq!(sgr_count(&output), 1);
        assert_eq!(stats.bytes_written, output.len());

        let mut renderer = DiffRenderer::new();
        renderer.set_synchronized_output(false);
        renderer.render(&prev, &cur, false);
        assert_eq!(renderer.output_bytes(), b"\x1b[5;8H\x1b[0;1mZ");
    }

    #[test]
    fn style_carries_across_frames() {
        let bold = Style::new().decoration(Decoration::BOLD);
        let blank = Buffer::new(4, 1);
        let mut first = blank.clone();
        first.set(0, 0, Cell::styled('a', bold));
        let mut second = first.clone();
        second.set(2, 0, Cell::styled('b', bold));
        let mut third = second.clone();
        third.set(3, 0, Cell::new('c'));

        let mut renderer = DiffRenderer::new();
        renderer.set_synchronized_output(false);
        renderer.render(&blank, &first, false);

        let stats = renderer.render(&first, &second, false);
        assert_eq!(renderer.output_bytes(), b"\x1b[1;3Hb");
        assert_eq!(stats.style_changes, 0);

        let stats = renderer.render(&second, &third, false);
        assert_eq!(renderer.output_bytes(), b"\x1b[1;4H\x1b[22mc");
        assert_eq!(stats.style_changes, 1);
    }

    #[test]
    fn every_changed_cell_costs_at_most_one_sgr() {
        let styles = [
            Style::new().fg(Color::RED),
            Style::new().bg(Color::BLUE).decoration(Decoration::ITALIC),
            Style::PLAIN,
            Style::new().fg(Color::Rgb(1, 2, 3)).decoration(Decoration::BOLD | Decoration::DIM),
        ];
        let mut renderer = DiffRenderer::new();
        let mut prev = Buffer::new(6, 2);
        for (i, style) in styles.iter().enumerate() {
            let mut cur = prev.clone();
            cur.paint_text(i32::try_from(i).unwrap(), 1, "xy", *style, None);
            let stats = renderer.render(&prev, &cur, false);
            let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
            assert!(sgr_count(&output) <= stats.cells_rendered, "{output:?}");
            assert_eq!(sgr_count(&output), stats.style_changes, "{output:?}");
            prev = cur;
        }
    }

    #[test]
    fn scattered_changes_render_only_changed() {
        let prev = Buffer::new(20, 10);
        let mut cur = prev.clone();
        cur.set_symbol(0, 0, 'A');
        cur.set_symbol(10, 5, 'B');
        cur.set_symbol(19, 9, 'C');

        let (stats, _) = diff(&prev, &cur, false);
        assert_eq!(stats.cells_rendered, 3);
        assert_eq!(stats.cells_skipped, 197);
        assert_eq!(stats.cursor_moves, 3);
        // Same style throughout: one SGR for the frame.
        assert_eq!(stats.style_changes, 1);
    }

    #[test]
    fn reverting_a_cell_renders_it_again() {
        let prev = Buffer::new(4, 1);
        let mut cur = prev.clone();
        cur.set_symbol(1, 0, '!');
        let (_, output) = diff(&cur, &prev, false);
        assert!(output.contains("\x1b[1;2H\x1b[0m "));
    }

    // ── Row skip ────────────────────────────────────────────────────────

    #[test]
    fn unchanged_rows_are_skipped() {
        let prev = Buffer::new(100, 50);
        let mut cur = prev.clone();
        cur.paint_text(0, 25, &"#".repeat(100), Style::PLAIN, None);

        let (stats, _) = diff(&prev, &cur, false);
        assert_eq!(stats.cells_rendered, 100);
        assert_eq!(stats.cells_skipped, 4900);
        assert_eq!(stats.cursor_moves, 1);
    }

    // ── Wide chars ──────────────────────────────────────────────────────

    #[test]
    fn continuation_change_redraws_owner() {
        let mut prev = Buffer::new(4, 1);
        prev.paint_text(0, 0, "中", Style::PLAIN, None);
        let mut cur = prev.clone();
        cur.set_background(1, 0, Color::BLUE);

        let (stats, output) = diff(&prev, &cur, false);
        assert_eq!(stats.cells_rendered, 2);
        assert!(output.contains("中"));
    }

    #[test]
    fn new_wide_char_is_written_once() {
        let prev = Buffer::new(4, 1);
        let mut cur = prev.clone();
        cur.paint_text(1, 0, "文", Style::PLAIN, None);
        let (stats, output) = diff(&prev, &cur, false);
        assert_eq!(stats.cells_rendered, 2);
        assert_eq!(stats.cursor_moves, 1);
        assert!(output.contains("\x1b[1;2H\x1b[0m文\x1b[?2026l"));
    }

    // ── Degenerate ──────────────────────────────────────────────────────

    #[test]
    fn zero_size_buffer_produces_no_output() {
        let frame = Buffer::new(0, 0);
        let (stats, output) = diff(&frame, &frame, true);
        assert_eq!(stats, RenderStats::default());
        assert!(output.is_empty());
    }

    #[test]
    fn render_stats_total_cells() {
        let stats = RenderStats {
            cells_rendered: 10,
            cells_skipped: 40,
            ..RenderStats::default()
        };
        assert_eq!(stats.total_cells(), 50);
    }
}
