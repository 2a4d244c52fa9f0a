// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `CellWriter`'s job. This
// module only knows the byte-level encoding of every command we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal.
//
// Style changes are encoded as ONE CSI sequence: the decoration-off codes
// for flags that went away, the decoration-on codes for flags that
// appeared, then whichever colors changed. `\x1b[22;3;38;5;200m` beats
// three separate sequences on every busy frame.

use std::fmt::Display;
use std::io::{self, Write};

use crate::color::Color;
use crate::decoration::Decoration;
use crate::style::Style;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP. ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// The stateful writer must invalidate its tracked style after this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Style (SGR) ─────────────────────────────────────────────────────────────

/// Decoration-on codes in emission order.
const ON_CODES: &[(Decoration, u8)] = &[
    (Decoration::BOLD, 1),
    (Decoration::DIM, 2),
    (Decoration::ITALIC, 3),
    (Decoration::UNDERLINED, 4),
    (Decoration::SLOW_BLINK, 5),
    (Decoration::RAPID_BLINK, 6),
    (Decoration::INVERT, 7),
    (Decoration::CONCEAL, 8),
    (Decoration::STRIKETHROUGH, 9),
];

/// Decoration-off codes. One code may switch off a whole group
/// (SGR 22 ends both bold and dim), so each entry names the group.
const OFF_CODES: &[(Decoration, u8)] = &[
    (Decoration::BOLD.union(Decoration::DIM), 22),
    (Decoration::ITALIC, 23),
    (Decoration::UNDERLINED, 24),
    (Decoration::SLOW_BLINK.union(Decoration::RAPID_BLINK), 25),
    (Decoration::INVERT, 27),
    (Decoration::CONCEAL, 28),
    (Decoration::STRIKETHROUGH, 29),
];

/// Accumulates semicolon-separated SGR parameters into one sequence.
struct Sgr<'w, W: Write> {
    w: &'w mut W,
    open: bool,
}

impl<'w, W: Write> Sgr<'w, W> {
    const fn new(w: &'w mut W) -> Self {
        Self { w, open: false }
    }

    fn param(&mut self, p: impl Display) -> io::Result<()> {
        self.w.write_all(if self.open { b";" } else { b"\x1b[" })?;
        self.open = true;
        write!(self.w, "{p}")
    }

    /// Color parameters. `base` is 30 for foreground, 40 for background.
    ///
    /// Compact codes for the 16 ANSI colors (30–37 / 90–97 and their
    /// background twins), `38;5;N` for other palette slots, `38;2;R;G;B`
    /// for `TrueColor`.
    fn color(&mut self, color: Color, base: u8) -> io::Result<()> {
        match color {
            Color::Default => self.param(base + 9),
            Color::Indexed(idx) if idx < 8 => self.param(base + idx),
            Color::Indexed(idx) if idx < 16 => self.param(base + 52 + idx),
            Color::Indexed(idx) => {
                self.param(base + 8)?;
                self.param(5)?;
                self.param(idx)
            }
            Color::Rgb(r, g, b) => {
                self.param(base + 8)?;
                self.param(2)?;
                self.param(r)?;
                self.param(g)?;
                self.param(b)
            }
        }
    }

    fn finish(self) -> io::Result<()> {
        if self.open {
            self.w.write_all(b"m")
        } else {
            Ok(())
        }
    }
}

/// Emit the SGR sequence that takes the terminal from `from` to `to`.
///
/// `from = None` means the terminal's current style is unknown: the
/// sequence starts with `0` (reset) and then sets everything `to` needs.
/// When `from == Some(to)` nothing is written.
///
/// ```
/// use weft_term::ansi::style_change;
/// use weft_term::color::Color;
/// use weft_term::decoration::Decoration;
/// use weft_term::style::Style;
///
/// let mut out = Vec::new();
/// let bold_red = Style::new().fg(Color::RED).decoration(Decoration::BOLD);
/// style_change(&mut out, None, bold_red).unwrap();
/// assert_eq!(out, b"\x1b[0;1;91m");
/// ```
pub fn style_change(w: &mut impl Write, from: Option<Style>, to: Style) -> io::Result<()> {
    let mut sgr = Sgr::new(w);
    let prev = match from {
        Some(prev) if prev == to => return Ok(()),
        Some(prev) => prev,
        None => {
            sgr.param(0)?;
            Style::PLAIN
        }
    };

    let removed = prev.decoration.difference(to.decoration);
    let mut turn_on = to.decoration.difference(prev.decoration);

    for &(group, code) in OFF_CODES {
        if removed.intersects(group) {
            sgr.param(code)?;
            // The off code cleared the whole group; restore survivors.
            turn_on |= to.decoration.intersection(group);
        }
    }
    for &(flag, code) in ON_CODES {
        if turn_on.contains(flag) {
            sgr.param(code)?;
        }
    }

    if prev.fg != to.fg {
        sgr.color(to.fg, 30)?;
    }
    if prev.bg != to.bg {
        sgr.color(to.bg, 40)?;
    }

    sgr.finish()
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// The terminal buffers everything until [`end_sync`], so a frame never
/// appears half-drawn.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output; the terminal presents the buffered frame.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ────────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore the original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
