// SPDX-License-Identifier: MIT
//
// Key decoding.
//
// Turns raw stdin bytes into `KeyEvent`s for the host loop:
//
// - ASCII and multi-byte UTF-8 characters
// - Enter, Tab, Backspace, Escape, Ctrl+letter
// - CSI sequences for arrows, Home/End, Delete, PageUp/PageDown,
//   including xterm modifier parameters (`ESC [ 1 ; 5 C`)
// - SS3 arrows and Home/End (application cursor mode)
// - Alt+key (ESC followed by a printable character)
//
// Escape sequences can span several `read()` calls, so the parser keeps
// unconsumed bytes between calls. A lone ESC is ambiguous: it may be the
// Escape key or the start of a sequence. It stays pending until more bytes
// arrive or the caller decides the input has gone quiet and calls
// [`Parser::flush`].

use bitflags::bitflags;

// ─── Key Types ───────────────────────────────────────────────────────────────

/// A decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }
}

/// Key identity, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys held during a keypress.
    ///
    /// Bit values follow the xterm encoding, where the CSI modifier
    /// parameter is `1 + bits`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// ```
/// use weft_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let keys = parser.advance(b"a\x1b[A");
/// assert_eq!(keys, vec![
///     KeyEvent::plain(KeyCode::Char('a')),
///     KeyEvent::plain(KeyCode::Up),
/// ]);
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed bytes and return every key that is now complete.
    ///
    /// Incomplete sequences stay buffered for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Emit pending bytes as literal keys.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]; other printable leftovers
    /// become characters. Partial UTF-8 is dropped.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(b as char))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

enum Parsed {
    /// A key, and how many bytes it used.
    Key(KeyEvent, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized input; drop this many bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Skip(0);
    };

    match lead {
        0x1B => parse_escape(buf),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        b @ 0x01..=0x1A => Parsed::Key(ctrl_letter(b, Modifiers::CTRL), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(KeyEvent::new(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::new(KeyCode::Char(b as char), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Key(ctrl_letter(b, Modifiers::CTRL | Modifiers::ALT), 2),
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

/// `ESC [ params final`.
fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes run until a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let consumed = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => return Parsed::Key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT), consumed),
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        },
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent::new(code, modifiers), consumed)
}

/// `ESC O final`: cursor keys in application mode.
fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&last) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match last {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Key(KeyEvent::plain(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Control byte 0x01..=0x1A to its letter.
const fn ctrl_letter(byte: u8, modifiers: Modifiers) -> KeyEvent {
    KeyEvent::new(KeyCode::Char((byte - 1 + b'a') as char), modifiers)
}

/// Semicolon-separated decimal parameters. Empty fields are 0; colon
/// sub-parameters are ignored.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
                })
        })
        .collect()
}

/// xterm modifier parameter (`1 + bits`) to flags. Unknown bits drop out.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = param.saturating_sub(1);
    Modifiers::from_bits_truncate(bits as u8)
}

/// UTF-8 sequence length from its lead byte; 0 for an invalid lead.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
