// SPDX-License-Identifier: MIT
//
// Terminal backends: where frames go and where keys come from.
//
// The renderer only needs a viewport size, a byte sink, and a flush. The
// host loop additionally polls for keys. `Backend` is that boundary; it is
// chosen once at startup and fixed for the life of the process.
//
//   AnsiBackend: the real terminal: raw mode and alternate screen through
//   the RAII `Terminal` guard, stdin read on a background thread, bytes
//   decoded into keys by `input::Parser`.
//
//   TestBackend: in-memory. Fixed size, captures written bytes, replays
//   scripted keys. Renderer tests run against it without a TTY.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::input::{KeyEvent, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

/// How long input must be quiet before a pending lone ESC counts as the
/// Escape key.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

// ─── Backend Trait ───────────────────────────────────────────────────────────

/// Host environment the renderer draws into.
pub trait Backend {
    /// Viewport size in cells, queried once per frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the size can't be determined.
    fn size(&self) -> io::Result<Size>;

    /// Write one frame's bytes. Blocking.
    ///
    /// # Errors
    ///
    /// Propagates the sink's I/O error.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Push written bytes to the device.
    ///
    /// # Errors
    ///
    /// Propagates the sink's I/O error.
    fn flush(&mut self) -> io::Result<()>;

    /// Whether a key can be read without blocking.
    fn key_available(&mut self) -> bool;

    /// Next key, or `None` if nothing is waiting. Never blocks.
    fn read_key(&mut self) -> Option<KeyEvent>;

    /// Whether input has ended for good: the source is closed and every
    /// key it produced has been read.
    fn input_closed(&self) -> bool {
        false
    }
}

// ─── AnsiBackend ─────────────────────────────────────────────────────────────

/// ANSI/VT100 terminal on stdin/stdout.
///
/// Creating it enters TUI mode; dropping it restores the terminal.
///
/// ```no_run
/// use weft_term::backend::{AnsiBackend, Backend};
///
/// let mut backend = AnsiBackend::new()?;
/// while backend.read_key().is_none() {
///     std::thread::sleep(std::time::Duration::from_millis(10));
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct AnsiBackend {
    // Field order is drop order: stop the reader before restoring the terminal.
    reader: StdinReader,
    keys: KeyQueue,
    terminal: Terminal,
    stdout: io::Stdout,
}

impl AnsiBackend {
    /// Enter raw mode and the alternate screen, and start reading stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be configured or the reader
    /// thread can't be spawned.
    pub fn new() -> io::Result<Self> {
        let mut terminal = Terminal::new();
        terminal.enter()?;
        let (reader, input) = StdinReader::spawn()?;
        debug!("ansi backend ready");

        Ok(Self {
            reader,
            keys: KeyQueue::new(input),
            terminal,
            stdout: io::stdout(),
        })
    }

    /// The terminal guard.
    #[must_use]
    pub const fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}

impl Backend for AnsiBackend {
    fn size(&self) -> io::Result<Size> {
        Ok(self.terminal.size())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }

    fn key_available(&mut self) -> bool {
        self.keys.pump();
        self.keys.has_keys()
    }

    fn read_key(&mut self) -> Option<KeyEvent> {
        self.keys.pump();
        self.keys.pop()
    }

    fn input_closed(&self) -> bool {
        self.keys.is_closed()
    }
}

impl Drop for AnsiBackend {
    fn drop(&mut self) {
        self.reader.stop();
        let _ = self.terminal.leave();
    }
}

// ─── KeyQueue ────────────────────────────────────────────────────────────────

/// Decoded keys from the stdin reader's channel.
struct KeyQueue {
    input: Receiver<Vec<u8>>,
    parser: Parser,
    pending: VecDeque<KeyEvent>,
    last_input: Instant,
    disconnected: bool,
}

impl KeyQueue {
    fn new(input: Receiver<Vec<u8>>) -> Self {
        Self {
            input,
            parser: Parser::new(),
            pending: VecDeque::new(),
            last_input: Instant::now(),
            disconnected: false,
        }
    }

    /// Drain the channel into decoded keys.
    fn pump(&mut self) {
        while !self.disconnected {
            match self.input.try_recv() {
                Ok(bytes) => {
                    self.last_input = Instant::now();
                    self.pending.extend(self.parser.advance(&bytes));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("stdin reader stopped; no more input");
                    self.disconnected = true;
                }
            }
        }

        // No more bytes can complete a partial sequence once the reader is gone.
        if self.parser.has_pending()
            && (self.disconnected || self.last_input.elapsed() >= ESCAPE_TIMEOUT)
        {
            self.pending.extend(self.parser.flush());
        }
    }

    fn has_keys(&self) -> bool {
        !self.pending.is_empty()
    }

    fn pop(&mut self) -> Option<KeyEvent> {
        self.pending.pop_front()
    }

    fn is_closed(&self) -> bool {
        self.disconnected && self.pending.is_empty() && !self.parser.has_pending()
    }
}

// ─── TestBackend ─────────────────────────────────────────────────────────────

/// In-memory backend for tests.
#[derive(Debug)]
pub struct TestBackend {
    size: Size,
    written: Vec<u8>,
    flushes: usize,
    keys: VecDeque<KeyEvent>,
    closed: bool,
}

impl TestBackend {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: Size { cols, rows },
            written: Vec::new(),
            flushes: 0,
            keys: VecDeque::new(),
            closed: false,
        }
    }

    /// Change the reported size; the renderer picks it up next frame.
    pub const fn set_size(&mut self, cols: u16, rows: u16) {
        self.size = Size { cols, rows };
    }

    /// Queue a key for `read_key`.
    pub fn push_key(&mut self, key: KeyEvent) {
        self.keys.push_back(key);
    }

    /// End input: once the queued keys are read, `input_closed` is true.
    pub const fn close_input(&mut self) {
        self.closed = true;
    }

    /// Everything written since creation or the last `clear_written`.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes as text (lossy).
    #[must_use]
    pub fn written_str(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    pub fn clear_written(&mut self) {
        self.written.clear();
    }

    /// Number of `flush` calls.
    #[must_use]
    pub const fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Backend for TestBackend {
    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn key_available(&mut self) -> bool {
        !self.keys.is_empty()
    }

    fn read_key(&mut self) -> Option<KeyEvent> {
        self.keys.pop_front()
    }

    fn input_closed(&self) -> bool {
        self.closed && self.keys.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
