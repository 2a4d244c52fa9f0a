// SPDX-License-Identifier: MIT
//
// Frame loop driver.
//
// The renderer owns two buffers. Each frame:
//
//   1. Query the viewport size; on change, resize both buffers and force
//      a full redraw.
//   2. Clear the current buffer and let the caller paint it through a
//      root `RenderContext`.
//   3. Diff current against previous, hand the bytes to the backend in a
//      single write, flush.
//   4. Swap the buffers, so what was just emitted becomes "previous".
//   5. Optionally sleep out the rest of the frame budget.
//
// Everything is synchronous. If the write fails the buffers are not
// swapped and the next frame redraws the whole screen.

use std::io;
use std::mem;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, trace};

use crate::backend::Backend;
use crate::buffer::Buffer;
use crate::diff::{DiffRenderer, RenderStats};
use crate::terminal::Size;
use crate::widget::{RenderContext, Widget};

// ─── Config ──────────────────────────────────────────────────────────────────

/// Renderer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Frames per second to pace to. `None` or `Some(0)` never sleeps.
    pub target_fps: Option<u32>,
    /// Wrap non-empty frames in DEC 2026 synchronized-output markers.
    pub synchronized_output: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            target_fps: None,
            synchronized_output: true,
        }
    }
}

impl RendererConfig {
    /// Time budget for one frame, if paced.
    #[must_use]
    pub fn frame_budget(&self) -> Option<Duration> {
        self.target_fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs(1) / fps)
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Double-buffered differential renderer over a [`Backend`].
///
/// ```
/// use weft_term::backend::TestBackend;
/// use weft_term::renderer::{Renderer, RendererConfig};
/// use weft_term::style::Style;
///
/// let mut renderer = Renderer::new(TestBackend::new(20, 2), RendererConfig::default());
/// renderer.draw(|ctx, _elapsed| {
///     ctx.set_string(0, 0, "hello", Style::PLAIN);
/// })?;
/// assert_eq!(renderer.last_frame().row_text(0).trim_end(), "hello");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Renderer<B: Backend> {
    backend: B,
    config: RendererConfig,
    current: Buffer,
    previous: Buffer,
    diff: DiffRenderer,
    force: bool,
    frame_count: u64,
    last_frame_at: Option<Instant>,
}

impl<B: Backend> Renderer<B> {
    #[must_use]
    pub fn new(backend: B, config: RendererConfig) -> Self {
        let mut diff = DiffRenderer::new();
        diff.set_synchronized_output(config.synchronized_output);
        Self {
            backend,
            config,
            current: Buffer::new(0, 0),
            previous: Buffer::new(0, 0),
            diff,
            force: true,
            frame_count: 0,
            last_frame_at: None,
        }
    }

    /// Build and flush one frame.
    ///
    /// `build` paints into a context covering the whole viewport and
    /// receives the time since the previous frame started (zero on the
    /// first frame).
    ///
    /// # Errors
    ///
    /// Propagates backend size, write, and flush errors.
    pub fn draw<F>(&mut self, build: F) -> io::Result<RenderStats>
    where
        F: FnOnce(&mut RenderContext<'_>, Duration),
    {
        let _span = debug_span!("weft.render.frame", frame = self.frame_count).entered();

        let size = self.backend.size()?;
        if size.cols != self.current.width() || size.rows != self.current.height() {
            debug!(cols = size.cols, rows = size.rows, "viewport resized");
            self.current.resize(size.cols, size.rows);
            self.previous.resize(size.cols, size.rows);
            self.force = true;
        }

        let started = Instant::now();
        let elapsed = self
            .last_frame_at
            .map_or(Duration::ZERO, |t| started.duration_since(t));
        self.last_frame_at = Some(started);

        self.current.clear();
        build(&mut RenderContext::new(&mut self.current), elapsed);

        let stats = self.diff.render(&self.previous, &self.current, self.force);
        let bytes = self.diff.output_bytes();
        if !bytes.is_empty() {
            if let Err(err) = self.backend.write(bytes).and_then(|()| self.backend.flush()) {
                self.force = true;
                return Err(err);
            }
        }

        self.force = false;
        mem::swap(&mut self.previous, &mut self.current);
        self.frame_count += 1;

        trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            style_changes = stats.style_changes,
            cursor_moves = stats.cursor_moves,
            bytes = stats.bytes_written,
            "frame flushed"
        );

        self.pace(started);
        Ok(stats)
    }

    /// Draw a single root widget over the whole viewport.
    ///
    /// # Errors
    ///
    /// Same as [`draw`](Self::draw).
    pub fn draw_widget<W: Widget + ?Sized>(&mut self, widget: &W) -> io::Result<RenderStats> {
        self.draw(|ctx, _| ctx.draw(widget))
    }

    /// Repaint every cell on the next frame.
    pub fn force_redraw(&mut self) {
        debug!("forced redraw");
        self.force = true;
    }

    /// Frames successfully flushed.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Size of the last emitted frame.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            cols: self.previous.width(),
            rows: self.previous.height(),
        }
    }

    /// The buffer emitted by the last frame.
    #[inline]
    #[must_use]
    pub const fn last_frame(&self) -> &Buffer {
        &self.previous
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Change the pacing target. Takes effect on the next frame.
    pub const fn set_target_fps(&mut self, fps: Option<u32>) {
        self.config.target_fps = fps;
    }

    #[inline]
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Sleep whatever is left of the frame budget.
    fn pace(&self, started: Instant) {
        let Some(budget) = self.config.frame_budget() else {
            return;
        };
        if let Some(rest) = budget.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
