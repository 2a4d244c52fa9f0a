// SPDX-License-Identifier: MIT
//
// Widgets and the render context they paint through.
//
// A widget never sees the buffer directly. It receives a `RenderContext`
// scoped to the rectangle its parent assigned: coordinates are local to
// that rectangle's origin, and every write is translated and then clipped
// against the context's clip rect before reaching the buffer. Composition
// is just `ctx.render(&child, sub_rect)`, which narrows the clip to the
// intersection, so a child can never write outside its parent.

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::color::Color;
use crate::rect::Rect;
use crate::style::Style;

// ─── Widget ──────────────────────────────────────────────────────────────────

/// Anything that can paint itself into a [`RenderContext`].
///
/// Painting has no return value; its only side effects are cell writes
/// through the context.
pub trait Widget {
    fn paint(&self, ctx: &mut RenderContext<'_>);
}

impl<W: Widget + ?Sized> Widget for &W {
    #[inline]
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        (**self).paint(ctx);
    }
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    #[inline]
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        (**self).paint(ctx);
    }
}

/// A widget backed by a closure. Built with [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F: Fn(&mut RenderContext<'_>)> Widget for FromFn<F> {
    #[inline]
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        (self.0)(ctx);
    }
}

/// Turn a closure into a widget.
///
/// ```
/// use weft_term::buffer::Buffer;
/// use weft_term::style::Style;
/// use weft_term::widget::{from_fn, RenderContext};
///
/// let hello = from_fn(|ctx: &mut RenderContext<'_>| {
///     ctx.set_string(0, 0, "hi", Style::PLAIN);
/// });
/// let mut buf = Buffer::new(4, 1);
/// RenderContext::new(&mut buf).draw(&hello);
/// assert_eq!(buf.row_text(0), "hi  ");
/// ```
pub const fn from_fn<F: Fn(&mut RenderContext<'_>)>(f: F) -> FromFn<F> {
    FromFn(f)
}

// ─── RenderContext ───────────────────────────────────────────────────────────

/// A view of a [`Buffer`] restricted to one widget's rectangle.
pub struct RenderContext<'a> {
    buffer: &'a mut Buffer,
    /// Absolute rectangle; its origin is local `(0, 0)`.
    area: Rect,
    /// Absolute clip, always inside both `area` and the buffer.
    clip: Rect,
}

impl<'a> RenderContext<'a> {
    /// A root context covering the whole buffer.
    #[must_use]
    pub fn new(buffer: &'a mut Buffer) -> Self {
        let area = buffer.area();
        Self {
            buffer,
            area,
            clip: area,
        }
    }

    /// The local rectangle a widget may paint in: origin `(0, 0)`, the
    /// size of the assigned area.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        Rect::sized(self.area.width, self.area.height)
    }

    /// The assigned area in absolute buffer coordinates.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// The absolute clip rectangle.
    #[inline]
    #[must_use]
    pub const fn clip(&self) -> Rect {
        self.clip
    }

    /// Translate local coordinates to absolute ones, or `None` if the
    /// point falls outside the clip.
    fn absolute(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let (ax, ay) = (self.area.x.saturating_add(x), self.area.y.saturating_add(y));
        self.clip.contains(ax, ay).then_some((ax, ay))
    }

    // ─── Composition ─────────────────────────────────────────────────────

    /// Paint `widget` over this context's whole area.
    pub fn draw<W: Widget + ?Sized>(&mut self, widget: &W) {
        widget.paint(self);
    }

    /// Paint `widget` into `rect`, given in local coordinates.
    ///
    /// The child's origin is `rect`'s origin; its clip is `rect`
    /// intersected with this context's clip. If nothing of `rect` is
    /// visible the widget is not invoked.
    pub fn render<W: Widget + ?Sized>(&mut self, widget: &W, rect: Rect) {
        let area = rect.offset(self.area.x, self.area.y);
        let Some(clip) = area.intersect(self.clip) else {
            return;
        };
        let mut child = RenderContext {
            buffer: &mut *self.buffer,
            area,
            clip,
        };
        widget.paint(&mut child);
    }

    // ─── Cell Writes ─────────────────────────────────────────────────────

    /// Write a symbol, keeping the cell's style. Returns `false` if clipped.
    pub fn set_symbol(&mut self, x: i32, y: i32, symbol: char) -> bool {
        let Some((ax, ay)) = self.absolute(x, y) else {
            return false;
        };
        let Some(style) = self.buffer.get(ax, ay).map(|c| c.style) else {
            return false;
        };
        self.buffer.put_char(ax, ay, symbol, style, self.clip)
    }

    /// Replace a cell's style. Returns `false` if clipped.
    pub fn set_style(&mut self, x: i32, y: i32, style: Style) -> bool {
        self.absolute(x, y)
            .is_some_and(|(ax, ay)| self.buffer.set_style(ax, ay, style))
    }

    /// Replace a cell's foreground color. Returns `false` if clipped.
    pub fn set_foreground(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.absolute(x, y)
            .is_some_and(|(ax, ay)| self.buffer.set_foreground(ax, ay, color))
    }

    /// Replace a cell's background color. Returns `false` if clipped.
    pub fn set_background(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.absolute(x, y)
            .is_some_and(|(ax, ay)| self.buffer.set_background(ax, ay, color))
    }

    /// Write a symbol and style together. Returns `false` if clipped.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        self.absolute(x, y)
            .is_some_and(|(ax, ay)| self.buffer.put_char(ax, ay, cell.symbol, cell.style, self.clip))
    }

    /// Paint one line of text at local `(x, y)`. Returns the columns the
    /// text advanced (see [`Buffer::paint_text`]).
    pub fn set_string(&mut self, x: i32, y: i32, text: &str, style: Style) -> u16 {
        let (ax, ay) = (self.area.x.saturating_add(x), self.area.y.saturating_add(y));
        self.buffer.paint_text(ax, ay, text, style, Some(self.clip))
    }

    // ─── Region Writes ───────────────────────────────────────────────────

    /// Overwrite the visible part of local `rect` with `symbol` in `style`.
    pub fn clear(&mut self, rect: Rect, symbol: char, style: Style) {
        let area = rect.offset(self.area.x, self.area.y);
        if let Some(r) = area.intersect(self.clip) {
            self.buffer.clear_rect(r, symbol, style);
        }
    }

    /// Overwrite every visible cell with `symbol` in `style`.
    pub fn fill(&mut self, symbol: char, style: Style) {
        self.buffer.clear_rect(self.clip, symbol, style);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
