// SPDX-License-Identifier: MIT
//
// Rect: an integer screen region, used both for layout and for clipping.
//
// The origin is signed so a region can sit partly off-screen (a widget
// rendered at x = -3 still gets its visible columns); sizes are unsigned
// because a negative width means nothing. Intersection is the clipping
// primitive; inflate/split are the layout primitives.

/// A rectangular region of the cell grid.
///
/// # Examples
///
/// ```
/// use weft_term::rect::Rect;
///
/// let r = Rect::new(10, 5, 80, 24);
/// assert!(r.contains(10, 5));     // top-left corner: inside
/// assert!(r.contains(89, 28));    // bottom-right corner: inside
/// assert!(!r.contains(90, 5));    // right edge is exclusive
///
/// let inner = r.inflate(-1, -1);
/// assert_eq!(inner, Rect::new(11, 6, 78, 22));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (may be negative).
    pub x: i32,
    /// Top edge (may be negative).
    pub y: i32,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn sized(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Number of cells covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.width as u32 * self.height as u32
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Overlap of two rects, or `None` if they don't overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Self::from_edges(x1, y1, x2, y2))
        } else {
            None
        }
    }

    /// Grow every side by `dx` columns and `dy` rows. Negative values
    /// shrink; a rect shrunk past nothing keeps its center with zero size.
    #[must_use]
    pub fn inflate(self, dx: i32, dy: i32) -> Self {
        let width = i32::from(self.width).saturating_add(dx.saturating_mul(2));
        let height = i32::from(self.height).saturating_add(dy.saturating_mul(2));
        let x = if width < 0 {
            self.x.saturating_add(i32::from(self.width) / 2)
        } else {
            self.x.saturating_sub(dx)
        };
        let y = if height < 0 {
            self.y.saturating_add(i32::from(self.height) / 2)
        } else {
            self.y.saturating_sub(dy)
        };
        Self::new(x, y, clamp_len(width), clamp_len(height))
    }

    /// The same rect moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }

    /// Split into a left part `at` columns wide and the remainder.
    #[must_use]
    pub fn split_horizontal(self, at: u16) -> (Self, Self) {
        let left = at.min(self.width);
        (
            Self::new(self.x, self.y, left, self.height),
            Self::new(self.x.saturating_add(i32::from(left)), self.y, self.width - left, self.height),
        )
    }

    /// Split into a top part `at` rows tall and the remainder.
    #[must_use]
    pub fn split_vertical(self, at: u16) -> (Self, Self) {
        let top = at.min(self.height);
        (
            Self::new(self.x, self.y, self.width, top),
            Self::new(self.x, self.y.saturating_add(i32::from(top)), self.width, self.height - top),
        )
    }

    fn from_edges(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, clamp_len(x2.saturating_sub(x1)), clamp_len(y2.saturating_sub(y1)))
    }
}

/// Clamp a signed length into `0..=u16::MAX`.
fn clamp_len(n: i32) -> u16 {
    u16::try_from(n.max(0)).unwrap_or(u16::MAX)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
