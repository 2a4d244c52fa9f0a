// SPDX-License-Identifier: MIT
//
// Styled text: an ordered list of runs, each a string with one effective
// style and an optional link. `\n` inside a run starts a new line.

use weft_term::buffer::string_width;
use weft_term::style::Style;
use weft_term::widget::{RenderContext, Widget};

use crate::error::MarkupError;
use crate::parser::parse_markup;

// ─── Run ─────────────────────────────────────────────────────────────────────

/// A span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: Style,
    /// Link target. Carried as data; not rendered.
    pub link: Option<String>,
}

impl Run {
    #[must_use]
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            link: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

// ─── Text ────────────────────────────────────────────────────────────────────

/// Styled, possibly multi-line text.
///
/// ```
/// use weft_markup::Text;
/// use weft_term::color::Color;
/// use weft_term::style::Style;
///
/// let text = Text::from_markup("[red]error:[/] disk full", Style::PLAIN)?;
/// assert_eq!(text.runs().len(), 2);
/// assert_eq!(text.runs()[0].style.fg, Color::RED);
/// assert_eq!(text.plain_text(), "error: disk full");
/// # Ok::<(), weft_markup::MarkupError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    runs: Vec<Run>,
}

impl Text {
    #[must_use]
    pub const fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Parse markup on top of `base`.
    ///
    /// # Errors
    ///
    /// See [`parse_markup`].
    pub fn from_markup(markup: &str, base: Style) -> Result<Self, MarkupError> {
        parse_markup(markup, base)
    }

    /// Unstyled text, taken literally (no markup).
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self::styled(text, Style::PLAIN)
    }

    /// Text in one style, taken literally.
    #[must_use]
    pub fn styled(text: &str, style: Style) -> Self {
        let mut out = Self::new();
        out.push(Run::new(text, style));
        out
    }

    /// Append a run. Empty runs are dropped; a run matching the last one's
    /// style and link is merged into it.
    pub fn push(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style == run.style && last.link == run.link => {
                last.text.push_str(&run.text);
            }
            _ => self.runs.push(run),
        }
    }

    #[inline]
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// All run text concatenated, styles dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Display columns of the widest line.
    #[must_use]
    pub fn width(&self) -> usize {
        self.plain_text()
            .split('\n')
            .map(string_width)
            .max()
            .unwrap_or(0)
    }

    /// Number of lines; zero for empty text.
    #[must_use]
    pub fn height(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        1 + self
            .runs
            .iter()
            .map(|run| run.text.matches('\n').count())
            .sum::<usize>()
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl Widget for Text {
    /// Lines go on successive rows from the context origin; anything past
    /// the clip is dropped.
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        let mut x: i32 = 0;
        let mut y: i32 = 0;

        for run in &self.runs {
            for (i, line) in run.text.split('\n').enumerate() {
                if i > 0 {
                    x = 0;
                    y += 1;
                }
                if line.is_empty() {
                    continue;
                }
                ctx.set_string(x, y, line, run.style);
                x = x.saturating_add(i32::try_from(string_width(line)).unwrap_or(i32::MAX));
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
