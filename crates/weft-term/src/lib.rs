// SPDX-License-Identifier: MIT
//
// weft-term: a character-grid rendering engine for terminals.
//
// Widgets paint styled cells into an off-screen buffer through a clipped
// render context. Each frame is diffed against the last one and only the
// changed cells reach the terminal, with cursor moves and SGR sequences
// emitted only when they actually change. The terminal is driven directly
// with ANSI escapes and raw termios; no TUI framework sits underneath.

pub mod ansi;
pub mod backend;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod decoration;
pub mod diff;
pub mod input;
pub mod output;
pub mod reader;
pub mod rect;
pub mod renderer;
pub mod style;
pub mod terminal;
pub mod widget;

pub use backend::{AnsiBackend, Backend, TestBackend};
pub use buffer::Buffer;
pub use cell::Cell;
pub use color::Color;
pub use decoration::Decoration;
pub use diff::RenderStats;
pub use input::{KeyCode, KeyEvent, Modifiers};
pub use rect::Rect;
pub use renderer::{Renderer, RendererConfig};
pub use style::{Style, StyleError, parse_style};
pub use terminal::Size;
pub use widget::{RenderContext, Widget, from_fn};
