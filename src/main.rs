// SPDX-License-Identifier: MIT
//
// weft: sandbox host for the rendering engine.
//
// Two boxed panes side by side, each holding a line of typed text, and an
// FPS counter along the bottom row. Keys go to the active pane:
//
//   ←          switch the active pane
//   → / q      quit (Ctrl+C too; raw mode swallows SIGINT)
//   Backspace  delete the last character
//   Esc        clear the pane
//   Tab        reverse the pane's text
//   anything   append it
//
// Layout:
//
//   ┌──────────────┐ ┌────────────────────────┐
//   │ pane 1       │ │ pane 2                 │  ← title row
//   │ ------------ │ │ ---------------------- │  ← separator
//   │ typed text   │ │ typed text             │
//   └──────────────┘ └────────────────────────┘
//                    FPS: 144                     ← status row
//
// Usage: weft [--fps N] [--log PATH] [--no-sync]
//
// `--fps 0` renders unpaced. `--log` writes tracing output to PATH with the
// filter taken from `WEFT_LOG` (default `info`); stdout belongs to the UI.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use weft_markup::Text;
use weft_term::{
    AnsiBackend, Backend, Cell, Color, KeyCode, KeyEvent, Modifiers, Rect, RenderContext, Renderer,
    RendererConfig, Style, Widget,
};

const DEFAULT_FPS: u32 = 144;

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct Options {
    fps: u32,
    log: Option<PathBuf>,
    synchronized: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            log: None,
            synchronized: true,
        }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fps" => {
                let value = args.next().context("--fps needs a value")?;
                options.fps = value
                    .parse()
                    .with_context(|| format!("invalid --fps value '{value}'"))?;
            }
            "--log" => {
                let value = args.next().context("--log needs a path")?;
                options.log = Some(PathBuf::from(value));
            }
            "--no-sync" => options.synchronized = false,
            other => bail!("unknown argument '{other}' (usage: weft [--fps N] [--log PATH] [--no-sync])"),
        }
    }

    Ok(options)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("WEFT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

// ─── Widgets ─────────────────────────────────────────────────────────────────

/// Single-line border around the viewport.
struct BoxWidget {
    color: Color,
}

impl Widget for BoxWidget {
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        let vp = ctx.viewport();
        if vp.width < 2 || vp.height < 2 {
            return;
        }
        let style = Style::new().fg(self.color);
        let (right, bottom) = (vp.right() - 1, vp.bottom() - 1);

        for x in 1..right {
            ctx.set_cell(x, 0, Cell::styled('─', style));
            ctx.set_cell(x, bottom, Cell::styled('─', style));
        }
        for y in 1..bottom {
            ctx.set_cell(0, y, Cell::styled('│', style));
            ctx.set_cell(right, y, Cell::styled('│', style));
        }
        ctx.set_cell(0, 0, Cell::styled('┌', style));
        ctx.set_cell(right, 0, Cell::styled('┐', style));
        ctx.set_cell(0, bottom, Cell::styled('└', style));
        ctx.set_cell(right, bottom, Cell::styled('┘', style));
    }
}

/// Dashed horizontal line on row `y`, one cell in from each side.
struct LineWidget {
    y: i32,
    color: Color,
}

impl Widget for LineWidget {
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        let vp = ctx.viewport();
        if vp.height == 0 {
            return;
        }
        let y = self.y.rem_euclid(i32::from(vp.height));
        for x in 1..vp.right() - 1 {
            ctx.set_symbol(x, y, '-');
            ctx.set_foreground(x, y, self.color);
        }
    }
}

/// " FPS: N " centered in the viewport.
struct FpsWidget {
    fps: u32,
}

impl Widget for FpsWidget {
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        let Ok(text) = Text::from_markup(&format!(" [yellow]FPS:[/] {} ", self.fps), Style::PLAIN)
        else {
            return;
        };
        let vp = ctx.viewport();
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        let x = (i32::from(vp.width) - i32::from(width)) / 2;
        ctx.render(&text, Rect::new(x, i32::from(vp.height / 2), width, 1));
    }
}

// ─── Panes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaneState {
    Inactive,
    Active,
}

impl PaneState {
    const fn color(self) -> Color {
        match self {
            Self::Active => Color::AQUA,
            Self::Inactive => Color::PURPLE,
        }
    }
}

/// A titled pane holding typed characters.
struct Pane {
    title: &'static str,
    state: PaneState,
    content: Vec<char>,
}

impl Pane {
    const fn new(title: &'static str, state: PaneState) -> Self {
        Self {
            title,
            state,
            content: Vec::new(),
        }
    }
}

impl Widget for Pane {
    fn paint(&self, ctx: &mut RenderContext<'_>) {
        let vp = ctx.viewport();
        let color = self.state.color();

        let title = Text::styled(self.title, Style::new().fg(color));
        ctx.render(&title, Rect::new(1, 0, vp.width.saturating_sub(1), 1));
        ctx.draw(&LineWidget { y: 1, color });

        for (x, &ch) in (0..).zip(&self.content) {
            ctx.set_symbol(x, 2, ch);
            ctx.set_foreground(x, 2, color);
        }
    }
}

// ─── Sandbox ─────────────────────────────────────────────────────────────────

struct Sandbox {
    panes: [Pane; 2],
}

impl Sandbox {
    const fn new() -> Self {
        Self {
            panes: [
                Pane::new("pane 1", PaneState::Active),
                Pane::new("pane 2", PaneState::Inactive),
            ],
        }
    }

    fn active_index(&self) -> usize {
        self.panes
            .iter()
            .position(|pane| pane.state == PaneState::Active)
            .unwrap_or(0)
    }

    /// Apply a key. Returns `false` when the sandbox should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let active = self.active_index();

        match key.code {
            KeyCode::Right | KeyCode::Char('q' | 'Q') => return false,
            KeyCode::Char('c') if key.modifiers.contains(Modifiers::CTRL) => return false,
            KeyCode::Left => {
                let next = (active + 1) % self.panes.len();
                for (i, pane) in self.panes.iter_mut().enumerate() {
                    pane.state = if i == next {
                        PaneState::Active
                    } else {
                        PaneState::Inactive
                    };
                }
                debug!(pane = next, "active pane changed");
            }
            KeyCode::Backspace => {
                self.panes[active].content.pop();
            }
            KeyCode::Escape => self.panes[active].content.clear(),
            KeyCode::Tab => self.panes[active].content.reverse(),
            KeyCode::Char(ch) => self.panes[active].content.push(ch),
            _ => {}
        }
        true
    }

    fn paint(&self, ctx: &mut RenderContext<'_>, elapsed: Duration) {
        let vp = ctx.viewport();
        let (body, status) = vp.split_vertical(vp.height.saturating_sub(1));

        let split = u16::try_from(u32::from(body.width) * 2 / 5).unwrap_or(0);
        let (left, rest) = body.split_horizontal(split);
        let (_gap, right) = rest.split_horizontal(1);

        ctx.render(&BoxWidget { color: Color::RED }, left);
        ctx.render(&BoxWidget { color: Color::GREY }, right);
        ctx.render(&self.panes[0], left.inflate(-1, -1));
        ctx.render(&self.panes[1], right.inflate(-1, -1));
        ctx.render(&FpsWidget { fps: fps(elapsed) }, status);
    }
}

/// Frames per second implied by one frame's duration.
fn fps(elapsed: Duration) -> u32 {
    let nanos = elapsed.as_nanos();
    if nanos == 0 {
        return 0;
    }
    u32::try_from(Duration::from_secs(1).as_nanos() / nanos).unwrap_or(u32::MAX)
}

// ─── Main ────────────────────────────────────────────────────────────────────

/// Read keys, draw, repeat until a quit key or the end of input.
fn run<B: Backend>(renderer: &mut Renderer<B>, sandbox: &mut Sandbox) -> Result<()> {
    loop {
        while renderer.backend_mut().key_available() {
            let Some(key) = renderer.backend_mut().read_key() else {
                break;
            };
            if !sandbox.handle_key(key) {
                return Ok(());
            }
        }
        if renderer.backend().input_closed() {
            info!("input closed, exiting");
            return Ok(());
        }

        renderer
            .draw(|ctx, elapsed| sandbox.paint(ctx, elapsed))
            .context("failed to draw frame")?;
    }
}

fn main() -> Result<()> {
    let options = parse_args(env::args().skip(1))?;
    if let Some(path) = &options.log {
        init_logging(path)?;
    }

    let config = RendererConfig {
        target_fps: Some(options.fps),
        synchronized_output: options.synchronized,
    };
    info!(?config, "starting sandbox");

    let backend = AnsiBackend::new().context("failed to initialize terminal")?;
    let mut renderer = Renderer::new(backend, config);
    let mut sandbox = Sandbox::new();

    run(&mut renderer, &mut sandbox)?;
    info!(frames = renderer.frame_count(), "sandbox exited");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weft_term::buffer::Buffer;
    use weft_term::TestBackend;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn typed(sandbox: &Sandbox, pane: usize) -> String {
        sandbox.panes[pane].content.iter().collect()
    }

    fn paint(sandbox: &Sandbox, width: u16, height: u16, elapsed: Duration) -> Buffer {
        let mut buffer = Buffer::new(width, height);
        sandbox.paint(&mut RenderContext::new(&mut buffer), elapsed);
        buffer
    }

    // ── Options ─────────────────────────────────────────────────────────

    #[test]
    fn options_default() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn options_all_flags() {
        let options = parse_args(args(&["--fps", "30", "--log", "/tmp/w.log", "--no-sync"])).unwrap();
        assert_eq!(
            options,
            Options {
                fps: 30,
                log: Some(PathBuf::from("/tmp/w.log")),
                synchronized: false,
            }
        );
    }

    #[test]
    fn options_reject_bad_input() {
        assert!(parse_args(args(&["--fps"])).is_err());
        assert!(parse_args(args(&["--fps", "fast"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    // ── Keys ────────────────────────────────────────────────────────────

    #[test]
    fn typing_goes_to_active_pane() {
        let mut sandbox = Sandbox::new();
        for ch in "hi there".chars() {
            assert!(sandbox.handle_key(press(KeyCode::Char(ch))));
        }
        assert_eq!(typed(&sandbox, 0), "hi there");
        assert_eq!(typed(&sandbox, 1), "");
    }

    #[test]
    fn left_cycles_active_pane() {
        let mut sandbox = Sandbox::new();
        sandbox.handle_key(press(KeyCode::Left));
        assert_eq!(sandbox.panes[0].state, PaneState::Inactive);
        assert_eq!(sandbox.panes[1].state, PaneState::Active);
        sandbox.handle_key(press(KeyCode::Char('x')));
        assert_eq!(typed(&sandbox, 1), "x");

        sandbox.handle_key(press(KeyCode::Left));
        assert_eq!(sandbox.active_index(), 0);
    }

    #[test]
    fn editing_keys() {
        let mut sandbox = Sandbox::new();
        for ch in "abc".chars() {
            sandbox.handle_key(press(KeyCode::Char(ch)));
        }
        sandbox.handle_key(press(KeyCode::Tab));
        assert_eq!(typed(&sandbox, 0), "cba");
        sandbox.handle_key(press(KeyCode::Backspace));
        assert_eq!(typed(&sandbox, 0), "cb");
        sandbox.handle_key(press(KeyCode::Escape));
        assert_eq!(typed(&sandbox, 0), "");
        sandbox.handle_key(press(KeyCode::Backspace));
        assert_eq!(typed(&sandbox, 0), "");
    }

    #[test]
    fn quit_keys() {
        let mut sandbox = Sandbox::new();
        assert!(!sandbox.handle_key(press(KeyCode::Right)));
        assert!(!sandbox.handle_key(press(KeyCode::Char('q'))));
        assert!(!sandbox.handle_key(KeyEvent::new(KeyCode::Char('c'), Modifiers::CTRL)));
        assert!(sandbox.handle_key(press(KeyCode::Char('c'))));
    }

    // ── Painting ────────────────────────────────────────────────────────

    #[test]
    fn panes_split_at_forty_percent() {
        let buffer = paint(&Sandbox::new(), 20, 6, Duration::ZERO);
        assert_eq!(buffer.row_text(0), "┌──────┐ ┌─────────┐");
        assert_eq!(buffer.row_text(4), "└──────┘ └─────────┘");
        assert_eq!(buffer.get(0, 0).unwrap().style.fg, Color::RED);
        assert_eq!(buffer.get(9, 0).unwrap().style.fg, Color::GREY);
    }

    #[test]
    fn pane_shows_title_separator_and_text() {
        let mut sandbox = Sandbox::new();
        sandbox.handle_key(press(KeyCode::Char('x')));
        let buffer = paint(&sandbox, 20, 6, Duration::ZERO);

        assert_eq!(buffer.row_text(1), "│ pane │ │ pane 2  │");
        assert_eq!(buffer.row_text(2), "│ ---- │ │ ------- │");
        assert_eq!(buffer.row_text(3), "│x     │ │         │");
        assert_eq!(buffer.get(1, 3).unwrap().style.fg, Color::AQUA);
        assert_eq!(buffer.get(11, 1).unwrap().style.fg, Color::PURPLE);
    }

    #[test]
    fn fps_label_centered_on_bottom_row() {
        let buffer = paint(&Sandbox::new(), 20, 6, Duration::from_millis(10));
        assert_eq!(buffer.row_text(5), "      FPS: 100      ");
        assert_eq!(buffer.get(6, 5).unwrap().style.fg, Color::YELLOW);
        assert_eq!(buffer.get(10, 5).unwrap().style.fg, Color::Default);
    }

    #[test]
    fn fps_from_elapsed() {
        assert_eq!(fps(Duration::ZERO), 0);
        assert_eq!(fps(Duration::from_millis(10)), 100);
        assert_eq!(fps(Duration::from_micros(6_944)), 144);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        for (w, h) in [(0, 0), (1, 1), (2, 2), (3, 1)] {
            let _ = paint(&Sandbox::new(), w, h, Duration::ZERO);
        }
    }

    // ── Loop ────────────────────────────────────────────────────────────

    #[test]
    fn run_applies_keys_until_quit() {
        let mut backend = TestBackend::new(20, 6);
        backend.push_key(press(KeyCode::Char('z')));
        backend.push_key(press(KeyCode::Char('q')));
        backend.push_key(press(KeyCode::Char('y')));
        let config = RendererConfig {
            target_fps: Some(0),
            synchronized_output: true,
        };
        let mut renderer = Renderer::new(backend, config);
        let mut sandbox = Sandbox::new();

        run(&mut renderer, &mut sandbox).unwrap();

        assert_eq!(typed(&sandbox, 0), "z");
        assert!(renderer.backend_mut().key_available(), "keys after quit stay queued");
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn run_stops_when_input_closes() {
        let mut backend = TestBackend::new(20, 6);
        backend.push_key(press(KeyCode::Char('a')));
        backend.close_input();
        let config = RendererConfig {
            target_fps: Some(0),
            synchronized_output: true,
        };
        let mut renderer = Renderer::new(backend, config);
        let mut sandbox = Sandbox::new();

        run(&mut renderer, &mut sandbox).unwrap();

        assert_eq!(typed(&sandbox, 0), "a");
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn sandbox_frame_through_renderer() {
        let mut renderer = Renderer::new(TestBackend::new(20, 6), RendererConfig::default());
        let sandbox = Sandbox::new();
        renderer.draw(|ctx, elapsed| sandbox.paint(ctx, elapsed)).unwrap();
        assert!(renderer.backend().written_str().contains("pane 2"));
        assert_eq!(renderer.last_frame().row_text(0), "┌──────┐ ┌─────────┐");
    }
}
