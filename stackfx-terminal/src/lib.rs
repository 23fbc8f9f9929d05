/// Terminal host for the stackfx engine
use anyhow::{bail, Context};
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use stackfx_core::{
    Engine, EngineConfig, EngineError, EventHost, ListenerKind, MacroState, Surface,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod cli;
pub mod renderer;

pub use cli::Args;
pub use renderer::AsciiRenderer;

/// Nominal pixel size of one character cell
const CELL_WIDTH_PX: f32 = 8.0;
const CELL_HEIGHT_PX: f32 = 16.0;
/// Virtual scroll distance per wheel notch
const SCROLL_STEP_PX: f32 = 40.0;
/// Rows reserved below the frame
const STATUS_ROWS: u16 = 1;

/// Frame surface for a terminal of `cols` x `rows` cells
pub fn surface_for(cols: u16, rows: u16) -> Surface {
    Surface::new(cols as u32, rows.saturating_sub(STATUS_ROWS) as u32)
        .with_pixel_aspect(CELL_WIDTH_PX / CELL_HEIGHT_PX)
}

fn needs_mouse(kind: ListenerKind) -> bool {
    matches!(
        kind,
        ListenerKind::PointerDown
            | ListenerKind::PointerMove
            | ListenerKind::PointerUp
            | ListenerKind::Scroll
    )
}

/// Attaches terminal input sources on behalf of the engine.
///
/// Mouse capture stays on while any mouse-driven kind is registered; focus
/// reporting backs pointer-leave.
#[derive(Debug, Default)]
pub struct TerminalHost {
    listening: Vec<ListenerKind>,
    mouse_captured: bool,
    focus_reporting: bool,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether events of `kind` should reach the engine
    pub fn accepts(&self, kind: ListenerKind) -> bool {
        self.listening.contains(&kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listening.len()
    }
}

fn registration_error(kind: ListenerKind, err: io::Error) -> EngineError {
    EngineError::ListenerRegistration {
        kind: kind.to_string(),
        reason: err.to_string(),
    }
}

impl EventHost for TerminalHost {
    fn listen(&mut self, kind: ListenerKind) -> Result<(), EngineError> {
        if needs_mouse(kind) && !self.mouse_captured {
            execute!(stdout(), EnableMouseCapture).map_err(|e| registration_error(kind, e))?;
            self.mouse_captured = true;
        }
        if kind == ListenerKind::PointerLeave && !self.focus_reporting {
            execute!(stdout(), EnableFocusChange).map_err(|e| registration_error(kind, e))?;
            self.focus_reporting = true;
        }
        self.listening.push(kind);
        Ok(())
    }

    fn unlisten(&mut self, kind: ListenerKind) {
        self.listening.retain(|k| *k != kind);

        if self.mouse_captured && !self.listening.iter().any(|k| needs_mouse(*k)) {
            if let Err(err) = execute!(stdout(), DisableMouseCapture) {
                log::warn!("failed to release mouse capture: {err}");
            }
            self.mouse_captured = false;
        }
        if kind == ListenerKind::PointerLeave && self.focus_reporting {
            if let Err(err) = execute!(stdout(), DisableFocusChange) {
                log::warn!("failed to stop focus reporting: {err}");
            }
            self.focus_reporting = false;
        }
    }
}

/// A mounted engine together with the host its listeners live on.
///
/// Dropping it tears the engine down, which releases mouse capture and focus
/// reporting on every exit path.
pub struct Mounted<H: EventHost> {
    engine: Engine,
    host: H,
}

impl<H: EventHost> Mounted<H> {
    pub fn new(surface: Surface, config: EngineConfig, mut host: H) -> Result<Self, EngineError> {
        let engine = Engine::mount(surface, config, &mut host)?;
        Ok(Self { engine, host })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn teardown(&mut self) {
        self.engine.teardown(&mut self.host);
    }
}

impl<H: EventHost> Drop for Mounted<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// What a terminal event asks of the app
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    PointerDown(f32, f32),
    PointerMove(f32, f32),
    PointerUp,
    PointerLeave,
    /// Change of the virtual scroll offset in pixels
    Scroll(f32),
    Resize(u16, u16),
    Toggle,
    Snap(MacroState),
    Quit,
    Nothing,
}

impl Action {
    /// Listener kind gating this action, if any
    fn listener(&self) -> Option<ListenerKind> {
        match self {
            Action::PointerDown(..) => Some(ListenerKind::PointerDown),
            Action::PointerMove(..) => Some(ListenerKind::PointerMove),
            Action::PointerUp => Some(ListenerKind::PointerUp),
            Action::PointerLeave => Some(ListenerKind::PointerLeave),
            Action::Scroll(_) => Some(ListenerKind::Scroll),
            Action::Resize(..) => Some(ListenerKind::Resize),
            _ => None,
        }
    }
}

fn cell_to_px(column: u16, row: u16) -> (f32, f32) {
    (column as f32 * CELL_WIDTH_PX, row as f32 * CELL_HEIGHT_PX)
}

/// Translate a crossterm event into an app action
pub fn map_event(event: &Event) -> Action {
    match event {
        Event::Key(KeyEvent { code, kind, .. }) if *kind != KeyEventKind::Release => match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => Action::Toggle,
            KeyCode::Char('a') => Action::Snap(MacroState::Assembled),
            KeyCode::Char('e') => Action::Snap(MacroState::Exploded),
            KeyCode::Down | KeyCode::PageDown => Action::Scroll(SCROLL_STEP_PX),
            KeyCode::Up | KeyCode::PageUp => Action::Scroll(-SCROLL_STEP_PX),
            _ => Action::Nothing,
        },
        Event::Mouse(MouseEvent {
            kind, column, row, ..
        }) => {
            let (x, y) = cell_to_px(*column, *row);
            match kind {
                MouseEventKind::Down(MouseButton::Left) => Action::PointerDown(x, y),
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    Action::PointerMove(x, y)
                }
                MouseEventKind::Up(MouseButton::Left) => Action::PointerUp,
                MouseEventKind::ScrollDown => Action::Scroll(SCROLL_STEP_PX),
                MouseEventKind::ScrollUp => Action::Scroll(-SCROLL_STEP_PX),
                _ => Action::Nothing,
            }
        }
        Event::FocusLost => Action::PointerLeave,
        Event::Resize(cols, rows) => Action::Resize(*cols, *rows),
        _ => Action::Nothing,
    }
}

/// One-line status: macro state, frame rate and, while exploded and at
/// rest, the ingredient names
pub fn status_line(engine: &Engine, fps: f32, width: usize) -> String {
    let state = if engine.is_animating() {
        "Animating"
    } else {
        engine.macro_state().label()
    };
    let mut line = format!(
        "stackfx | {state} | FPS: {fps:.1} | Space=Toggle A/E=Snap Wheel=Scroll Q=Quit"
    );
    if !engine.is_animating() && engine.macro_state() == MacroState::Exploded {
        let names: Vec<String> = engine.members().into_iter().map(|m| m.name).collect();
        line.push_str(" | ");
        line.push_str(&names.join(", "));
    }
    let line: String = line.chars().take(width).collect();
    format!("{line:<width$}")
}

/// Main application struct for the terminal stack viewer
pub struct TerminalApp {
    mounted: Mounted<TerminalHost>,
    renderer: AsciiRenderer,
    frame_time: Duration,
    scroll_offset: f32,
    running: bool,
    last_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size().context("querying terminal size")?;
        let surface = surface_for(cols, rows);
        if surface.is_empty() {
            bail!("terminal too small ({cols}x{rows})");
        }

        let mounted = Mounted::new(surface, args.engine_config(), TerminalHost::new())
            .context("mounting the engine")?;

        Ok(Self {
            mounted,
            renderer: AsciiRenderer::new(!args.no_color),
            frame_time: args.frame_time(),
            scroll_offset: 0.0,
            running: true,
            last_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup; an early return above is covered by dropping `mounted`
        self.mounted.teardown();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Drain input so fast drags are not spread over many frames
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(&event)?;
            }

            self.mounted.engine_mut().tick(frame_start - previous);
            previous = frame_start;
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: &Event) -> io::Result<()> {
        let action = map_event(event);
        if let Some(kind) = action.listener() {
            if !self.mounted.host().accepts(kind) {
                return Ok(());
            }
        }

        let engine = self.mounted.engine_mut();
        match action {
            Action::PointerDown(x, y) => engine.pointer_down(x, y),
            Action::PointerMove(x, y) => {
                engine.pointer_move(x, y);
            }
            Action::PointerUp => engine.pointer_up(),
            Action::PointerLeave => engine.pointer_leave(),
            Action::Scroll(step) => {
                self.scroll_offset = (self.scroll_offset + step).max(0.0);
                engine.on_scroll(self.scroll_offset);
            }
            Action::Resize(cols, rows) => {
                engine.resize(surface_for(cols, rows));
                execute!(stdout(), Clear(ClearType::All))?;
            }
            Action::Toggle => {
                engine.toggle();
            }
            Action::Snap(state) => {
                engine.request_transition(state, true);
            }
            Action::Quit => self.running = false,
            Action::Nothing => {}
        }
        Ok(())
    }

    fn render(&self) -> io::Result<()> {
        let engine = self.mounted.engine();
        let frame = engine.frame();
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(frame, &mut stdout)?;

        // Status line under the frame
        let status = status_line(engine, self.fps, frame.width());
        queue!(
            stdout,
            cursor::MoveTo(0, frame.height() as u16),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
