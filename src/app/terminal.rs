use crate::app::{SelectionError, SelectionModel, SelectionSurface, SurfaceEvent};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, IsTerminal, Stdout};

/// Whether a key-event-capable terminal is attached. Resolved once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputCapability {
    Terminal,
    Unavailable { reason: String },
}

impl InputCapability {
    pub fn detect() -> Self {
        if !io::stdin().is_terminal() {
            return Self::Unavailable {
                reason: "stdin is not a terminal".to_string(),
            };
        }
        if !io::stdout().is_terminal() {
            return Self::Unavailable {
                reason: "stdout is not a terminal".to_string(),
            };
        }
        Self::Terminal
    }

    pub fn open(&self) -> Result<TerminalSurface, SelectionError> {
        match self {
            Self::Terminal => TerminalSurface::open(),
            Self::Unavailable { reason } => {
                Err(SelectionError::CapabilityUnavailable(reason.clone()))
            }
        }
    }
}

/// Raw-mode alternate screen driven by ratatui. Dropping it restores the terminal,
/// including on unwind.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSurface {
    fn open() -> Result<Self, SelectionError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(error) = stdout.execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(error.into());
        }
        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(error.into())
            }
        }
    }
}

impl SelectionSurface for TerminalSurface {
    fn draw(&mut self, model: &SelectionModel) -> Result<(), SelectionError> {
        self.terminal
            .draw(|frame| crate::ui::render_selection(frame, model))?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<SurfaceEvent, SelectionError> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    return Ok(SurfaceEvent::Key(key));
                }
                Event::Resize(_, _) => return Ok(SurfaceEvent::Resized),
                _ => {}
            }
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
