mod terminal;

use crate::domain::Order;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::ops::Range;
use thiserror::Error;
use time::UtcOffset;

pub use terminal::InputCapability;

/// Rows shown at once in the order list.
pub const WINDOW_ROWS: usize = 20;
/// Rows kept above the cursor before the window starts scrolling.
pub const CURSOR_LEAD: usize = 10;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("interactive keyboard input is unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("terminal I/O error")]
    Terminal(#[from] std::io::Error),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionOutcome {
    Confirmed(Vec<usize>),
    Cancelled,
}

impl SelectionOutcome {
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Confirmed(indices) => indices,
            Self::Cancelled => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionEvent {
    MoveUp,
    MoveDown,
    Toggle,
    SelectAll,
    ClearAll,
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionCommand {
    None,
    Redraw,
    Finish(SelectionOutcome),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SurfaceEvent {
    Key(KeyEvent),
    Resized,
}

/// Draws the selection model and yields input. Implemented by the real terminal
/// and by test doubles.
pub trait SelectionSurface {
    fn draw(&mut self, model: &SelectionModel) -> Result<(), SelectionError>;
    fn next_event(&mut self) -> Result<SurfaceEvent, SelectionError>;
}

#[derive(Clone, Debug)]
pub struct SelectionModel {
    orders: Vec<Order>,
    selected: Vec<bool>,
    cursor: usize,
    pub date_offset: UtcOffset,
}

impl SelectionModel {
    pub fn new(orders: Vec<Order>, date_offset: UtcOffset) -> Self {
        let selected = vec![false; orders.len()];
        Self {
            orders,
            selected,
            cursor: 0,
            date_offset,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn selected(&self) -> &[bool] {
        &self.selected
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|flag| **flag).count()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(index, flag)| flag.then_some(index))
            .collect()
    }

    /// Rows drawn when the list area is `rows` tall.
    pub fn window(&self, rows: usize) -> Range<usize> {
        visible_window(self.cursor, self.orders.len(), rows)
    }

    pub fn hidden_below(&self, rows: usize) -> usize {
        self.orders.len().saturating_sub(self.window(rows).end)
    }
}

/// At most [`WINDOW_ROWS`] rows, fewer when the area is shorter. The cursor keeps
/// [`CURSOR_LEAD`] rows above it unless that would push it out of the window.
pub fn visible_window(cursor: usize, len: usize, rows: usize) -> Range<usize> {
    let rows = rows.min(WINDOW_ROWS);
    let lead = CURSOR_LEAD.min(rows.saturating_sub(1));
    let start = cursor.saturating_sub(lead).min(len);
    let end = len.min(start + rows);
    start..end
}

pub fn event_from_key(key: KeyEvent) -> Option<SelectionEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(SelectionEvent::Cancel),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(SelectionEvent::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(SelectionEvent::MoveDown),
        KeyCode::Char(' ') => Some(SelectionEvent::Toggle),
        KeyCode::Char('a') => Some(SelectionEvent::SelectAll),
        KeyCode::Char('c') => Some(SelectionEvent::ClearAll),
        KeyCode::Enter => Some(SelectionEvent::Confirm),
        KeyCode::Esc => Some(SelectionEvent::Cancel),
        _ => None,
    }
}

pub fn update(model: SelectionModel, event: SelectionEvent) -> (SelectionModel, SelectionCommand) {
    let mut model = model;
    if model.orders.is_empty() {
        return (model, SelectionCommand::Finish(SelectionOutcome::Cancelled));
    }
    let last = model.orders.len() - 1;

    let command = match event {
        SelectionEvent::MoveUp => {
            if model.cursor == 0 {
                SelectionCommand::None
            } else {
                model.cursor -= 1;
                SelectionCommand::Redraw
            }
        }
        SelectionEvent::MoveDown => {
            if model.cursor >= last {
                SelectionCommand::None
            } else {
                model.cursor += 1;
                SelectionCommand::Redraw
            }
        }
        SelectionEvent::Toggle => {
            let cursor = model.cursor;
            model.selected[cursor] = !model.selected[cursor];
            SelectionCommand::Redraw
        }
        SelectionEvent::SelectAll => {
            model.selected.fill(true);
            SelectionCommand::Redraw
        }
        SelectionEvent::ClearAll => {
            model.selected.fill(false);
            SelectionCommand::Redraw
        }
        SelectionEvent::Confirm => {
            SelectionCommand::Finish(SelectionOutcome::Confirmed(model.selected_indices()))
        }
        SelectionEvent::Cancel => SelectionCommand::Finish(SelectionOutcome::Cancelled),
    };

    (model, command)
}

/// Drives the browse loop until the user confirms or cancels.
pub fn run_selection(
    model: SelectionModel,
    surface: &mut dyn SelectionSurface,
) -> Result<SelectionOutcome, SelectionError> {
    let mut model = model;
    if model.orders.is_empty() {
        return Ok(SelectionOutcome::Cancelled);
    }

    surface.draw(&model)?;
    loop {
        let key = match surface.next_event()? {
            SurfaceEvent::Key(key) => key,
            SurfaceEvent::Resized => {
                surface.draw(&model)?;
                continue;
            }
        };
        let Some(event) = event_from_key(key) else {
            continue;
        };

        let (next, command) = update(model, event);
        model = next;
        match command {
            SelectionCommand::None => {}
            SelectionCommand::Redraw => surface.draw(&model)?,
            SelectionCommand::Finish(outcome) => return Ok(outcome),
        }
    }
}

/// Opens the terminal and runs the selection loop. An empty order list is
/// cancelled before the terminal is touched.
pub fn select_orders(
    orders: &[Order],
    capability: &InputCapability,
    date_offset: UtcOffset,
) -> Result<SelectionOutcome, SelectionError> {
    if orders.is_empty() {
        return Ok(SelectionOutcome::Cancelled);
    }

    let mut surface = capability.open()?;
    let model = SelectionModel::new(orders.to_vec(), date_offset);
    run_selection(model, &mut surface)
}
