use crate::{Cell, GRID_RADIUS, GRID_SIZE, TermInt, TermCoords};
use crate::input::{Control, ControlState, InputSource};
use crate::render::{Canvas, Rgba, BACKGROUND_COLOR};

use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::{info, warn};

/// Each grid cell is two terminal columns wide so squares look square.
const CELL_COLS: TermInt = 2;
const BOARD_COLS: TermInt = GRID_SIZE as TermInt * CELL_COLS + 2;
const BOARD_ROWS: TermInt = GRID_SIZE as TermInt + 2;
// Board plus the status line
const NEEDED_ROWS: TermInt = BOARD_ROWS + 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Glyph {
    text: &'static str,
    fg: (u8, u8, u8),
}

impl Glyph {
    fn empty() -> Self {
        Glyph { text: "  ", fg: BACKGROUND_COLOR.to_rgb8() }
    }

    fn square(scale: f32, color: Rgba) -> Self {
        let text = if scale >= 1.0 { "██" } else { "▐▌" };
        Glyph { text, fg: color.to_rgb8() }
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    origin: TermCoords,
    stdout: Stdout,
    // What is on screen now; None until first drawn
    screen: Vec<Option<Glyph>>,
    next: Vec<Glyph>,
    status: String,
    shown_status: Option<String>,
    held: ControlState,
    enhanced: bool,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Failed to read terminal size")?;
        if width < BOARD_COLS || height < NEEDED_ROWS {
            bail!(
                "Terminal is {}x{}, the board needs at least {}x{}",
                width, height, BOARD_COLS, NEEDED_ROWS
            );
        }

        let origin = ((width - BOARD_COLS) / 2, (height - NEEDED_ROWS) / 2);
        let cells = (GRID_SIZE * GRID_SIZE) as usize;

        Ok(TermManager {
            width,
            height,
            origin,
            stdout: stdout(),
            screen: vec![None; cells],
            next: vec![Glyph::empty(); cells],
            status: String::new(),
            shown_status: None,
            held: ControlState::default(),
            enhanced: false,
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
            .context("Failed to hide cursor")?;

        // Without release events a held key can only be seen while its
        // press events keep arriving
        self.enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced {
            execute!(
                self.stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .context("Failed to enable key release events")?;
            info!("Keyboard enhancement enabled, tracking key releases");
        } else {
            warn!("Terminal does not report key releases, presses count for one frame");
        }

        self.clear()?;
        self.draw_borders()?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.enhanced {
            execute!(self.stdout, PopKeyboardEnhancementFlags)
                .context("Failed to disable key release events")?;
        }
        terminal::disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.stdout,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        Ok(())
    }

    pub fn get_terminal_size(&self) -> TermCoords {
        (self.width, self.height)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))
            .context("Failed to clear terminal")?;
        self.screen.iter_mut().for_each(|g| *g = None);
        self.shown_status = None;
        Ok(())
    }

    fn draw_borders(&mut self) -> Result<()> {
        let (left, top) = self.origin;
        let right = left + BOARD_COLS - 1;
        let bottom = top + BOARD_ROWS - 1;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            queue!(self.stdout, cursor::MoveTo(x, top), style::Print(ch))?;
            queue!(self.stdout, cursor::MoveTo(x, bottom), style::Print(ch))?;
        }

        for y in top + 1..bottom {
            queue!(self.stdout, cursor::MoveTo(left, y), style::Print('|'))?;
            queue!(self.stdout, cursor::MoveTo(right, y), style::Print('|'))?;
        }

        self.stdout.flush().context("Failed to draw borders")
    }

    fn reports_releases(&self) -> bool {
        self.enhanced || cfg!(windows)
    }

    fn apply_key(&mut self, key: &KeyEvent) {
        let control = match control_for(key) {
            Some(c) => c,
            None => return,
        };

        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.held.set(control, true),
            KeyEventKind::Release => self.held.set(control, false),
        }
    }
}

impl InputSource for TermManager {
    fn sample(&mut self) -> Result<ControlState> {
        if !self.reports_releases() {
            self.held.clear();
        }

        while event::poll(Duration::from_millis(0)).context("Failed to poll input")? {
            if let Event::Key(key) = event::read().context("Failed to read input")? {
                self.apply_key(&key);
            }
        }

        Ok(self.held)
    }
}

impl Canvas for TermManager {
    fn begin_frame(&mut self) {
        self.next.iter_mut().for_each(|g| *g = Glyph::empty());
    }

    fn draw_square(&mut self, cell: Cell, scale: f32, color: Rgba) {
        if let Some(i) = board_index(cell) {
            self.next[i] = Glyph::square(scale, color);
        }
    }

    fn set_status(&mut self, text: &str) {
        self.status.clear();
        self.status.push_str(text);
    }

    fn present(&mut self) -> Result<()> {
        let (r, g, b) = BACKGROUND_COLOR.to_rgb8();
        queue!(self.stdout, style::SetBackgroundColor(style::Color::Rgb { r, g, b }))?;

        for (i, glyph) in self.next.iter().enumerate() {
            if self.screen[i] == Some(*glyph) {
                continue;
            }

            let (x, y) = cell_to_screen(self.origin, index_cell(i));
            let (r, g, b) = glyph.fg;
            queue!(
                self.stdout,
                cursor::MoveTo(x, y),
                style::SetForegroundColor(style::Color::Rgb { r, g, b }),
                style::Print(glyph.text)
            )?;
            self.screen[i] = Some(*glyph);
        }
        queue!(self.stdout, style::ResetColor)?;

        if self.shown_status.as_deref() != Some(self.status.as_str()) {
            let width = (self.width - self.origin.0) as usize;
            let line = format!("{:<w$.w$}", self.status, w = width);
            queue!(
                self.stdout,
                cursor::MoveTo(self.origin.0, self.origin.1 + BOARD_ROWS),
                style::Print(line)
            )?;
            self.shown_status = Some(self.status.clone());
        }

        self.stdout.flush().context("Failed to flush frame")
    }
}

/// Maps a key event onto a logical control. Arrows or WASD move, R restarts,
/// Esc, Q or Ctrl+C leave.
fn control_for(key: &KeyEvent) -> Option<Control> {
    if is_ctrl_c(key) {
        return Some(Control::Exit);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Control::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Control::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::Right),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Control::Restart),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Control::Exit),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

/// Row-major index with the top row (y = 10) first.
fn board_index(cell: Cell) -> Option<usize> {
    if !cell.in_bounds() {
        return None;
    }
    let row = (GRID_RADIUS - cell.y) as usize;
    let col = (cell.x + GRID_RADIUS) as usize;
    Some(row * GRID_SIZE as usize + col)
}

fn index_cell(i: usize) -> Cell {
    let size = GRID_SIZE as usize;
    Cell::new((i % size) as i32 - GRID_RADIUS, GRID_RADIUS - (i / size) as i32)
}

fn cell_to_screen(origin: TermCoords, cell: Cell) -> TermCoords {
    let col = (cell.x + GRID_RADIUS) as TermInt * CELL_COLS;
    let row = (GRID_RADIUS - cell.y) as TermInt;
    (origin.0 + 1 + col, origin.1 + 1 + row)
}
