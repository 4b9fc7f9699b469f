//! Terminal frontend: a colored readout and a half-block preview of the canvas.

use crate::arc::{SURFACE_SIZE, TAU};
use crate::error::Result;
use crate::raster::PixelSurface;
use crate::readout;
use crate::render::redraw;
use crate::state::{AngleState, AngleStore, Direction};
use crate::surface::Rgba;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use log::{debug, warn};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::mpsc;

/// Angle change per arrow key press.
pub const STEP: f64 = TAU / 40.0;

/// Lines above the preview: readout, direction and key help.
const HEADER_ROWS: u16 = 3;
/// Pixels rendered per preview cell column.
const OVERSAMPLE: usize = 4;

/// One terminal cell holding two vertically stacked pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub top: Option<Rgba>,
    pub bottom: Option<Rgba>,
}

fn to_color(rgba: Rgba) -> Color {
    Color::Rgb {
        r: rgba.r,
        g: rgba.g,
        b: rgba.b,
    }
}

/// Writes the readout with its token colors, without a trailing newline.
pub fn print_readout<W: Write>(out: &mut W, state: &AngleState) -> io::Result<()> {
    for token in readout::tokens(state) {
        queue!(
            out,
            SetForegroundColor(to_color(token.kind.color())),
            Print(&token.text)
        )?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// Reduces `surface` to `cols` x `rows` cells; each half cell takes the
/// most common visible color of its block of pixels.
pub fn downsample(surface: &PixelSurface, cols: usize, rows: usize) -> Vec<Vec<Cell>> {
    let block_w = surface.width() as f64 / cols as f64;
    let block_h = surface.height() as f64 / (rows * 2) as f64;

    let dominant = |bx: usize, by: usize| -> Option<Rgba> {
        let x0 = (bx as f64 * block_w) as usize;
        let x1 = (((bx + 1) as f64 * block_w) as usize).min(surface.width());
        let y0 = (by as f64 * block_h) as usize;
        let y1 = (((by + 1) as f64 * block_h) as usize).min(surface.height());

        let mut counts: HashMap<Rgba, usize> = HashMap::new();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = surface.pixel(x, y);
                if p.a != 0 {
                    *counts.entry(p).or_default() += 1;
                }
            }
        }
        counts
            .into_iter()
            .max_by_key(|&(color, n)| (n, color.as_rgba8()))
            .map(|(color, _)| color)
    };

    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| Cell {
                    top: dominant(col, row * 2),
                    bottom: dominant(col, row * 2 + 1),
                })
                .collect()
        })
        .collect()
}

/// Side of the square preview in cell columns for a terminal of the given
/// size. Always even so it splits into whole half-block rows.
pub fn preview_side(cols: u16, rows: u16) -> usize {
    let side = cols.min(rows.saturating_sub(HEADER_ROWS).saturating_mul(2)) as usize;
    side - side % 2
}

fn terminal_size() -> (u16, u16) {
    match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => {
            warn!("terminal size unavailable, assuming 80x24");
            (80, 24)
        }
    }
}

fn draw<W: Write>(out: &mut W, state: &AngleState) -> io::Result<()> {
    let (cols, rows) = terminal_size();
    let side = preview_side(cols, rows);
    debug!("terminal redraw at {} cells", side);

    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    print_readout(out, state)?;
    queue!(
        out,
        cursor::MoveTo(0, 1),
        Print(format!(
            "start {:.2}  end {:.2}  anticlockwise {}",
            state.start_angle, state.end_angle, state.direction
        )),
        cursor::MoveTo(0, 2),
        Print("←/→ start  ↓/↑ end  t/f/u or Tab direction  r reset  q quit"),
    )?;

    if side > 0 {
        let pixels = side * OVERSAMPLE;
        let mut surface =
            PixelSurface::with_logical_size(pixels, pixels, SURFACE_SIZE, SURFACE_SIZE);
        redraw(Some(&mut surface), state);

        for (i, line) in downsample(&surface, side, side / 2).iter().enumerate() {
            queue!(out, cursor::MoveTo(0, HEADER_ROWS + i as u16))?;
            for cell in line {
                queue!(
                    out,
                    SetForegroundColor(cell.top.map_or(Color::Reset, to_color)),
                    SetBackgroundColor(cell.bottom.map_or(Color::Reset, to_color)),
                    Print('▀')
                )?;
            }
            queue!(out, ResetColor)?;
        }
    }
    out.flush()
}

/// Raw mode and the alternate screen, undone on drop.
struct RawScreen;

impl RawScreen {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(RawScreen)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen) {
            warn!("failed to leave alternate screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to disable raw mode: {}", e);
        }
    }
}

enum Action {
    Continue,
    Quit,
}

fn handle_key(store: &mut AngleStore, key: KeyEvent) -> Action {
    let state = *store.state();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Action::Quit
        }
        KeyCode::Left => store.set_start(state.start_angle - STEP),
        KeyCode::Right => store.set_start(state.start_angle + STEP),
        KeyCode::Down => store.set_end(state.end_angle - STEP),
        KeyCode::Up => store.set_end(state.end_angle + STEP),
        KeyCode::Char('t') => store.set_direction(Direction::Reverse),
        KeyCode::Char('f') => store.set_direction(Direction::Forward),
        KeyCode::Char('u') => store.set_direction(Direction::Unspecified),
        KeyCode::Tab => store.set_direction(state.direction.next()),
        KeyCode::Char('r') => store.replace(AngleState::default()),
        _ => {}
    }
    Action::Continue
}

/// Store subscriber queueing one redraw per change.
fn queue_redraw(tx: mpsc::Sender<AngleState>) -> impl FnMut(&AngleState) {
    move |state| {
        if let Err(e) = tx.send(*state) {
            debug!("redraw dropped: {}", e);
        }
    }
}

/// Runs the interactive terminal preview until the user quits.
pub fn run(state: AngleState) -> Result<()> {
    let mut store = AngleStore::new(state);
    let (tx, rx) = mpsc::channel();
    store.subscribe(queue_redraw(tx));

    let mut stdout = io::stdout();
    let _screen = RawScreen::enter(&mut stdout)?;
    draw(&mut stdout, store.state())?;

    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Action::Quit = handle_key(&mut store, key) {
                    break;
                }
            }
            Event::Resize(..) => draw(&mut stdout, store.state())?,
            _ => {}
        }
        for changed in rx.try_iter() {
            draw(&mut stdout, &changed)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ARC_COLOR;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn readout_is_colored() {
        let mut out = Vec::new();
        print_readout(&mut out, &AngleState::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[38;2;79;193;255mctx"));
        assert!(text.contains("0.25"));
        assert!(text.contains("PI"));
        assert!(!text.contains("true"));
    }

    #[test]
    fn preview_fits_the_terminal() {
        assert_eq!(preview_side(80, 24), 42);
        assert_eq!(preview_side(30, 100), 30);
        assert_eq!(preview_side(31, 100), 30);
        assert_eq!(preview_side(80, 2), 0);
    }

    #[test]
    fn downsample_keeps_the_arc() {
        let mut surface = PixelSurface::with_logical_size(160, 160, 500.0, 500.0);
        redraw(Some(&mut surface), &AngleState::default());
        let cells = downsample(&surface, 40, 20);

        assert_eq!(cells.len(), 20);
        assert!(cells.iter().all(|row| row.len() == 40));
        let has_arc = cells
            .iter()
            .flatten()
            .any(|c| c.top == Some(ARC_COLOR) || c.bottom == Some(ARC_COLOR));
        assert!(has_arc);
        assert_eq!(cells[10][20], Cell::default());
    }

    #[test]
    fn redraws_queue_until_the_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        let mut store = AngleStore::new(AngleState::default());
        store.subscribe(queue_redraw(tx));

        store.set_start(1.0);
        assert_eq!(rx.try_iter().map(|s| s.start_angle).collect::<Vec<_>>(), [1.0]);

        drop(rx);
        store.set_end(2.0);
        assert_eq!(store.state().end_angle, 2.0);
    }

    #[test]
    fn keys_drive_the_store() {
        let mut store = AngleStore::new(AngleState::default());
        handle_key(&mut store, press(KeyCode::Right));
        assert_eq!(store.state().start_angle, 0.16);
        handle_key(&mut store, press(KeyCode::Down));
        assert_eq!(store.state().end_angle, 0.63);
        handle_key(&mut store, press(KeyCode::Char('t')));
        assert_eq!(store.state().direction, Direction::Reverse);
        handle_key(&mut store, press(KeyCode::Tab));
        assert_eq!(store.state().direction, Direction::Forward);
        handle_key(&mut store, press(KeyCode::Char('r')));
        assert_eq!(*store.state(), AngleState::default());
        assert!(matches!(
            handle_key(&mut store, press(KeyCode::Char('q'))),
            Action::Quit
        ));
    }
}
