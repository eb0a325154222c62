/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed from a `SessionSnapshot` into the `front`
/// buffer, compared cell by cell with `back` (the previous frame), and only
/// the changed cells are written. All commands are queued and flushed once.
///
/// Board layout: every lattice cell is CELL_W × CELL_H terminal cells plus a
/// shared border. A vertical wall overdraws the cell's right border, a
/// horizontal wall its bottom border.
///
///   ┌─────┬─────┐     player   @
///   │ @   │     │     coin     $   (the fake coin looks the same)
///   │ $ ^ ┃     │     trap     ^   (only shown once the game is over)
///   └━━━━━┴─────┘

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use escape_grid::config::GridSpec;
use escape_grid::domain::entity::{Direction, WallOrientation};
use escape_grid::domain::geometry::Point;
use escape_grid::sim::session::Phase;
use escape_grid::sim::snapshot::{SessionSnapshot, TokenView};

// ── Cell: the unit of the frame buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const CELL_W: usize = 6;
const CELL_H: usize = 3;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const GOAL_BG: Color = Color::Rgb { r: 18, g: 48, b: 30 };
const LATTICE_FG: Color = Color::Rgb { r: 70, g: 70, b: 95 };
const WALL_FG: Color = Color::Rgb { r: 230, g: 140, b: 60 };
const COIN_FG: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const TRAP_FG: Color = Color::Rgb { r: 230, g: 60, b: 60 };
const FAKE_FG: Color = Color::Rgb { r: 220, g: 90, b: 220 };
const PLAYER_FG: Color = Color::Rgb { r: 120, g: 255, b: 120 };

// Slots inside a cell, relative to its top-left terminal cell
const PLAYER_SLOT: (usize, usize) = (2, 0);
const COIN_SLOT: (usize, usize) = (1, 1);
const TRAP_SLOT: (usize, usize) = (3, 1);

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, snap: &SessionSnapshot, message: &str) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.sync_size();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Full repaint on every phase change (game over reveal, restart)
        if self.last_phase != Some(snap.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(snap.phase);
        }

        self.front.clear();
        compose(&mut self.front, snap, message);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn sync_size(&mut self) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build frame content ──

fn compose(buf: &mut FrameBuffer, snap: &SessionSnapshot, message: &str) {
    let grid = &snap.grid;
    let rows = grid.rows.max(0) as usize;
    let revealed = snap.phase.is_terminal() || snap.ended;

    compose_hud(buf, snap);
    compose_lattice(buf, grid);

    for wall in &snap.walls {
        let Some((x0, y0)) = cell_origin(grid, wall.col, wall.row) else { continue };
        match wall.orientation {
            WallOrientation::Vertical => {
                for dy in 0..=CELL_H {
                    buf.set(x0 + CELL_W, y0 + dy, Cell::new('┃', WALL_FG, Cell::BASE_BG));
                }
            }
            WallOrientation::Horizontal => {
                for dx in 0..=CELL_W {
                    buf.set(x0 + dx, y0 + CELL_H, Cell::new('━', WALL_FG, Cell::BASE_BG));
                }
            }
        }
    }

    for prize in snap.prizes.iter().filter(|p| p.active) {
        put_token(buf, grid, prize, COIN_SLOT, '$', COIN_FG);
    }

    let decoy = TokenView { x: snap.decoy.x, y: snap.decoy.y, size: snap.decoy.size, active: snap.decoy.active };
    if decoy.active {
        let fg = if revealed { FAKE_FG } else { COIN_FG };
        put_token(buf, grid, &decoy, COIN_SLOT, '$', fg);
    }

    if revealed {
        for trap in snap.traps.iter().filter(|t| t.active) {
            put_token(buf, grid, trap, TRAP_SLOT, '^', TRAP_FG);
        }
    }

    let (pw, ph) = grid.cell_of(Point::new(snap.player.x, snap.player.y));
    if let Some((x0, y0)) = cell_origin(grid, pw, ph) {
        let glyph = match snap.player.facing {
            Direction::Left => '◀',
            Direction::Right => '▶',
            Direction::Up => '▲',
            Direction::Down => '▼',
        };
        let bg = cell_bg(grid, pw);
        buf.set(x0 + 1 + PLAYER_SLOT.0, y0 + 1 + PLAYER_SLOT.1, Cell::new('@', PLAYER_FG, bg));
        buf.set(x0 + 2 + PLAYER_SLOT.0, y0 + 1 + PLAYER_SLOT.1, Cell::new(glyph, PLAYER_FG, bg));
    }

    let map_bottom = MAP_ROW + rows * CELL_H + 1;
    compose_message(buf, map_bottom + 1, snap, message);

    let help = " ←↑↓→ move  WASD jump  E pick up  T spring  Q disarm  F scan  P replay  X end  R restart  Esc quit";
    buf.put_str(0, map_bottom + 3, help, Color::DarkGrey, Cell::BASE_BG);
}

fn compose_hud(buf: &mut FrameBuffer, snap: &SessionSnapshot) {
    let collected = snap.prizes.len() as u32 - snap.prizes_remaining;
    let hud = format!(
        " Score:{:<4} Moves:{:<3} Time:{:<3} Scans:{}  Coins:{}/{}  Steps:{}",
        snap.score,
        snap.moves_left.max(0),
        snap.time_left.max(0),
        snap.scans_left,
        collected,
        snap.prizes.len(),
        snap.player.steps,
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
}

/// Cell borders and the goal-column tint.
fn compose_lattice(buf: &mut FrameBuffer, grid: &GridSpec) {
    let cols = grid.cols.max(0) as usize;
    let rows = grid.rows.max(0) as usize;
    for h in 0..rows {
        for w in 0..cols {
            let x0 = MAP_COL + w * CELL_W;
            let y0 = MAP_ROW + h * CELL_H;
            let bg = cell_bg(grid, w as i32);
            for dy in 1..CELL_H {
                for dx in 1..CELL_W {
                    buf.set(x0 + dx, y0 + dy, Cell::new(' ', Color::White, bg));
                }
            }
        }
    }

    let right = MAP_COL + cols * CELL_W;
    let bottom = MAP_ROW + rows * CELL_H;
    for y in MAP_ROW..=bottom {
        for x in MAP_COL..=right {
            let on_v = (x - MAP_COL) % CELL_W == 0;
            let on_h = (y - MAP_ROW) % CELL_H == 0;
            let ch = match (on_v, on_h) {
                (true, true) => '+',
                (true, false) => '│',
                (false, true) => '─',
                (false, false) => continue,
            };
            buf.set(x, y, Cell::new(ch, LATTICE_FG, Cell::BASE_BG));
        }
    }
}

fn compose_message(buf: &mut FrameBuffer, row: usize, snap: &SessionSnapshot, message: &str) {
    let banner = match snap.phase {
        Phase::Won => Some("YOU WIN! Every coin collected."),
        Phase::LostScore => Some("GAME OVER: out of points."),
        Phase::LostMoves => Some("GAME OVER: out of moves."),
        Phase::LostTime => Some("GAME OVER: out of time."),
        Phase::Playing => None,
    };
    let text = match (banner, message.is_empty()) {
        (Some(b), true) => format!(" {b}  [R] restart "),
        (Some(b), false) => format!(" {b}  {message}  [R] restart "),
        (None, false) => format!(" {message} "),
        (None, true) => return,
    };
    buf.fill_row(row, MSG_BG);
    buf.put_str(0, row, &text, Color::Black, MSG_BG);
}

/// Top-left terminal cell of lattice cell (w, h), if it is on the board.
fn cell_origin(grid: &GridSpec, w: i32, h: i32) -> Option<(usize, usize)> {
    if !(0..grid.cols).contains(&w) || !(0..grid.rows).contains(&h) {
        return None;
    }
    Some((MAP_COL + w as usize * CELL_W, MAP_ROW + h as usize * CELL_H))
}

fn cell_bg(grid: &GridSpec, w: i32) -> Color {
    if w * grid.space_size + grid.start_x > grid.goal_x() {
        GOAL_BG
    } else {
        Cell::BASE_BG
    }
}

fn put_token(buf: &mut FrameBuffer, grid: &GridSpec, token: &TokenView, slot: (usize, usize), ch: char, fg: Color) {
    let (w, h) = grid.cell_of(Point::new(token.x, token.y));
    if let Some((x0, y0)) = cell_origin(grid, w, h) {
        buf.set(x0 + 1 + slot.0, y0 + 1 + slot.1, Cell::new(ch, fg, cell_bg(grid, w)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_grid::config::GameConfig;
    use escape_grid::domain::entity::Stride;
    use escape_grid::sim::session::GameSession;

    fn frame(session: &GameSession, message: &str) -> FrameBuffer {
        let mut buf = FrameBuffer::new(120, 30);
        compose(&mut buf, &session.snapshot(), message);
        buf
    }

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn session() -> GameSession {
        let cfg = GameConfig { seed: Some(3), ..GameConfig::default() };
        GameSession::from_config(&cfg).unwrap()
    }

    fn count(buf: &FrameBuffer, ch: char) -> usize {
        buf.cells.iter().filter(|c| c.ch == ch).count()
    }

    #[test]
    fn hud_shows_resources() {
        let buf = frame(&session(), "");
        let hud = row_text(&buf, HUD_ROW);
        assert!(hud.contains("Score:10"));
        assert!(hud.contains("Moves:20"));
        assert!(hud.contains("Time:15"));
        assert!(hud.contains("Scans:3"));
        assert!(hud.contains("Coins:0/3"));
    }

    #[test]
    fn player_drawn_in_start_cell() {
        let buf = frame(&session(), "");
        let (x, y) = (MAP_COL + 1 + PLAYER_SLOT.0, MAP_ROW + 1 + PLAYER_SLOT.1);
        assert_eq!(buf.get(x, y).ch, '@');
        assert_eq!(buf.get(x + 1, y).ch, '▶');
    }

    #[test]
    fn traps_hidden_until_game_over() {
        let mut s = session();
        assert_eq!(count(&frame(&s, ""), '^'), 0);
        // Two off-grid bumps drain the score
        s.move_player(Direction::Left, Stride::Single);
        s.move_player(Direction::Left, Stride::Single);
        assert!(s.phase().is_terminal());
        assert!(count(&frame(&s, ""), '^') > 0);
    }

    #[test]
    fn message_row_and_banner() {
        let mut s = session();
        let buf = frame(&s, "No coin here!");
        let msg_row = MAP_ROW + 5 * CELL_H + 2;
        assert!(row_text(&buf, msg_row).contains("No coin here!"));

        s.move_player(Direction::Left, Stride::Single);
        s.move_player(Direction::Left, Stride::Single);
        let buf = frame(&s, "");
        assert!(row_text(&buf, msg_row).contains("out of points"));
    }

    #[test]
    fn goal_column_is_tinted() {
        let grid = GridSpec::default();
        assert_eq!(cell_bg(&grid, 6), Cell::BASE_BG);
        assert_eq!(cell_bg(&grid, 7), GOAL_BG);
    }

    #[test]
    fn off_board_cells_have_no_origin() {
        let grid = GridSpec::default();
        assert_eq!(cell_origin(&grid, 0, 0), Some((MAP_COL, MAP_ROW)));
        assert_eq!(cell_origin(&grid, 7, 4), Some((MAP_COL + 7 * CELL_W, MAP_ROW + 4 * CELL_H)));
        assert_eq!(cell_origin(&grid, 8, 0), None);
        assert_eq!(cell_origin(&grid, -1, 0), None);
    }
}
