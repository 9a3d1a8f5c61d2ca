//! Terminal backend: double-buffered, diff-based crossterm renderer.
//!
//! How it works:
//!   1. Menu drawing writes into the `front` buffer (array of Cell)
//!   2. `present()` compares each cell with `back` (previous frame)
//!   3. Only changed cells produce terminal commands, batched with `queue!`
//!   4. Front and back are swapped
//!
//! Pixel coordinates from the menu are mapped to terminal cells by dividing
//! by the atlas tile size, so one patch is one cell and one character of
//! text is one cell.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use super::{Renderer, Rgba, TileAtlas};

fn to_color(c: Rgba) -> Color {
    Color::Rgb { r: c.r(), g: c.g(), b: c.b() }
}

// ── Glyph: a tile of the terminal atlas ──

/// One atlas tile. `None` parts are transparent: an empty `ch` leaves the
/// cell's character alone, an empty `bg` keeps the cell's background.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Glyph {
    pub ch: Option<char>,
    pub fg: Color,
    pub bg: Option<Color>,
}

impl Glyph {
    const CLEAR: Glyph = Glyph { ch: None, fg: Color::White, bg: None };
}

/// Box-drawing stand-in for the panel sprite sheet.
pub struct GlyphAtlas {
    frame_fg: Color,
    frame_bg: Color,
    marker_fg: Color,
    cursor_fg: Color,
    cell_px: (i32, i32),
}

impl GlyphAtlas {
    /// `cell_px` is how many menu pixels one terminal cell stands for.
    pub fn new(cell_px: (i32, i32)) -> Self {
        GlyphAtlas {
            frame_fg: Color::White,
            frame_bg: Color::Rgb { r: 24, g: 32, b: 120 },
            marker_fg: Color::Rgb { r: 255, g: 220, b: 90 },
            cursor_fg: Color::Rgb { r: 255, g: 255, b: 255 },
            cell_px,
        }
    }

    fn frame(&self, ch: char) -> Glyph {
        Glyph { ch: Some(ch), fg: self.frame_fg, bg: Some(self.frame_bg) }
    }

    fn overlay(&self, ch: char, fg: Color) -> Glyph {
        Glyph { ch: Some(ch), fg, bg: None }
    }
}

impl TileAtlas for GlyphAtlas {
    type Tile = Glyph;

    fn tile(&self, col: usize, row: usize) -> Glyph {
        match (col, row) {
            (0, 0) => self.frame('┌'),
            (1, 0) => self.frame('─'),
            (2, 0) => self.frame('┐'),
            (0, 1) => self.frame('│'),
            (1, 1) => self.frame(' '),
            (2, 1) => self.frame('│'),
            (0, 2) => self.frame('└'),
            (1, 2) => self.frame('─'),
            (2, 2) => self.frame('┘'),
            (3, 0) => self.overlay('▲', self.marker_fg),
            (3, 1) => self.overlay('▸', self.marker_fg),
            (3, 2) => self.overlay('▼', self.marker_fg),
            // 2x2 cursor: a single arrow left of the panel border
            (4, 0) => self.overlay('▶', self.cursor_fg),
            _ => Glyph::CLEAR,
        }
    }

    fn tile_width(&self) -> i32 { self.cell_px.0 }
    fn tile_height(&self) -> i32 { self.cell_px.1 }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets repainted.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn blank(bg: Color) -> Self {
        Cell { ch: ' ', fg: Color::White, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize, bg: Color) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::blank(bg); w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize, bg: Color) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::blank(bg); w * h];
        }
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Mutable cell at signed coordinates; `None` when off-screen.
    fn at(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        let idx = y as usize * self.width + x as usize;
        self.cells.get_mut(idx)
    }

    fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }
}

// ── TerminalRenderer ──

pub struct TerminalRenderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    /// Menu pixels per terminal cell.
    cell_px: (i32, i32),
    /// Background of the last `clear`; also used for terminal-level clears
    /// so row gaps match the cells.
    base_bg: Color,
}

impl TerminalRenderer {
    pub fn new(cell_px: (i32, i32)) -> Self {
        let base_bg = Color::Rgb { r: 22, g: 22, b: 35 };
        TerminalRenderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0, base_bg),
            back: FrameBuffer::new(0, 0, base_bg),
            cell_px: (cell_px.0.max(1), cell_px.1.max(1)),
            base_bg,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(self.base_bg),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;
        // Force full repaint on first frame
        self.back.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Terminal size in menu pixels.
    pub fn size_px(&self) -> (i32, i32) {
        (
            self.front.width as i32 * self.cell_px.0,
            self.front.height as i32 * self.cell_px.1,
        )
    }

    /// Pick up terminal resizes. Call once per frame before drawing.
    pub fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th, self.base_bg);
            self.back.resize(tw, th, self.base_bg);
            self.back.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(self.base_bg), Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// Emit the frame and swap buffers.
    pub fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        // Next frame starts from what is on screen
        self.front.cells.clone_from(&self.back.cells);
        Ok(())
    }

    fn to_cell(&self, x: i32, y: i32) -> (i32, i32) {
        (x.div_euclid(self.cell_px.0), y.div_euclid(self.cell_px.1))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = self.base_bg;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let (cell, prev) = match (self.front.get(x, y), self.back.get(x, y)) {
                    (Some(c), Some(p)) => (c, p),
                    (Some(c), None) => (c, Cell::INVALID),
                    _ => continue,
                };
                if cell == prev {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl Renderer for TerminalRenderer {
    type Tile = Glyph;

    fn clear(&mut self, color: Rgba) {
        self.base_bg = to_color(color);
        self.front.fill(Cell::blank(self.base_bg));
    }

    fn draw_image(&mut self, tile: &Glyph, x: i32, y: i32) {
        let (cx, cy) = self.to_cell(x, y);
        if let Some(cell) = self.front.at(cx, cy) {
            if let Some(ch) = tile.ch {
                cell.ch = ch;
                cell.fg = tile.fg;
            }
            if let Some(bg) = tile.bg {
                cell.bg = bg;
            }
        }
    }

    /// Tints the foreground of every cell on the rectangle's outline.
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        let fg = to_color(color);
        let (x0, y0) = self.to_cell(x, y);
        let (x1, y1) = self.to_cell(x + w - 1, y + h - 1);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let on_edge = cx == x0 || cx == x1 || cy == y0 || cy == y1;
                if !on_edge {
                    continue;
                }
                if let Some(cell) = self.front.at(cx, cy) {
                    cell.fg = fg;
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgba) {
        let fg = to_color(color);
        let (cx, cy) = self.to_cell(x, y);
        for (i, ch) in text.chars().enumerate() {
            if let Some(cell) = self.front.at(cx + i as i32, cy) {
                cell.ch = ch;
                cell.fg = fg;
            }
        }
    }
}
