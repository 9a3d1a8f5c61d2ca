//! Drawing collaborators: the renderer and tile-atlas contracts the menu
//! draws through, plus the atlas slots it expects.
//!
//! Atlas layout (columns x rows, one patch each):
//!
//! ```text
//!   0   1   2   3      4   5
//! +---+---+---+---+  +---+---+
//! | TL| T | TR| ^ |  |  cursor|   row 0
//! | L | I | R | > |  |  (2x2) |   row 1
//! | BL| B | BR| v |  +---+---+   row 2
//! +---+---+---+---+
//! ```

pub mod terminal;

#[cfg(test)]
pub(crate) mod record;

/// 32-bit ARGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const WHITE: Rgba = Rgba(0xffff_ffff);
    pub const GREY: Rgba = Rgba(0xff80_8080);
    pub const MAGENTA: Rgba = Rgba(0xffff_00ff);
    pub const YELLOW: Rgba = Rgba(0xffff_ff00);
    pub const BLACK: Rgba = Rgba(0xff00_0000);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba(0xff00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn r(self) -> u8 { (self.0 >> 16) as u8 }
    pub fn g(self) -> u8 { (self.0 >> 8) as u8 }
    pub fn b(self) -> u8 { self.0 as u8 }
}

// ── Atlas slots ──

/// Up-scroll marker, drawn on the top border.
pub const SLOT_SCROLL_UP: (usize, usize) = (3, 0);
/// "Has submenu" marker, drawn right of an item's text.
pub const SLOT_SUBMENU: (usize, usize) = (3, 1);
/// Down-scroll marker, drawn on the bottom border.
pub const SLOT_SCROLL_DOWN: (usize, usize) = (3, 2);
/// Top-left of the 2x2 cursor glyph.
pub const SLOT_CURSOR: (usize, usize) = (4, 0);

/// A sheet of equally-sized tiles.
pub trait TileAtlas {
    type Tile;

    fn tile(&self, col: usize, row: usize) -> Self::Tile;
    fn tile_width(&self) -> i32;
    fn tile_height(&self) -> i32;
}

/// Immediate-mode drawing surface. Coordinates are pixels.
pub trait Renderer {
    type Tile;

    fn clear(&mut self, color: Rgba);
    fn draw_image(&mut self, tile: &Self::Tile, x: i32, y: i32);
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba);
    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgba);
}
