//! Test doubles: an atlas whose tiles are their own coordinates and a
//! renderer that records every call.

use super::{Renderer, Rgba, TileAtlas};

pub struct GridAtlas;

impl TileAtlas for GridAtlas {
    type Tile = (usize, usize);

    fn tile(&self, col: usize, row: usize) -> (usize, usize) {
        (col, row)
    }
    fn tile_width(&self) -> i32 { 16 }
    fn tile_height(&self) -> i32 { 24 }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DrawCall {
    Clear(Rgba),
    Image { tile: (usize, usize), x: i32, y: i32 },
    Rect { x: i32, y: i32, w: i32, h: i32, color: Rgba },
    Text { text: String, x: i32, y: i32, color: Rgba },
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn images(&self) -> Vec<((usize, usize), i32, i32)> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Image { tile, x, y } => Some((*tile, *x, *y)),
            _ => None,
        }).collect()
    }

    pub fn texts(&self) -> Vec<(String, i32, i32, Rgba)> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text { text, x, y, color } => Some((text.clone(), *x, *y, *color)),
            _ => None,
        }).collect()
    }

    pub fn rects(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Rect { .. })).count()
    }
}

impl Renderer for RecordingRenderer {
    type Tile = (usize, usize);

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }
    fn draw_image(&mut self, tile: &(usize, usize), x: i32, y: i32) {
        self.calls.push(DrawCall::Image { tile: *tile, x, y });
    }
    fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }
    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Rgba) {
        self.calls.push(DrawCall::Text { text: text.to_string(), x, y, color });
    }
}
