//! MenuStack: the panels currently open, bottom = root, top = focus.
//!
//! Input goes to the top panel only. Confirming on an entry with children
//! pushes that entry as a new panel; confirming on a leaf hands the leaf
//! back as the chosen command. The stack holds `NodeId`s into a tree owned
//! by the caller and never changes the tree's structure.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::geom::Vec2;
use crate::gfx::{self, Renderer, Rgba, TileAtlas};

use super::nav::Direction;
use super::tree::{Confirm, MenuTree, NodeId};

/// Offset between a panel and the one opened on top of it.
pub const DEFAULT_PANEL_OFFSET: Vec2 = Vec2::new(10, 10);

/// Result of `MenuStack::confirm` on a non-empty stack.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Confirmed {
    /// A leaf was chosen: run its command.
    Chosen(NodeId),
    /// A submenu was opened on top of the stack.
    Entered(NodeId),
    /// The selection is disabled; nothing happened.
    Rejected(NodeId),
}

impl Confirmed {
    /// The chosen command, if this confirm produced one.
    pub fn chosen(self) -> Option<NodeId> {
        match self {
            Confirmed::Chosen(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MenuStack {
    panels: Vec<NodeId>,
    panel_offset: Vec2,
    draw_tile_borders: bool,
}

impl Default for MenuStack {
    fn default() -> Self {
        MenuStack::new()
    }
}

impl MenuStack {
    pub fn new() -> Self {
        MenuStack {
            panels: Vec::new(),
            panel_offset: DEFAULT_PANEL_OFFSET,
            draw_tile_borders: false,
        }
    }

    /// Replace whatever is open with `item` as the only panel.
    pub fn open(&mut self, item: NodeId) {
        self.clear();
        self.panels.push(item);
        debug!(?item, "menu opened");
    }

    /// Close every panel.
    pub fn clear(&mut self) {
        self.panels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.panels.len()
    }

    /// Focused panel.
    pub fn top(&self) -> Option<NodeId> {
        self.panels.last().copied()
    }

    pub fn panels(&self) -> &[NodeId] {
        &self.panels
    }

    // ── Input ──

    pub fn move_up(&mut self, tree: &mut MenuTree) -> Result<()> {
        self.navigate(tree, Direction::Up)
    }

    pub fn move_down(&mut self, tree: &mut MenuTree) -> Result<()> {
        self.navigate(tree, Direction::Down)
    }

    pub fn move_left(&mut self, tree: &mut MenuTree) -> Result<()> {
        self.navigate(tree, Direction::Left)
    }

    pub fn move_right(&mut self, tree: &mut MenuTree) -> Result<()> {
        self.navigate(tree, Direction::Right)
    }

    /// Forward a move to the focused panel. No-op when nothing is open.
    pub fn navigate(&mut self, tree: &mut MenuTree, dir: Direction) -> Result<()> {
        match self.top() {
            Some(top) => tree.navigate(top, dir),
            None => Ok(()),
        }
    }

    /// Close the focused panel, returning to its parent. The closed
    /// node keeps its cursor for the next time it is entered.
    pub fn back(&mut self) -> Option<NodeId> {
        let popped = self.panels.pop();
        if let Some(item) = popped {
            debug!(?item, depth = self.panels.len(), "panel closed");
        }
        popped
    }

    /// Confirm the focused panel's selection. `Ok(None)` when nothing is
    /// open.
    pub fn confirm(&mut self, tree: &MenuTree) -> Result<Option<Confirmed>> {
        let top = match self.top() {
            Some(top) => top,
            None => return Ok(None),
        };

        let outcome = match tree.confirm(top)? {
            Confirm::SelectLeaf(leaf) => {
                let item = tree.get(leaf)?;
                if item.is_enabled() {
                    info!(name = item.name(), id = ?item.id(), "command chosen");
                    Confirmed::Chosen(leaf)
                } else {
                    warn!(name = item.name(), "disabled command rejected");
                    Confirmed::Rejected(leaf)
                }
            }
            Confirm::Descend(child) => {
                let item = tree.get(child)?;
                if item.is_enabled() {
                    self.panels.push(child);
                    debug!(name = item.name(), depth = self.panels.len(), "submenu entered");
                    Confirmed::Entered(child)
                } else {
                    warn!(name = item.name(), "disabled submenu rejected");
                    Confirmed::Rejected(child)
                }
            }
        };
        Ok(Some(outcome))
    }

    // ── Drawing ──

    /// Draw every open panel, each `panel_offset` further than the one
    /// below it, then the cursor on the focused panel.
    pub fn draw<R, A>(&self, tree: &mut MenuTree, r: &mut R, atlas: &A, screen_offset: Vec2) -> Result<()>
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let mut offset = screen_offset;
        let mut cursor = None;
        for &panel in &self.panels {
            cursor = Some(tree.draw_panel(panel, r, atlas, offset, self.draw_tile_borders)?);
            offset += self.panel_offset;
        }

        if let Some(pos) = cursor {
            self.draw_cursor(r, atlas, pos);
        }
        Ok(())
    }

    fn draw_cursor<R, A>(&self, r: &mut R, atlas: &A, pos: Vec2)
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let (col, row) = gfx::SLOT_CURSOR;
        let (tw, th) = (atlas.tile_width(), atlas.tile_height());
        for dy in 0..2 {
            for dx in 0..2 {
                let tile = atlas.tile(col + dx, row + dy);
                r.draw_image(&tile, pos.x + dx as i32 * tw, pos.y + dy as i32 * th);
            }
        }
        if self.draw_tile_borders {
            r.draw_rect(pos.x, pos.y, tw * 2, th * 2, Rgba::YELLOW);
        }
    }

    // ── Settings ──

    pub fn panel_offset(&self) -> Vec2 {
        self.panel_offset
    }

    pub fn set_panel_offset(&mut self, offset: Vec2) {
        self.panel_offset = offset;
    }

    pub fn is_drawing_tile_borders(&self) -> bool {
        self.draw_tile_borders
    }

    pub fn set_draw_tile_borders(&mut self, on: bool) {
        self.draw_tile_borders = on;
    }
}
