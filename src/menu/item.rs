//! MenuItem: one node of the menu tree.
//!
//! A node is both an entry (name, command id, enabled flag) shown inside
//! its parent's panel, and a panel of its own when it has children. As a
//! panel it carries the table layout, the cached geometry produced by
//! `MenuTree::build`, and the cursor/scroll state used for navigation.
//!
//! Units:
//!   - layout units / patches: one background tile (`PATCH_SIZE` pixels)
//!   - one character of an item name occupies one patch horizontally

use std::collections::HashMap;
use std::fmt;

use crate::error::{MenuError, Result};
use crate::geom::{GridShape, Vec2};
use crate::gfx::{self, Renderer, Rgba, TileAtlas};

use super::nav::{self, CellPos, NavState};
use super::tree::NodeId;

/// Pixel size of one background patch. Same for every node.
pub const PATCH_SIZE: Vec2 = Vec2::new(16, 24);

/// Gap between cells, in patches.
pub const DEFAULT_CELL_PADDING: Vec2 = Vec2::new(2, 0);

/// Geometry derived by `MenuTree::build`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    /// Largest intrinsic size among the children (patches).
    pub cell_size: Vec2,
    /// `ceil(children / columns)`
    pub total_rows: usize,
    /// Panel size including the one-patch border on every side.
    pub size_in_patches: Vec2,
}

impl Layout {
    pub fn compute<I>(table: GridShape, cell_padding: Vec2, child_sizes: I, child_count: usize) -> Layout
    where
        I: IntoIterator<Item = Vec2>,
    {
        let cell_size = child_sizes.into_iter().fold(Vec2::ZERO, Vec2::max);
        let shape = table.as_vec2();
        Layout {
            cell_size,
            total_rows: nav::total_rows(child_count, table.columns),
            size_in_patches: shape * cell_size + (shape - Vec2::ONE) * cell_padding + Vec2::new(2, 2),
        }
    }
}

/// Whether a node's `Layout` is current.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LayoutState {
    NotBuilt,
    Built(Layout),
}

#[derive(Clone, Debug)]
pub struct MenuItem {
    id: Option<i32>,
    pub(crate) name: String,
    pub(crate) enabled: bool,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// name -> position in `children`
    pub(crate) index: HashMap<String, usize>,

    pub(crate) table: GridShape,
    cell_padding: Vec2,
    pub(crate) layout: LayoutState,

    pub(crate) nav: NavState,
    pub(crate) cursor_screen_pos: Vec2,
}

impl MenuItem {
    pub(crate) fn new(name: String, parent: Option<NodeId>) -> Self {
        MenuItem {
            id: None,
            name,
            enabled: true,
            parent,
            children: Vec::new(),
            index: HashMap::new(),
            table: GridShape::default(),
            cell_padding: DEFAULT_CELL_PADDING,
            layout: LayoutState::NotBuilt,
            nav: NavState::default(),
            cursor_screen_pos: Vec2::ZERO,
        }
    }

    // ── Identity ──

    /// Command identifier, `None` until the builder assigns one.
    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: i32) {
        self.id = Some(id);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Space this entry needs inside its parent's cell: one line of text.
    pub fn intrinsic_size(&self) -> Vec2 {
        Vec2::new(self.name.chars().count() as i32, 1)
    }

    // ── Layout ──

    pub fn table(&self) -> GridShape {
        self.table
    }

    pub fn cell_padding(&self) -> Vec2 {
        self.cell_padding
    }

    pub fn patch_size(&self) -> Vec2 {
        PATCH_SIZE
    }

    pub fn is_built(&self) -> bool {
        matches!(self.layout, LayoutState::Built(_))
    }

    pub fn layout(&self) -> Result<&Layout> {
        match &self.layout {
            LayoutState::Built(layout) => Ok(layout),
            LayoutState::NotBuilt => Err(MenuError::NotBuilt { name: self.name.clone() }),
        }
    }

    /// Layout of a panel that can take navigation input.
    pub(crate) fn navigable_layout(&self) -> Result<Layout> {
        let layout = *self.layout()?;
        if self.children.is_empty() {
            return Err(MenuError::EmptyPanel { name: self.name.clone() });
        }
        Ok(layout)
    }

    // ── Navigation state ──

    pub fn nav(&self) -> NavState {
        self.nav
    }

    pub fn cursor(&self) -> CellPos {
        self.nav.cursor
    }

    pub fn top_visible_row(&self) -> usize {
        self.nav.top_visible_row
    }

    pub fn selected_index(&self) -> usize {
        self.nav.selected
    }

    /// Cursor overlay position from the most recent draw.
    pub fn cursor_screen_pos(&self) -> Vec2 {
        self.cursor_screen_pos
    }

    // ── Drawing ──

    /// Draw the panel (frame + visible children) and return the cursor
    /// position in screen space. `children` must be this node's children
    /// in order.
    pub(crate) fn draw_self<R, A>(
        &self,
        children: &[&MenuItem],
        r: &mut R,
        atlas: &A,
        screen_offset: Vec2,
        draw_tile_borders: bool,
    ) -> Result<Vec2>
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let layout = *self.layout()?;
        self.draw_panel(&layout, r, atlas, screen_offset, draw_tile_borders);
        self.draw_content(&layout, children, r, atlas, screen_offset);
        Ok(self.cursor_position(&layout, screen_offset))
    }

    fn draw_panel<R, A>(&self, layout: &Layout, r: &mut R, atlas: &A, screen_offset: Vec2, draw_tile_borders: bool)
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let size = layout.size_in_patches;
        for x in 0..size.x {
            for y in 0..size.y {
                let loc = patch_to_screen(Vec2::new(x, y), screen_offset);
                let tile = atlas.tile(edge_index(x, size.x), edge_index(y, size.y));
                r.draw_image(&tile, loc.x, loc.y);
                if draw_tile_borders {
                    r.draw_rect(loc.x, loc.y, PATCH_SIZE.x, PATCH_SIZE.y, Rgba::MAGENTA);
                }
            }
        }
    }

    fn draw_content<R, A>(&self, layout: &Layout, children: &[&MenuItem], r: &mut R, atlas: &A, screen_offset: Vec2)
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let columns = self.table.columns;
        let top = self.nav.top_visible_row;
        let size = layout.size_in_patches;

        // Scroll markers sit on the border, one patch in from the right
        if top > 0 {
            let loc = patch_to_screen(Vec2::new(size.x - 2, 0), screen_offset);
            let (col, row) = gfx::SLOT_SCROLL_UP;
            r.draw_image(&atlas.tile(col, row), loc.x, loc.y);
        }
        if layout.total_rows.saturating_sub(top) > self.table.rows {
            let loc = patch_to_screen(Vec2::new(size.x - 2, size.y - 1), screen_offset);
            let (col, row) = gfx::SLOT_SCROLL_DOWN;
            r.draw_image(&atlas.tile(col, row), loc.x, loc.y);
        }

        let first = top * columns;
        let end = (first + self.table.rows * columns).min(children.len());
        let pitch = layout.cell_size + self.cell_padding;
        for (i, child) in children.iter().enumerate().take(end).skip(first) {
            let visible = i - first;
            let cell = Vec2::new((visible % columns) as i32, (visible / columns) as i32);
            let patch = cell * pitch + Vec2::ONE;

            let loc = patch_to_screen(patch, screen_offset);
            let color = if child.enabled { Rgba::WHITE } else { Rgba::GREY };
            r.draw_text(&child.name, loc.x, loc.y, color);

            if child.has_children() {
                let loc = patch_to_screen(patch + Vec2::new(layout.cell_size.x, 0), screen_offset);
                let (col, row) = gfx::SLOT_SUBMENU;
                r.draw_image(&atlas.tile(col, row), loc.x, loc.y);
            }
        }
    }

    /// The 2x2 cursor glyph starts one patch left of the cell's column
    /// origin and on the cell's first text row.
    fn cursor_position(&self, layout: &Layout, screen_offset: Vec2) -> Vec2 {
        let pitch = layout.cell_size + self.cell_padding;
        let column = self.nav.cursor.column as i32;
        let row = self.nav.cursor.row as i32 - self.nav.top_visible_row as i32;
        Vec2::new(
            column * pitch.x * PATCH_SIZE.x + screen_offset.x - PATCH_SIZE.x,
            row * pitch.y * PATCH_SIZE.y + screen_offset.y + PATCH_SIZE.y,
        )
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} children: {}", self.name, self.children.len())
    }
}

fn patch_to_screen(patch: Vec2, screen_offset: Vec2) -> Vec2 {
    patch * PATCH_SIZE + screen_offset
}

/// 0 on the leading edge, 2 on the trailing edge, 1 in between.
fn edge_index(i: i32, len: i32) -> usize {
    if i == len - 1 {
        2
    } else if i > 0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_intrinsic_size_is_name_length() {
        let item = MenuItem::new("Fire".into(), None);
        assert_eq!(item.intrinsic_size(), Vec2::new(4, 1));
    }

    #[test]
    fn new_item_defaults() {
        let item = MenuItem::new("root".into(), None);
        assert_eq!(item.id(), None);
        assert!(item.is_enabled());
        assert!(!item.has_children());
        assert_eq!(item.table(), GridShape::new(1, 0));
        assert_eq!(item.cell_padding(), Vec2::new(2, 0));
        assert_eq!(item.patch_size(), Vec2::new(16, 24));
        assert!(matches!(item.layout(), Err(MenuError::NotBuilt { .. })));
    }

    #[test]
    fn layout_for_battle_table() {
        let sizes = ["Attack", "Magic", "Defend", "Items", "Escape"]
            .iter()
            .map(|n| Vec2::new(n.len() as i32, 1));
        let layout = Layout::compute(GridShape::new(2, 3), DEFAULT_CELL_PADDING, sizes, 5);
        assert_eq!(layout.cell_size, Vec2::new(6, 1));
        assert_eq!(layout.total_rows, 3);
        // 2*6 + 1*2 + 2 wide, 3*1 + 2*0 + 2 high
        assert_eq!(layout.size_in_patches, Vec2::new(16, 5));
    }

    #[test]
    fn layout_of_leaf_is_just_the_border() {
        let layout = Layout::compute(GridShape::default(), DEFAULT_CELL_PADDING, std::iter::empty(), 0);
        assert_eq!(layout.cell_size, Vec2::ZERO);
        assert_eq!(layout.total_rows, 0);
        assert_eq!(layout.size_in_patches, Vec2::new(2, 2));
    }

    #[test]
    fn edge_index_marks_corners_and_edges() {
        let picks: Vec<usize> = (0..4).map(|i| edge_index(i, 4)).collect();
        assert_eq!(picks, vec![0, 1, 1, 2]);
    }

    #[test]
    fn display_lists_child_count() {
        let item = MenuItem::new("Magic".into(), None);
        assert_eq!(item.to_string(), "Magic children: 0");
    }
}
