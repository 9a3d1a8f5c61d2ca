//! MenuTree: arena owning every `MenuItem`, addressed by `NodeId`.
//!
//! The application builds the tree once (builder API or a `MenuDef`),
//! calls `build(root)`, then hands the root to a `MenuStack`. The stack
//! only keeps `NodeId`s, so restructuring the tree never leaves it holding
//! a dangling reference.
//!
//! Layout is cached per node (`LayoutState`). Any structural change
//! invalidates the node and all of its ancestors; navigation and drawing
//! refuse to run on a node that is not built.

use tracing::{debug, trace};

use crate::error::{MenuError, Result};
use crate::geom::{GridShape, Vec2};
use crate::gfx::{Renderer, TileAtlas};

use super::item::{Layout, LayoutState, MenuItem};
use super::nav::{self, Direction, NavState};

/// Handle to a node inside one `MenuTree`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

/// What confirming on a panel means.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Confirm {
    /// The selected child has children of its own: open it.
    Descend(NodeId),
    /// The selected child is a leaf: it is the final choice.
    SelectLeaf(NodeId),
}

#[derive(Clone, Debug)]
pub struct MenuTree {
    nodes: Vec<MenuItem>,
}

impl MenuTree {
    /// A tree holding only its root.
    pub fn new(root_name: impl Into<String>) -> Self {
        MenuTree {
            nodes: vec![MenuItem::new(root_name.into(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Result<&MenuItem> {
        self.nodes.get(id.0).ok_or(MenuError::InvalidNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut MenuItem> {
        self.nodes.get_mut(id.0).ok_or(MenuError::InvalidNode(id))
    }

    // ── Builder API ──

    /// Insert a child named `name`, or return the existing one.
    pub fn add_or_get_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.get(parent)?;
        Ok(self.insert_child(parent, name))
    }

    /// `parent` must be valid.
    fn insert_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(&pos) = self.nodes[parent.0].index.get(name) {
            return self.nodes[parent.0].children[pos];
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(MenuItem::new(name.to_string(), Some(parent)));
        let item = &mut self.nodes[parent.0];
        item.index.insert(name.to_string(), item.children.len());
        item.children.push(id);
        self.invalidate_from(parent);
        id
    }

    /// Builder-style editing of one node.
    pub fn edit(&mut self, id: NodeId) -> Result<NodeMut<'_>> {
        self.get(id)?;
        Ok(NodeMut { tree: self, id })
    }

    /// Look up a direct child by name.
    pub fn child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
        let item = self.get(parent)?;
        item.index
            .get(name)
            .map(|&pos| item.children[pos])
            .ok_or_else(|| MenuError::UnknownChild {
                parent: item.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    pub fn set_table(&mut self, id: NodeId, columns: usize, rows: usize) -> Result<()> {
        let item = self.get_mut(id)?;
        if columns == 0 {
            return Err(MenuError::InvalidTable { name: item.name.clone() });
        }
        item.table = GridShape::new(columns, rows);
        self.invalidate_from(id);
        Ok(())
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_id(&mut self, id: NodeId, command_id: i32) -> Result<()> {
        self.get_mut(id)?.set_id(command_id);
        Ok(())
    }

    /// Rename a node, keeping the parent's name index in step. The new
    /// name must not clash with a sibling.
    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        let old = self.get(id)?.name.clone();
        if old == name {
            return Ok(());
        }
        if let Some(parent) = self.nodes[id.0].parent {
            let siblings = &self.nodes[parent.0];
            if siblings.index.contains_key(name) {
                return Err(MenuError::DuplicateChild {
                    parent: siblings.name.clone(),
                    name: name.to_string(),
                });
            }
            let index = &mut self.nodes[parent.0].index;
            if let Some(pos) = index.remove(&old) {
                index.insert(name.to_string(), pos);
            }
        }
        self.nodes[id.0].name = name.to_string();
        // The parent's cell width depends on this name
        self.invalidate(id)
    }

    // ── Layout ──

    /// Compute layout for `id` and its whole subtree, children first.
    pub fn build(&mut self, id: NodeId) -> Result<()> {
        let children = self.get(id)?.children.clone();
        for &child in &children {
            self.build(child)?;
        }

        let item = &self.nodes[id.0];
        let sizes = children.iter().map(|c| self.nodes[c.0].intrinsic_size());
        let layout = Layout::compute(item.table, item.cell_padding(), sizes, children.len());

        let item = &mut self.nodes[id.0];
        item.layout = LayoutState::Built(layout);
        item.nav = nav::normalize(item.nav, item.table, layout.total_rows, children.len());
        trace!(menu = %item.name, ?layout, "built");
        Ok(())
    }

    /// Mark `id` and every ancestor as needing a rebuild.
    pub fn invalidate(&mut self, id: NodeId) -> Result<()> {
        self.get(id)?;
        self.invalidate_from(id);
        Ok(())
    }

    fn invalidate_from(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(node) = cur {
            let item = &mut self.nodes[node.0];
            item.layout = LayoutState::NotBuilt;
            cur = item.parent;
        }
    }

    // ── Navigation ──

    /// Move the cursor of panel `id` one step.
    ///
    /// Precondition: the panel is built and has children.
    pub fn navigate(&mut self, id: NodeId, dir: Direction) -> Result<()> {
        let item = self.get_mut(id)?;
        let layout = item.navigable_layout()?;
        item.nav = nav::apply_move(item.nav, dir, item.table, layout.total_rows, item.children.len());
        debug!(
            menu = %item.name,
            ?dir,
            column = item.nav.cursor.column,
            row = item.nav.cursor.row,
            selected = item.nav.selected,
            "cursor moved"
        );
        Ok(())
    }

    /// Confirm the current selection of panel `id`.
    pub fn confirm(&self, id: NodeId) -> Result<Confirm> {
        let child = self.selected_item(id)?;
        if self.nodes[child.0].has_children() {
            Ok(Confirm::Descend(child))
        } else {
            Ok(Confirm::SelectLeaf(child))
        }
    }

    /// Child under the cursor of panel `id`.
    pub fn selected_item(&self, id: NodeId) -> Result<NodeId> {
        let item = self.get(id)?;
        item.navigable_layout()?;
        Ok(item.children[item.nav.selected])
    }

    /// Put the cursor of panel `id` back on its first cell.
    pub fn reset_cursor(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.nav = NavState::default();
        Ok(())
    }

    // ── Drawing ──

    /// Draw panel `id` at `screen_offset` and record its cursor position.
    pub fn draw_panel<R, A>(
        &mut self,
        id: NodeId,
        r: &mut R,
        atlas: &A,
        screen_offset: Vec2,
        draw_tile_borders: bool,
    ) -> Result<Vec2>
    where
        R: Renderer,
        A: TileAtlas<Tile = R::Tile>,
    {
        let item = self.get(id)?;
        let children: Vec<&MenuItem> = item.children.iter().map(|c| &self.nodes[c.0]).collect();
        let cursor = item.draw_self(&children, r, atlas, screen_offset, draw_tile_borders)?;
        self.nodes[id.0].cursor_screen_pos = cursor;
        Ok(cursor)
    }
}

/// Chainable editor for one node, from `MenuTree::edit`.
///
/// ```
/// use retromenu::menu::MenuTree;
///
/// let mut tree = MenuTree::new("main");
/// let root = tree.root();
/// tree.edit(root).unwrap().table(2, 3).unwrap();
/// tree.edit(root).unwrap().add("Magic").add("Black").add("Fire").id(201);
/// tree.build(root).unwrap();
/// ```
pub struct NodeMut<'a> {
    tree: &'a mut MenuTree,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub fn handle(&self) -> NodeId {
        self.id
    }

    /// Move to the child `name`, creating it if needed.
    pub fn add(self, name: &str) -> NodeMut<'a> {
        let child = self.tree.insert_child(self.id, name);
        NodeMut { tree: self.tree, id: child }
    }

    pub fn table(self, columns: usize, rows: usize) -> Result<Self> {
        self.tree.set_table(self.id, columns, rows)?;
        Ok(self)
    }

    pub fn id(self, command_id: i32) -> Self {
        self.tree.nodes[self.id.0].set_id(command_id);
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.tree.nodes[self.id.0].enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::record::{GridAtlas, RecordingRenderer};
    use crate::gfx::Rgba;
    use crate::menu::nav::CellPos;

    /// The battle menu from the demo, built by hand.
    fn battle() -> MenuTree {
        let mut t = MenuTree::new("main");
        let root = t.root();
        t.set_table(root, 2, 3).unwrap();
        t.edit(root).unwrap().add("Attack").id(101);
        let magic = t.add_or_get_child(root, "Magic").unwrap();
        t.set_table(magic, 1, 2).unwrap();
        let white = t.edit(magic).unwrap().add("White").table(3, 6).unwrap().handle();
        for (i, name) in ["Cure", "Cura", "Curaga", "Esuna"].iter().enumerate() {
            t.edit(white).unwrap().add(name).id(401 + i as i32);
        }
        let black = t.edit(magic).unwrap().add("Black").table(3, 4).unwrap().handle();
        let spells = [
            "Fire", "Fira", "Firaga", "Blizzard", "Blizzara", "Blizzaga",
            "Thunder", "Thundara", "Thundaga", "Quake", "Quake2", "Quake3",
            "Bio", "Bio1", "Bio2", "Demi", "Demi1", "Demi2",
        ];
        for (i, name) in spells.iter().enumerate() {
            t.edit(black).unwrap().add(name).id(201 + i as i32);
        }
        let blizzara = t.child(black, "Blizzara").unwrap();
        t.set_enabled(blizzara, false).unwrap();
        t.edit(root).unwrap().add("Defend").id(102);
        let items = t.edit(root).unwrap().add("Items").table(2, 4).unwrap().enabled(false).handle();
        t.edit(items).unwrap().add("Potion").id(301);
        t.edit(root).unwrap().add("Escape").id(103);
        t.build(root).unwrap();
        t
    }

    fn path(t: &MenuTree, names: &[&str]) -> NodeId {
        names.iter().fold(t.root(), |id, n| t.child(id, n).unwrap())
    }

    // ── Builder ──

    #[test]
    fn add_or_get_child_is_idempotent() {
        let mut t = MenuTree::new("root");
        let root = t.root();
        let a = t.add_or_get_child(root, "X").unwrap();
        let b = t.add_or_get_child(root, "X").unwrap();
        assert_eq!(a, b);
        assert_eq!(t.get(root).unwrap().child_count(), 1);
        assert_eq!(t.node_count(), 2);
    }

    #[test]
    fn children_keep_insertion_order() {
        let t = battle();
        let names: Vec<&str> = t.children(t.root()).unwrap().iter()
            .map(|&c| t.get(c).unwrap().name())
            .collect();
        assert_eq!(names, vec!["Attack", "Magic", "Defend", "Items", "Escape"]);
    }

    #[test]
    fn unknown_child_is_an_error() {
        let t = battle();
        let err = t.child(t.root(), "Summon").unwrap_err();
        assert!(matches!(err, MenuError::UnknownChild { ref name, .. } if name == "Summon"));
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let big = battle();
        let last = NodeId(big.node_count() - 1);
        let small = MenuTree::new("tiny");
        assert!(matches!(small.get(last), Err(MenuError::InvalidNode(_))));
    }

    #[test]
    fn zero_columns_rejected() {
        let mut t = MenuTree::new("root");
        let root = t.root();
        assert!(matches!(t.set_table(root, 0, 3), Err(MenuError::InvalidTable { .. })));
    }

    #[test]
    fn ids_and_enabled_flags_are_recorded() {
        let t = battle();
        let fire = path(&t, &["Magic", "Black", "Fire"]);
        assert_eq!(t.get(fire).unwrap().id(), Some(201));
        assert_eq!(t.get(t.root()).unwrap().id(), None);
        assert!(!t.get(path(&t, &["Items"])).unwrap().is_enabled());
    }

    #[test]
    fn rename_rekeys_parent_index() {
        let mut t = battle();
        let escape = path(&t, &["Escape"]);
        t.set_name(escape, "Run").unwrap();
        assert_eq!(t.child(t.root(), "Run").unwrap(), escape);
        assert!(t.child(t.root(), "Escape").is_err());
        assert!(!t.get(t.root()).unwrap().is_built());

        let err = t.set_name(escape, "Attack").unwrap_err();
        assert!(matches!(err, MenuError::DuplicateChild { .. }));
    }

    // ── Layout ──

    #[test]
    fn build_takes_max_child_size_at_every_level() {
        let t = battle();
        let black = path(&t, &["Magic", "Black"]);
        let fire = t.child(black, "Fire").unwrap();
        assert_eq!(t.get(fire).unwrap().intrinsic_size(), Vec2::new(4, 1));
        // "Blizzard" family and "Thundara" are 8 wide
        assert_eq!(t.get(black).unwrap().layout().unwrap().cell_size, Vec2::new(8, 1));
        // "White" / "Black"
        let magic = path(&t, &["Magic"]);
        assert_eq!(t.get(magic).unwrap().layout().unwrap().cell_size, Vec2::new(5, 1));
        // "Attack" / "Defend" / "Escape"
        assert_eq!(t.get(t.root()).unwrap().layout().unwrap().cell_size, Vec2::new(6, 1));
    }

    #[test]
    fn battle_root_layout() {
        let t = battle();
        let layout = *t.get(t.root()).unwrap().layout().unwrap();
        assert_eq!(layout.total_rows, 3);
        assert_eq!(layout.size_in_patches, Vec2::new(16, 5));

        let black = *t.get(path(&t, &["Magic", "Black"])).unwrap().layout().unwrap();
        assert_eq!(black.total_rows, 6);
        // 3*8 + 2*2 + 2, 4*1 + 3*0 + 2
        assert_eq!(black.size_in_patches, Vec2::new(30, 6));
    }

    #[test]
    fn adding_after_build_invalidates_ancestors_only() {
        let mut t = battle();
        let white = path(&t, &["Magic", "White"]);
        t.add_or_get_child(white, "Raise").unwrap();
        assert!(!t.get(white).unwrap().is_built());
        assert!(!t.get(path(&t, &["Magic"])).unwrap().is_built());
        assert!(!t.get(t.root()).unwrap().is_built());
        assert!(t.get(path(&t, &["Magic", "Black"])).unwrap().is_built());

        t.build(t.root()).unwrap();
        assert_eq!(t.get(white).unwrap().layout().unwrap().total_rows, 2);
    }

    #[test]
    fn existing_child_lookup_keeps_layout() {
        let mut t = battle();
        t.add_or_get_child(t.root(), "Attack").unwrap();
        assert!(t.get(t.root()).unwrap().is_built());
    }

    #[test]
    fn unbuilt_panel_refuses_navigation() {
        let mut t = MenuTree::new("root");
        let root = t.root();
        t.add_or_get_child(root, "A").unwrap();
        assert!(matches!(t.navigate(root, Direction::Down), Err(MenuError::NotBuilt { .. })));
        assert!(matches!(t.confirm(root), Err(MenuError::NotBuilt { .. })));
    }

    #[test]
    fn childless_panel_refuses_navigation() {
        let mut t = battle();
        let attack = path(&t, &["Attack"]);
        assert!(matches!(t.navigate(attack, Direction::Up), Err(MenuError::EmptyPanel { .. })));
        assert!(matches!(t.confirm(attack), Err(MenuError::EmptyPanel { .. })));
    }

    // ── Navigation / confirm ──

    #[test]
    fn down_three_times_selects_escape() {
        let mut t = battle();
        let root = t.root();
        for _ in 0..3 {
            t.navigate(root, Direction::Down).unwrap();
        }
        let item = t.get(root).unwrap();
        assert_eq!(item.cursor(), CellPos::new(0, 2));
        assert_eq!(item.selected_index(), 4);
        let escape = t.selected_item(root).unwrap();
        assert_eq!(t.get(escape).unwrap().name(), "Escape");
    }

    #[test]
    fn confirm_on_leaf_selects_it() {
        let t = battle();
        let attack = path(&t, &["Attack"]);
        assert_eq!(t.confirm(t.root()).unwrap(), Confirm::SelectLeaf(attack));
    }

    #[test]
    fn confirm_on_submenu_descends() {
        let mut t = battle();
        let root = t.root();
        t.navigate(root, Direction::Right).unwrap();
        let magic = path(&t, &["Magic"]);
        assert_eq!(t.confirm(root).unwrap(), Confirm::Descend(magic));
    }

    #[test]
    fn reset_cursor_returns_to_origin() {
        let mut t = battle();
        let root = t.root();
        t.navigate(root, Direction::Down).unwrap();
        t.reset_cursor(root).unwrap();
        assert_eq!(t.get(root).unwrap().nav(), NavState::default());
    }

    #[test]
    fn rebuild_keeps_cursor_in_range() {
        let mut t = battle();
        let black = path(&t, &["Magic", "Black"]);
        for _ in 0..5 {
            t.navigate(black, Direction::Down).unwrap();
        }
        t.set_table(black, 6, 2).unwrap();
        t.build(t.root()).unwrap();
        let item = t.get(black).unwrap();
        assert!(item.selected_index() < item.child_count());
        assert!(item.top_visible_row() <= 1);
    }

    // ── Drawing ──

    #[test]
    fn panel_background_uses_edge_tiles() {
        let mut t = battle();
        let mut r = RecordingRenderer::default();
        t.draw_panel(t.root(), &mut r, &GridAtlas, Vec2::new(100, 100), false).unwrap();

        let images = r.images();
        // 16 x 5 patches of background; no scroll markers, "Magic" and
        // "Items" get a submenu marker
        assert_eq!(images.len(), 16 * 5 + 2);
        assert!(images.contains(&((0, 0), 100, 100)));
        assert!(images.contains(&((2, 0), 100 + 15 * 16, 100)));
        assert!(images.contains(&((0, 2), 100, 100 + 4 * 24)));
        assert!(images.contains(&((2, 2), 100 + 15 * 16, 100 + 4 * 24)));
        assert!(images.contains(&((1, 1), 100 + 16, 100 + 24)));
        assert!(images.contains(&((1, 0), 100 + 16, 100)));
        assert!(images.contains(&((0, 1), 100, 100 + 24)));
        assert_eq!(r.rects(), 0);
    }

    #[test]
    fn items_drawn_in_grid_with_dimmed_disabled() {
        let mut t = battle();
        let mut r = RecordingRenderer::default();
        t.draw_panel(t.root(), &mut r, &GridAtlas, Vec2::ZERO, false).unwrap();

        let texts = r.texts();
        // cell pitch is 6 + 2 patches horizontally, 1 vertically
        assert_eq!(texts[0], ("Attack".to_string(), 16, 24, Rgba::WHITE));
        assert_eq!(texts[1], ("Magic".to_string(), 9 * 16, 24, Rgba::WHITE));
        assert_eq!(texts[2], ("Defend".to_string(), 16, 48, Rgba::WHITE));
        assert_eq!(texts[3], ("Items".to_string(), 9 * 16, 48, Rgba::GREY));
        assert_eq!(texts[4], ("Escape".to_string(), 16, 72, Rgba::WHITE));

        // submenu marker right after the 6-wide cell of "Magic"
        assert!(r.images().contains(&((3, 1), 15 * 16, 24)));
    }

    #[test]
    fn scroll_markers_follow_the_window() {
        let mut t = battle();
        let black = path(&t, &["Magic", "Black"]);
        let off = Vec2::ZERO;

        let mut r = RecordingRenderer::default();
        t.draw_panel(black, &mut r, &GridAtlas, off, false).unwrap();
        // 30 x 6 patches: down marker at (28, 5) only
        assert!(r.images().contains(&((3, 2), 28 * 16, 5 * 24)));
        assert!(!r.images().iter().any(|(tile, _, _)| *tile == (3, 0)));
        assert_eq!(r.texts().len(), 12);

        for _ in 0..5 {
            t.navigate(black, Direction::Down).unwrap();
        }
        let mut r = RecordingRenderer::default();
        t.draw_panel(black, &mut r, &GridAtlas, off, false).unwrap();
        assert!(r.images().contains(&((3, 0), 28 * 16, 0)));
        assert!(!r.images().iter().any(|(tile, _, _)| *tile == (3, 2)));
        // window now starts at row 2: "Thunder"
        assert_eq!(r.texts()[0].0, "Thunder");
        assert_eq!(r.texts().len(), 12);
    }

    #[test]
    fn cursor_position_tracks_cell() {
        let mut t = battle();
        let root = t.root();
        let off = Vec2::new(100, 100);

        let pos = t.draw_panel(root, &mut RecordingRenderer::default(), &GridAtlas, off, false).unwrap();
        assert_eq!(pos, Vec2::new(100 - 16, 100 + 24));

        t.navigate(root, Direction::Right).unwrap();
        t.navigate(root, Direction::Down).unwrap();
        let pos = t.draw_panel(root, &mut RecordingRenderer::default(), &GridAtlas, off, false).unwrap();
        assert_eq!(pos, Vec2::new(8 * 16 + 100 - 16, 24 + 100 + 24));
        assert_eq!(t.get(root).unwrap().cursor_screen_pos(), pos);
    }

    #[test]
    fn debug_bounds_outline_every_patch() {
        let mut t = battle();
        let mut r = RecordingRenderer::default();
        t.draw_panel(t.root(), &mut r, &GridAtlas, Vec2::ZERO, true).unwrap();
        assert_eq!(r.rects(), 16 * 5);
    }

    #[test]
    fn drawing_unbuilt_panel_fails() {
        let mut t = MenuTree::new("root");
        let mut r = RecordingRenderer::default();
        let root = t.root();
        let err = t.draw_panel(root, &mut r, &GridAtlas, Vec2::ZERO, false).unwrap_err();
        assert!(matches!(err, MenuError::NotBuilt { .. }));
        assert!(r.calls.is_empty());
    }
}
