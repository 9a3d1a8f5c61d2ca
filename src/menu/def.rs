//! Declarative menu definitions.
//!
//! A `MenuDef` mirrors the builder API as data, so menus can live in a TOML
//! file instead of setup code:
//!
//! ```toml
//! name = "main"
//! table = [2, 3]
//!
//! [[items]]
//! name = "Attack"
//! id = 101
//!
//! [[items]]
//! name = "Magic"
//! table = [1, 2]
//!
//!   [[items.items]]
//!   name = "Fire"
//!   id = 201
//! ```
//!
//! Repeated names merge into one entry, the same way `add_or_get_child`
//! behaves.

use std::path::Path;

use serde::Deserialize;

use crate::error::{MenuError, Result};

use super::tree::{MenuTree, NodeId};

/// The battle menu shipped with the demo.
const BATTLE_MENU: &str = include_str!("../../menus/battle.toml");

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MenuDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<i32>,
    /// Unset leaves the node as it is, so a repeated entry does not
    /// re-enable one disabled earlier.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// `[columns, rows]`
    #[serde(default)]
    pub table: Option<[usize; 2]>,
    #[serde(default)]
    pub items: Vec<MenuDef>,
}

impl MenuDef {
    pub fn parse(text: &str) -> Result<MenuDef> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<MenuDef> {
        let text = std::fs::read_to_string(path).map_err(|source| MenuError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// The embedded battle menu.
    pub fn battle() -> Result<MenuDef> {
        Self::parse(BATTLE_MENU)
    }

    /// Create a tree with this definition as its root, already built.
    pub fn to_tree(&self) -> Result<MenuTree> {
        let mut tree = MenuTree::new(self.name.as_str());
        let root = tree.root();
        self.apply(&mut tree, root)?;
        tree.build(root)?;
        Ok(tree)
    }

    /// Apply this definition to `node` and create its children. Does not
    /// build; call `MenuTree::build` afterwards.
    pub fn apply(&self, tree: &mut MenuTree, node: NodeId) -> Result<()> {
        if let Some([columns, rows]) = self.table {
            tree.set_table(node, columns, rows)?;
        }
        if let Some(id) = self.id {
            tree.set_id(node, id)?;
        }
        if let Some(enabled) = self.enabled {
            tree.set_enabled(node, enabled)?;
        }
        for item in &self.items {
            let child = tree.add_or_get_child(node, &item.name)?;
            item.apply(tree, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{GridShape, Vec2};
    use crate::menu::{Confirmed, MenuStack};

    #[test]
    fn embedded_battle_menu_builds() {
        let def = MenuDef::battle().unwrap();
        assert_eq!(def.name, "main");
        assert_eq!(def.items.len(), 5);

        let tree = def.to_tree().unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.table(), GridShape::new(2, 3));
        assert_eq!(root.layout().unwrap().total_rows, 3);
        assert_eq!(root.layout().unwrap().size_in_patches, Vec2::new(16, 5));

        let magic = tree.child(tree.root(), "Magic").unwrap();
        let black = tree.child(magic, "Black").unwrap();
        assert_eq!(tree.get(black).unwrap().child_count(), 18);
        let blizzara = tree.child(black, "Blizzara").unwrap();
        assert!(!tree.get(blizzara).unwrap().is_enabled());
        assert_eq!(tree.get(blizzara).unwrap().id(), Some(205));

        let items = tree.child(tree.root(), "Items").unwrap();
        assert!(!tree.get(items).unwrap().is_enabled());
    }

    #[test]
    fn battle_menu_down_three_lands_on_escape() {
        let mut tree = MenuDef::battle().unwrap().to_tree().unwrap();
        let mut stack = MenuStack::new();
        stack.open(tree.root());
        for _ in 0..3 {
            stack.move_down(&mut tree).unwrap();
        }
        let chosen = stack.confirm(&tree).unwrap().and_then(Confirmed::chosen).unwrap();
        let escape = tree.get(chosen).unwrap();
        assert_eq!(escape.name(), "Escape");
        assert_eq!(escape.id(), Some(103));
    }

    #[test]
    fn disabled_first_entry_is_rejected_immediately() {
        let text = r#"
            name = "root"
            [[items]]
            name = "Locked"
            enabled = false
            [[items.items]]
            name = "Secret"
            [[items]]
            name = "Open"
        "#;
        let tree = MenuDef::parse(text).unwrap().to_tree().unwrap();
        let mut stack = MenuStack::new();
        stack.open(tree.root());
        let got = stack.confirm(&tree).unwrap().unwrap();
        assert!(matches!(got, Confirmed::Rejected(_)));
        assert_eq!(got.chosen(), None);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn repeated_names_merge() {
        let text = r#"
            name = "root"
            [[items]]
            name = "A"
            id = 1
            enabled = false
            [[items]]
            name = "A"
            table = [2, 1]
            [[items]]
            name = "A"
            id = 7
        "#;
        let tree = MenuDef::parse(text).unwrap().to_tree().unwrap();
        assert_eq!(tree.children(tree.root()).unwrap().len(), 1);
        let a = tree.get(tree.child(tree.root(), "A").unwrap()).unwrap();
        assert_eq!(a.id(), Some(7));
        assert_eq!(a.table(), GridShape::new(2, 1));
        assert!(!a.is_enabled());
    }

    #[test]
    fn unknown_keys_and_zero_columns_are_errors() {
        assert!(matches!(
            MenuDef::parse("name = \"x\"\ncolour = 3\n"),
            Err(MenuError::Definition(_))
        ));
        let zero = MenuDef::parse("name = \"x\"\ntable = [0, 2]\n").unwrap();
        assert!(matches!(zero.to_tree(), Err(MenuError::InvalidTable { .. })));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MenuDef::load(Path::new("/nonexistent/retromenu/menu.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/retromenu/menu.toml"));
    }
}
