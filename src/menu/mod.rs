//! The menu engine: item tree, per-panel navigation and the panel stack.

pub mod def;
pub mod item;
pub mod nav;
pub mod stack;
pub mod tree;

pub use def::MenuDef;
pub use item::{Layout, LayoutState, MenuItem, PATCH_SIZE};
pub use nav::{CellPos, Direction, NavState};
pub use stack::{Confirmed, MenuStack};
pub use tree::{Confirm, MenuTree, NodeId, NodeMut};
