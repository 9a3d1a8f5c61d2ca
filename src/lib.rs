//! RetroMenu: nested, grid-laid-out menus for tile-based game UIs.
//!
//! ```text
//!   MenuDef (TOML) ──► MenuTree ──build()──► MenuStack ──draw()──► Renderer
//!                        ▲                      │
//!                        └──── NodeId ──────────┘
//! ```
//!
//! The tree owns the items; the stack only holds handles into it. Drawing
//! goes through the `gfx::Renderer` / `gfx::TileAtlas` traits, with a
//! crossterm backend in `gfx::terminal`.

pub mod error;
pub mod geom;
pub mod gfx;
pub mod menu;

pub use error::{MenuError, Result};
pub use geom::{GridShape, Vec2};
pub use menu::{Confirmed, Direction, MenuDef, MenuStack, MenuTree, NodeId};
