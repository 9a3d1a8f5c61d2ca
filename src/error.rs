//! Error types for menu building, navigation and definition loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::menu::NodeId;

/// Everything that can go wrong while driving a menu.
///
/// Disabled entries are *not* errors: confirming one is ordinary
/// control flow reported through `Confirmed::Rejected`.
#[derive(Debug, Error)]
pub enum MenuError {
    /// Handle does not belong to this tree.
    #[error("node {0:?} does not exist in this menu tree")]
    InvalidNode(NodeId),

    /// Child lookup by name failed.
    #[error("menu '{parent}' has no child named '{name}'")]
    UnknownChild {
        parent: String,
        name: String,
    },

    /// Renaming would give two siblings the same name.
    #[error("menu '{parent}' already has a child named '{name}'")]
    DuplicateChild {
        parent: String,
        name: String,
    },

    /// Navigation or confirm was routed to a panel without children.
    #[error("menu '{name}' has no children to navigate")]
    EmptyPanel { name: String },

    /// Layout was read before `build()` ran (or after an invalidation).
    #[error("menu '{name}' has not been built; call MenuTree::build first")]
    NotBuilt { name: String },

    /// A table needs at least one column.
    #[error("menu '{name}' cannot use a table with zero columns")]
    InvalidTable { name: String },

    /// TOML menu definition failed to parse.
    #[error("invalid menu definition: {0}")]
    Definition(#[from] toml::de::Error),

    /// Menu definition file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MenuError>;
