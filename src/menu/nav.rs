//! Cursor / scroll state machine for a single panel.
//!
//! Pure functions over a `Copy` state value, so the math can be tested
//! without a tree or a renderer. Moves clamp, they never wrap.

use crate::geom::GridShape;

/// Discrete directional input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A grid slot in a panel's table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CellPos {
    pub column: usize,
    pub row: usize,
}

impl CellPos {
    pub const fn new(column: usize, row: usize) -> Self {
        CellPos { column, row }
    }
}

/// Per-panel navigation state.
///
/// `selected` is the flat child index of `cursor`
/// (`row * columns + column`). It always names an existing child
/// when the panel has children.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NavState {
    pub cursor: CellPos,
    pub top_visible_row: usize,
    pub selected: usize,
}

/// Rows needed to hold `child_count` items in `columns` columns.
pub fn total_rows(child_count: usize, columns: usize) -> usize {
    child_count.div_ceil(columns.max(1))
}

/// Largest scroll offset that still fills the visible window.
pub fn max_top_row(shape: GridShape, total_rows: usize) -> usize {
    total_rows.saturating_sub(shape.rows)
}

/// Apply one directional move and return the resulting state.
pub fn apply_move(
    state: NavState,
    dir: Direction,
    shape: GridShape,
    total_rows: usize,
    child_count: usize,
) -> NavState {
    let mut next = state;
    match dir {
        Direction::Up => {
            next.cursor.row = next.cursor.row.saturating_sub(1);
            if next.cursor.row < next.top_visible_row {
                next.top_visible_row -= 1;
            }
        }
        Direction::Down => {
            next.cursor.row = (next.cursor.row + 1).min(total_rows.saturating_sub(1));
            // row > top + rows - 1, written without underflow
            if next.cursor.row + 1 > next.top_visible_row + shape.rows {
                next.top_visible_row =
                    (next.top_visible_row + 1).min(max_top_row(shape, total_rows));
            }
        }
        Direction::Left => {
            next.cursor.column = next.cursor.column.saturating_sub(1);
        }
        Direction::Right => {
            next.cursor.column = (next.cursor.column + 1).min(shape.columns.saturating_sub(1));
        }
    }
    clamp_to_last_item(next, shape.columns, child_count)
}

/// Re-derive `selected` and pull the cursor back onto the last child
/// when it rests on an empty slot of a partially filled last row.
pub fn clamp_to_last_item(state: NavState, columns: usize, child_count: usize) -> NavState {
    let columns = columns.max(1);
    let mut next = state;
    next.selected = next.cursor.row * columns + next.cursor.column;
    if child_count > 0 && next.selected >= child_count {
        let last = child_count - 1;
        next.cursor = CellPos::new(last % columns, last / columns);
        next.selected = last;
    }
    next
}

/// Bring a state back inside the bounds of a (possibly reshaped) panel.
/// Used after a rebuild, when the table or child count may have changed.
pub fn normalize(state: NavState, shape: GridShape, total_rows: usize, child_count: usize) -> NavState {
    let mut next = state;
    next.cursor.row = next.cursor.row.min(total_rows.saturating_sub(1));
    next.cursor.column = next.cursor.column.min(shape.columns.saturating_sub(1));
    next.top_visible_row = next
        .top_visible_row
        .min(max_top_row(shape, total_rows))
        .min(next.cursor.row);
    if shape.rows > 0 && next.cursor.row >= next.top_visible_row + shape.rows {
        next.top_visible_row = next.cursor.row + 1 - shape.rows;
    }
    clamp_to_last_item(next, shape.columns, child_count)
}
