//! Small integer geometry used by the layout math.
//!
//! Everything is in `i32` because screen positions may go negative
//! (the cursor glyph sits one patch left of the first column).

use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2D integer vector: pixels, patches or grid units depending on context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0, y: 0 };
    pub const ONE: Vec2 = Vec2 { x: 1, y: 1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Vec2 { x, y }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component-wise (Hadamard) product.
impl Mul for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl From<[i32; 2]> for Vec2 {
    fn from(v: [i32; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

/// Table dimensions of a panel: how its children are arranged.
///
/// `columns` is always at least 1 (enforced by `MenuTree::set_table`).
/// `rows` is the number of *visible* rows; the panel scrolls when
/// there are more.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridShape {
    pub columns: usize,
    pub rows: usize,
}

impl GridShape {
    pub const fn new(columns: usize, rows: usize) -> Self {
        GridShape { columns, rows }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.columns as i32, self.rows as i32)
    }
}

impl Default for GridShape {
    /// One column, nothing arranged yet.
    fn default() -> Self {
        GridShape { columns: 1, rows: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hadamard_product_and_sum() {
        let a = Vec2::new(2, 3);
        let b = Vec2::new(4, 5);
        assert_eq!(a * b, Vec2::new(8, 15));
        assert_eq!(a + b - Vec2::ONE, Vec2::new(5, 7));
    }

    #[test]
    fn max_is_component_wise() {
        assert_eq!(Vec2::new(6, 1).max(Vec2::new(4, 2)), Vec2::new(6, 2));
    }

    #[test]
    fn default_grid_is_single_empty_column() {
        assert_eq!(GridShape::default(), GridShape::new(1, 0));
    }
}
