//! Grid coordinates and screen-space geometry
//!
//! Grid games address cells by `Position`. The catch and collector games work
//! in screen points (`Vec2`, y grows downward) inside layout `Bounds` supplied
//! by the presentation layer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cell address on a square grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    #[inline]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Row-major index on a grid of width `size`, if the position is on it
    #[inline]
    pub fn index(self, size: usize) -> Option<usize> {
        (self.row < size && self.column < size).then_some(self.row * size + self.column)
    }

    #[inline]
    pub fn from_index(index: usize, size: usize) -> Self {
        Self::new(index / size, index % size)
    }
}

/// Axis-aligned rectangle in screen points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Half-open containment: min edges inside, max edges outside
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }

    /// Shrink by `padding` on every side (never below zero size)
    pub fn inset_by(&self, padding: f32) -> Bounds {
        Bounds::new(
            self.origin.x + padding,
            self.origin.y + padding,
            self.size.x - 2.0 * padding,
            self.size.y - 2.0 * padding,
        )
    }
}

/// Safe-area insets reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Insets {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// True when two points are closer than `radius`
#[inline]
pub fn within_reach(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance(b) < radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_index() {
        assert_eq!(Position::new(1, 2).index(3), Some(5));
        assert_eq!(Position::new(3, 0).index(3), None);
        assert_eq!(Position::from_index(5, 3), Position::new(1, 2));
    }

    #[test]
    fn test_bounds_contains_is_half_open() {
        let b = Bounds::new(0.0, 50.0, 100.0, 200.0);
        assert!(b.contains(Vec2::new(0.0, 50.0)));
        assert!(b.contains(Vec2::new(99.9, 249.9)));
        assert!(!b.contains(Vec2::new(100.0, 100.0)));
        assert!(!b.contains(Vec2::new(50.0, 250.0)));
        assert!(!b.contains(Vec2::new(50.0, 49.0)));
        assert_eq!(b.center(), Vec2::new(50.0, 150.0));
    }

    #[test]
    fn test_inset_never_negative() {
        let b = Bounds::new(0.0, 0.0, 20.0, 20.0).inset_by(15.0);
        assert!(b.is_empty());
        assert_eq!(b.width(), 0.0);
    }

    #[test]
    fn test_within_reach() {
        assert!(within_reach(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.1));
        assert!(!within_reach(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
    }
}
