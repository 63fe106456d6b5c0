// ABOUTME: Fraction-based geometry primitives for the layout engine.
// ABOUTME: Rectangles in normalized 0..1 container coordinates, axes, edges.

use serde::{Deserialize, Serialize};

/// Tolerance for fraction comparisons. Sizes and positions within this
/// distance of 0 or 1 are treated as exactly 0 or 1.
pub const EPSILON: f32 = 1e-4;

/// Rectangle in normalized container coordinates (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn full() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }

    /// Offset of the rectangle's leading edge along the given axis
    pub fn start(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Row => self.left,
            Axis::Column => self.top,
        }
    }

    /// Extent of the rectangle along the given axis
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Row => self.width,
            Axis::Column => self.height,
        }
    }
}

/// Direction a group's children run in.
///
/// Row children are arranged left-to-right and separated by vertical
/// dividers; Column children run top-to-bottom with horizontal dividers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// Component of a point along this axis (x for Row, y for Column)
    pub fn component(&self, x: f32, y: f32) -> f32 {
        match self {
            Axis::Row => x,
            Axis::Column => y,
        }
    }
}

/// Which side of a reference child a sibling sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// One of the four edges of a pane rectangle.
///
/// The edge a split gesture starts from determines both the split axis
/// and the side the new pane appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn axis(&self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::Row,
            Edge::Top | Edge::Bottom => Axis::Column,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Edge::Left | Edge::Top => Side::Before,
            Edge::Right | Edge::Bottom => Side::After,
        }
    }
}
