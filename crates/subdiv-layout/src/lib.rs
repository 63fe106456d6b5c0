// ABOUTME: Tiling layout tree engine for recursively splittable pane grids.
// ABOUTME: Arena tree with split/resize/remove primitives, geometry, serialization.

mod compose;
mod serialize;
mod tree;

pub use compose::{Divider, PaneGeometry};
pub use serialize::{LayoutError, LayoutNode};
pub use tree::{ContentRef, LayoutTree, Node, NodeId, NodeKind};
