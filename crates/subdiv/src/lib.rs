// ABOUTME: Widget layer for the subdiv tiling pane engine.
// ABOUTME: Pointer-driven gestures, event stream, and the widget context object.

mod events;
mod gesture;
mod widget;

pub use events::{Event, EventEmitter, ListenerId, PaneRef};
pub use gesture::{DividerPreview, GesturePreview, SplitPreview};
pub use widget::Subdivide;

pub use subdiv_core::{Axis, Config, Edge, Rect, Side};
pub use subdiv_layout::{
    ContentRef, Divider, LayoutError, LayoutNode, LayoutTree, NodeId, PaneGeometry,
};
