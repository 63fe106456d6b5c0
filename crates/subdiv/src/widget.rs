// ABOUTME: The widget context object owning tree, config, and gesture state.
// ABOUTME: Routes pointer events to gestures and commits mutations with events.

use subdiv_core::Config;
use subdiv_layout::{Divider, LayoutError, LayoutNode, LayoutTree, PaneGeometry};

use crate::events::{Event, EventEmitter, ListenerId, PaneRef};
use crate::gesture::{DividerGesture, GesturePreview, SplitGesture};

enum Gesture {
    Idle,
    Split(SplitGesture),
    Divider(DividerGesture),
}

/// One tiling pane widget instance.
///
/// Owns the layout tree, configuration, event listeners, and the active
/// gesture. Instances are fully independent; there is no process-wide
/// state. All mutation happens synchronously inside the pointer-up that
/// commits a gesture.
pub struct Subdivide {
    config: Config,
    tree: LayoutTree,
    emitter: EventEmitter,
    gesture: Gesture,
    width_px: f32,
    height_px: f32,
}

impl Subdivide {
    /// A widget holding a single pane that fills the container
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tree: LayoutTree::new(),
            emitter: EventEmitter::new(),
            gesture: Gesture::Idle,
            width_px: 0.0,
            height_px: 0.0,
        }
    }

    /// A widget starting from a caller-supplied layout. Malformed input
    /// is rejected; the widget refuses to initialize rather than repair.
    pub fn with_layout(config: Config, layout: &LayoutNode) -> Result<Self, LayoutError> {
        let tree = LayoutTree::from_layout(layout)?;
        Ok(Self {
            config,
            tree,
            emitter: EventEmitter::new(),
            gesture: Gesture::Idle,
            width_px: 0.0,
            height_px: 0.0,
        })
    }

    /// Announce the starting layout to listeners. Call once after the
    /// host has registered its listeners and mounted the widget.
    pub fn mount(&mut self) {
        tracing::info!(panes = self.tree.panes().len(), "widget mounted");
        let layout = self.tree.to_layout();
        self.emitter.emit(&Event::Layout { layout });
    }

    /// Update the container's pixel size, used to normalize pointer
    /// coordinates and to size divider grab regions
    pub fn resize(&mut self, width_px: f32, height_px: f32) {
        self.width_px = width_px;
        self.height_px = height_px;
    }

    pub fn on(&mut self, listener: impl FnMut(&Event) + 'static) -> ListenerId {
        self.emitter.on(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// Serialized form of the committed tree
    pub fn layout(&self) -> LayoutNode {
        self.tree.to_layout()
    }

    /// Absolute geometry for every pane, for the rendering collaborator
    pub fn pane_rects(&self) -> Vec<PaneGeometry> {
        self.tree.pane_rects()
    }

    /// Divider descriptors for every adjacent-sibling boundary
    pub fn dividers(&self) -> Vec<Divider> {
        self.tree.dividers()
    }

    /// The active gesture's preview, if one is in flight
    pub fn preview(&self) -> Option<GesturePreview> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Split(gesture) => Some(GesturePreview::Split(gesture.preview())),
            Gesture::Divider(gesture) => Some(GesturePreview::Divider(gesture.preview())),
        }
    }

    /// Pointer-down entry point. Pixel coordinates; `split_modifier` is
    /// the host's designated split key state. Lands on a divider grab
    /// region first, then (with the modifier) on a pane; anything else is
    /// silently ignored.
    pub fn pointer_down(&mut self, x_px: f32, y_px: f32, split_modifier: bool) {
        if self.width_px <= 0.0 || self.height_px <= 0.0 {
            return;
        }
        if !matches!(self.gesture, Gesture::Idle) {
            // A gesture was abandoned mid-flight; its preview is gone
            tracing::debug!("pointer-down during active gesture, discarding preview");
            self.gesture = Gesture::Idle;
        }

        let fx = x_px / self.width_px;
        let fy = y_px / self.height_px;
        let grab_x = self.config.divider_grab_px / self.width_px;
        let grab_y = self.config.divider_grab_px / self.height_px;

        if let Some(divider) = self.tree.hit_test_divider(fx, fy, grab_x, grab_y) {
            if let Some(gesture) =
                DividerGesture::begin(&self.tree, &divider, fx, fy, self.config.min_size)
            {
                tracing::debug!(group = divider.group.0, boundary = divider.boundary, "divider drag started");
                self.gesture = Gesture::Divider(gesture);
            }
        } else if split_modifier {
            if let Some(pane) = self.tree.hit_test_pane(fx, fy) {
                if let Some(gesture) = SplitGesture::begin(
                    &self.tree,
                    pane,
                    fx,
                    fy,
                    self.width_px,
                    self.height_px,
                    self.config.min_size,
                ) {
                    tracing::debug!(pane = pane.0, edge = ?gesture.edge, "split gesture started");
                    self.gesture = Gesture::Split(gesture);
                }
            }
        }
    }

    /// Pointer-move entry point: updates the active preview only
    pub fn pointer_move(&mut self, x_px: f32, y_px: f32) {
        if self.width_px <= 0.0 || self.height_px <= 0.0 {
            return;
        }
        let fx = x_px / self.width_px;
        let fy = y_px / self.height_px;
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Split(gesture) => gesture.update(fx, fy),
            Gesture::Divider(gesture) => gesture.update(fx, fy),
        }
    }

    /// Pointer-up entry point: commits the active gesture atomically and
    /// fires events, or cancels with no observable effect
    pub fn pointer_up(&mut self, x_px: f32, y_px: f32) {
        if self.width_px <= 0.0 || self.height_px <= 0.0 {
            return;
        }
        let fx = x_px / self.width_px;
        let fy = y_px / self.height_px;

        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Split(mut gesture) => {
                gesture.update(fx, fy);
                self.commit_split(&gesture);
            }
            Gesture::Divider(mut gesture) => {
                gesture.update(fx, fy);
                self.commit_divider(&gesture);
            }
        }
    }

    /// Abandon the active gesture (lost pointer capture, escape): back to
    /// Idle with no mutation and no events
    pub fn pointer_cancel(&mut self) {
        if !matches!(self.gesture, Gesture::Idle) {
            tracing::debug!("gesture cancelled");
        }
        self.gesture = Gesture::Idle;
    }

    fn commit_split(&mut self, gesture: &SplitGesture) {
        let Some(ratio) = gesture.commit_ratio() else {
            tracing::debug!(pane = gesture.pane.0, "split below minimum, cancelled");
            return;
        };
        let edge = gesture.edge;
        let Some(new_pane) = self
            .tree
            .insert_split(gesture.pane, edge.side(), edge.axis(), ratio)
        else {
            return;
        };
        let Some(content) = self.tree.pane_content(new_pane) else {
            return;
        };

        tracing::info!(pane = new_pane.0, from = gesture.pane.0, "pane opened");
        let layout = self.tree.to_layout();
        self.emitter.emit(&Event::Open {
            pane: PaneRef {
                id: new_pane,
                content,
            },
            layout: layout.clone(),
        });
        self.emitter.emit(&Event::Layout { layout });
    }

    fn commit_divider(&mut self, gesture: &DividerGesture) {
        if let Some((side, _)) = gesture.removing {
            let freed = self.tree.remove_neighbor(gesture.group, gesture.boundary, side);
            let layout = self.tree.to_layout();
            for (id, content) in freed {
                tracing::info!(pane = id.0, "pane closed");
                self.emitter.emit(&Event::Close {
                    pane: PaneRef { id, content },
                    layout: layout.clone(),
                });
            }
            self.emitter.emit(&Event::Layout { layout });
        } else {
            self.tree
                .move_boundary(gesture.group, gesture.boundary, gesture.candidate());
            // Every completed drag produces a layout event, moved or not
            tracing::debug!(group = gesture.group.0, "boundary committed");
            let layout = self.tree.to_layout();
            self.emitter.emit(&Event::Layout { layout });
        }
    }
}
