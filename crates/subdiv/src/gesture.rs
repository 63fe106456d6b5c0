// ABOUTME: Pointer-driven gesture state machines for splitting and resizing.
// ABOUTME: Each tracks a non-committing preview and resolves to one tree mutation.

use subdiv_core::{Axis, Edge, Rect, Side, EPSILON};
use subdiv_layout::{Divider, LayoutTree, NodeId};

/// Non-committing preview of the gesture in flight, for hosts to render.
/// The committed tree is untouched until pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePreview {
    Split(SplitPreview),
    Divider(DividerPreview),
}

/// Where the new pane would land if the split were released now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPreview {
    pub pane: NodeId,
    pub edge: Edge,
    pub axis: Axis,
    pub side: Side,
    /// Proposed new-pane extent, as a container fraction
    pub ratio: f32,
    /// Absolute rectangle the new pane would occupy
    pub rect: Rect,
}

/// Where the dragged boundary would settle if released now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerPreview {
    pub group: NodeId,
    pub boundary: usize,
    pub axis: Axis,
    /// Candidate boundary position, as an absolute container fraction
    pub at: f32,
    /// Pane that would be removed on release, if the drag has pushed a
    /// neighbor to zero
    pub removing: Option<NodeId>,
}

/// Split-from-edge gesture: Idle -> Previewing -> committed or cancelled.
///
/// Existence of a value means Previewing; the widget holds Idle as the
/// absence of any gesture and drops the value on commit or cancel.
#[derive(Debug)]
pub(crate) struct SplitGesture {
    pub(crate) pane: NodeId,
    pub(crate) edge: Edge,
    /// Target pane's absolute rectangle captured at entry
    rect: Rect,
    /// Absolute position of the starting edge along the split axis
    origin: f32,
    /// Configured minimum pane extent, as a container fraction
    min: f32,
    /// Raw proposed extent from the last pointer position
    raw: f32,
}

impl SplitGesture {
    /// Enter the gesture from a pointer-down at (`fx`, `fy`) container
    /// fractions over `pane`. The nearest pane edge in *pixel* distance
    /// picks the edge; ties resolve left > right > top > bottom.
    pub(crate) fn begin(
        tree: &LayoutTree,
        pane: NodeId,
        fx: f32,
        fy: f32,
        width_px: f32,
        height_px: f32,
        min: f32,
    ) -> Option<Self> {
        let rect = tree.rect_of(pane)?;

        let candidates = [
            (Edge::Left, (fx - rect.left) * width_px),
            (Edge::Right, (rect.left + rect.width - fx) * width_px),
            (Edge::Top, (fy - rect.top) * height_px),
            (Edge::Bottom, (rect.top + rect.height - fy) * height_px),
        ];
        let mut edge = Edge::Left;
        let mut best = candidates[0].1;
        for &(candidate, distance) in &candidates[1..] {
            if distance < best {
                edge = candidate;
                best = distance;
            }
        }

        let origin = match edge {
            Edge::Left => rect.left,
            Edge::Right => rect.left + rect.width,
            Edge::Top => rect.top,
            Edge::Bottom => rect.top + rect.height,
        };

        let mut gesture = Self {
            pane,
            edge,
            rect,
            origin,
            min,
            raw: 0.0,
        };
        gesture.update(fx, fy);
        Some(gesture)
    }

    pub(crate) fn update(&mut self, fx: f32, fy: f32) {
        self.raw = (self.edge.axis().component(fx, fy) - self.origin).abs();
    }

    /// Ratio to hand to `insert_split`, relative to the target pane's own
    /// extent. None if the release position makes the split degenerate.
    pub(crate) fn commit_ratio(&self) -> Option<f32> {
        if self.raw < self.min {
            return None;
        }
        let extent = self.rect.extent(self.edge.axis());
        if extent < 2.0 * self.min {
            // Target too small to hold two panes of the minimum size
            return None;
        }
        let local_min = self.min / extent;
        Some((self.raw / extent).clamp(local_min, 1.0 - local_min))
    }

    pub(crate) fn preview(&self) -> SplitPreview {
        let axis = self.edge.axis();
        let extent = self.rect.extent(axis);
        let ratio = self.raw.clamp(self.min, (extent - self.min).max(self.min));

        let rect = match self.edge {
            Edge::Left => Rect {
                width: ratio,
                ..self.rect
            },
            Edge::Right => Rect {
                left: self.rect.left + self.rect.width - ratio,
                width: ratio,
                ..self.rect
            },
            Edge::Top => Rect {
                height: ratio,
                ..self.rect
            },
            Edge::Bottom => Rect {
                top: self.rect.top + self.rect.height - ratio,
                height: ratio,
                ..self.rect
            },
        };

        SplitPreview {
            pane: self.pane,
            edge: self.edge,
            axis,
            side: self.edge.side(),
            ratio,
            rect,
        }
    }
}

/// Drag-a-divider gesture: Idle -> Dragging -> resized, removed, or
/// cancelled. The candidate offset follows the pointer *delta* from
/// entry, so a zero-pixel drag commits the boundary exactly where it was.
#[derive(Debug)]
pub(crate) struct DividerGesture {
    pub(crate) group: NodeId,
    pub(crate) boundary: usize,
    pub(crate) axis: Axis,
    /// Pair range in group-local fractions
    lo: f32,
    hi: f32,
    /// Boundary offset at entry (group-local)
    start: f32,
    /// Group's absolute span along the axis
    group_start: f32,
    group_extent: f32,
    /// Configured minimum, converted to a group-local fraction
    min_local: f32,
    /// Pointer position at entry, absolute fraction along the axis
    pointer_start: f32,
    /// Pair members that are panes and thus eligible for removal
    first_pane: Option<NodeId>,
    second_pane: Option<NodeId>,
    /// Candidate boundary offset (group-local) from the last update
    candidate: f32,
    pub(crate) removing: Option<(Side, NodeId)>,
}

impl DividerGesture {
    pub(crate) fn begin(tree: &LayoutTree, divider: &Divider, fx: f32, fy: f32, min: f32) -> Option<Self> {
        let children = tree.children(divider.group)?;
        let first_id = *children.get(divider.boundary)?;
        let second_id = *children.get(divider.boundary + 1)?;
        let first = tree.get(first_id)?;
        let second = tree.get(second_id)?;

        let group_rect = tree.rect_of(divider.group)?;
        let group_extent = group_rect.extent(divider.axis);
        if group_extent <= 0.0 {
            return None;
        }

        let start = second.pos;
        Some(Self {
            group: divider.group,
            boundary: divider.boundary,
            axis: divider.axis,
            lo: first.pos,
            hi: second.pos + second.size,
            start,
            group_start: group_rect.start(divider.axis),
            group_extent,
            min_local: min / group_extent,
            pointer_start: divider.axis.component(fx, fy),
            first_pane: first.is_pane().then_some(first_id),
            second_pane: second.is_pane().then_some(second_id),
            candidate: start,
            removing: None,
        })
    }

    pub(crate) fn update(&mut self, fx: f32, fy: f32) {
        let pointer = self.axis.component(fx, fy);
        let lo_abs = self.group_start + self.lo * self.group_extent;
        let hi_abs = self.group_start + self.hi * self.group_extent;

        // At or past the pair's outer edge (within tolerance) the drag is
        // allowed to push a pane neighbor out of existence; group
        // neighbors clamp instead.
        if pointer <= lo_abs + EPSILON {
            if let Some(pane) = self.first_pane {
                self.candidate = self.lo;
                self.removing = Some((Side::Before, pane));
                return;
            }
        } else if pointer >= hi_abs - EPSILON {
            if let Some(pane) = self.second_pane {
                self.candidate = self.hi;
                self.removing = Some((Side::After, pane));
                return;
            }
        }

        let raw = self.start + (pointer - self.pointer_start) / self.group_extent;
        let lo_min = self.lo + self.min_local;
        let hi_min = self.hi - self.min_local;
        self.candidate = if lo_min <= hi_min {
            raw.clamp(lo_min, hi_min)
        } else {
            // Pair thinner than two minimums: hold the line
            self.start
        };
        self.removing = None;
    }

    pub(crate) fn candidate(&self) -> f32 {
        self.candidate
    }

    pub(crate) fn preview(&self) -> DividerPreview {
        DividerPreview {
            group: self.group,
            boundary: self.boundary,
            axis: self.axis,
            at: self.group_start + self.candidate * self.group_extent,
            removing: self.removing.map(|(_, pane)| pane),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_tree() -> (LayoutTree, NodeId) {
        let mut tree = LayoutTree::new();
        let left = tree
            .insert_split(NodeId(0), Side::Before, Axis::Row, 0.2)
            .unwrap();
        (tree, left)
    }

    #[test]
    fn nearest_edge_wins() {
        let tree = LayoutTree::new();
        let g = SplitGesture::begin(&tree, NodeId(0), 0.99, 0.5, 1000.0, 1000.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Right);
        let g = SplitGesture::begin(&tree, NodeId(0), 0.5, 0.97, 1000.0, 1000.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Bottom);
    }

    #[test]
    fn equidistant_edges_prefer_left_then_right_then_top() {
        let tree = LayoutTree::new();
        // Corner point: left and top both 10px away
        let g = SplitGesture::begin(&tree, NodeId(0), 0.01, 0.01, 1000.0, 1000.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Left);
        // Dead center: all four edges tie
        let g = SplitGesture::begin(&tree, NodeId(0), 0.5, 0.5, 1000.0, 1000.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Left);
        // Right and top tie at 100px on a pane pinned to the right edge
        let g = SplitGesture::begin(&tree, NodeId(0), 0.9, 0.1, 1000.0, 1000.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Right);
    }

    #[test]
    fn pixel_distances_respect_aspect_ratio() {
        let tree = LayoutTree::new();
        // 2000x500 container: fraction 0.1 from the left is 200px, while
        // fraction 0.1 from the top is only 50px.
        let g = SplitGesture::begin(&tree, NodeId(0), 0.1, 0.1, 2000.0, 500.0, 0.01).unwrap();
        assert_eq!(g.edge, Edge::Top);
    }

    #[test]
    fn commit_ratio_is_local_to_the_target() {
        let (tree, left) = split_tree();
        // Target spans [0, 0.2]; drag from its left edge to x = 0.1
        let mut g = SplitGesture::begin(&tree, left, 0.004, 0.5, 1000.0, 1000.0, 0.01).unwrap();
        g.update(0.1, 0.5);
        let ratio = g.commit_ratio().unwrap();
        assert!((ratio - 0.5).abs() < 1e-5);
    }

    #[test]
    fn sub_minimum_release_cancels() {
        let tree = LayoutTree::new();
        let mut g = SplitGesture::begin(&tree, NodeId(0), 0.004, 0.5, 1000.0, 1000.0, 0.01).unwrap();
        g.update(0.006, 0.5);
        assert!(g.commit_ratio().is_none());
    }

    #[test]
    fn preview_rect_hugs_the_starting_edge() {
        let tree = LayoutTree::new();
        let mut g = SplitGesture::begin(&tree, NodeId(0), 0.995, 0.5, 1000.0, 1000.0, 0.01).unwrap();
        g.update(0.7, 0.5);
        let preview = g.preview();
        assert_eq!(preview.side, Side::After);
        assert!((preview.rect.left - 0.7).abs() < 1e-5);
        assert!((preview.rect.width - 0.3).abs() < 1e-5);
    }

    #[test]
    fn divider_candidate_follows_pointer_delta() {
        let (tree, _) = split_tree();
        let divider = tree.dividers()[0];
        let mut g = DividerGesture::begin(&tree, &divider, 0.2, 0.5, 0.01).unwrap();
        g.update(0.35, 0.5);
        assert!((g.candidate() - 0.35).abs() < 1e-5);
        assert!(g.removing.is_none());
    }

    #[test]
    fn zero_delta_keeps_the_boundary_bit_exact() {
        let (tree, _) = split_tree();
        let divider = tree.dividers()[0];
        // Grabbed slightly off-center; releasing without moving must not
        // nudge the boundary.
        let mut g = DividerGesture::begin(&tree, &divider, 0.204, 0.5, 0.01).unwrap();
        g.update(0.204, 0.5);
        assert_eq!(g.candidate(), 0.2);
    }

    #[test]
    fn dragging_past_the_outer_edge_marks_removal() {
        let (tree, left) = split_tree();
        let divider = tree.dividers()[0];
        let mut g = DividerGesture::begin(&tree, &divider, 0.2, 0.5, 0.01).unwrap();

        g.update(1.001, 0.5);
        assert_eq!(g.removing, Some((Side::After, NodeId(0))));

        g.update(0.0, 0.5);
        assert_eq!(g.removing, Some((Side::Before, left)));

        // Back inside: removal marker clears
        g.update(0.5, 0.5);
        assert!(g.removing.is_none());
    }

    #[test]
    fn group_neighbors_clamp_instead_of_removing() {
        let (mut tree, left) = split_tree();
        tree.insert_split(left, Side::After, Axis::Column, 0.5).unwrap();

        // The root divider now separates a column group from pane 0
        let divider = tree
            .dividers()
            .into_iter()
            .find(|d| d.group == tree.root())
            .unwrap();
        let mut g = DividerGesture::begin(&tree, &divider, 0.2, 0.5, 0.01).unwrap();
        g.update(0.0, 0.5);
        assert!(g.removing.is_none());
        assert!((g.candidate() - 0.01).abs() < 1e-5);
    }
}
