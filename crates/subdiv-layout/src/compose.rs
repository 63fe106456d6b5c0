// ABOUTME: Geometry composition from relative tree positions to absolute rects.
// ABOUTME: Also derives divider descriptors and pointer hit tests.

use subdiv_core::{Axis, Rect};

use crate::tree::{ContentRef, LayoutTree, Node, NodeId, NodeKind};

/// Absolute geometry for one pane, in container fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneGeometry {
    pub id: NodeId,
    pub content: ContentRef,
    pub rect: Rect,
}

/// The draggable boundary between two adjacent siblings of a group.
///
/// The rect is the zero-thickness boundary segment: vertical dividers
/// (Row groups) have `width == 0`, horizontal ones `height == 0`. The
/// host applies its configured visual thickness when rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub group: NodeId,
    pub boundary: usize,
    pub axis: Axis,
    pub rect: Rect,
}

impl LayoutTree {
    /// Absolute rectangle of a node, composed by folding its ancestor
    /// chain from the root. Pure: same tree, same answer.
    pub fn rect_of(&self, id: NodeId) -> Option<Rect> {
        if !self.contains(id) {
            return None;
        }
        let mut chain = Vec::new();
        let mut cursor = id;
        while let Some(parent) = self.get(cursor)?.parent {
            chain.push(cursor);
            cursor = parent;
        }

        let mut rect = Rect::full();
        for &child_id in chain.iter().rev() {
            let child = self.get(child_id)?;
            let parent = self.get(child.parent?)?;
            match parent.axis()? {
                Axis::Row => {
                    rect.left += child.pos * rect.width;
                    rect.width *= child.size;
                }
                Axis::Column => {
                    rect.top += child.pos * rect.height;
                    rect.height *= child.size;
                }
            }
        }
        Some(rect)
    }

    /// Absolute rectangles for every pane, in traversal order
    pub fn pane_rects(&self) -> Vec<PaneGeometry> {
        let mut result = Vec::new();
        collect_rects(self, self.root(), Rect::full(), &mut result);
        result
    }

    /// Divider descriptors for every adjacent-sibling boundary, in
    /// traversal order
    pub fn dividers(&self) -> Vec<Divider> {
        let mut result = Vec::new();
        collect_dividers(self, self.root(), Rect::full(), &mut result);
        result
    }

    /// The pane containing the given point (container fractions)
    pub fn hit_test_pane(&self, x: f32, y: f32) -> Option<NodeId> {
        self.pane_rects()
            .into_iter()
            .find(|pane| pane.rect.contains(x, y))
            .map(|pane| pane.id)
    }

    /// The first divider whose grab region contains the given point.
    ///
    /// `grab_x`/`grab_y` are the half-widths of the region around
    /// vertical and horizontal dividers respectively, as container
    /// fractions (the widget derives them from a pixel setting).
    pub fn hit_test_divider(&self, x: f32, y: f32, grab_x: f32, grab_y: f32) -> Option<Divider> {
        self.dividers().into_iter().find(|divider| {
            let rect = divider.rect;
            match divider.axis {
                Axis::Row => {
                    (x - rect.left).abs() <= grab_x && y >= rect.top && y <= rect.top + rect.height
                }
                Axis::Column => {
                    (y - rect.top).abs() <= grab_y && x >= rect.left && x <= rect.left + rect.width
                }
            }
        })
    }
}

fn child_rect(parent_rect: Rect, axis: Axis, child: &Node) -> Rect {
    match axis {
        Axis::Row => Rect {
            left: parent_rect.left + child.pos * parent_rect.width,
            top: parent_rect.top,
            width: child.size * parent_rect.width,
            height: parent_rect.height,
        },
        Axis::Column => Rect {
            left: parent_rect.left,
            top: parent_rect.top + child.pos * parent_rect.height,
            width: parent_rect.width,
            height: child.size * parent_rect.height,
        },
    }
}

fn collect_rects(tree: &LayoutTree, id: NodeId, rect: Rect, out: &mut Vec<PaneGeometry>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Pane { content } => out.push(PaneGeometry {
            id,
            content: *content,
            rect,
        }),
        NodeKind::Group { axis, children } => {
            for &child_id in children {
                let Some(child) = tree.get(child_id) else {
                    continue;
                };
                collect_rects(tree, child_id, child_rect(rect, *axis, child), out);
            }
        }
    }
}

fn collect_dividers(tree: &LayoutTree, id: NodeId, rect: Rect, out: &mut Vec<Divider>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let NodeKind::Group { axis, children } = &node.kind else {
        return;
    };

    for (boundary, pair) in children.windows(2).enumerate() {
        let Some(second) = tree.get(pair[1]) else {
            continue;
        };
        let rect = match axis {
            Axis::Row => Rect {
                left: rect.left + second.pos * rect.width,
                top: rect.top,
                width: 0.0,
                height: rect.height,
            },
            Axis::Column => Rect {
                left: rect.left,
                top: rect.top + second.pos * rect.height,
                width: rect.width,
                height: 0.0,
            },
        };
        out.push(Divider {
            group: id,
            boundary,
            axis: *axis,
            rect,
        });
    }

    for &child_id in children {
        let Some(child) = tree.get(child_id) else {
            continue;
        };
        collect_dividers(tree, child_id, child_rect(rect, *axis, child), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subdiv_core::{Side, EPSILON};

    fn assert_rect(rect: Rect, left: f32, top: f32, width: f32, height: f32) {
        assert!((rect.left - left).abs() < EPSILON, "left {} != {}", rect.left, left);
        assert!((rect.top - top).abs() < EPSILON, "top {} != {}", rect.top, top);
        assert!(
            (rect.width - width).abs() < EPSILON,
            "width {} != {}",
            rect.width,
            width
        );
        assert!(
            (rect.height - height).abs() < EPSILON,
            "height {} != {}",
            rect.height,
            height
        );
    }

    #[test]
    fn single_pane_fills_container() {
        let tree = LayoutTree::new();
        let rects = tree.pane_rects();
        assert_eq!(rects.len(), 1);
        assert_rect(rects[0].rect, 0.0, 0.0, 1.0, 1.0);
        assert!(tree.dividers().is_empty());
    }

    #[test]
    fn nested_groups_compose_rects() {
        let mut tree = LayoutTree::new();
        let right = tree
            .insert_split(NodeId(0), Side::After, Axis::Row, 0.5)
            .unwrap();
        let below = tree
            .insert_split(right, Side::After, Axis::Column, 0.25)
            .unwrap();

        assert_rect(tree.rect_of(NodeId(0)).unwrap(), 0.0, 0.0, 0.5, 1.0);
        assert_rect(tree.rect_of(right).unwrap(), 0.5, 0.0, 0.5, 0.75);
        assert_rect(tree.rect_of(below).unwrap(), 0.5, 0.75, 0.5, 0.25);
    }

    #[test]
    fn composition_is_idempotent() {
        let mut tree = LayoutTree::new();
        let right = tree
            .insert_split(NodeId(0), Side::After, Axis::Row, 0.3)
            .unwrap();
        tree.insert_split(right, Side::Before, Axis::Column, 0.4)
            .unwrap();

        let first = tree.pane_rects();
        let second = tree.pane_rects();
        assert_eq!(first, second);
    }

    #[test]
    fn dividers_sit_on_pair_boundaries() {
        let mut tree = LayoutTree::new();
        let left = tree
            .insert_split(NodeId(0), Side::Before, Axis::Row, 0.2)
            .unwrap();
        tree.insert_split(left, Side::After, Axis::Column, 0.5)
            .unwrap();

        let dividers = tree.dividers();
        assert_eq!(dividers.len(), 2);

        // Root boundary: vertical line at x = 0.2 spanning the full height
        assert_eq!(dividers[0].axis, Axis::Row);
        assert_rect(dividers[0].rect, 0.2, 0.0, 0.0, 1.0);

        // Nested boundary: horizontal line halfway down the left column
        assert_eq!(dividers[1].axis, Axis::Column);
        assert_rect(dividers[1].rect, 0.0, 0.5, 0.2, 0.0);
    }

    #[test]
    fn hit_tests_resolve_panes_and_dividers() {
        let mut tree = LayoutTree::new();
        let left = tree
            .insert_split(NodeId(0), Side::Before, Axis::Row, 0.2)
            .unwrap();

        assert_eq!(tree.hit_test_pane(0.1, 0.5), Some(left));
        assert_eq!(tree.hit_test_pane(0.9, 0.5), Some(NodeId(0)));

        let hit = tree.hit_test_divider(0.204, 0.5, 0.006, 0.006).unwrap();
        assert_eq!(hit.boundary, 0);
        assert!(tree.hit_test_divider(0.3, 0.5, 0.006, 0.006).is_none());
    }
}
