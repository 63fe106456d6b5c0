// ABOUTME: Plain nested-object representation of the layout tree.
// ABOUTME: Serde model, tree conversion, and strict load-time validation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use subdiv_core::{Axis, EPSILON};

use crate::tree::{ContentRef, LayoutTree, Node, NodeId, NodeKind};

/// Serialized form of the layout tree.
///
/// This is the shape accepted as an initial layout and carried in event
/// payloads. `pos`/`size` are fractions of the parent group's extent.
/// Extra input fields (such as sibling links emitted by other tools) are
/// ignored; sibling links are always derived internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    Group {
        id: u64,
        axis: Axis,
        pos: f32,
        size: f32,
        children: Vec<LayoutNode>,
    },
    Pane {
        id: u64,
        pos: f32,
        size: f32,
    },
}

impl LayoutNode {
    pub fn id(&self) -> u64 {
        match self {
            LayoutNode::Group { id, .. } | LayoutNode::Pane { id, .. } => *id,
        }
    }

    fn pos(&self) -> f32 {
        match self {
            LayoutNode::Group { pos, .. } | LayoutNode::Pane { pos, .. } => *pos,
        }
    }

    fn size(&self) -> f32 {
        match self {
            LayoutNode::Group { size, .. } | LayoutNode::Pane { size, .. } => *size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("duplicate node id {0}")]
    DuplicateId(u64),

    #[error("group {0} has fewer than 2 children")]
    SingletonGroup(u64),

    #[error("node {id} has invalid size {size}")]
    BadSize { id: u64, size: f32 },

    #[error("group {group}: child {child} starts at {found}, expected {expected}")]
    NonContiguous {
        group: u64,
        child: u64,
        found: f32,
        expected: f32,
    },

    #[error("group {group}: children end at {end}, expected 1")]
    Untiled { group: u64, end: f32 },
}

impl LayoutTree {
    /// Serialize the tree into its plain nested representation
    pub fn to_layout(&self) -> LayoutNode {
        build_layout(self, self.root())
    }

    /// Build a tree from a serialized layout.
    ///
    /// The input is validated against the tiling invariants first;
    /// malformed layouts are rejected rather than repaired. Content refs
    /// are allocated to panes in traversal order, and id allocation
    /// resumes past the largest id present.
    pub fn from_layout(layout: &LayoutNode) -> Result<Self, LayoutError> {
        let mut seen = HashSet::new();
        validate(layout, &mut seen)?;

        let mut tree = LayoutTree {
            nodes: HashMap::new(),
            root: NodeId(layout.id()),
            next_id: 0,
            next_content: 0,
        };
        // Root pos/size are meaningless in the input; normalize to the
        // full container.
        build_tree(&mut tree, layout, None, 0.0, 1.0);
        tree.next_id = seen.iter().max().map_or(0, |&id| id + 1);
        Ok(tree)
    }
}

fn build_layout(tree: &LayoutTree, id: NodeId) -> LayoutNode {
    let node = tree.get(id).expect("dangling node id");
    match &node.kind {
        NodeKind::Pane { .. } => LayoutNode::Pane {
            id: id.0,
            pos: node.pos,
            size: node.size,
        },
        NodeKind::Group { axis, children } => LayoutNode::Group {
            id: id.0,
            axis: *axis,
            pos: node.pos,
            size: node.size,
            children: children.iter().map(|&c| build_layout(tree, c)).collect(),
        },
    }
}

fn validate(node: &LayoutNode, seen: &mut HashSet<u64>) -> Result<(), LayoutError> {
    if !seen.insert(node.id()) {
        return Err(LayoutError::DuplicateId(node.id()));
    }
    let LayoutNode::Group { id, children, .. } = node else {
        return Ok(());
    };
    if children.len() < 2 {
        return Err(LayoutError::SingletonGroup(*id));
    }

    let mut cursor = 0.0_f32;
    for child in children {
        let size = child.size();
        if !size.is_finite() || size <= EPSILON {
            return Err(LayoutError::BadSize {
                id: child.id(),
                size,
            });
        }
        let pos = child.pos();
        if !pos.is_finite() || (pos - cursor).abs() > EPSILON {
            return Err(LayoutError::NonContiguous {
                group: *id,
                child: child.id(),
                found: pos,
                expected: cursor,
            });
        }
        cursor = pos + size;
    }
    if (cursor - 1.0).abs() > EPSILON {
        return Err(LayoutError::Untiled {
            group: *id,
            end: cursor,
        });
    }

    for child in children {
        validate(child, seen)?;
    }
    Ok(())
}

fn build_tree(
    tree: &mut LayoutTree,
    layout: &LayoutNode,
    parent: Option<NodeId>,
    pos: f32,
    size: f32,
) -> NodeId {
    let id = NodeId(layout.id());
    let kind = match layout {
        LayoutNode::Pane { .. } => {
            let content = ContentRef(tree.next_content);
            tree.next_content += 1;
            NodeKind::Pane { content }
        }
        LayoutNode::Group { axis, .. } => NodeKind::Group {
            axis: *axis,
            children: Vec::new(),
        },
    };
    tree.nodes.insert(
        id,
        Node {
            id,
            parent,
            prev: None,
            next: None,
            pos,
            size,
            kind,
        },
    );

    if let LayoutNode::Group { children, .. } = layout {
        let mut prev = None;
        for child in children {
            let child_id = build_tree(tree, child, Some(id), child.pos(), child.size());
            if let NodeKind::Group { children, .. } = &mut tree.node_mut(id).kind {
                children.push(child_id);
            }
            tree.node_mut(child_id).prev = prev;
            if let Some(prev_id) = prev {
                tree.node_mut(prev_id).next = Some(child_id);
            }
            prev = Some(child_id);
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use subdiv_core::Side;

    fn two_pane_column() -> LayoutNode {
        LayoutNode::Group {
            id: 0,
            axis: Axis::Column,
            pos: 0.0,
            size: 1.0,
            children: vec![
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.0,
                    size: 0.5,
                },
                LayoutNode::Pane {
                    id: 2,
                    pos: 0.5,
                    size: 0.5,
                },
            ],
        }
    }

    #[test]
    fn roundtrip_preserves_structure() {
        let mut tree = LayoutTree::new();
        let right = tree
            .insert_split(NodeId(0), Side::After, Axis::Row, 0.25)
            .unwrap();
        tree.insert_split(right, Side::Before, Axis::Column, 0.5)
            .unwrap();

        let layout = tree.to_layout();
        let restored = LayoutTree::from_layout(&layout).unwrap();
        assert_eq!(restored.to_layout(), layout);
    }

    #[test]
    fn loaded_panes_get_contents_in_traversal_order() {
        let tree = LayoutTree::from_layout(&two_pane_column()).unwrap();
        assert_eq!(tree.pane_content(NodeId(1)), Some(ContentRef(0)));
        assert_eq!(tree.pane_content(NodeId(2)), Some(ContentRef(1)));
    }

    #[test]
    fn id_allocation_resumes_past_loaded_ids() {
        let mut tree = LayoutTree::from_layout(&two_pane_column()).unwrap();
        let new = tree
            .insert_split(NodeId(2), Side::After, Axis::Column, 0.5)
            .unwrap();
        assert_eq!(new, NodeId(3));
    }

    #[test]
    fn json_shape_matches_wire_format() {
        let json = serde_json::to_value(two_pane_column()).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["axis"], "column");
        assert_eq!(json["children"][0]["type"], "pane");
        assert_eq!(json["children"][0]["id"], 1);
    }

    #[test]
    fn input_sibling_links_are_ignored() {
        let json = r#"{
            "type": "group", "id": 0, "axis": "row", "pos": 0, "size": 1,
            "prev": null, "next": null,
            "children": [
                {"type": "pane", "id": 1, "pos": 0.0, "size": 0.25, "prev": null, "next": 2},
                {"type": "pane", "id": 2, "pos": 0.25, "size": 0.75, "prev": 1, "next": null}
            ]
        }"#;
        let layout: LayoutNode = serde_json::from_str(json).unwrap();
        let tree = LayoutTree::from_layout(&layout).unwrap();
        // Links are derived, not taken from input
        assert_eq!(tree.get(NodeId(1)).unwrap().next, Some(NodeId(2)));
        assert_eq!(tree.get(NodeId(2)).unwrap().prev, Some(NodeId(1)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let layout = LayoutNode::Group {
            id: 0,
            axis: Axis::Row,
            pos: 0.0,
            size: 1.0,
            children: vec![
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.0,
                    size: 0.5,
                },
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.5,
                    size: 0.5,
                },
            ],
        };
        assert_eq!(
            LayoutTree::from_layout(&layout),
            Err(LayoutError::DuplicateId(1))
        );
    }

    #[test]
    fn rejects_singleton_group() {
        let layout = LayoutNode::Group {
            id: 0,
            axis: Axis::Row,
            pos: 0.0,
            size: 1.0,
            children: vec![LayoutNode::Pane {
                id: 1,
                pos: 0.0,
                size: 1.0,
            }],
        };
        assert_eq!(
            LayoutTree::from_layout(&layout),
            Err(LayoutError::SingletonGroup(0))
        );
    }

    #[test]
    fn rejects_non_contiguous_children() {
        let layout = LayoutNode::Group {
            id: 0,
            axis: Axis::Row,
            pos: 0.0,
            size: 1.0,
            children: vec![
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.0,
                    size: 0.4,
                },
                LayoutNode::Pane {
                    id: 2,
                    pos: 0.5,
                    size: 0.5,
                },
            ],
        };
        assert!(matches!(
            LayoutTree::from_layout(&layout),
            Err(LayoutError::NonContiguous { group: 0, child: 2, .. })
        ));
    }

    #[test]
    fn rejects_children_not_tiling_to_one() {
        let layout = LayoutNode::Group {
            id: 0,
            axis: Axis::Row,
            pos: 0.0,
            size: 1.0,
            children: vec![
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.0,
                    size: 0.4,
                },
                LayoutNode::Pane {
                    id: 2,
                    pos: 0.4,
                    size: 0.5,
                },
            ],
        };
        assert!(matches!(
            LayoutTree::from_layout(&layout),
            Err(LayoutError::Untiled { group: 0, .. })
        ));
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let layout = LayoutNode::Group {
            id: 0,
            axis: Axis::Row,
            pos: 0.0,
            size: 1.0,
            children: vec![
                LayoutNode::Pane {
                    id: 1,
                    pos: 0.0,
                    size: 0.0,
                },
                LayoutNode::Pane {
                    id: 2,
                    pos: 0.0,
                    size: 1.0,
                },
            ],
        };
        assert!(matches!(
            LayoutTree::from_layout(&layout),
            Err(LayoutError::BadSize { id: 1, .. })
        ));
    }

    #[test]
    fn root_slot_is_normalized_on_load() {
        let layout = LayoutNode::Group {
            id: 7,
            axis: Axis::Row,
            pos: 0.25,
            size: 0.5,
            children: vec![
                LayoutNode::Pane {
                    id: 8,
                    pos: 0.0,
                    size: 0.5,
                },
                LayoutNode::Pane {
                    id: 9,
                    pos: 0.5,
                    size: 0.5,
                },
            ],
        };
        let tree = LayoutTree::from_layout(&layout).unwrap();
        let root = tree.get(tree.root()).unwrap();
        assert_eq!(root.pos, 0.0);
        assert_eq!(root.size, 1.0);
        assert_eq!(tree.next_id, 10);
    }
}
