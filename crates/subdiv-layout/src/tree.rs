// ABOUTME: Arena-backed tree of pane and group nodes with tiling invariants.
// ABOUTME: Supports edge splits, boundary moves, neighbor removal, and collapse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use subdiv_core::{Axis, Side, EPSILON};

/// Unique node identifier. Monotonically assigned, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Opaque content identity for a pane. The host keys the content unit it
/// instantiates inside the pane by this value; the tree never looks at it
/// beyond allocating and releasing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(pub u64);

/// A node in the layout tree.
///
/// `pos` and `size` are fractions of the parent group's extent along the
/// parent's main axis; both are meaningless for the root. `prev`/`next`
/// are derived sibling links maintained exclusively by the tree.
#[derive(Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub pos: f32,
    pub size: f32,
    pub kind: NodeKind,
}

#[derive(Debug, PartialEq)]
pub enum NodeKind {
    Pane { content: ContentRef },
    Group { axis: Axis, children: Vec<NodeId> },
}

impl Node {
    pub fn is_pane(&self) -> bool {
        matches!(self.kind, NodeKind::Pane { .. })
    }

    pub fn content(&self) -> Option<ContentRef> {
        match self.kind {
            NodeKind::Pane { content } => Some(content),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        match self.kind {
            NodeKind::Group { axis, .. } => Some(axis),
            NodeKind::Pane { .. } => None,
        }
    }
}

/// The layout tree: an arena of nodes indexed by id.
///
/// Groups own their children as id lists; parent and sibling references
/// are id lookups, never ownership. Every committed mutation leaves the
/// children of each group tiling `[0, 1]` contiguously.
#[derive(Debug, PartialEq)]
pub struct LayoutTree {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) next_id: u64,
    pub(crate) next_content: u64,
}

impl LayoutTree {
    /// Backstop against degenerate splits and zero-width resizes. The
    /// widget layer clamps against its configured minimum first; this
    /// floor only guards direct callers of the primitives.
    pub const MIN_RATIO: f32 = 1e-3;

    /// A tree holding a single pane that fills the whole container
    pub fn new() -> Self {
        let id = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                parent: None,
                prev: None,
                next: None,
                pos: 0.0,
                size: 1.0,
                kind: NodeKind::Pane {
                    content: ContentRef(0),
                },
            },
        );
        Self {
            nodes,
            root: id,
            next_id: 1,
            next_content: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All pane ids in traversal (document) order
    pub fn panes(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_panes(self.root, &mut result);
        result
    }

    pub fn pane_content(&self, id: NodeId) -> Option<ContentRef> {
        self.nodes.get(&id).and_then(Node::content)
    }

    /// Child id list of a group, in ascending `pos` order
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::Group { children, .. } => Some(children.as_slice()),
            NodeKind::Pane { .. } => None,
        }
    }

    fn collect_panes(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.node(id).kind {
            NodeKind::Pane { .. } => out.push(id),
            NodeKind::Group { children, .. } => {
                for &child in children {
                    self.collect_panes(child, out);
                }
            }
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(&id).expect("dangling node id")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(&id).expect("dangling node id")
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_pane(&mut self) -> NodeId {
        let id = self.alloc_id();
        let content = ContentRef(self.next_content);
        self.next_content += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                parent: None,
                prev: None,
                next: None,
                pos: 0.0,
                size: 1.0,
                kind: NodeKind::Pane { content },
            },
        );
        id
    }

    /// Rewrite parent/prev/next links for every child of `group` from its
    /// child list
    fn relink(&mut self, group: NodeId) {
        let children = match &self.node(group).kind {
            NodeKind::Group { children, .. } => children.clone(),
            NodeKind::Pane { .. } => return,
        };
        let mut prev = None;
        for (i, &id) in children.iter().enumerate() {
            let next = children.get(i + 1).copied();
            let node = self.node_mut(id);
            node.parent = Some(group);
            node.prev = prev;
            node.next = next;
            prev = Some(id);
        }
    }

    /// Split `target` and return the new pane's id.
    ///
    /// `ratio` is the share of `target`'s own extent granted to the new
    /// pane. If `target`'s parent group already runs along `axis`, the new
    /// pane is inserted as an immediate sibling on `side`; otherwise
    /// `target` is wrapped in a new two-child group of the requested axis
    /// that inherits its slot. Degenerate ratios are rejected as a no-op.
    pub fn insert_split(
        &mut self,
        target: NodeId,
        side: Side,
        axis: Axis,
        ratio: f32,
    ) -> Option<NodeId> {
        if !ratio.is_finite() || !(Self::MIN_RATIO..=1.0 - Self::MIN_RATIO).contains(&ratio) {
            return None;
        }
        if !self.nodes.contains_key(&target) {
            return None;
        }
        debug_assert!(self.node(target).is_pane(), "split target must be a pane");

        let parent = self.node(target).parent;
        let parent_axis = parent.and_then(|p| self.node(p).axis());

        let new_pane = match (parent, parent_axis) {
            (Some(group), Some(parent_axis)) if parent_axis == axis => {
                self.insert_sibling(target, group, side, ratio)
            }
            _ => self.wrap_in_group(target, side, axis, ratio),
        };
        Some(new_pane)
    }

    fn insert_sibling(&mut self, target: NodeId, group: NodeId, side: Side, ratio: f32) -> NodeId {
        let (old_pos, old_size) = {
            let t = self.node(target);
            (t.pos, t.size)
        };
        let new_size = old_size * ratio;
        let kept = old_size - new_size;

        let new_pane = self.alloc_pane();
        {
            let t = self.node_mut(target);
            t.size = kept;
            if side == Side::Before {
                t.pos = old_pos + new_size;
            }
        }
        {
            let n = self.node_mut(new_pane);
            n.size = new_size;
            n.pos = match side {
                Side::Before => old_pos,
                Side::After => old_pos + kept,
            };
        }

        let NodeKind::Group { children, .. } = &mut self.node_mut(group).kind else {
            unreachable!("sibling insertion target parent is a group");
        };
        let index = children
            .iter()
            .position(|&c| c == target)
            .expect("target missing from its parent's child list");
        let at = match side {
            Side::Before => index,
            Side::After => index + 1,
        };
        children.insert(at, new_pane);
        self.relink(group);
        self.debug_check(group);
        new_pane
    }

    fn wrap_in_group(&mut self, target: NodeId, side: Side, axis: Axis, ratio: f32) -> NodeId {
        let new_pane = self.alloc_pane();
        let group_id = self.alloc_id();

        let (slot_pos, slot_size, outer) = {
            let t = self.node(target);
            (t.pos, t.size, t.parent)
        };

        let children = match side {
            Side::Before => vec![new_pane, target],
            Side::After => vec![target, new_pane],
        };
        self.nodes.insert(
            group_id,
            Node {
                id: group_id,
                parent: outer,
                prev: None,
                next: None,
                pos: slot_pos,
                size: slot_size,
                kind: NodeKind::Group { axis, children },
            },
        );

        // Demote the target into the new group's local coordinate space
        {
            let t = self.node_mut(target);
            t.size = 1.0 - ratio;
            t.pos = match side {
                Side::Before => ratio,
                Side::After => 0.0,
            };
        }
        {
            let n = self.node_mut(new_pane);
            n.size = ratio;
            n.pos = match side {
                Side::Before => 0.0,
                Side::After => 1.0 - ratio,
            };
        }
        self.relink(group_id);

        match outer {
            Some(pp) => {
                let NodeKind::Group { children, .. } = &mut self.node_mut(pp).kind else {
                    unreachable!("outer parent is a group");
                };
                let index = children
                    .iter()
                    .position(|&c| c == target)
                    .expect("target missing from its parent's child list");
                children[index] = group_id;
                self.relink(pp);
            }
            None => {
                self.root = group_id;
            }
        }
        self.debug_check(group_id);
        new_pane
    }

    /// Move the boundary between the children at `boundary` and
    /// `boundary + 1` of `group` to `offset` (group-local fraction).
    ///
    /// Only the pair's pos/size change; their combined extent is
    /// conserved. The offset is clamped so each neighbor keeps at least
    /// [`Self::MIN_RATIO`].
    pub fn move_boundary(&mut self, group: NodeId, boundary: usize, offset: f32) {
        let Some((first, second)) = self.boundary_pair(group, boundary) else {
            return;
        };
        let a = self.node(first).pos;
        let b = {
            let s = self.node(second);
            s.pos + s.size
        };
        if !offset.is_finite() || b - a <= 2.0 * Self::MIN_RATIO {
            return;
        }
        let offset = offset.clamp(a + Self::MIN_RATIO, b - Self::MIN_RATIO);

        {
            let f = self.node_mut(first);
            f.size = offset - a;
        }
        {
            let s = self.node_mut(second);
            s.pos = offset;
            s.size = b - offset;
        }
        self.debug_check(group);
    }

    /// Remove the pair member on `side` of `boundary` inside `group`,
    /// granting its extent to the surviving neighbor.
    ///
    /// The removed child may be a whole subtree; every pane in it is
    /// freed and returned in traversal order. If the group is left with a
    /// single child it is collapsed (once, not recursively).
    pub fn remove_neighbor(
        &mut self,
        group: NodeId,
        boundary: usize,
        side: Side,
    ) -> Vec<(NodeId, ContentRef)> {
        let Some((first, second)) = self.boundary_pair(group, boundary) else {
            return Vec::new();
        };
        let (removed, survivor) = match side {
            Side::Before => (first, second),
            Side::After => (second, first),
        };

        let (removed_pos, removed_size) = {
            let r = self.node(removed);
            (r.pos, r.size)
        };
        {
            let s = self.node_mut(survivor);
            s.size += removed_size;
            if side == Side::Before {
                s.pos = removed_pos;
            }
        }

        let NodeKind::Group { children, .. } = &mut self.node_mut(group).kind else {
            unreachable!("boundary pair parent is a group");
        };
        children.retain(|&c| c != removed);
        let remaining = children.len();
        self.relink(group);

        let freed = self.free_subtree(removed);

        if remaining == 1 {
            self.collapse(group);
        } else {
            self.debug_check(group);
        }
        freed
    }

    fn boundary_pair(&self, group: NodeId, boundary: usize) -> Option<(NodeId, NodeId)> {
        let children = self.children(group)?;
        let first = *children.get(boundary)?;
        let second = *children.get(boundary + 1)?;
        Some((first, second))
    }

    /// Drop a node and its whole subtree from the arena, returning the
    /// panes that were freed in traversal order
    fn free_subtree(&mut self, id: NodeId) -> Vec<(NodeId, ContentRef)> {
        let mut freed = Vec::new();
        let mut order = Vec::new();
        self.collect_panes(id, &mut order);
        for pane in order {
            if let Some(content) = self.pane_content(pane) {
                freed.push((pane, content));
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if let NodeKind::Group { children, .. } = node.kind {
                    stack.extend(children);
                }
            }
        }
        freed
    }

    /// Replace a single-child group with its remaining child, which
    /// inherits the group's slot in the outer parent
    fn collapse(&mut self, group: NodeId) {
        let (child, g_pos, g_size, outer) = {
            let g = self.node(group);
            let NodeKind::Group { children, .. } = &g.kind else {
                unreachable!("collapse target is a group");
            };
            debug_assert_eq!(children.len(), 1, "collapse requires a sole child");
            (children[0], g.pos, g.size, g.parent)
        };

        {
            let c = self.node_mut(child);
            c.parent = outer;
            c.pos = g_pos;
            c.size = g_size;
            c.prev = None;
            c.next = None;
        }

        match outer {
            Some(pp) => {
                let NodeKind::Group { children, .. } = &mut self.node_mut(pp).kind else {
                    unreachable!("outer parent is a group");
                };
                let index = children
                    .iter()
                    .position(|&c| c == group)
                    .expect("group missing from its parent's child list");
                children[index] = child;
                self.relink(pp);
            }
            None => {
                self.root = child;
                let c = self.node_mut(child);
                c.pos = 0.0;
                c.size = 1.0;
            }
        }
        self.nodes.remove(&group);
    }

    /// Development-only invariant check for one group's child list
    fn debug_check(&self, group: NodeId) {
        if cfg!(debug_assertions) {
            let Some(children) = self.children(group) else {
                return;
            };
            debug_assert!(children.len() >= 2, "group below 2 children");
            let mut cursor = 0.0_f32;
            for &id in children {
                let node = self.node(id);
                debug_assert!(
                    (node.pos - cursor).abs() < EPSILON,
                    "child {:?} starts at {} but previous ended at {}",
                    id,
                    node.pos,
                    cursor
                );
                debug_assert!(node.size > 0.0, "child {:?} has non-positive size", id);
                cursor = node.pos + node.size;
            }
            debug_assert!((cursor - 1.0).abs() < EPSILON, "children end at {}", cursor);
        }
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}
