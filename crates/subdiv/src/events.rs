// ABOUTME: Process-local publish/subscribe for layout change notifications.
// ABOUTME: Open/close/layout events carrying the serialized tree.

use subdiv_layout::{ContentRef, LayoutNode, NodeId};

/// Identity of a pane as reported to hosts: the tree id plus the opaque
/// content reference the host keys its content unit by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneRef {
    pub id: NodeId,
    pub content: ContentRef,
}

/// A change notification fired synchronously after a committed mutation.
///
/// `Open` and `Close` are always immediately followed by a `Layout`
/// event carrying the identical serialized tree; at most one structural
/// event is fired per commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open { pane: PaneRef, layout: LayoutNode },
    Close { pane: PaneRef, layout: LayoutNode },
    Layout { layout: LayoutNode },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Open { .. } => "open",
            Event::Close { .. } => "close",
            Event::Layout { .. } => "layout",
        }
    }

    pub fn layout(&self) -> &LayoutNode {
        match self {
            Event::Open { layout, .. } | Event::Close { layout, .. } | Event::Layout { layout } => {
                layout
            }
        }
    }
}

/// Handle returned by [`EventEmitter::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Synchronous, single-threaded event dispatch. Listeners run in
/// registration order on the caller's stack; there is no queue and no
/// cross-thread delivery.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&Event)>)>,
    next_id: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, listener: impl FnMut(&Event) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn layout_event() -> Event {
        Event::Layout {
            layout: LayoutNode::Pane {
                id: 0,
                pos: 0.0,
                size: 1.0,
            },
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = EventEmitter::new();

        let a = Rc::clone(&seen);
        emitter.on(move |_| a.borrow_mut().push("first"));
        let b = Rc::clone(&seen);
        emitter.on(move |_| b.borrow_mut().push("second"));

        emitter.emit(&layout_event());
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn off_unsubscribes() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = EventEmitter::new();

        let c = Rc::clone(&count);
        let id = emitter.on(move |_| *c.borrow_mut() += 1);

        emitter.emit(&layout_event());
        assert!(emitter.off(id));
        emitter.emit(&layout_event());

        assert_eq!(*count.borrow(), 1);
        assert!(!emitter.off(id));
    }

    #[test]
    fn kind_names_match_the_contract() {
        let pane = PaneRef {
            id: NodeId(1),
            content: ContentRef(1),
        };
        let layout = LayoutNode::Pane {
            id: 0,
            pos: 0.0,
            size: 1.0,
        };
        let open = Event::Open {
            pane,
            layout: layout.clone(),
        };
        let close = Event::Close {
            pane,
            layout: layout.clone(),
        };
        assert_eq!(open.kind(), "open");
        assert_eq!(close.kind(), "close");
        assert_eq!(layout_event().kind(), "layout");
        assert_eq!(open.layout(), &layout);
    }
}
