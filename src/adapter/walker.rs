//! Pre-order node walker
//!
//! A lazy iterator over a subtree driven by a `TreeCursor`. The tree is
//! never modified; the walk can be rewound and replayed.

use std::ops::Range;
use tree_sitter::{Node, TreeCursor};

/// Pre-order traversal: each node is yielded before its descendants,
/// siblings in source order.
pub struct PreorderWalk<'t> {
    start: Node<'t>,
    cursor: TreeCursor<'t>,
    depth: usize,
    last_depth: usize,
    finished: bool,
}

impl<'t> PreorderWalk<'t> {
    pub fn new(start: Node<'t>) -> Self {
        Self {
            start,
            cursor: start.walk(),
            depth: 0,
            last_depth: 0,
            finished: false,
        }
    }

    /// Depth of the most recently yielded node, the start node being 0
    pub fn depth(&self) -> usize {
        self.last_depth
    }

    /// Rewind to the start node
    pub fn restart(&mut self) {
        self.cursor.reset(self.start);
        self.depth = 0;
        self.last_depth = 0;
        self.finished = false;
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            self.depth += 1;
            return;
        }
        loop {
            if self.depth == 0 {
                self.finished = true;
                return;
            }
            if self.cursor.goto_next_sibling() {
                return;
            }
            self.cursor.goto_parent();
            self.depth -= 1;
        }
    }
}

impl<'t> Iterator for PreorderWalk<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.finished {
            return None;
        }
        let node = self.cursor.node();
        self.last_depth = self.depth;
        self.advance();
        Some(node)
    }
}

/// A node visit reported to a [`WalkObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent<'a> {
    pub kind: &'a str,
    pub span: Range<usize>,
    pub depth: usize,
}

impl<'a> NodeEvent<'a> {
    pub fn new(node: &Node<'a>, depth: usize) -> Self {
        Self {
            kind: node.kind(),
            span: node.byte_range(),
            depth,
        }
    }
}

/// Hook invoked for every node the extraction walk visits
pub trait WalkObserver {
    fn on_node(&mut self, event: &NodeEvent<'_>);
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct Silent;

impl WalkObserver for Silent {
    fn on_node(&mut self, _event: &NodeEvent<'_>) {}
}

/// Observer that emits one TRACE event per node
#[derive(Debug, Default)]
pub struct TraceObserver {
    visited: usize,
}

impl TraceObserver {
    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl WalkObserver for TraceObserver {
    fn on_node(&mut self, event: &NodeEvent<'_>) {
        self.visited += 1;
        tracing::trace!(
            target: "codeshape::walk",
            kind = event.kind,
            start = event.span.start,
            end = event.span.end,
            depth = event.depth,
            "visit"
        );
    }
}
