//! Generational identifier for nodes in a [`DataFrame`](crate::DataFrame)
//! graph.
//!
//! Nodes live in an arena owned by the graph controller; every node-to-node
//! reference is a `NodeId` rather than a pointer. The generation counter
//! makes stale handles detectable: when a run consumes a filter node, the
//! arena slot's generation is bumped and any handle still carrying the old
//! id resolves to "no such node" instead of to unrelated memory.
//!
//! They're small, `Copy`, and hashable, so they can be used efficiently as
//! keys when snapshotting or traversing the graph.

/// Unique identifier for a node in a transformation graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    /// Return the underlying numeric parts.
    ///
    /// Useful mainly for debugging.
    pub fn raw(&self) -> (u32, u32) {
        (self.index, self.generation)
    }
}
