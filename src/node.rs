//! Graph nodes and the arena that owns them.
//!
//! A node is one stage of the transformation DAG: the root, a filter, or a
//! defined column. Terminal actions are booked separately on the controller
//! (see [`frame`](crate::frame)) since they are consumed by a run while
//! nodes may outlive one.
//!
//! The arena is the sole owner of all nodes; every parent link is a
//! [`NodeId`]. Removing a node bumps its slot's generation, so handles
//! created before a run cannot silently alias a recycled slot.

use crate::node_id::NodeId;
use crate::row_fn::{RowExpr, RowPred};
use anyhow::{bail, Result};

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Root,
    Filter { pred: RowPred, columns: Vec<String> },
    Define { name: String, expr: RowExpr, columns: Vec<String> },
}

/// A live arena entry: the node plus its parent link.
pub(crate) struct Entry {
    pub parent: NodeId,
    pub node: Node,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Generational arena of graph nodes, rooted at index 0.
pub(crate) struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    /// Create an arena holding the root node; returns it and the root id.
    pub fn new() -> (Self, NodeId) {
        let root = NodeId::new(0, 0);
        let arena = Arena {
            slots: vec![Slot {
                generation: 0,
                entry: Some(Entry { parent: root, node: Node::Root }),
            }],
        };
        (arena, root)
    }

    pub fn insert(&mut self, parent: NodeId, node: Node) -> NodeId {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(Entry { parent, node }),
        });
        NodeId::new(index, 0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Entry> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Like [`get`](Self::get) but fails with a diagnostic for stale handles.
    pub fn get_checked(&self, id: NodeId) -> Result<&Entry> {
        match self.get(id) {
            Some(entry) => Ok(entry),
            None => bail!(
                "graph node is no longer available (filter and action nodes are consumed by run())"
            ),
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Entry> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let entry = slot.entry.take();
        if entry.is_some() {
            slot.generation += 1;
        }
        entry
    }

    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if slot.generation == id.generation() {
                if let Some(entry) = slot.entry.as_mut() {
                    entry.parent = parent;
                }
            }
        }
    }

    /// Number of arena slots ever allocated (live or tombstoned).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn live_ids(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entry.is_some())
            .map(|(i, s)| NodeId::new(i as u32, s.generation))
            .collect()
    }
}
