use std::collections::HashMap;

use egui::{Pos2, Rect};
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableGraph},
    visit::{EdgeRef, IntoEdgeReferences, IntoNodeReferences},
    Directed, Direction,
};
use serde::{Deserialize, Serialize};

use crate::{
    elements::{RenderEdge, RenderNode},
    error::RenderGraphError,
};

type StableGraphType = StableGraph<RenderNode, RenderEdge, Directed>;

/// An edge touching a node, seen from that node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentEdge {
    pub key: String,
    /// The endpoint that is not the node the edge was queried from.
    /// Equals that node for self-loops.
    pub other: String,
    pub direction: Direction,
}

/// Wrapper around [`petgraph::stable_graph::StableGraph`] keyed by node id and edge dynamic id.
///
/// Derived from [`crate::CanonicalGraph`]. Only the engine mutates structure; interaction code
/// gets location and highlight access through [`crate::PointerSurface`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderGraph {
    g: StableGraphType,

    node_idx: HashMap<String, NodeIndex>,
    edge_idx: HashMap<String, EdgeIndex>,
}

impl RenderGraph {
    /// Adds a node. Inserting an id twice is a caller bug and is rejected.
    pub fn add_node(&mut self, node: RenderNode) -> Result<NodeIndex, RenderGraphError> {
        if self.node_idx.contains_key(node.id()) {
            return Err(RenderGraphError::DuplicateNode(node.id().to_string()));
        }

        let id = node.id().to_string();
        let idx = self.g.add_node(node);
        self.node_idx.insert(id, idx);

        Ok(idx)
    }

    /// Adds a directed edge under `edge.key()` between two existing nodes.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        edge: RenderEdge,
    ) -> Result<EdgeIndex, RenderGraphError> {
        if self.edge_idx.contains_key(edge.key()) {
            return Err(RenderGraphError::DuplicateEdge(edge.key().to_string()));
        }
        let start = self.index_of(source)?;
        let end = self.index_of(target)?;

        let key = edge.key().to_string();
        let idx = self.g.add_edge(start, end, edge);
        self.edge_idx.insert(key, idx);

        Ok(idx)
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex, RenderGraphError> {
        self.node_idx
            .get(id)
            .copied()
            .ok_or_else(|| RenderGraphError::MissingNode(id.to_string()))
    }

    /// Removes node together with every incident edge. Missing ids are ignored.
    pub fn drop_node(&mut self, id: &str) -> Option<RenderNode> {
        let idx = self.node_idx.remove(id)?;

        // before removing the node we need to forget keys of the edges going with it
        let incident = self
            .g
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.g.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().key().to_string())
            .collect::<Vec<_>>();
        for key in &incident {
            self.edge_idx.remove(key);
        }

        self.g.remove_node(idx)
    }

    /// Removes edge by key. Missing keys are ignored.
    pub fn drop_edge(&mut self, key: &str) -> Option<RenderEdge> {
        let idx = self.edge_idx.remove(key)?;
        self.g.remove_edge(idx)
    }

    pub fn clear(&mut self) {
        self.g.clear();
        self.node_idx.clear();
        self.edge_idx.clear();
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_idx.contains_key(id)
    }

    pub fn has_edge(&self, key: &str) -> bool {
        self.edge_idx.contains_key(key)
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.node_idx.get(id).and_then(|&i| self.g.node_weight(i))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut RenderNode> {
        let idx = *self.node_idx.get(id)?;
        self.g.node_weight_mut(idx)
    }

    pub fn edge(&self, key: &str) -> Option<&RenderEdge> {
        self.edge_idx.get(key).and_then(|&i| self.g.edge_weight(i))
    }

    pub fn edge_mut(&mut self, key: &str) -> Option<&mut RenderEdge> {
        let idx = *self.edge_idx.get(key)?;
        self.g.edge_weight_mut(idx)
    }

    /// Source and target node ids of the edge.
    pub fn edge_endpoints(&self, key: &str) -> Option<(&str, &str)> {
        let (start, end) = self.g.edge_endpoints(*self.edge_idx.get(key)?)?;
        Some((self.g.node_weight(start)?.id(), self.g.node_weight(end)?.id()))
    }

    /// Total degree, in plus out. Unknown ids have degree 0.
    pub fn degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_idx.get(id) else {
            return 0;
        };
        self.g.edges_directed(idx, Direction::Outgoing).count()
            + self.g.edges_directed(idx, Direction::Incoming).count()
    }

    /// Every edge touching `id`, outgoing first. Self-loops are reported once.
    pub fn incident_edges(&self, id: &str) -> Vec<IncidentEdge> {
        let Some(&idx) = self.node_idx.get(id) else {
            return Vec::new();
        };

        let outgoing = self.g.edges_directed(idx, Direction::Outgoing).map(|e| {
            (e.weight().key(), e.target(), Direction::Outgoing)
        });
        let incoming = self
            .g
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.source() != idx)
            .map(|e| (e.weight().key(), e.source(), Direction::Incoming));

        outgoing
            .chain(incoming)
            .filter_map(|(key, other, direction)| {
                Some(IncidentEdge {
                    key: key.to_string(),
                    other: self.g.node_weight(other)?.id().to_string(),
                    direction,
                })
            })
            .collect()
    }

    /// Provides iterator over all nodes in insertion order.
    pub fn nodes_iter(&self) -> impl Iterator<Item = &RenderNode> {
        self.g.node_references().map(|(_, n)| n)
    }

    pub fn nodes_iter_mut(&mut self) -> impl Iterator<Item = &mut RenderNode> {
        self.g.node_weights_mut()
    }

    /// Provides iterator over all edges with their source and target ids.
    pub fn edges_iter(&self) -> impl Iterator<Item = (&RenderEdge, &str, &str)> {
        self.g.edge_references().filter_map(|e| {
            Some((
                e.weight(),
                self.g.node_weight(e.source())?.id(),
                self.g.node_weight(e.target())?.id(),
            ))
        })
    }

    pub fn node_count(&self) -> usize {
        self.g.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.g.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.g.node_count() == 0
    }

    /// Bounding rect of all nodes including their sizes. `None` for an empty graph.
    pub fn bounds(&self) -> Option<Rect> {
        let mut nodes = self.nodes_iter();
        let first = nodes.next()?;
        let mut min = first.location() - egui::Vec2::splat(first.size());
        let mut max = first.location() + egui::Vec2::splat(first.size());

        for n in nodes {
            let loc = n.location();
            let size = n.size();
            min = Pos2::new(min.x.min(loc.x - size), min.y.min(loc.y - size));
            max = Pos2::new(max.x.max(loc.x + size), max.y.max(loc.y + size));
        }

        Some(Rect::from_min_max(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32) -> RenderNode {
        RenderNode::new(id, Pos2::new(x, 0.))
    }

    fn sample() -> RenderGraph {
        let mut g = RenderGraph::default();
        g.add_node(node("a", 0.)).unwrap();
        g.add_node(node("b", 10.)).unwrap();
        g.add_node(node("c", 20.)).unwrap();
        g.add_edge("a", "b", RenderEdge::new("e0", "r0")).unwrap();
        g.add_edge("c", "a", RenderEdge::new("e1", "r1")).unwrap();
        g
    }

    #[test]
    fn duplicate_insertion_is_rejected() {
        let mut g = sample();
        assert_eq!(
            g.add_node(node("a", 5.)),
            Err(RenderGraphError::DuplicateNode("a".into()))
        );
        assert_eq!(
            g.add_edge("a", "c", RenderEdge::new("e0", "r9")),
            Err(RenderGraphError::DuplicateEdge("e0".into()))
        );
        assert_eq!(
            g.add_edge("a", "zzz", RenderEdge::new("e5", "r9")),
            Err(RenderGraphError::MissingNode("zzz".into()))
        );
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn multi_edges_are_kept_apart() {
        let mut g = sample();
        g.add_edge("a", "b", RenderEdge::new("e2", "r0")).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.degree("b"), 2);
    }

    #[test]
    fn degree_of_unknown_node_is_zero() {
        let g = sample();
        assert_eq!(g.degree("a"), 2);
        assert_eq!(g.degree("b"), 1);
        assert_eq!(g.degree("nope"), 0);
    }

    #[test]
    fn drops_are_noops_on_missing_ids() {
        let mut g = sample();
        assert!(g.drop_node("nope").is_none());
        assert!(g.drop_edge("nope").is_none());
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn drop_node_forgets_incident_edge_keys() {
        let mut g = sample();
        g.drop_node("a").unwrap();
        assert_eq!(g.edge_count(), 0);
        assert!(!g.has_edge("e0"));
        assert!(!g.has_edge("e1"));
        // keys can be reused once dropped
        g.add_edge("b", "c", RenderEdge::new("e0", "r0")).unwrap();
        assert_eq!(g.edge_endpoints("e0"), Some(("b", "c")));
    }

    #[test]
    fn incident_edges_report_direction() {
        let mut g = sample();
        g.add_edge("a", "a", RenderEdge::new("loop", "r2")).unwrap();
        let inc = g.incident_edges("a");
        assert_eq!(inc.len(), 3);
        assert!(inc.contains(&IncidentEdge {
            key: "e0".into(),
            other: "b".into(),
            direction: Direction::Outgoing
        }));
        assert!(inc.contains(&IncidentEdge {
            key: "e1".into(),
            other: "c".into(),
            direction: Direction::Incoming
        }));
        assert!(inc.contains(&IncidentEdge {
            key: "loop".into(),
            other: "a".into(),
            direction: Direction::Outgoing
        }));
    }

    #[test]
    fn bounds_include_node_sizes() {
        let g = sample();
        let b = g.bounds().unwrap();
        assert_eq!(b.min, Pos2::new(-4., -4.));
        assert_eq!(b.max, Pos2::new(24., 4.));
        assert!(RenderGraph::default().bounds().is_none());
    }
}
