use petgraph::Direction;
use serde::Serialize;

use crate::{
    records::Properties,
    selection::{InspectionTarget, SelectionState},
    CanonicalGraph, RenderGraph,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NeighborDirection {
    Outgoing,
    Incoming,
}

impl From<Direction> for NeighborDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Outgoing => Self::Outgoing,
            Direction::Incoming => Self::Incoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborRef {
    pub id: String,
    pub label: String,
    pub direction: NeighborDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInspection {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: Properties,
    pub degree: usize,
    /// One entry per neighbor and direction, in edge order.
    pub neighbors: Vec<NeighborRef>,
    /// Hover-derived rather than click-derived
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointRef {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeInspection {
    pub id: String,
    pub dynamic_id: String,
    pub kind: Option<String>,
    pub properties: Properties,
    pub source: EndpointRef,
    pub target: EndpointRef,
    pub focused: bool,
}

/// Read-only view of whatever the selection currently resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inspection {
    Node(NodeInspection),
    Edge(EdgeInspection),
}

impl Inspection {
    pub fn resolve(
        canonical: &CanonicalGraph,
        render: &RenderGraph,
        selection: &SelectionState,
    ) -> Option<Self> {
        match selection.resolve()? {
            InspectionTarget::Node { id, focused } => {
                inspect_node(canonical, render, id, focused).map(Self::Node)
            }
            InspectionTarget::Edge { id, focused } => {
                inspect_edge(canonical, render, id, focused).map(Self::Edge)
            }
        }
    }
}

fn display_label(render: &RenderGraph, id: &str) -> String {
    render
        .node(id)
        .map_or_else(|| id.to_string(), |n| n.label().to_string())
}

fn inspect_node(
    canonical: &CanonicalGraph,
    render: &RenderGraph,
    id: &str,
    focused: bool,
) -> Option<NodeInspection> {
    let record = canonical.lookup_node(id)?;

    let mut neighbors: Vec<NeighborRef> = Vec::new();
    for incident in render.incident_edges(id) {
        let direction = incident.direction.into();
        if neighbors
            .iter()
            .any(|n| n.id == incident.other && n.direction == direction)
        {
            continue;
        }
        neighbors.push(NeighborRef {
            label: display_label(render, &incident.other),
            id: incident.other,
            direction,
        });
    }

    Some(NodeInspection {
        id: record.id.clone(),
        labels: record.labels.clone(),
        properties: record.properties.clone(),
        degree: render.degree(id),
        neighbors,
        focused,
    })
}

fn inspect_edge(
    canonical: &CanonicalGraph,
    render: &RenderGraph,
    dynamic_id: &str,
    focused: bool,
) -> Option<EdgeInspection> {
    let record = canonical.lookup_edge_by_dynamic_id(dynamic_id)?;
    let endpoint = |id: &str| EndpointRef {
        id: id.to_string(),
        label: display_label(render, id),
    };

    Some(EdgeInspection {
        id: record.id.clone(),
        dynamic_id: record.dynamic_id.clone(),
        kind: record.kind.clone(),
        properties: record.properties.clone(),
        source: endpoint(&record.source),
        target: endpoint(&record.target),
        focused,
    })
}

#[cfg(test)]
mod tests {
    use egui::Pos2;

    use super::*;
    use crate::{
        records::{EdgeRecord, NodeRecord},
        RenderEdge, RenderNode,
    };

    fn graphs() -> (CanonicalGraph, RenderGraph) {
        let mut canonical = CanonicalGraph::default();
        let mut e0 = EdgeRecord::new("r0", "a", "b").with_kind("KNOWS");
        e0.dynamic_id = "e0".into();
        let mut e1 = EdgeRecord::new("r1", "c", "a");
        e1.dynamic_id = "e1".into();
        let mut e2 = EdgeRecord::new("r2", "a", "b");
        e2.dynamic_id = "e2".into();
        canonical.load(
            vec![NodeRecord::new("a"), NodeRecord::new("b"), NodeRecord::new("c")],
            vec![e0, e1, e2],
        );

        let mut render = RenderGraph::default();
        for id in ["a", "b", "c"] {
            let mut n = RenderNode::new(id, Pos2::ZERO);
            n.set_label(id.to_uppercase());
            render.add_node(n).unwrap();
        }
        render.add_edge("a", "b", RenderEdge::new("e0", "r0")).unwrap();
        render.add_edge("c", "a", RenderEdge::new("e1", "r1")).unwrap();
        render.add_edge("a", "b", RenderEdge::new("e2", "r2")).unwrap();

        (canonical, render)
    }

    #[test]
    fn node_view_lists_neighbors_once_per_direction() {
        let (canonical, render) = graphs();
        let mut selection = SelectionState::default();
        selection.set_selected_node(Some("a".into()));

        let Some(Inspection::Node(view)) = Inspection::resolve(&canonical, &render, &selection)
        else {
            panic!("expected a node");
        };
        assert_eq!(view.degree, 3);
        assert!(!view.focused);
        assert_eq!(
            view.neighbors,
            vec![
                NeighborRef {
                    id: "b".into(),
                    label: "B".into(),
                    direction: NeighborDirection::Outgoing,
                },
                NeighborRef {
                    id: "c".into(),
                    label: "C".into(),
                    direction: NeighborDirection::Incoming,
                },
            ]
        );
    }

    #[test]
    fn edge_view_resolves_endpoint_labels() {
        let (canonical, render) = graphs();
        let mut selection = SelectionState::default();
        selection.set_focused_edge(Some("e0".into()));

        let Some(Inspection::Edge(view)) = Inspection::resolve(&canonical, &render, &selection)
        else {
            panic!("expected an edge");
        };
        assert_eq!(view.id, "r0");
        assert_eq!(view.kind.as_deref(), Some("KNOWS"));
        assert_eq!(view.source.label, "A");
        assert_eq!(view.target.label, "B");
        assert!(view.focused);
    }

    #[test]
    fn stale_selection_resolves_to_nothing() {
        let (canonical, render) = graphs();
        let mut selection = SelectionState::default();
        selection.set_selected_node(Some("ghost".into()));
        assert!(Inspection::resolve(&canonical, &render, &selection).is_none());
    }
}
