use serde::{Deserialize, Serialize};

/// Focus moved to a node, or away from all nodes when `id` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadNodeFocus {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadNodeSelect {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadEdgeFocus {
    pub id: Option<String>,
}

/// `id` is the dynamic id of the edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadEdgeSelect {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadNodeDragStart {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadNodeMove {
    pub id: String,
    /// Graph coordinates
    pub new_pos: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadNodeDragEnd {
    pub id: String,
}

/// Output of the pointer state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    NodeFocus(PayloadNodeFocus),
    NodeSelect(PayloadNodeSelect),
    EdgeFocus(PayloadEdgeFocus),
    EdgeSelect(PayloadEdgeSelect),
    NodeDragStart(PayloadNodeDragStart),
    NodeMove(PayloadNodeMove),
    NodeDragEnd(PayloadNodeDragEnd),
    /// Click on empty canvas
    ClearSelection,
}
