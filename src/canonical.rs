use std::collections::HashMap;

use serde_json::Value;

use crate::records::{EdgeRecord, NodeRecord, ENTITY_ID};

/// Authoritative node and edge records with O(1) identity lookups.
///
/// Indices are rebuilt from scratch on every bulk load. The only incremental
/// index edits happen through the rename path used by [`crate::GraphSyncEngine`].
#[derive(Debug, Clone, Default)]
pub struct CanonicalGraph {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,

    node_index_by_id: HashMap<String, usize>,
    edge_index_by_id: HashMap<String, usize>,
    edge_index_by_dynamic_id: HashMap<String, usize>,
}

impl CanonicalGraph {
    /// Replaces all state and rebuilds the three indices.
    pub fn load(&mut self, nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) {
        self.nodes = nodes;
        self.edges = edges;
        self.rebuild_indices();
    }

    pub fn clear(&mut self) {
        self.load(Vec::new(), Vec::new());
    }

    fn rebuild_indices(&mut self) {
        self.node_index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.edge_index_by_id = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        self.edge_index_by_dynamic_id = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.dynamic_id.clone(), i))
            .collect();
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lookup_node(&self, id: &str) -> Option<&NodeRecord> {
        self.node_index_by_id.get(id).map(|&i| &self.nodes[i])
    }

    pub fn lookup_edge(&self, id: &str) -> Option<&EdgeRecord> {
        self.edge_index_by_id.get(id).map(|&i| &self.edges[i])
    }

    pub fn lookup_edge_by_dynamic_id(&self, dynamic_id: &str) -> Option<&EdgeRecord> {
        self.edge_index_by_dynamic_id
            .get(dynamic_id)
            .map(|&i| &self.edges[i])
    }

    pub fn edge_position_by_dynamic_id(&self, dynamic_id: &str) -> Option<usize> {
        self.edge_index_by_dynamic_id.get(dynamic_id).copied()
    }

    /// Writes a node property. Unknown ids are ignored.
    pub fn set_node_property(&mut self, id: &str, key: &str, value: Value) {
        if let Some(&i) = self.node_index_by_id.get(id) {
            self.nodes[i].properties.insert(key.to_string(), value);
        }
    }

    /// Writes an edge property. Unknown ids are ignored.
    pub fn set_edge_property(&mut self, id: &str, key: &str, value: Value) {
        if let Some(&i) = self.edge_index_by_id.get(id) {
            self.edges[i].properties.insert(key.to_string(), value);
        }
    }

    /// Writes a property on the edge stored under `dynamic_id`, which stays unambiguous
    /// when backend ids collide. Unknown dynamic ids are ignored.
    pub fn set_edge_property_by_dynamic_id(&mut self, dynamic_id: &str, key: &str, value: Value) {
        if let Some(&i) = self.edge_index_by_dynamic_id.get(dynamic_id) {
            self.edges[i].properties.insert(key.to_string(), value);
        }
    }

    /// Moves a node to a new identity: id, labels and `entity_id` all become `new_id`.
    /// Returns false when `old_id` is unknown.
    pub(crate) fn rename_node(&mut self, old_id: &str, new_id: &str) -> bool {
        let Some(i) = self.node_index_by_id.remove(old_id) else {
            return false;
        };

        let node = &mut self.nodes[i];
        node.id = new_id.to_string();
        node.labels = vec![new_id.to_string()];
        node.properties
            .insert(ENTITY_ID.to_string(), Value::String(new_id.to_string()));

        self.node_index_by_id.insert(new_id.to_string(), i);
        true
    }

    /// Rewrites the endpoints equal to `old_node` and moves the edge to a new dynamic id.
    /// Returns false when `position` is out of range.
    pub(crate) fn rewire_edge(
        &mut self,
        position: usize,
        old_node: &str,
        new_node: &str,
        new_dynamic_id: &str,
    ) -> bool {
        let Some(edge) = self.edges.get_mut(position) else {
            return false;
        };

        if edge.source == old_node {
            edge.source = new_node.to_string();
        }
        if edge.target == old_node {
            edge.target = new_node.to_string();
        }

        let old_dynamic_id = std::mem::replace(&mut edge.dynamic_id, new_dynamic_id.to_string());
        if self.edge_index_by_dynamic_id.get(&old_dynamic_id) == Some(&position) {
            self.edge_index_by_dynamic_id.remove(&old_dynamic_id);
        }
        self.edge_index_by_dynamic_id
            .insert(new_dynamic_id.to_string(), position);
        true
    }

    /// Checks that every index entry points at a record carrying the same key.
    pub fn indices_consistent(&self) -> bool {
        self.node_index_by_id.len() == self.nodes.len()
            && self
                .node_index_by_id
                .iter()
                .all(|(id, &i)| self.nodes.get(i).is_some_and(|n| &n.id == id))
            && self
                .edge_index_by_id
                .iter()
                .all(|(id, &i)| self.edges.get(i).is_some_and(|e| &e.id == id))
            && self.edge_index_by_dynamic_id.len() == self.edges.len()
            && self
                .edge_index_by_dynamic_id
                .iter()
                .all(|(id, &i)| self.edges.get(i).is_some_and(|e| &e.dynamic_id == id))
    }
}
