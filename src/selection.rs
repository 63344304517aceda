/// What the inspection panel should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionTarget<'a> {
    Node { id: &'a str, focused: bool },
    /// `id` is the dynamic id of the edge
    Edge { id: &'a str, focused: bool },
}

/// Four independent optional references into the render graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_node: Option<String>,
    focused_node: Option<String>,
    selected_edge: Option<String>,
    focused_edge: Option<String>,
}

impl SelectionState {
    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn focused_node(&self) -> Option<&str> {
        self.focused_node.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&str> {
        self.selected_edge.as_deref()
    }

    pub fn focused_edge(&self) -> Option<&str> {
        self.focused_edge.as_deref()
    }

    pub fn set_selected_node(&mut self, id: Option<String>) {
        self.selected_node = id;
    }

    pub fn set_focused_node(&mut self, id: Option<String>) {
        self.focused_node = id;
    }

    pub fn set_selected_edge(&mut self, id: Option<String>) {
        self.selected_edge = id;
    }

    pub fn set_focused_edge(&mut self, id: Option<String>) {
        self.focused_edge = id;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Focused node > selected node > focused edge > selected edge.
    pub fn resolve(&self) -> Option<InspectionTarget<'_>> {
        if let Some(id) = self.focused_node() {
            return Some(InspectionTarget::Node { id, focused: true });
        }
        if let Some(id) = self.selected_node() {
            return Some(InspectionTarget::Node { id, focused: false });
        }
        if let Some(id) = self.focused_edge() {
            return Some(InspectionTarget::Edge { id, focused: true });
        }
        self.selected_edge()
            .map(|id| InspectionTarget::Edge { id, focused: false })
    }

    /// Points every node reference equal to `old` at `new`.
    pub(crate) fn rename_node(&mut self, old: &str, new: &str) {
        for slot in [&mut self.selected_node, &mut self.focused_node] {
            if slot.as_deref() == Some(old) {
                *slot = Some(new.to_string());
            }
        }
    }

    /// Points every edge reference equal to `old` at `new`.
    pub(crate) fn rekey_edge(&mut self, old: &str, new: &str) {
        for slot in [&mut self.selected_edge, &mut self.focused_edge] {
            if slot.as_deref() == Some(old) {
                *slot = Some(new.to_string());
            }
        }
    }

    /// Clears references the predicates reject.
    pub(crate) fn retain(&mut self, has_node: impl Fn(&str) -> bool, has_edge: impl Fn(&str) -> bool) {
        for slot in [&mut self.selected_node, &mut self.focused_node] {
            if slot.as_deref().is_some_and(|id| !has_node(id)) {
                *slot = None;
            }
        }
        for slot in [&mut self.selected_edge, &mut self.focused_edge] {
            if slot.as_deref().is_some_and(|id| !has_edge(id)) {
                *slot = None;
            }
        }
    }
}
