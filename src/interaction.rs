use egui::Pos2;
use tracing::trace;

use crate::{
    camera::Renderer,
    events::{
        Event, PayloadEdgeFocus, PayloadEdgeSelect, PayloadNodeDragEnd, PayloadNodeDragStart,
        PayloadNodeFocus, PayloadNodeMove, PayloadNodeSelect,
    },
    RenderGraph,
};

/// Pointer travel in pixels a press must exceed before it becomes a drag.
pub const DRAG_EPSILON: f32 = 4.;

/// Raw pointer input as reported by the renderer. Positions are viewport coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    EnterNode(String),
    LeaveNode(String),
    Down { node: String, pos: Pos2 },
    Move(Pos2),
    Up(Pos2),
    EnterEdge(String),
    LeaveEdge(String),
    ClickEdge(String),
    /// Click on empty canvas
    ClickStage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(String),
    PressedOnNode {
        node: String,
        start: Pos2,
    },
    Dragging(String),
}

/// Write access to the render graph limited to what pointer gestures may change.
pub struct PointerSurface<'a> {
    g: &'a mut RenderGraph,
}

impl<'a> PointerSurface<'a> {
    pub fn new(g: &'a mut RenderGraph) -> Self {
        Self { g }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.g.has_node(id)
    }

    pub fn set_location(&mut self, id: &str, location: Pos2) -> bool {
        self.g
            .node_mut(id)
            .map(|n| n.set_location(location))
            .is_some()
    }

    pub fn set_highlighted(&mut self, id: &str, highlighted: bool) -> bool {
        self.g
            .node_mut(id)
            .map(|n| n.set_highlighted(highlighted))
            .is_some()
    }
}

/// Hover, click-select and drag state machine.
///
/// A select is only emitted by a pointer-up whose gesture never moved further than
/// [`DRAG_EPSILON`] from where it was pressed.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    drag_enabled: bool,
    /// Press recorded while dragging is disabled
    pending_click: Option<(String, Pos2)>,
    /// Node under the pointer, tracked through presses and drags
    hover: Option<String>,
    /// Node of the last emitted focus event
    focused: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InteractionController {
    pub fn new(drag_enabled: bool) -> Self {
        Self {
            state: InteractionState::Idle,
            drag_enabled,
            pending_click: None,
            hover: None,
            focused: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    /// Takes effect from the next press. A gesture already underway completes normally.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    /// True while a press or drag is underway.
    pub fn gesture_in_progress(&self) -> bool {
        matches!(
            self.state,
            InteractionState::PressedOnNode { .. } | InteractionState::Dragging(_)
        )
    }

    /// The default camera pan must not react to the current gesture.
    pub fn suppresses_camera_pan(&self) -> bool {
        self.gesture_in_progress()
    }

    /// Node the pointer is over, if any.
    pub fn hovered(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    /// Forgets the current gesture, used when the graph is replaced. Hover survives when
    /// `has_node` still knows the node.
    pub fn reset(&mut self, has_node: impl Fn(&str) -> bool) {
        self.pending_click = None;
        if self.hover.as_deref().is_some_and(|id| !has_node(id)) {
            self.hover = None;
        }
        if self.focused.as_deref().is_some_and(|id| !has_node(id)) {
            self.focused = None;
        }
        self.state = self.resting_state();
    }

    fn resting_state(&self) -> InteractionState {
        match &self.hover {
            Some(id) => InteractionState::Hovering(id.clone()),
            None => InteractionState::Idle,
        }
    }

    /// Emits a focus change when the hovered node differs from the focused one.
    fn sync_focus(&mut self) -> Vec<Event> {
        if self.focused == self.hover {
            return Vec::new();
        }
        self.focused = self.hover.clone();
        vec![Event::NodeFocus(PayloadNodeFocus {
            id: self.hover.clone(),
        })]
    }

    /// Points a gesture on `old` at `new` after the node was renamed.
    pub(crate) fn rename_node(&mut self, old: &str, new: &str) {
        match &mut self.state {
            InteractionState::Hovering(id) | InteractionState::Dragging(id) if *id == old => {
                *id = new.to_string();
            }
            InteractionState::PressedOnNode { node, .. } if *node == old => {
                *node = new.to_string();
            }
            _ => {}
        }
        let pending = self.pending_click.as_mut().map(|(node, _)| node);
        for slot in [pending, self.hover.as_mut(), self.focused.as_mut()]
            .into_iter()
            .flatten()
        {
            if *slot == old {
                *slot = new.to_string();
            }
        }
    }

    pub fn handle<R: Renderer + ?Sized>(
        &mut self,
        event: PointerEvent,
        surface: &mut PointerSurface<'_>,
        renderer: &R,
    ) -> Vec<Event> {
        trace!(?event, state = ?self.state, "pointer event");

        match event {
            PointerEvent::EnterNode(id) => self.enter_node(id, surface),
            PointerEvent::LeaveNode(id) => self.leave_node(&id),
            PointerEvent::Down { node, pos } => self.down(node, pos, surface),
            PointerEvent::Move(pos) => self.pointer_move(pos, surface, renderer),
            PointerEvent::Up(_) => self.up(surface),
            PointerEvent::EnterEdge(key) if !self.gesture_in_progress() => {
                vec![Event::EdgeFocus(PayloadEdgeFocus { id: Some(key) })]
            }
            PointerEvent::LeaveEdge(_) if !self.gesture_in_progress() => {
                vec![Event::EdgeFocus(PayloadEdgeFocus { id: None })]
            }
            PointerEvent::ClickEdge(key) if !self.gesture_in_progress() => {
                vec![Event::EdgeSelect(PayloadEdgeSelect { id: key })]
            }
            PointerEvent::ClickStage if !self.gesture_in_progress() => {
                vec![Event::ClearSelection]
            }
            PointerEvent::EnterEdge(_)
            | PointerEvent::LeaveEdge(_)
            | PointerEvent::ClickEdge(_)
            | PointerEvent::ClickStage => Vec::new(),
        }
    }

    fn enter_node(&mut self, id: String, surface: &PointerSurface<'_>) -> Vec<Event> {
        if !surface.has_node(&id) {
            return Vec::new();
        }
        self.hover = Some(id);
        // focus follows once the gesture ends
        if self.gesture_in_progress() {
            return Vec::new();
        }
        self.state = self.resting_state();
        self.sync_focus()
    }

    fn leave_node(&mut self, id: &str) -> Vec<Event> {
        if self.hover.as_deref() != Some(id) {
            return Vec::new();
        }
        self.hover = None;
        if self.gesture_in_progress() {
            return Vec::new();
        }
        self.state = InteractionState::Idle;
        self.pending_click = None;
        self.sync_focus()
    }

    fn down(&mut self, node: String, pos: Pos2, surface: &mut PointerSurface<'_>) -> Vec<Event> {
        if self.gesture_in_progress() || !surface.has_node(&node) {
            return Vec::new();
        }

        if !self.drag_enabled {
            self.pending_click = Some((node, pos));
            return Vec::new();
        }

        surface.set_highlighted(&node, true);
        self.state = InteractionState::PressedOnNode { node, start: pos };
        Vec::new()
    }

    fn pointer_move<R: Renderer + ?Sized>(
        &mut self,
        pos: Pos2,
        surface: &mut PointerSurface<'_>,
        renderer: &R,
    ) -> Vec<Event> {
        let mut events = Vec::new();

        match &self.state {
            InteractionState::PressedOnNode { node, start } => {
                if !exceeds_drag_epsilon(*start, pos) {
                    return events;
                }
                let node = node.clone();
                events.push(Event::NodeDragStart(PayloadNodeDragStart { id: node.clone() }));
                self.state = InteractionState::Dragging(node);
            }
            InteractionState::Dragging(_) => {}
            InteractionState::Idle | InteractionState::Hovering(_) => {
                // without dragging, a press that travels is a pan, not a click
                if self
                    .pending_click
                    .as_ref()
                    .is_some_and(|(_, start)| exceeds_drag_epsilon(*start, pos))
                {
                    self.pending_click = None;
                }
                return events;
            }
        }

        if let InteractionState::Dragging(node) = &self.state {
            let new_pos = renderer.viewport_to_graph(pos);
            if surface.set_location(node, new_pos) {
                events.push(Event::NodeMove(PayloadNodeMove {
                    id: node.clone(),
                    new_pos: [new_pos.x, new_pos.y],
                }));
            }
        }

        events
    }

    fn up(&mut self, surface: &mut PointerSurface<'_>) -> Vec<Event> {
        let mut events = match std::mem::take(&mut self.state) {
            InteractionState::PressedOnNode { node, .. } => {
                surface.set_highlighted(&node, false);
                vec![Event::NodeSelect(PayloadNodeSelect { id: node })]
            }
            InteractionState::Dragging(node) => {
                surface.set_highlighted(&node, false);
                vec![Event::NodeDragEnd(PayloadNodeDragEnd { id: node })]
            }
            InteractionState::Idle | InteractionState::Hovering(_) => {
                match self.pending_click.take() {
                    Some((node, _)) if surface.has_node(&node) => {
                        vec![Event::NodeSelect(PayloadNodeSelect { id: node })]
                    }
                    _ => Vec::new(),
                }
            }
        };
        self.state = self.resting_state();
        events.extend(self.sync_focus());
        events
    }
}

fn exceeds_drag_epsilon(start: Pos2, pos: Pos2) -> bool {
    (pos - start).length_sq() > DRAG_EPSILON * DRAG_EPSILON
}
