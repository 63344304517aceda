use std::time::Duration;

use egui::Pos2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    camera::{Camera, Renderer},
    error::{FetchError, SyncError},
    events::{Event, EventSink},
    inspect::Inspection,
    interaction::{InteractionController, PointerEvent, PointerSurface},
    layouts::{
        CommunityDetector, ForceAtlas2, ForceDirected, LayoutPipeline, LayoutReport, Louvain,
        Placement,
    },
    records::{value_number, value_text, EdgeRecord, GraphData, NodeRecord, ENTITY_ID, WEIGHT},
    selection::SelectionState,
    CanonicalGraph, RenderEdge, RenderGraph, RenderNode, Settings,
};

/// Credentials forwarded to the backend with a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub token: String,
}

/// Per-call context of a fetch. Passed explicitly, never read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchContext {
    pub workspace: String,
    pub auth: Option<AuthContext>,
}

impl FetchContext {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthContext {
            token: token.into(),
        });
        self
    }
}

/// Backend the engine loads graphs from.
pub trait GraphSource {
    fn fetch(&mut self, ctx: &FetchContext) -> Result<GraphData, FetchError>;
}

impl<F> GraphSource for F
where
    F: FnMut(&FetchContext) -> Result<GraphData, FetchError>,
{
    fn fetch(&mut self, ctx: &FetchContext) -> Result<GraphData, FetchError> {
        self(ctx)
    }
}

/// Issued by [`GraphSyncEngine::begin_load`]. Only the latest ticket may replace the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A newer load was started before this one finished; the result was discarded.
    Superseded,
}

/// Passed to graph-replaced hooks once per completed load.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphReplaced {
    pub generation: u64,
    pub version: u64,
    pub nodes: usize,
    pub edges: usize,
    pub empty: bool,
    /// `None` when the pipeline was skipped
    pub layout: Option<LayoutReport>,
}

type GraphReplacedHook = Box<dyn FnMut(&GraphReplaced)>;

/// Edge of the render graph scheduled to move to a new key during a rename.
struct Rekey {
    old_key: String,
    new_key: String,
    source: String,
    target: String,
    edge: RenderEdge,
}

/// Keeps the [`CanonicalGraph`] and the [`RenderGraph`] in sync.
///
/// Every mutation of either model goes through this type. The only other writer of the
/// render graph is the [`InteractionController`], which is limited to node locations and
/// highlight through [`PointerSurface`].
pub struct GraphSyncEngine<C = Louvain, P = ForceDirected<ForceAtlas2>, R = Camera> {
    canonical: CanonicalGraph,
    render: RenderGraph,

    pipeline: LayoutPipeline<C, P>,
    renderer: R,
    interaction: InteractionController,
    selection: SelectionState,
    settings: Settings,

    version: u64,
    empty: bool,
    busy: bool,
    latest_generation: u64,
    /// Source of edge dynamic ids. Never reset so keys stay unique for the whole session.
    next_edge_key: u64,

    hooks: Vec<GraphReplacedHook>,
    sink: Option<Box<dyn EventSink>>,
}

impl GraphSyncEngine {
    pub fn new(settings: Settings) -> Self {
        let pipeline = LayoutPipeline::from_settings(&settings);
        let camera = Camera::default().with_padding(settings.camera.screen_padding);
        Self::with_parts(settings, pipeline, camera)
    }
}

impl Default for GraphSyncEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl<C, P, R> GraphSyncEngine<C, P, R>
where
    C: CommunityDetector,
    P: Placement,
    R: Renderer,
{
    pub fn with_parts(settings: Settings, pipeline: LayoutPipeline<C, P>, renderer: R) -> Self {
        Self {
            canonical: CanonicalGraph::default(),
            render: RenderGraph::default(),
            pipeline,
            renderer,
            interaction: InteractionController::new(settings.interaction.drag_enabled),
            selection: SelectionState::default(),
            settings,
            version: 0,
            empty: true,
            busy: false,
            latest_generation: 0,
            next_edge_key: 0,
            hooks: Vec::new(),
            sink: None,
        }
    }

    /// Publishes every interaction event to `sink` in addition to returning it.
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Registers a hook invoked exactly once per completed load, after layout.
    pub fn on_graph_replaced(&mut self, hook: impl FnMut(&GraphReplaced) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn canonical(&self) -> &CanonicalGraph {
        &self.canonical
    }

    pub fn render(&self) -> &RenderGraph {
        &self.render
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Increases on every load and every property update.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// A load has begun and not finished yet.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.settings.interaction.drag_enabled = enabled;
        self.interaction.set_drag_enabled(enabled);
    }

    /// Replaces both models with `nodes` and `edges` and runs the layout pipeline.
    pub fn load(
        &mut self,
        nodes: Vec<NodeRecord>,
        edges: Vec<EdgeRecord>,
    ) -> Result<(), SyncError> {
        let ticket = self.begin_load();
        self.finish_load(ticket, Ok(GraphData::new(nodes, edges)))
            .map(|_| ())
    }

    /// Marks the engine busy and returns the ticket the fetched result must be delivered with.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_generation += 1;
        self.busy = true;
        debug!(generation = self.latest_generation, "load started");
        LoadTicket {
            generation: self.latest_generation,
        }
    }

    /// Applies a fetch result. Results of superseded tickets are discarded untouched.
    ///
    /// A failed fetch clears both models, sets the empty flag and is returned as
    /// [`SyncError::LoadFailure`]. Nothing is retried.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<GraphData, FetchError>,
    ) -> Result<LoadOutcome, SyncError> {
        if ticket.generation != self.latest_generation {
            warn!(
                generation = ticket.generation,
                latest = self.latest_generation,
                "discarding superseded load result"
            );
            return Ok(LoadOutcome::Superseded);
        }
        self.busy = false;

        match result {
            Ok(data) => {
                self.replace_graph(data, ticket.generation);
                Ok(LoadOutcome::Loaded)
            }
            Err(e) => {
                warn!(generation = ticket.generation, error = %e, "load failed, clearing graph");
                self.canonical.clear();
                self.render.clear();
                self.empty = true;
                self.interaction.reset(|_| false);
                self.selection.clear();
                self.version += 1;
                self.notify_replaced(ticket.generation, None);
                Err(SyncError::LoadFailure(e))
            }
        }
    }

    /// Fetches from `source` and loads the result.
    pub fn load_from<S: GraphSource + ?Sized>(
        &mut self,
        source: &mut S,
        ctx: &FetchContext,
    ) -> Result<LoadOutcome, SyncError> {
        let ticket = self.begin_load();
        let result = source.fetch(ctx);
        self.finish_load(ticket, result)
    }

    fn replace_graph(&mut self, data: GraphData, generation: u64) {
        let GraphData { nodes, edges } = data;
        let (nodes_in, edges_in) = (nodes.len(), edges.len());

        let mut rng = match self.settings.load.scatter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut render = RenderGraph::default();
        let mut kept_nodes = Vec::with_capacity(nodes.len());
        for record in nodes {
            let location = record
                .position
                .unwrap_or_else(|| scatter(&mut rng, self.settings.load.scatter_extent));
            let mut node = RenderNode::new(&record.id, location);
            node.set_size(self.settings.load.initial_node_size);
            node.set_color(self.settings.load.initial_node_color);
            if let Some(label) = record.property_text(&self.settings.labels.node_label_property) {
                node.set_label(label);
            }

            match render.add_node(node) {
                Ok(_) => kept_nodes.push(record),
                Err(e) => warn!(error = %e, "dropping node record"),
            }
        }

        let mut kept_edges = Vec::with_capacity(edges.len());
        for mut record in edges {
            record.dynamic_id = next_dynamic_id(&mut self.next_edge_key);

            let mut edge = RenderEdge::new(&record.dynamic_id, &record.id);
            edge.set_size(self.settings.edges.edge_size(record.weight()));
            edge.set_label(
                record
                    .property_text(&self.settings.labels.edge_label_property)
                    .unwrap_or_default(),
            );

            match render.add_edge(&record.source, &record.target, edge) {
                Ok(_) => kept_edges.push(record),
                Err(e) => warn!(edge = %record.id, error = %e, "dropping edge record"),
            }
        }

        self.canonical.load(kept_nodes, kept_edges);
        self.render = render;
        self.empty = self.canonical.is_empty();

        let render = &self.render;
        self.interaction.reset(|id| render.has_node(id));
        self.selection
            .retain(|id| render.has_node(id), |key| render.has_edge(key));

        let layout = self.pipeline.run(&mut self.render, &mut self.renderer);

        self.version += 1;
        debug!(
            generation,
            nodes = self.render.node_count(),
            edges = self.render.edge_count(),
            dropped_nodes = nodes_in - self.render.node_count(),
            dropped_edges = edges_in - self.render.edge_count(),
            "graph loaded"
        );
        self.notify_replaced(generation, layout);
    }

    fn notify_replaced(&mut self, generation: u64, layout: Option<LayoutReport>) {
        let replaced = GraphReplaced {
            generation,
            version: self.version,
            nodes: self.render.node_count(),
            edges: self.render.edge_count(),
            empty: self.empty,
            layout,
        };
        for hook in &mut self.hooks {
            hook(&replaced);
        }
    }

    /// Reruns the layout pipeline over the current graph.
    ///
    /// Refused while a pointer gesture is in progress. Returns `None` when refused or when
    /// the graph is empty.
    pub fn relayout(&mut self) -> Option<LayoutReport> {
        if self.interaction.gesture_in_progress() {
            debug!("relayout refused during pointer gesture");
            return None;
        }
        let report = self.pipeline.run(&mut self.render, &mut self.renderer)?;
        self.version += 1;
        Some(report)
    }

    /// Writes a node property into both models.
    ///
    /// Changing `entity_id` of a node whose `entity_id` equals its id renames the node.
    /// A rename either completes in both models or leaves them untouched and fails with
    /// [`SyncError::MutationFailure`]. Unknown ids are ignored.
    pub fn update_node_property(
        &mut self,
        id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), SyncError> {
        let renames = key == ENTITY_ID
            && self
                .canonical
                .lookup_node(id)
                .is_some_and(|n| n.entity_id() == Some(id));

        match value.as_str() {
            Some(new_id) if renames && new_id != id => self.rename_node(id, new_id)?,
            _ => {
                self.canonical.set_node_property(id, key, value.clone());
                if key == self.settings.labels.node_label_property {
                    if let Some(node) = self.render.node_mut(id) {
                        node.set_label(value_text(&value));
                    }
                }
            }
        }

        self.version += 1;
        Ok(())
    }

    /// Stages every insert under the new id first and only then drops the old elements.
    fn rename_node(&mut self, old: &str, new: &str) -> Result<(), SyncError> {
        let target = format!("node {old}");

        let Some(staged_node) = self.render.node(old).map(|n| n.renamed(new)) else {
            error!(old, new, "renamed node is missing from the render graph");
            return Err(SyncError::mutation(target));
        };

        let mut plan = Vec::new();
        for incident in self.render.incident_edges(old) {
            let (Some(edge), Some((from, to))) = (
                self.render.edge(&incident.key),
                self.render.edge_endpoints(&incident.key),
            ) else {
                continue;
            };
            let swap = |end: &str| if end == old { new } else { end }.to_string();
            let new_key = next_dynamic_id(&mut self.next_edge_key);
            plan.push(Rekey {
                edge: edge.rekeyed(&new_key),
                old_key: incident.key,
                new_key,
                source: swap(from),
                target: swap(to),
            });
        }

        if let Err(e) = self.render.add_node(staged_node) {
            error!(old, new, error = %e, "rename aborted before any change");
            return Err(SyncError::mutation(target));
        }
        for (done, r) in plan.iter().enumerate() {
            if let Err(e) = self.render.add_edge(&r.source, &r.target, r.edge.clone()) {
                error!(old, new, edge = %r.old_key, error = %e, "rename aborted, rolling back");
                for inserted in &plan[..done] {
                    self.render.drop_edge(&inserted.new_key);
                }
                self.render.drop_node(new);
                return Err(SyncError::mutation(target));
            }
        }

        // every insert succeeded, the old elements can go
        for r in &plan {
            self.render.drop_edge(&r.old_key);
        }
        self.render.drop_node(old);

        let positions: Vec<(usize, &str)> = plan
            .iter()
            .filter_map(|r| {
                self.canonical
                    .edge_position_by_dynamic_id(&r.old_key)
                    .map(|p| (p, r.new_key.as_str()))
            })
            .collect();
        if !self.canonical.rename_node(old, new) {
            error!(old, new, "renamed node is missing from the canonical graph");
        }
        for (position, key) in positions {
            self.canonical.rewire_edge(position, old, new, key);
        }

        self.selection.rename_node(old, new);
        self.selection.set_selected_node(Some(new.to_string()));
        for r in &plan {
            self.selection.rekey_edge(&r.old_key, &r.new_key);
        }
        self.interaction.rename_node(old, new);

        debug!(old, new, edges = plan.len(), "node renamed");
        Ok(())
    }

    /// Writes an edge property by canonical id. Label and weight changes also reach the
    /// render edge addressed by `dynamic_id`; a label change selects that edge.
    pub fn update_edge_property(
        &mut self,
        id: &str,
        dynamic_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), SyncError> {
        if let Some(edge) = self.render.edge(dynamic_id) {
            if edge.canonical_id() != id {
                error!(
                    id,
                    dynamic_id,
                    rendered = edge.canonical_id(),
                    "dynamic id renders a different edge"
                );
                return Err(SyncError::mutation(format!("edge {id}")));
            }
        }

        // backend ids may collide across direction, the dynamic id names one record
        let stored = self
            .canonical
            .lookup_edge_by_dynamic_id(dynamic_id)
            .map(|record| record.id.clone());
        match stored.as_deref() {
            Some(stored) if stored != id => {
                error!(id, dynamic_id, stored, "dynamic id stores a different edge");
                return Err(SyncError::mutation(format!("edge {id}")));
            }
            Some(_) => {
                self.canonical
                    .set_edge_property_by_dynamic_id(dynamic_id, key, value.clone());
            }
            None => self.canonical.set_edge_property(id, key, value.clone()),
        }

        if key == self.settings.labels.edge_label_property {
            if let Some(edge) = self.render.edge_mut(dynamic_id) {
                edge.set_label(value_text(&value));
                self.selection.set_selected_edge(Some(dynamic_id.to_string()));
            }
        }
        if key == WEIGHT {
            let size = self.settings.edges.edge_size(value_number(&value));
            if let Some(edge) = self.render.edge_mut(dynamic_id) {
                edge.set_size(size);
            }
        }

        self.version += 1;
        Ok(())
    }

    fn reframe_duration(&self) -> Duration {
        Duration::from_millis(self.settings.camera.animation_ms)
    }

    /// Selects a node, optionally animating the camera onto it. Unknown ids are ignored.
    pub fn set_selected_node(&mut self, id: Option<&str>, recenter: bool) {
        if !self.known_node(id) {
            return;
        }
        self.selection.set_selected_node(id.map(str::to_string));
        if !recenter {
            return;
        }
        if let Some(location) = id.and_then(|id| self.render.node(id)).map(RenderNode::location)
        {
            let duration = self.reframe_duration();
            self.renderer.center_on(location, duration);
        }
    }

    /// Selects an edge by dynamic id, optionally centering the camera on its midpoint.
    /// Unknown ids are ignored.
    pub fn set_selected_edge(&mut self, id: Option<&str>, recenter: bool) {
        if !self.known_edge(id) {
            return;
        }
        self.selection.set_selected_edge(id.map(str::to_string));
        if !recenter {
            return;
        }
        if let Some(midpoint) = id.and_then(|id| self.edge_midpoint(id)) {
            let duration = self.reframe_duration();
            self.renderer.center_on(midpoint, duration);
        }
    }

    fn edge_midpoint(&self, key: &str) -> Option<Pos2> {
        let (source, target) = self.render.edge_endpoints(key)?;
        let a = self.render.node(source)?.location();
        let b = self.render.node(target)?.location();
        Some(a.lerp(b, 0.5))
    }

    pub fn set_focused_node(&mut self, id: Option<&str>) {
        if self.known_node(id) {
            self.selection.set_focused_node(id.map(str::to_string));
        }
    }

    pub fn set_focused_edge(&mut self, id: Option<&str>) {
        if self.known_edge(id) {
            self.selection.set_focused_edge(id.map(str::to_string));
        }
    }

    /// `None` clears a slot and is always accepted.
    fn known_node(&self, id: Option<&str>) -> bool {
        let known = id.is_none_or(|id| self.render.has_node(id));
        if !known {
            debug!(?id, "ignoring reference to unknown node");
        }
        known
    }

    fn known_edge(&self, key: Option<&str>) -> bool {
        let known = key.is_none_or(|key| self.render.has_edge(key));
        if !known {
            debug!(?key, "ignoring reference to unknown edge");
        }
        known
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Snapshot of the current inspection target.
    pub fn inspect(&self) -> Option<Inspection> {
        Inspection::resolve(&self.canonical, &self.render, &self.selection)
    }

    /// Moves selection to a neighbor of the inspected node and recenters on it.
    /// Returns false when `id` is not a neighbor of the inspected node.
    pub fn navigate_to_neighbor(&mut self, id: &str) -> bool {
        let is_neighbor = matches!(
            self.inspect(),
            Some(Inspection::Node(view)) if view.neighbors.iter().any(|n| n.id == id)
        );
        if !is_neighbor {
            return false;
        }

        self.set_focused_node(None);
        self.set_selected_node(Some(id), true);
        true
    }

    /// Feeds a pointer event through the interaction state machine and applies the
    /// resulting focus and selection changes.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<Event> {
        let mut surface = PointerSurface::new(&mut self.render);
        let events = self.interaction.handle(event, &mut surface, &self.renderer);

        for event in &events {
            self.apply_event(event);
            if let Some(sink) = &self.sink {
                sink.send(event.clone());
            }
        }
        events
    }

    fn apply_event(&mut self, event: &Event) {
        let known = match event {
            Event::NodeFocus(p) => self.known_node(p.id.as_deref()),
            Event::NodeSelect(p) => self.known_node(Some(&p.id)),
            Event::EdgeFocus(p) => self.known_edge(p.id.as_deref()),
            Event::EdgeSelect(p) => self.known_edge(Some(&p.id)),
            _ => true,
        };
        if !known {
            return;
        }

        match event {
            Event::NodeFocus(p) => self.selection.set_focused_node(p.id.clone()),
            Event::NodeSelect(p) => {
                self.selection.set_selected_node(Some(p.id.clone()));
                self.selection.set_selected_edge(None);
            }
            Event::EdgeFocus(p) => self.selection.set_focused_edge(p.id.clone()),
            Event::EdgeSelect(p) => {
                self.selection.set_selected_edge(Some(p.id.clone()));
                self.selection.set_selected_node(None);
            }
            Event::ClearSelection => {
                self.selection.set_selected_node(None);
                self.selection.set_selected_edge(None);
            }
            Event::NodeDragStart(_) | Event::NodeMove(_) | Event::NodeDragEnd(_) => {}
        }
    }
}

fn next_dynamic_id(counter: &mut u64) -> String {
    let id = format!("e{counter}");
    *counter += 1;
    id
}

fn scatter(rng: &mut impl Rng, extent: f32) -> Pos2 {
    if extent <= 0. {
        return Pos2::ZERO;
    }
    Pos2::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::json;

    use super::*;
    use crate::settings::SettingsLoad;

    fn engine() -> GraphSyncEngine {
        GraphSyncEngine::new(Settings::default().with_load(SettingsLoad {
            scatter_seed: Some(7),
            ..SettingsLoad::default()
        }))
    }

    fn triangle() -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
        (
            vec![NodeRecord::new("a"), NodeRecord::new("b"), NodeRecord::new("c")],
            vec![
                EdgeRecord::new("r0", "a", "b"),
                EdgeRecord::new("r1", "b", "c"),
                EdgeRecord::new("r2", "c", "a"),
            ],
        )
    }

    #[test]
    fn dynamic_ids_are_never_reused() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes.clone(), edges.clone()).unwrap();
        let first: Vec<String> = e.canonical().edges().iter().map(|r| r.dynamic_id.clone()).collect();
        e.load(nodes, edges).unwrap();
        for r in e.canonical().edges() {
            assert!(!first.contains(&r.dynamic_id));
        }
    }

    #[test]
    fn dangling_edges_and_duplicate_nodes_are_dropped() {
        let mut e = engine();
        e.load(
            vec![
                NodeRecord::new("a"),
                NodeRecord::new("a").with_property("description", json!("second")),
                NodeRecord::new("b"),
            ],
            vec![
                EdgeRecord::new("r0", "a", "b"),
                EdgeRecord::new("r1", "a", "ghost"),
            ],
        )
        .unwrap();

        assert_eq!(e.canonical().nodes().len(), 2);
        assert_eq!(e.canonical().edges().len(), 1);
        assert_eq!(e.render().node_count(), 2);
        assert_eq!(e.render().edge_count(), 1);
        assert!(e.canonical().lookup_node("a").unwrap().properties.get("description").is_none());
        assert!(e.canonical().indices_consistent());
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut e = engine();
        let stale = e.begin_load();
        let fresh = e.begin_load();
        assert!(e.is_busy());

        let (nodes, edges) = triangle();
        let outcome = e
            .finish_load(stale, Ok(GraphData::new(nodes.clone(), edges.clone())))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert!(e.is_empty());
        assert!(e.is_busy());

        let outcome = e
            .finish_load(fresh, Ok(GraphData::new(nodes, edges)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert!(!e.is_empty());
        assert!(!e.is_busy());
    }

    #[test]
    fn failed_load_clears_and_notifies_once() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();

        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        e.on_graph_replaced(move |r| seen.borrow_mut().push(r.clone()));

        let mut source =
            |_: &FetchContext| -> Result<GraphData, FetchError> { Err(FetchError::Unauthorized) };
        let err = e
            .load_from(&mut source, &FetchContext::new("default"))
            .unwrap_err();

        assert_eq!(err, SyncError::LoadFailure(FetchError::Unauthorized));
        assert!(e.is_empty());
        assert!(e.canonical().nodes().is_empty());
        assert!(e.render().is_empty());
        assert_eq!(calls.borrow().len(), 1);
        assert!(calls.borrow()[0].empty);
    }

    #[test]
    fn source_receives_context() {
        let mut e = engine();
        let mut source = |ctx: &FetchContext| -> Result<GraphData, FetchError> {
            assert_eq!(ctx.workspace, "books");
            assert_eq!(ctx.auth.as_ref().map(|a| a.token.as_str()), Some("t0k"));
            Ok(GraphData::new(vec![NodeRecord::new("a")], Vec::new()))
        };
        let outcome = e
            .load_from(&mut source, &FetchContext::new("books").with_auth("t0k"))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(e.render().node_count(), 1);
    }

    #[test]
    fn rename_into_existing_id_changes_nothing() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();
        let before_keys: Vec<String> = e.render().edges_iter().map(|(r, _, _)| r.key().to_string()).collect();
        let version = e.version();

        let err = e.update_node_property("a", ENTITY_ID, json!("b")).unwrap_err();
        assert_eq!(err.to_string(), "failed to update node a");

        assert!(e.render().has_node("a"));
        assert_eq!(e.render().node_count(), 3);
        let after_keys: Vec<String> = e.render().edges_iter().map(|(r, _, _)| r.key().to_string()).collect();
        assert_eq!(before_keys, after_keys);
        assert!(e.canonical().lookup_node("a").is_some());
        assert!(e.canonical().indices_consistent());
        assert_eq!(e.version(), version);
    }

    #[test]
    fn rename_carries_selection_and_self_loops() {
        let mut e = engine();
        e.load(
            vec![NodeRecord::new("a"), NodeRecord::new("b")],
            vec![EdgeRecord::new("r0", "a", "a"), EdgeRecord::new("r1", "b", "a")],
        )
        .unwrap();
        let loop_key = e.canonical().lookup_edge("r0").unwrap().dynamic_id.clone();
        e.set_focused_edge(Some(&loop_key));
        e.set_focused_node(Some("a"));

        e.update_node_property("a", ENTITY_ID, json!("z")).unwrap();

        assert_eq!(e.selection().focused_node(), Some("z"));
        assert_eq!(e.selection().selected_node(), Some("z"));
        let new_loop_key = e.canonical().lookup_edge("r0").unwrap().dynamic_id.clone();
        assert_ne!(new_loop_key, loop_key);
        assert_eq!(e.selection().focused_edge(), Some(new_loop_key.as_str()));
        assert_eq!(e.render().edge_endpoints(&new_loop_key), Some(("z", "z")));
        assert_eq!(e.render().degree("z"), 3);
        assert!(e.canonical().indices_consistent());
    }

    #[test]
    fn entity_id_differing_from_id_only_relabels() {
        let mut e = engine();
        e.load(
            vec![NodeRecord::new("a").with_property(ENTITY_ID, json!("Alice"))],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(e.render().node("a").unwrap().label(), "Alice");

        e.update_node_property("a", ENTITY_ID, json!("Alicia")).unwrap();
        assert!(e.render().has_node("a"));
        assert_eq!(e.render().node("a").unwrap().label(), "Alicia");
    }

    #[test]
    fn unknown_node_update_still_bumps_version() {
        let mut e = engine();
        let v = e.version();
        e.update_node_property("nope", "description", json!("x")).unwrap();
        assert_eq!(e.version(), v + 1);
    }

    #[test]
    fn edge_label_and_weight_updates_reach_render_edge() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();
        let key = e.canonical().lookup_edge("r0").unwrap().dynamic_id.clone();

        e.update_edge_property("r0", &key, "keywords", json!("friends")).unwrap();
        assert_eq!(e.render().edge(&key).unwrap().label(), "friends");
        assert_eq!(e.selection().selected_edge(), Some(key.as_str()));

        e.update_edge_property("r0", &key, WEIGHT, json!(2)).unwrap();
        assert_eq!(e.render().edge(&key).unwrap().size(), 4.);
        assert_eq!(e.canonical().lookup_edge("r0").unwrap().weight(), Some(2.));
    }

    #[test]
    fn mismatched_edge_ids_are_rejected() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();
        let key = e.canonical().lookup_edge("r0").unwrap().dynamic_id.clone();

        assert!(e.update_edge_property("r1", &key, "keywords", json!("x")).is_err());
        assert!(e.canonical().lookup_edge("r1").unwrap().properties.get("keywords").is_none());
    }

    #[test]
    fn colliding_edge_ids_update_the_addressed_record() {
        let mut e = engine();
        e.load(
            vec![NodeRecord::new("a"), NodeRecord::new("b")],
            vec![EdgeRecord::new("r", "a", "b"), EdgeRecord::new("r", "b", "a")],
        )
        .unwrap();
        let first = e.canonical().edges()[0].dynamic_id.clone();

        e.update_edge_property("r", &first, "keywords", json!("likes"))
            .unwrap();

        assert_eq!(e.render().edge(&first).unwrap().label(), "likes");
        let edges = e.canonical().edges();
        assert_eq!(edges[0].properties.get("keywords"), Some(&json!("likes")));
        assert!(edges[1].properties.get("keywords").is_none());
    }

    #[test]
    fn selection_ignores_unknown_ids() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();

        e.update_edge_property("r0", "bogus", "keywords", json!("x"))
            .unwrap();
        assert_eq!(e.selection().selected_edge(), None);

        e.set_selected_node(Some("a"), false);
        e.set_selected_node(Some("ghost"), false);
        assert_eq!(e.selection().selected_node(), Some("a"));

        e.set_selected_edge(Some("bogus"), true);
        e.set_focused_node(Some("ghost"));
        e.set_focused_edge(Some("bogus"));
        assert_eq!(e.selection().selected_edge(), None);
        assert_eq!(e.selection().focused_node(), None);
        assert_eq!(e.selection().focused_edge(), None);

        e.handle_pointer(PointerEvent::ClickEdge("bogus".into()));
        assert_eq!(e.selection().selected_node(), Some("a"));
        assert_eq!(e.selection().selected_edge(), None);

        e.set_selected_node(None, false);
        assert_eq!(e.selection().selected_node(), None);
    }

    #[test]
    fn pointer_clicks_move_selection_between_kinds() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();
        let key = e.canonical().lookup_edge("r0").unwrap().dynamic_id.clone();

        e.handle_pointer(PointerEvent::ClickEdge(key.clone()));
        assert_eq!(e.selection().selected_edge(), Some(key.as_str()));

        e.handle_pointer(PointerEvent::Down {
            node: "a".into(),
            pos: Pos2::ZERO,
        });
        e.handle_pointer(PointerEvent::Up(Pos2::ZERO));
        assert_eq!(e.selection().selected_node(), Some("a"));
        assert_eq!(e.selection().selected_edge(), None);

        e.handle_pointer(PointerEvent::ClickStage);
        assert_eq!(e.selection().selected_node(), None);
    }

    #[test]
    fn events_reach_the_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut e = engine().with_event_sink(tx);
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();

        e.handle_pointer(PointerEvent::EnterNode("b".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::NodeFocus(crate::events::PayloadNodeFocus {
                id: Some("b".into())
            })
        );
        assert_eq!(e.selection().focused_node(), Some("b"));
    }

    #[test]
    fn relayout_waits_for_gesture_end() {
        let mut e = engine();
        let (nodes, edges) = triangle();
        e.load(nodes, edges).unwrap();

        e.handle_pointer(PointerEvent::Down {
            node: "a".into(),
            pos: Pos2::ZERO,
        });
        assert!(e.relayout().is_none());

        e.handle_pointer(PointerEvent::Up(Pos2::ZERO));
        assert!(e.relayout().is_some());
    }

    #[test]
    fn navigation_follows_neighbors_only() {
        let mut e = engine();
        e.load(
            vec![NodeRecord::new("a"), NodeRecord::new("b"), NodeRecord::new("c")],
            vec![EdgeRecord::new("r0", "a", "b")],
        )
        .unwrap();
        e.set_selected_node(Some("a"), false);

        assert!(!e.navigate_to_neighbor("c"));
        assert!(e.navigate_to_neighbor("b"));
        assert_eq!(e.selection().selected_node(), Some("b"));
    }
}
