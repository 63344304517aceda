mod camera;
mod canonical;
mod elements;
mod engine;
mod error;
mod graph;
mod inspect;
mod interaction;
mod records;
mod selection;
mod settings;

pub mod events;
pub mod layouts;

pub use self::camera::{Camera, Renderer};
pub use self::canonical::CanonicalGraph;
pub use self::elements::{community_color, RenderEdge, RenderNode, DEFAULT_NODE_COLOR};
pub use self::engine::{
    AuthContext, FetchContext, GraphReplaced, GraphSource, GraphSyncEngine, LoadOutcome,
    LoadTicket,
};
pub use self::error::{FetchError, RenderGraphError, SyncError};
pub use self::graph::{IncidentEdge, RenderGraph};
pub use self::inspect::{
    EdgeInspection, EndpointRef, Inspection, NeighborDirection, NeighborRef, NodeInspection,
};
pub use self::interaction::{
    InteractionController, InteractionState, PointerEvent, PointerSurface, DRAG_EPSILON,
};
pub use self::records::{EdgeRecord, GraphData, NodeRecord, Properties, ENTITY_ID, WEIGHT};
pub use self::selection::{InspectionTarget, SelectionState};
pub use self::settings::{
    Settings, SettingsCamera, SettingsEdges, SettingsInteraction, SettingsLabels, SettingsLoad,
    SettingsSizing,
};
