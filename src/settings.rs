use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::{elements::DEFAULT_NODE_COLOR, layouts::ForceAtlas2State};

/// Size-by-degree parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSizing {
    pub base: f32,
    /// Multiplier of `log2(1 + degree)`
    pub gain: f32,
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for SettingsSizing {
    fn default() -> Self {
        Self {
            base: 5.,
            gain: 4.,
            min_size: 1.,
            max_size: 40.,
        }
    }
}

/// Edge size derived from the `weight` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsEdges {
    pub base: f32,
    pub slope: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Weight assumed when an edge has no numeric `weight`
    pub default_weight: f32,
}

impl Default for SettingsEdges {
    fn default() -> Self {
        Self {
            base: 1.,
            slope: 1.5,
            min_size: 1.,
            max_size: 5.,
            default_weight: 1.,
        }
    }
}

impl SettingsEdges {
    pub fn edge_size(&self, weight: Option<f32>) -> f32 {
        let w = weight.unwrap_or(self.default_weight);
        (self.base + w * self.slope)
            .max(self.min_size)
            .min(self.max_size.max(self.min_size))
    }
}

/// Which properties feed the displayed labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLabels {
    pub node_label_property: String,
    pub edge_label_property: String,
}

impl Default for SettingsLabels {
    fn default() -> Self {
        Self {
            node_label_property: crate::records::ENTITY_ID.to_string(),
            edge_label_property: "keywords".to_string(),
        }
    }
}

/// Initial render attributes assigned on load, before the layout pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLoad {
    /// Half side of the square nodes without a position are scattered in
    pub scatter_extent: f32,
    /// Fixed seed for reproducible scatter. Random when `None`.
    pub scatter_seed: Option<u64>,
    pub initial_node_size: f32,
    pub initial_node_color: Color32,
}

impl Default for SettingsLoad {
    fn default() -> Self {
        Self {
            scatter_extent: 100.,
            scatter_seed: None,
            initial_node_size: 4.,
            initial_node_color: DEFAULT_NODE_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsInteraction {
    /// Node dragging. Clicks still select when disabled.
    pub drag_enabled: bool,
}

impl Default for SettingsInteraction {
    fn default() -> Self {
        Self { drag_enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsCamera {
    /// Duration of the reframe animation after layout and of recenter moves
    pub animation_ms: u64,
    /// Padding around the graph when fitting to the viewport
    pub screen_padding: f32,
}

impl Default for SettingsCamera {
    fn default() -> Self {
        Self {
            animation_ms: 300,
            screen_padding: 0.3,
        }
    }
}

/// Engine configuration. Every section is optional in serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sizing: SettingsSizing,
    pub edges: SettingsEdges,
    pub labels: SettingsLabels,
    pub load: SettingsLoad,
    pub interaction: SettingsInteraction,
    pub camera: SettingsCamera,
    pub force: ForceAtlas2State,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_sizing(mut self, sizing: SettingsSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_edges(mut self, edges: SettingsEdges) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_labels(mut self, labels: SettingsLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_load(mut self, load: SettingsLoad) -> Self {
        self.load = load;
        self
    }

    pub fn with_interactions(mut self, interaction: SettingsInteraction) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_camera(mut self, camera: SettingsCamera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_force(mut self, force: ForceAtlas2State) -> Self {
        self.force = force;
        self
    }
}
