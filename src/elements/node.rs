use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use super::DEFAULT_NODE_COLOR;

/// Visual attributes of a node in the [`crate::RenderGraph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    id: String,
    label: String,
    location: Pos2,
    size: f32,
    color: Color32,
    community: Option<usize>,
    highlighted: bool,
}

impl RenderNode {
    pub fn new(id: impl Into<String>, location: Pos2) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            location,
            size: 4.,
            color: DEFAULT_NODE_COLOR,
            community: None,
            highlighted: false,
        }
    }

    /// Copies every attribute except identity, which moves to `id` and becomes the label.
    pub(crate) fn renamed(&self, id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            highlighted: false,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn location(&self) -> Pos2 {
        self.location
    }

    pub fn set_location(&mut self, location: Pos2) {
        self.location = location;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn community(&self) -> Option<usize> {
        self.community
    }

    pub fn set_community(&mut self, community: Option<usize>) {
        self.community = community;
    }

    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }
}
