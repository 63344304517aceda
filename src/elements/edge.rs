use serde::{Deserialize, Serialize};

/// Visual attributes of an edge in the [`crate::RenderGraph`].
///
/// `key` is the dynamic id of the edge, `canonical_id` the backend id it renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderEdge {
    key: String,
    canonical_id: String,
    label: String,
    size: f32,
}

impl RenderEdge {
    pub fn new(key: impl Into<String>, canonical_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            canonical_id: canonical_id.into(),
            label: String::default(),
            size: 1.,
        }
    }

    /// Same attributes under a different key.
    pub(crate) fn rekeyed(&self, key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..self.clone()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }
}
