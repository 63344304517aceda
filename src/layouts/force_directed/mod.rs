mod algorithm;
mod force_atlas2;
mod layout;

pub use algorithm::ForceAlgorithm;
pub use force_atlas2::{ForceAtlas2, ForceAtlas2State};
pub use layout::ForceDirected;
