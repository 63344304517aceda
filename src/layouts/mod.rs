pub mod community;
pub mod force_directed;
pub mod sizing;

mod layout;

pub use community::{assign_community_colors, CommunityDetector, Louvain};
pub use force_directed::{ForceAlgorithm, ForceAtlas2, ForceAtlas2State, ForceDirected};
pub use layout::{LayoutPipeline, LayoutReport, Placement};
pub use sizing::{node_size, size_by_degree};
