mod color;
mod edge;
mod node;

pub use self::color::{community_color, DEFAULT_NODE_COLOR};
pub use self::edge::RenderEdge;
pub use self::node::RenderNode;
