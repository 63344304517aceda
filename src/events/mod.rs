mod event;
mod sink;

pub use event::{
    Event, PayloadEdgeFocus, PayloadEdgeSelect, PayloadNodeDragEnd, PayloadNodeDragStart,
    PayloadNodeFocus, PayloadNodeMove, PayloadNodeSelect,
};

pub use sink::EventSink;
