use crate::{settings::SettingsSizing, RenderGraph};

/// Size of a node with the given degree.
///
/// Isolated nodes sit on the `min_size` floor. Connected nodes grow with `log2(1 + degree)`
/// so hubs are compressed, clamped to `[min_size, max_size]`.
pub fn node_size(degree: usize, s: &SettingsSizing) -> f32 {
    let max = s.max_size.max(s.min_size);
    if degree == 0 {
        return s.min_size.clamp(0., max);
    }
    let size = s.base + s.gain * (1. + degree as f32).log2();
    size.clamp(s.min_size, max)
}

/// Writes [`node_size`] into every node. Returns the largest size assigned.
pub fn size_by_degree(g: &mut RenderGraph, s: &SettingsSizing) -> f32 {
    let sizes: Vec<f32> = g
        .nodes_iter()
        .map(|n| node_size(g.degree(n.id()), s))
        .collect();

    let mut largest = 0.;
    for (node, size) in g.nodes_iter_mut().zip(sizes) {
        node.set_size(size);
        largest = f32::max(largest, size);
    }
    largest
}

#[cfg(test)]
mod tests {
    use egui::Pos2;
    use proptest::prelude::*;

    use super::*;
    use crate::{RenderEdge, RenderNode};

    #[test]
    fn isolated_node_gets_floor() {
        assert_eq!(node_size(0, &SettingsSizing::default()), 1.);
    }

    #[test]
    fn logarithmic_growth() {
        let s = SettingsSizing::default();
        assert_eq!(node_size(1, &s), 9.);
        assert_eq!(node_size(3, &s), 13.);
        assert_eq!(node_size(1_000_000, &s), 40.);
    }

    #[test]
    fn sizing_twice_is_idempotent() {
        let mut g = RenderGraph::default();
        for id in ["a", "b", "c"] {
            g.add_node(RenderNode::new(id, Pos2::ZERO)).unwrap();
        }
        g.add_edge("a", "b", RenderEdge::new("e0", "r0")).unwrap();
        g.add_edge("a", "c", RenderEdge::new("e1", "r1")).unwrap();

        let s = SettingsSizing::default();
        size_by_degree(&mut g, &s);
        let first: Vec<f32> = g.nodes_iter().map(RenderNode::size).collect();
        size_by_degree(&mut g, &s);
        let second: Vec<f32> = g.nodes_iter().map(RenderNode::size).collect();

        assert_eq!(first, second);
        assert!(g.node("a").unwrap().size() > g.node("b").unwrap().size());
    }

    proptest! {
        #[test]
        fn size_stays_within_bounds(degree in 0usize..100_000) {
            let s = SettingsSizing::default();
            let size = node_size(degree, &s);
            prop_assert!(size >= 0.);
            prop_assert!(size <= s.max_size);
        }

        #[test]
        fn size_is_monotonic_in_degree(a in 0usize..10_000, b in 0usize..10_000) {
            let s = SettingsSizing::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(node_size(lo, &s) <= node_size(hi, &s));
        }
    }
}
