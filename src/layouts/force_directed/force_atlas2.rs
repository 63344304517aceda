use std::collections::HashMap;

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use super::algorithm::ForceAlgorithm;
use crate::RenderGraph;

/// Parameters of [`ForceAtlas2`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceAtlas2State {
    /// Steps per placement run
    pub iterations: u32,
    /// Strength of the pairwise repulsion
    pub scaling_ratio: f32,
    /// Pull toward the origin
    pub gravity: f32,
    /// Gravity grows with the distance to the origin instead of being constant
    pub strong_gravity: bool,
    /// Fraction of the accumulated force applied per step
    pub speed: f32,
    /// Upper bound of a single node displacement per step
    pub max_step: f32,
    pub epsilon: f32,
}

impl Default for ForceAtlas2State {
    fn default() -> Self {
        Self {
            iterations: 150,
            scaling_ratio: 100.,
            gravity: 1.,
            strong_gravity: false,
            speed: 0.1,
            max_step: 10.,
            epsilon: 1e-3,
        }
    }
}

/// Degree-weighted repulsion, linear attraction along edges and gravity toward the origin.
#[derive(Debug, Default)]
pub struct ForceAtlas2 {
    state: ForceAtlas2State,
    // Reusable displacement buffer to avoid per-step allocations
    scratch_disp: Vec<Vec2>,
}

impl ForceAlgorithm for ForceAtlas2 {
    type State = ForceAtlas2State;

    fn from_state(state: Self::State) -> Self {
        Self {
            state,
            scratch_disp: Vec::new(),
        }
    }

    fn iterations(&self) -> u32 {
        self.state.iterations
    }

    fn step(&mut self, g: &mut RenderGraph) {
        if g.node_count() == 0 {
            return;
        }

        let (locations, masses, edges) = snapshot(g);

        // Ensure scratch buffer is sized and zeroed
        if self.scratch_disp.len() == locations.len() {
            self.scratch_disp.fill(Vec2::ZERO);
        } else {
            self.scratch_disp.clear();
            self.scratch_disp.resize(locations.len(), Vec2::ZERO);
        }

        let params = &self.state;
        compute_repulsion(
            &locations,
            &masses,
            &mut self.scratch_disp,
            params.scaling_ratio,
            params.epsilon,
        );
        compute_attraction(&locations, &edges, &mut self.scratch_disp);
        compute_gravity(
            &locations,
            &masses,
            &mut self.scratch_disp,
            params.gravity,
            params.strong_gravity,
            params.epsilon,
        );
        apply_displacements(g, &masses, &self.scratch_disp, params.speed, params.max_step);
    }

    fn state(&self) -> Self::State {
        self.state.clone()
    }
}

/// Node locations and masses in iteration order plus edges as position pairs.
fn snapshot(g: &RenderGraph) -> (Vec<Pos2>, Vec<f32>, Vec<(usize, usize)>) {
    let position: HashMap<&str, usize> = g
        .nodes_iter()
        .enumerate()
        .map(|(i, n)| (n.id(), i))
        .collect();
    let locations: Vec<Pos2> = g.nodes_iter().map(crate::RenderNode::location).collect();

    let mut masses = vec![1.; locations.len()];
    let mut edges = Vec::with_capacity(g.edge_count());
    for (_, source, target) in g.edges_iter() {
        let (Some(&s), Some(&t)) = (position.get(source), position.get(target)) else {
            continue;
        };
        masses[s] += 1.;
        masses[t] += 1.;
        if s != t {
            edges.push((s, t));
        }
    }

    (locations, masses, edges)
}

pub(crate) fn compute_repulsion(
    locations: &[Pos2],
    masses: &[f32],
    disp: &mut [Vec2],
    scaling_ratio: f32,
    epsilon: f32,
) {
    for i in 0..locations.len() {
        for j in (i + 1)..locations.len() {
            let delta = locations[i] - locations[j];
            let length = delta.length();
            // coincident nodes get pushed apart along a fixed per-pair direction
            let dir = if length < epsilon {
                Vec2::angled((i * 31 + j) as f32)
            } else {
                delta / length
            };
            let force = scaling_ratio * masses[i] * masses[j] / length.max(epsilon);
            disp[i] += dir * force;
            disp[j] -= dir * force;
        }
    }
}

pub(crate) fn compute_attraction(locations: &[Pos2], edges: &[(usize, usize)], disp: &mut [Vec2]) {
    for &(s, t) in edges {
        let delta = locations[t] - locations[s];
        disp[s] += delta;
        disp[t] -= delta;
    }
}

pub(crate) fn compute_gravity(
    locations: &[Pos2],
    masses: &[f32],
    disp: &mut [Vec2],
    gravity: f32,
    strong: bool,
    epsilon: f32,
) {
    if gravity == 0. {
        return;
    }
    for (i, loc) in locations.iter().enumerate() {
        let to_origin = -loc.to_vec2();
        let distance = to_origin.length();
        if distance < epsilon {
            continue;
        }
        let force = if strong {
            gravity * masses[i] * distance
        } else {
            gravity * masses[i]
        };
        disp[i] += to_origin / distance * force;
    }
}

pub(crate) fn apply_displacements(
    g: &mut RenderGraph,
    masses: &[f32],
    disp: &[Vec2],
    speed: f32,
    max_step: f32,
) {
    for (i, node) in g.nodes_iter_mut().enumerate() {
        let mut step = disp[i] * speed / masses[i];
        if step.length() > max_step {
            step = step.normalized() * max_step;
        }
        let new_loc = node.location() + step;
        if !new_loc.x.is_finite() || !new_loc.y.is_finite() {
            continue;
        }
        node.set_location(new_loc);
    }
}
