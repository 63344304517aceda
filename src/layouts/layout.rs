use std::time::Duration;

use egui::Rect;
use tracing::debug;

use super::{
    community::{assign_community_colors, CommunityDetector, Louvain},
    force_directed::{ForceAtlas2, ForceDirected},
    sizing::size_by_degree,
};
use crate::{camera::Renderer, settings::SettingsSizing, RenderGraph, Settings};

/// Computes node positions over the whole graph.
pub trait Placement {
    fn place(&mut self, g: &mut RenderGraph);
}

/// What a pipeline run produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutReport {
    pub communities: usize,
    pub largest_size: f32,
    /// Node bounds the camera was framed on
    pub bounds: Rect,
}

/// Community coloring, size by degree, placement and camera framing, in that order.
///
/// Always runs over the full graph. Every stage is skipped on an empty graph.
#[derive(Debug)]
pub struct LayoutPipeline<C = Louvain, P = ForceDirected<ForceAtlas2>> {
    detector: C,
    placement: P,
    sizing: SettingsSizing,
    reframe_duration: Duration,
}

impl LayoutPipeline {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Louvain,
            ForceDirected::from_state(settings.force.clone()),
            settings.sizing.clone(),
            Duration::from_millis(settings.camera.animation_ms),
        )
    }
}

impl<C: CommunityDetector, P: Placement> LayoutPipeline<C, P> {
    pub fn new(
        detector: C,
        placement: P,
        sizing: SettingsSizing,
        reframe_duration: Duration,
    ) -> Self {
        Self {
            detector,
            placement,
            sizing,
            reframe_duration,
        }
    }

    pub fn placement(&self) -> &P {
        &self.placement
    }

    pub fn placement_mut(&mut self) -> &mut P {
        &mut self.placement
    }

    pub fn set_sizing(&mut self, sizing: SettingsSizing) {
        self.sizing = sizing;
    }

    pub fn set_reframe_duration(&mut self, duration: Duration) {
        self.reframe_duration = duration;
    }

    /// Returns `None` when the graph is empty and nothing ran.
    pub fn run<R: Renderer + ?Sized>(
        &mut self,
        g: &mut RenderGraph,
        renderer: &mut R,
    ) -> Option<LayoutReport> {
        if g.is_empty() {
            return None;
        }

        let membership = self.detector.detect(g);
        let communities = assign_community_colors(g, &membership);

        let largest_size = size_by_degree(g, &self.sizing);

        self.placement.place(g);

        // bounds only exist once placement has finished
        let bounds = g.bounds()?;
        renderer.clear_viewport_override();
        renderer.reset_camera(bounds, self.reframe_duration);

        debug!(
            nodes = g.node_count(),
            edges = g.edge_count(),
            communities,
            "layout pipeline finished"
        );

        Some(LayoutReport {
            communities,
            largest_size,
            bounds,
        })
    }
}
