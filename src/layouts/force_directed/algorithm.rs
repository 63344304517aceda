use crate::RenderGraph;

/// A pluggable force-directed algorithm decoupled from the pipeline that drives it.
///
/// The algorithm advances the layout of a [`RenderGraph`] by one step.
pub trait ForceAlgorithm: Default {
    type State: Clone + std::fmt::Debug;

    /// Construct from a state value (typically taken from settings).
    fn from_state(state: Self::State) -> Self;

    /// Number of steps one placement run performs.
    fn iterations(&self) -> u32;

    /// Advance the simulation by one step.
    fn step(&mut self, g: &mut RenderGraph);

    /// Return current state.
    fn state(&self) -> Self::State;
}
