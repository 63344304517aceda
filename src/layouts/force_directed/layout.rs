use tracing::debug;

use super::algorithm::ForceAlgorithm;
use crate::{layouts::Placement, RenderGraph};

/// Runs a [`ForceAlgorithm`] for its fixed iteration budget.
#[derive(Debug, Default)]
pub struct ForceDirected<A: ForceAlgorithm> {
    alg: A,
}

impl<A: ForceAlgorithm> ForceDirected<A> {
    pub fn from_state(state: A::State) -> Self {
        Self {
            alg: A::from_state(state),
        }
    }

    pub fn state(&self) -> A::State {
        self.alg.state()
    }
}

impl<A: ForceAlgorithm> Placement for ForceDirected<A> {
    fn place(&mut self, g: &mut RenderGraph) {
        if g.node_count() == 0 {
            return;
        }

        let iterations = self.alg.iterations();
        for _ in 0..iterations {
            self.alg.step(g);
        }

        debug!(iterations, nodes = g.node_count(), "force-directed placement done");
    }
}
