use std::collections::{BTreeMap, HashMap};

use crate::{elements::community_color, RenderGraph};

/// Partitions nodes into communities. Community ids only need to be stable within one call.
pub trait CommunityDetector {
    fn detect(&self, g: &RenderGraph) -> HashMap<String, usize>;
}

const MAX_LEVELS: usize = 16;
const MAX_PASSES: usize = 64;
const MIN_GAIN: f64 = 1e-12;

/// Louvain modularity optimization: local moving followed by aggregation, repeated while
/// nodes keep moving. Edge direction and multiplicity are folded into undirected weights.
#[derive(Debug, Clone, Default)]
pub struct Louvain;

impl CommunityDetector for Louvain {
    fn detect(&self, g: &RenderGraph) -> HashMap<String, usize> {
        let ids: Vec<&str> = g.nodes_iter().map(crate::RenderNode::id).collect();
        if ids.is_empty() {
            return HashMap::new();
        }

        let position: HashMap<&str, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut adj: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); ids.len()];
        for (_, source, target) in g.edges_iter() {
            let (Some(&s), Some(&t)) = (position.get(source), position.get(target)) else {
                continue;
            };
            if s == t {
                continue;
            }
            *adj[s].entry(t).or_default() += 1.;
            *adj[t].entry(s).or_default() += 1.;
        }

        let membership = louvain(adj);

        ids.into_iter()
            .zip(membership)
            .map(|(id, c)| (id.to_string(), c))
            .collect()
    }
}

/// Returns a community per node, numbered in first-seen order.
fn louvain(mut adj: Vec<BTreeMap<usize, f64>>) -> Vec<usize> {
    let mut membership: Vec<usize> = (0..adj.len()).collect();

    for _ in 0..MAX_LEVELS {
        let (moved, level_comm) = local_moving(&adj);
        if !moved {
            break;
        }

        let level_comm = renumber(&level_comm);
        for m in &mut membership {
            *m = level_comm[*m];
        }
        adj = aggregate(&adj, &level_comm);
    }

    renumber(&membership)
}

/// One level of node moves. `adj[i][i]` holds internal weight of aggregated nodes.
fn local_moving(adj: &[BTreeMap<usize, f64>]) -> (bool, Vec<usize>) {
    let n = adj.len();
    let mut comm: Vec<usize> = (0..n).collect();

    let k: Vec<f64> = adj.iter().map(|row| row.values().sum()).collect();
    let m2: f64 = k.iter().sum();
    if m2 == 0. {
        return (false, comm);
    }

    let mut tot = k.clone();
    let mut moved_any = false;

    for _ in 0..MAX_PASSES {
        let mut moved = false;

        for i in 0..n {
            let current = comm[i];

            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for (&j, &w) in &adj[i] {
                if j != i {
                    *links.entry(comm[j]).or_default() += w;
                }
            }

            tot[current] -= k[i];

            let gain = |c: usize, w: f64| w - tot[c] * k[i] / m2;
            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.));
            for (&c, &w) in &links {
                let g = gain(c, w);
                if g > best_gain + MIN_GAIN {
                    best = c;
                    best_gain = g;
                }
            }

            tot[best] += k[i];
            if best != current {
                comm[i] = best;
                moved = true;
                moved_any = true;
            }
        }

        if !moved {
            break;
        }
    }

    (moved_any, comm)
}

fn aggregate(adj: &[BTreeMap<usize, f64>], comm: &[usize]) -> Vec<BTreeMap<usize, f64>> {
    let size = comm.iter().max().map_or(0, |m| m + 1);
    let mut next = vec![BTreeMap::new(); size];
    for (i, row) in adj.iter().enumerate() {
        for (&j, &w) in row {
            *next[comm[i]].entry(comm[j]).or_default() += w;
        }
    }
    next
}

fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|l| {
            let next = seen.len();
            *seen.entry(*l).or_insert(next)
        })
        .collect()
}

/// Colors nodes by community. Distinct communities are numbered in first-seen node order
/// and the `i`-th one gets [`community_color`]`(i)`. Nodes absent from `communities` keep
/// their color.
pub fn assign_community_colors(g: &mut RenderGraph, communities: &HashMap<String, usize>) -> usize {
    let mut index_of: HashMap<usize, usize> = HashMap::new();
    for node in g.nodes_iter_mut() {
        let Some(&c) = communities.get(node.id()) else {
            continue;
        };
        let next = index_of.len();
        let i = *index_of.entry(c).or_insert(next);
        node.set_community(Some(i));
        node.set_color(community_color(i));
    }
    index_of.len()
}
