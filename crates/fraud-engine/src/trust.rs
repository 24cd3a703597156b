//! Bounded-depth trust lookups over the [`PaymentNetwork`].
//!
//! Two users trust each other when the payee is within [`MAX_TRUST_DEPTH`]
//! hops of the payer. Traversal is a plain breadth-first search where a
//! node at the depth limit is reported but never expanded.

use crate::payment_network::PaymentNetwork;
use crate::types::User;
use petgraph::graph::NodeIndex;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

/// Largest degree of separation that still counts as trusted.
pub const MAX_TRUST_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct TrustResolver<'a> {
    network: &'a PaymentNetwork,
}

impl<'a> TrustResolver<'a> {
    pub fn new(network: &'a PaymentNetwork) -> Self {
        Self { network }
    }

    /// Every user reachable from `origin` in at most `max_depth` hops, keyed
    /// to its shortest hop count. `origin` is always present at depth 0,
    /// even when it never appeared in the history.
    pub fn reachable_within(&self, origin: &str, max_depth: u32) -> HashMap<User, u32> {
        let Some(start) = self.network.index_of(origin) else {
            return HashMap::from([(origin.to_owned(), 0)]);
        };

        self.bfs(start, max_depth, None)
            .into_iter()
            .map(|(idx, depth)| (self.network.user_at(idx).to_owned(), depth))
            .collect()
    }

    /// Hop count from `payer` to `payee`, if it is within [`MAX_TRUST_DEPTH`].
    pub fn degree_between(&self, payer: &str, payee: &str) -> Option<u32> {
        if payer == payee {
            return Some(0);
        }
        let start = self.network.index_of(payer)?;
        let target = self.network.index_of(payee)?;

        self.bfs(start, MAX_TRUST_DEPTH, Some(target))
            .get(&target)
            .copied()
    }

    pub fn is_trusted(&self, payer: &str, payee: &str) -> bool {
        self.degree_between(payer, payee).is_some()
    }

    /// Depth-limited BFS. Stops early once `target` has been assigned a depth.
    fn bfs(&self, start: NodeIndex, max_depth: u32, target: Option<NodeIndex>) -> HashMap<NodeIndex, u32> {
        let mut depths = HashMap::from([(start, 0u32)]);
        let mut queue = VecDeque::from([(start, 0u32)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for next in self.network.neighbor_indices(node) {
                if let Entry::Vacant(slot) = depths.entry(next) {
                    slot.insert(depth + 1);
                    if Some(next) == target {
                        return depths;
                    }
                    queue.push_back((next, depth + 1));
                }
            }
        }

        depths
    }
}
