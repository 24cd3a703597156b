use crate::types::{PaymentRecord, User};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// ---------------------------------------------------------------------------
/// Payment network
/// ---------------------------------------------------------------------------

/// Undirected "has paid each other" graph built from the payment history.
///
/// Built once during the batch stage and only read afterwards. There is no
/// eviction: the whole adjacency stays resident for the run.
#[derive(Debug, Clone, Default)]
pub struct PaymentNetwork {
    graph: UnGraph<User, ()>,
    node_map: HashMap<User, NodeIndex>,
}

impl PaymentNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_add_node(&mut self, user: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(user) {
            return idx;
        }
        let idx = self.graph.add_node(user.to_owned());
        self.node_map.insert(user.to_owned(), idx);
        idx
    }

    /// Connects two users. Self-payments are ignored and repeated pairs
    /// do not create parallel edges.
    pub fn add_edge(&mut self, user_a: &str, user_b: &str) {
        if user_a == user_b {
            return;
        }
        let a_idx = self.get_or_add_node(user_a);
        let b_idx = self.get_or_add_node(user_b);
        // find_edge is direction-agnostic on an undirected graph
        self.graph.update_edge(a_idx, b_idx, ());
    }

    pub fn contains(&self, user: &str) -> bool {
        self.node_map.contains_key(user)
    }

    pub fn neighbors<'a>(&'a self, user: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.node_map
            .get(user)
            .copied()
            .into_iter()
            .flat_map(move |idx| self.graph.neighbors(idx).map(move |n| self.graph[n].as_str()))
    }

    pub fn user_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    // --------------------------------------------------------------------
    // Index-level access for traversals
    // --------------------------------------------------------------------
    pub(crate) fn index_of(&self, user: &str) -> Option<NodeIndex> {
        self.node_map.get(user).copied()
    }

    pub(crate) fn neighbor_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub(crate) fn user_at(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }
}

/// ---------------------------------------------------------------------------
/// Construction feed
/// ---------------------------------------------------------------------------

/// Accumulates historical records into a [`PaymentNetwork`] and tracks the
/// largest amount seen, which later becomes the per-payment ceiling.
#[derive(Debug, Default)]
pub struct NetworkFeed {
    network: PaymentNetwork,
    max_amount: f64,
    records_seen: usize,
}

impl NetworkFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &PaymentRecord) {
        self.network.add_edge(&record.payer, &record.payee);
        if record.amount > self.max_amount {
            self.max_amount = record.amount;
        }
        self.records_seen += 1;
    }

    pub fn network(&self) -> &PaymentNetwork {
        &self.network
    }

    pub fn max_amount(&self) -> f64 {
        self.max_amount
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    pub fn finish(self) -> (PaymentNetwork, f64) {
        (self.network, self.max_amount)
    }
}
