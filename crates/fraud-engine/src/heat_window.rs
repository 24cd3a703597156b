use crate::types::User;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace};

/// ---------------------------------------------------------------------------
/// Thresholds
/// ---------------------------------------------------------------------------

/// Width of the sliding heat window, in seconds of event time.
pub const HEAT_WINDOW_SECS: i64 = 60;
/// Events this far (or further) behind the horizon are expired (two days).
pub const EXPIRY_AGE_SECS: i64 = 172_800;
/// A user with more distinct counterparties than this in the window is bursting.
pub const FAN_OUT_THRESHOLD: usize = 10;
/// A pair with more co-payments than this in the window is bursting.
pub const PAIR_COUNT_THRESHOLD: u32 = 10;

/// ---------------------------------------------------------------------------
/// Public Types
/// ---------------------------------------------------------------------------

/// Where an observed event landed relative to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// At or past the horizon; may advance it and trigger eviction.
    InOrder,
    /// Behind the horizon but inside the window; recorded, no eviction.
    RecentOutOfOrder,
    /// Behind the window but not expired; active, not recorded.
    StaleOutOfOrder,
    /// Two days or more behind the horizon; nothing is touched.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub active: bool,
    pub placement: Placement,
}

impl From<Placement> for Observation {
    fn from(placement: Placement) -> Self {
        Self {
            active: placement != Placement::Expired,
            placement,
        }
    }
}

/// ---------------------------------------------------------------------------
/// Heat Window
/// ---------------------------------------------------------------------------

/// Rolling 60-second co-payment graph.
///
/// "Now" is the horizon: the largest event timestamp observed so far. Each
/// timestamp inside the window owns a bucket of the pairs that arrived at
/// it, and every recorded pair holds one unit of weight on the undirected
/// edge between its users until its bucket is evicted.
#[derive(Debug, Clone, Default)]
pub struct HeatWindow {
    graph: StableUnGraph<User, u32>, // edge = co-payment count
    node_map: HashMap<User, NodeIndex>,

    per_timestamp_pairs: HashMap<i64, Vec<(User, User)>>,
    timestamp_queue: VecDeque<i64>, // ascending, distinct

    horizon: Option<i64>,
}

impl HeatWindow {
    pub fn new() -> Self {
        Self::default()
    }

    // --------------------------------------------------------------------
    // Node helpers
    // --------------------------------------------------------------------
    fn get_or_add_node(&mut self, user: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(user) {
            return idx;
        }
        let idx = self.graph.add_node(user.to_owned());
        self.node_map.insert(user.to_owned(), idx);
        idx
    }

    fn remove_if_isolated(&mut self, idx: NodeIndex) {
        if self.graph.neighbors(idx).next().is_some() {
            return;
        }
        if let Some(user) = self.graph.remove_node(idx) {
            self.node_map.remove(&user);
        }
    }

    // --------------------------------------------------------------------
    // OBSERVE: one call per stream event, in arrival order
    // --------------------------------------------------------------------
    /// Folds one payment into the window and reports whether it is active.
    ///
    /// Expired events leave every structure untouched, horizon included.
    /// Stale out-of-order events are active but invisible to the heat graph.
    pub fn observe(&mut self, timestamp: i64, payer: &str, payee: &str) -> Observation {
        let placement = self.place(timestamp);

        match placement {
            Placement::InOrder => self.insert_in_order(timestamp, payer, payee),
            Placement::RecentOutOfOrder => self.insert_out_of_order(timestamp, payer, payee),
            Placement::StaleOutOfOrder => {
                trace!(target: "fraud::heat", timestamp, "stale out-of-order payment not recorded");
            }
            Placement::Expired => {
                debug!(target: "fraud::heat", timestamp, horizon = ?self.horizon, "expired payment");
            }
        }

        Observation::from(placement)
    }

    fn place(&self, timestamp: i64) -> Placement {
        let Some(horizon) = self.horizon else {
            return Placement::InOrder;
        };

        let age = horizon.saturating_sub(timestamp);
        if age >= EXPIRY_AGE_SECS {
            Placement::Expired
        } else if age <= 0 {
            Placement::InOrder
        } else if age <= HEAT_WINDOW_SECS {
            Placement::RecentOutOfOrder
        } else {
            Placement::StaleOutOfOrder
        }
    }

    fn insert_in_order(&mut self, timestamp: i64, payer: &str, payee: &str) {
        // An equal timestamp already owns the newest bucket
        if self.horizon != Some(timestamp) {
            self.timestamp_queue.push_back(timestamp);
            self.horizon = Some(timestamp);
        }

        self.record_pair(timestamp, payer, payee);
        self.prune(timestamp);
    }

    fn insert_out_of_order(&mut self, timestamp: i64, payer: &str, payee: &str) {
        if let Err(pos) = self.timestamp_queue.binary_search(&timestamp) {
            self.timestamp_queue.insert(pos, timestamp);
        }

        self.record_pair(timestamp, payer, payee);
    }

    fn record_pair(&mut self, timestamp: i64, payer: &str, payee: &str) {
        self.per_timestamp_pairs
            .entry(timestamp)
            .or_default()
            .push((payer.to_owned(), payee.to_owned()));
        self.increment_edge(payer, payee);
    }

    // --------------------------------------------------------------------
    // EDGE COUNTS
    // --------------------------------------------------------------------
    fn increment_edge(&mut self, payer: &str, payee: &str) {
        if payer == payee {
            return;
        }
        let a_idx = self.get_or_add_node(payer);
        let b_idx = self.get_or_add_node(payee);

        match self.graph.find_edge(a_idx, b_idx) {
            Some(eidx) => {
                if let Some(count) = self.graph.edge_weight_mut(eidx) {
                    *count += 1;
                }
            }
            None => {
                self.graph.add_edge(a_idx, b_idx, 1);
            }
        }
    }

    fn decrement_edge(&mut self, payer: &str, payee: &str) {
        if payer == payee {
            return;
        }
        let (Some(&a_idx), Some(&b_idx)) = (self.node_map.get(payer), self.node_map.get(payee)) else {
            return;
        };
        let Some(eidx) = self.graph.find_edge(a_idx, b_idx) else {
            return;
        };

        let remaining = match self.graph.edge_weight_mut(eidx) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => return,
        };

        if remaining == 0 {
            self.graph.remove_edge(eidx);
            self.remove_if_isolated(a_idx);
            self.remove_if_isolated(b_idx);
        }
    }

    // --------------------------------------------------------------------
    // ROLLING PRUNE
    // --------------------------------------------------------------------
    fn prune(&mut self, horizon: i64) {
        while let Some(&oldest) = self.timestamp_queue.front() {
            if horizon.saturating_sub(oldest) <= HEAT_WINDOW_SECS {
                break;
            }
            self.timestamp_queue.pop_front();
            if let Some(pairs) = self.per_timestamp_pairs.remove(&oldest) {
                debug!(target: "fraud::heat", timestamp = oldest, pairs = pairs.len(), "evicting bucket");
                for (payer, payee) in pairs {
                    self.decrement_edge(&payer, &payee);
                }
            }
        }
    }

    // --------------------------------------------------------------------
    // QUERIES
    // --------------------------------------------------------------------
    /// Burst check: either user fans out to more than [`FAN_OUT_THRESHOLD`]
    /// counterparties, or the pair has more than [`PAIR_COUNT_THRESHOLD`]
    /// co-payments in the current window. Read-only.
    pub fn is_suspicious(&self, payer: &str, payee: &str) -> bool {
        self.counterparties(payer) > FAN_OUT_THRESHOLD
            || self.counterparties(payee) > FAN_OUT_THRESHOLD
            || self.pair_count(payer, payee) > PAIR_COUNT_THRESHOLD
    }

    /// Distinct users `user` has paid or been paid by inside the window.
    pub fn counterparties(&self, user: &str) -> usize {
        self.node_map
            .get(user)
            .map_or(0, |&idx| self.graph.neighbors(idx).count())
    }

    /// Co-payments between two users inside the window; symmetric.
    pub fn pair_count(&self, user_a: &str, user_b: &str) -> u32 {
        let (Some(&a_idx), Some(&b_idx)) = (self.node_map.get(user_a), self.node_map.get(user_b)) else {
            return 0;
        };
        if a_idx == b_idx {
            return 0;
        }
        self.graph
            .find_edge(a_idx, b_idx)
            .and_then(|eidx| self.graph.edge_weight(eidx))
            .copied()
            .unwrap_or(0)
    }

    /// Newest event timestamp seen, `None` before the first active event.
    pub fn horizon(&self) -> Option<i64> {
        self.horizon
    }

    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.timestamp_queue.front().copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.timestamp_queue.len()
    }

    /// Users with at least one live co-payment edge.
    pub fn user_count(&self) -> usize {
        self.graph.node_count()
    }
}
