use std::collections::HashMap;

use serde::Serialize;

/// Directed origin→destination daily flow volumes in people per day.
///
/// Sparse by construction: zone pairs whose generated volume fell under the
/// materialization threshold are absent, not stored as zero. A matrix is
/// immutable once handed to the engine; the feedback coupler replaces it
/// wholesale instead of editing entries in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MobilityMatrix {
    flows: HashMap<(String, String), f64>,
}

/// One directed edge of the matrix, used for ranked listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowEdge {
    pub origin: String,
    pub dest: String,
    pub volume: f64,
}

impl MobilityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: &str, dest: &str, volume: f64) {
        self.flows
            .insert((origin.to_owned(), dest.to_owned()), volume);
    }

    /// Flow volume from `origin` to `dest`; 0 for pairs that were not
    /// materialized.
    pub fn flow(&self, origin: &str, dest: &str) -> f64 {
        self.flows
            .get(&(origin.to_owned(), dest.to_owned()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn total_flow(&self) -> f64 {
        self.flows.values().sum()
    }

    /// Every materialized flow arriving at `zone`, as (origin, volume).
    pub fn inflows(&self, zone: &str) -> Vec<(String, f64)> {
        self.flows
            .iter()
            .filter(|((_, dest), _)| dest == zone)
            .map(|((origin, _), volume)| (origin.clone(), *volume))
            .collect()
    }

    /// Every materialized flow leaving `zone`, as (destination, volume).
    pub fn outflows(&self, zone: &str) -> Vec<(String, f64)> {
        self.flows
            .iter()
            .filter(|((origin, _), _)| origin == zone)
            .map(|((_, dest), volume)| (dest.clone(), *volume))
            .collect()
    }

    pub fn inflow_total(&self, zone: &str) -> f64 {
        self.flows
            .iter()
            .filter(|((_, dest), _)| dest == zone)
            .map(|(_, volume)| volume)
            .sum()
    }

    pub fn outflow_total(&self, zone: &str) -> f64 {
        self.flows
            .iter()
            .filter(|((origin, _), _)| origin == zone)
            .map(|(_, volume)| volume)
            .sum()
    }

    /// The `n` largest flows, descending by volume. Ties keep matrix
    /// iteration order, which callers must not rely on.
    pub fn top_flows(&self, n: usize) -> Vec<FlowEdge> {
        let mut edges: Vec<FlowEdge> = self
            .flows
            .iter()
            .map(|((origin, dest), volume)| FlowEdge {
                origin: origin.clone(),
                dest: dest.clone(),
                volume: *volume,
            })
            .collect();
        edges.sort_by(|a, b| b.volume.total_cmp(&a.volume));
        edges.truncate(n);
        edges
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.flows
            .iter()
            .map(|((origin, dest), volume)| (origin.as_str(), dest.as_str(), *volume))
    }
}

/// Current total flow as a 0-100 percentage of the baseline matrix, rounded.
/// Returns 0 when the baseline carries no flow.
pub fn mobility_index(current: &MobilityMatrix, baseline: &MobilityMatrix) -> u8 {
    let base_flow = baseline.total_flow();
    if base_flow <= 0.0 {
        return 0;
    }
    let relative = current.total_flow() / base_flow * 100.0;
    relative.clamp(0.0, 100.0).round() as u8
}
