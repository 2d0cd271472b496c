//! Synthetic human-mobility network for the epiflow simulation.
//!
//! Flows between zone pairs come from a gravity model (flow proportional to
//! the product of the two populations over squared distance) adjusted for
//! destination centrality, calendar season, and a handful of named
//! high-traffic corridors. The matrix is sparse: pairs whose volume falls
//! under the materialization threshold are simply absent.
//!
//! Regeneration is wholesale: the feedback coupler rebuilds the whole matrix
//! from the gravity model every simulated day and then applies quarantine
//! suppression, so calendar effects and current policy always recombine
//! fresh instead of compounding on yesterday's matrix.

pub mod gravity;
pub mod matrix;

pub use gravity::{generate, generate_with_quarantine};
pub use matrix::{mobility_index, FlowEdge, MobilityMatrix};
