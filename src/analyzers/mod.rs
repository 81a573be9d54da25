//! Distance reconstruction and anomaly detection over shapes.
//!
//! [`reconstruct`](reconstruct::reconstruct) turns an ordered point sequence
//! into cumulative haversine distances, [`classify`](classify::classify)
//! flags shapes whose mean spacing between points exceeds a threshold, and
//! [`analyze_shapes`](analyzer::analyze_shapes) runs both over a dataset.

pub mod analyzer;
pub mod classify;
pub mod reconstruct;
pub mod types;
pub mod units;
pub mod utility;
