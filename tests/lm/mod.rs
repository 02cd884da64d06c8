//! Solver tests on hand-written problems.

mod lm_algorithm;
mod covariance;
