//! Cost-benefit analysis of churn classifiers.
//!
//! Sweeps every predicted probability as a decision threshold, prices the
//! confusion matrix at each threshold with a cost-benefit matrix, and picks
//! the threshold with the highest expected profit per customer.

pub mod analysis;
pub mod batch;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod profit;
pub mod server;
pub mod state;
