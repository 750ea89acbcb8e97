//! Glue between the data, estimator and output crates.

pub(crate) mod cache_manager;
pub(crate) mod data_pipeline;
