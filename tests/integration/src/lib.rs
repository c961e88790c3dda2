//! End-to-end tests for the GeoFix pipeline
//!
//! This test suite validates:
//! - Acquisition through scripted providers feeding the analysis pipeline
//! - Resource teardown across resolution, timeout, cancel and replacement
//! - Future-based acquisition on a real tokio timer with paused time
//! - Configuration files driving acquisition parameters

pub mod test_utils;

#[cfg(test)]
mod acquisition_pipeline_tests;

#[cfg(test)]
mod async_acquisition_tests;

#[cfg(test)]
mod config_tests;
