//! Geometry utilities for cut-sieve.
//!
//! This module provides cell measures and the decomposition of cut cells into
//! sub-simplices on either side of the interface.

pub mod decomposition;
pub mod metrics;
