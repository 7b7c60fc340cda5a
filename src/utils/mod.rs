//! Utility functions shared across the crate
//!
//! This module provides logging helpers and progress reporting.

pub mod logging;
