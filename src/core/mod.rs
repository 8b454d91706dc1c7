//! Core counter functionality
//!
//! This module contains the flash monotonic counter engine, the logging
//! macros and the flow meter glue that feeds the counter.

pub mod counter;
pub mod flow;
pub mod logging;
