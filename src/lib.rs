#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! flow_counter - Wear-leveling flash monotonic counter for flow metering
//!
//! This library provides a platform abstraction for flash regions and
//! metadata storage, a power-loss tolerant monotonic counter built on top of
//! it, and the glue that turns flow sensor pulses into counter steps.

// Platform abstraction layer (flash regions, metadata store, mocks)
pub mod platform;

// Counter engine, logging and flow sampling
pub mod core;

// Build-time configuration
pub mod config;

pub use crate::core::counter::{CounterError, MonotonicCounter};
