//! flow_counter_core - Pure no_std logic for the flash monotonic counter
//!
//! This crate contains platform-agnostic algorithms and types
//! that can be tested on host without any feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **No I/O**: Flash and metadata access live in the firmware crate
//!
//! # Modules
//!
//! - [`counter`]: Metadata key derivation, bit arithmetic, rollover phase and counter configuration
//! - [`flow`]: Flow meter configuration and pulse to step accumulation

#![no_std]

pub mod counter;
pub mod flow;
