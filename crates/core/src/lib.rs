//! # px-core
//!
//! Shared types, configuration and logging for the PulseX market dashboard.
//!
//! This crate provides the building blocks used across the workspace: the
//! raw worksheet table and typed snapshot rows, token pair identifiers,
//! layered configuration, and the tracing setup.

pub mod config;
pub mod logging;
pub mod types;
