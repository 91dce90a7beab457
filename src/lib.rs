//! Core 3-D space-colonization tree growth library.
//!
//! Grows a directed tree of nodes and branches from a seeded cloud of
//! attractor points: growth steps toward nearby attractors, consumes
//! them on arrival, and a final bottom-up pass derives branch thickness.
//! The result is plain data (positions, directions, thickness) for a
//! host application to mesh or render.
//!
//! Main components:
//! - [`volume`] — the region bounding the attractor cloud.
//! - [`attractor`] — attractor point generation, assignment and culling.
//! - [`assignment`] — per-iteration node→points accumulation.
//! - [`tree`] — node/branch arena, direction constraints, thickness.
//! - [`engine`] — the growth loop and its terminal outcomes.
//! - [`config`] — global configuration for the growth algorithm.
//! - [`error`] — the crate error type.
//! - [`types`] — shared type aliases and IDs.

pub mod assignment;
pub mod attractor;
pub mod config;
pub mod engine;
pub mod error;
pub mod tree;
pub mod types;
pub mod volume;
