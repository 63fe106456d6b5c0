// ABOUTME: Shared types and configuration for subdiv.
// ABOUTME: Defines fraction geometry, axes/edges, and config file handling.

pub mod config;
pub mod geometry;

pub use config::{Config, ConfigError};
pub use geometry::{Axis, Edge, Rect, Side, EPSILON};
