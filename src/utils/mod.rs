//! Utility modules shared by the build pipeline.

pub mod exec;
