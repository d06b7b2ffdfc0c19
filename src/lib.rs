//! Stackgraph — a declarative infrastructure compiler.
//!
//! One project description compiles into an ordered graph of cloud
//! resources, then into code for one of three backends: a flat Pulumi
//! program, a CDKTF construct stack, or Kubernetes manifests.

pub mod cli;
pub mod core;
pub mod resources;
