//! Graph module: resource storage, resolution, and the resolved edge graph.
//!
//! # Module Organization
//!
//! - [`resources`]: [`ResourceSet`], the ordered and namespace-indexed resource store
//! - [`resolve`]: the Relationship Resolver turning facts into [`Edge`]s
//! - [`manifest`]: [`ManifestGraph`], resolved edges on top of `petgraph`
//!
//! ```rust
//! use manifest_graph::graph::{resolve_graph, ManifestGraph, ResourceSet};
//! ```

mod manifest;
mod resolve;
mod resources;

#[cfg(test)]
mod tests;

pub use manifest::{Edge, ManifestGraph};
pub use resolve::{resolve, resolve_graph, ResolveMode, Resolved};
pub use resources::{ResourceEntry, ResourceSet};
