//! # manifest-graph
//!
//! A Rust library for turning a stream of Kubernetes manifests into a typed relationship
//! graph and rendering it as a Mermaid diagram.
//!
//! ## Overview
//!
//! manifest-graph reads one multi-document YAML stream, normalizes every document that
//! carries a `kind` into a [`Resource`](properties::Resource), discovers the references
//! between resources, and resolves them into edges:
//!
//! ```text
//! YAML stream
//!     │
//!     ├──> Normalizer (codec::normalize)
//!     │      └─ Resource per document, keyed by (kind, namespace, name)
//!     │
//!     ├──> Extractor (codec::extract)
//!     │      ├─ pod specs: service accounts, env/envFrom, volumes
//!     │      ├─ Service selectors, Ingress backends
//!     │      └─ NetworkPolicy pod selectors, HPA scale targets
//!     │
//!     ├──> Resolver (graph::resolve)
//!     │      ├─ exact key lookup
//!     │      └─ label selector matching within the namespace
//!     │
//!     └──> Renderer (render)
//!            └─ Mermaid erDiagram / classDiagram
//! ```
//!
//! ### Key Properties
//!
//! - **Best effort**: references to resources outside the stream are dropped, not reported,
//!   unless [`ResolveMode::Strict`](graph::ResolveMode) is requested
//! - **Deterministic**: the same input always yields the same edges in the same order
//! - **Open kinds**: unknown kinds are stored and can be referenced, they just contribute no
//!   relationships of their own
//! - **Last write wins**: a later document with the same identity key replaces the earlier one
//!
//! ## Quick Start
//!
//! ```rust
//! use manifest_graph::{compiler::{render, ManifestCompiler}, config::RenderConfig};
//!
//! # fn main() -> Result<(), manifest_graph::ManifestGraphError> {
//! let manifests = r#"
//! kind: ServiceAccount
//! metadata: {name: web-sa}
//! ---
//! kind: Deployment
//! metadata: {name: web}
//! spec:
//!   template:
//!     spec:
//!       serviceAccountName: web-sa
//! "#;
//!
//! let resolution = ManifestCompiler::default().compile_str(manifests, "inline")?;
//! assert_eq!(resolution.edges().len(), 1);
//!
//! let diagram = render(&resolution, &RenderConfig::default())?;
//! assert!(diagram.contains("Deployment_1 ||--o| ServiceAccount_1 : uses_serviceaccount"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! Start with [`compiler::ManifestCompiler`], then see [`codec`] for the extraction rules,
//! [`graph`] for resolution, and [`render`] for the output formats.

pub mod codec;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod properties;
pub mod render;

pub use error::*;
