//! Diagram rendering: pure functions from resources and edges to Mermaid text.
//!
//! Two renderers share the same naming scheme: every resource becomes an entity called
//! `<Kind>_<n>`, where `n` counts resources of that kind in resource-set order starting at
//! 1. Any character that Mermaid does not accept in an identifier is replaced by `_`.
//!
//! - [`ErDiagram`] - `erDiagram` with a theme init line and `||--o|` relations
//! - [`ClassDiagram`] - `classDiagram` with `-->` relations

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{
    error::{ManifestGraphError, Result},
    graph::{Edge, ResourceSet},
    properties::ResourceKey,
};

mod class;
mod er;

pub use class::ClassDiagram;
pub use er::{ErDiagram, DEFAULT_THEME};

pub const NO_RESOURCES_ENTITY: &str = "NoResourcesFound";
pub const NO_RESOURCES_MESSAGE: &str = "No Kubernetes resources found in the provided YAML.";

static IDENTIFIER_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static pattern is valid"));

pub trait DiagramRenderer {
    fn render(&self, resources: &ResourceSet, edges: &[Edge]) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Er,
    Class,
}

impl DiagramFormat {
    pub fn renderer(&self, theme: &str) -> Box<dyn DiagramRenderer> {
        match self {
            DiagramFormat::Er => Box::new(ErDiagram::new(theme)),
            DiagramFormat::Class => Box::new(ClassDiagram),
        }
    }
}

impl Display for DiagramFormat {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            DiagramFormat::Er => f.write_str("er"),
            DiagramFormat::Class => f.write_str("class"),
        }
    }
}

impl FromStr for DiagramFormat {
    type Err = ManifestGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "er" | "erdiagram" => Ok(DiagramFormat::Er),
            "class" | "classdiagram" => Ok(DiagramFormat::Class),
            other => Err(ManifestGraphError::Config(format!(
                "Unknown diagram format '{other}', expected 'er' or 'class'"
            ))),
        }
    }
}

/// Stable entity identifiers for every resource.
pub fn entity_names(resources: &ResourceSet) -> BTreeMap<ResourceKey, String> {
    // Numbered per sanitized prefix, distinct kinds may sanitize to the same text.
    let mut per_prefix = BTreeMap::<String, usize>::new();
    resources
        .iter()
        .map(|resource| {
            let prefix = IDENTIFIER_UNSAFE.replace_all(&resource.kind, "_").into_owned();
            let count = per_prefix.entry(prefix.clone()).or_default();
            *count += 1;
            (resource.key(), format!("{prefix}_{count}"))
        })
        .collect()
}

/// Pair every edge with the entity names of its endpoints. Edges whose endpoints are not
/// part of `resources` are an error: the resolver never produces them.
pub(crate) fn edge_entities<'a>(
    names: &'a BTreeMap<ResourceKey, String>,
    edges: &'a [Edge],
) -> Result<Vec<(&'a str, &'a str, &'a Edge)>> {
    edges
        .iter()
        .map(|edge| {
            let source = names.get(&edge.source);
            let target = names.get(&edge.target);
            match (source, target) {
                (Some(source), Some(target)) => Ok((source.as_str(), target.as_str(), edge)),
                _ => Err(ManifestGraphError::Render(format!(
                    "edge {edge} references a resource outside the rendered set"
                ))),
            }
        })
        .collect()
}

/// Make a value safe inside a double-quoted Mermaid string.
pub fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "#quot;")
        .replace(['\n', '\r'], " ")
}
