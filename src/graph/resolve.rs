//! Relationship Resolver: matches [`RelationFact`]s against the completed [`ResourceSet`].

use serde::{Deserialize, Serialize};

use super::{Edge, ManifestGraph, ResourceSet};
use crate::codec::{FactTarget, RelationFact, UnresolvedFact, UnresolvedReason};

/// How unresolved facts are treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Unresolvable facts are dropped without complaint.
    #[default]
    Lenient,
    /// Unresolvable facts fail the pipeline.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub edges: Vec<Edge>,
    pub unresolved: Vec<UnresolvedFact>,
}

/// Resolve every fact, in order, into edges.
///
/// - Key targets produce at most one edge.
/// - Selector targets fan out to every resource of the source namespace whose labels
///   contain the selector; an empty selector matches all of them.
/// - Facts whose source or target cannot be found produce nothing and are reported in
///   [`Resolved::unresolved`].
///
/// Identical edges are not collapsed.
pub fn resolve(resources: &ResourceSet, facts: &[RelationFact]) -> Resolved {
    let mut resolved = Resolved::default();

    for fact in facts {
        let Some(source) = resources.get(&fact.source) else {
            tracing::debug!("[resolve] dropping fact from unknown source {}", fact.source);
            resolved.unresolved.push(UnresolvedFact {
                fact: fact.clone(),
                reason: UnresolvedReason::MissingSource,
            });
            continue;
        };

        let before = resolved.edges.len();
        match &fact.target {
            FactTarget::Key(target) => {
                if resources.contains(target) {
                    resolved.edges.push(Edge {
                        source: fact.source.clone(),
                        target: target.clone(),
                        relation: fact.relation,
                    });
                }
            }
            FactTarget::Selector(selector) => {
                let matches = resources
                    .in_namespace(&source.namespace)
                    .filter(|candidate| candidate.matches_selector(selector))
                    .map(|candidate| Edge {
                        source: fact.source.clone(),
                        target: candidate.key(),
                        relation: fact.relation,
                    });
                resolved.edges.extend(matches);
            }
        }

        if resolved.edges.len() == before {
            let reason = match fact.target {
                FactTarget::Key(_) => UnresolvedReason::MissingTarget,
                FactTarget::Selector(_) => UnresolvedReason::NoSelectorMatch,
            };
            tracing::debug!("[resolve] no target for {} {} -> {}", fact.relation, fact.source, fact.target);
            resolved.unresolved.push(UnresolvedFact {
                fact: fact.clone(),
                reason,
            });
        }
    }

    resolved
}

/// Resolve facts and load the resulting edges into a [`ManifestGraph`].
pub fn resolve_graph(resources: &ResourceSet, facts: &[RelationFact]) -> (ManifestGraph, Vec<UnresolvedFact>) {
    let Resolved { edges, unresolved } = resolve(resources, facts);
    let mut graph = ManifestGraph::new(resources);
    for edge in &edges {
        // Both endpoints were checked against `resources` above.
        graph.add_edge(edge);
    }
    tracing::debug!(
        "[resolve] {} edge(s), {} unresolved fact(s)",
        edges.len(),
        unresolved.len()
    );
    (graph, unresolved)
}
