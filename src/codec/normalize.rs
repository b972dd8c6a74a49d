//! Document Normalizer: generic YAML trees in, [`Resource`] records out.

use serde_yaml::Value;

use super::{
    diagnostic::{GraphDiagnostic, SkipReason},
    extract::apply_attributes,
    lookup, scalar_string, string_map_at, StreamDocument,
};
use crate::{
    error::ManifestGraphError,
    graph::ResourceSet,
    properties::{Resource, DEFAULT_API_VERSION, DEFAULT_NAME, DEFAULT_NAMESPACE},
};

/// Result of consuming one document stream.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub resources: ResourceSet,
    pub diagnostics: Vec<GraphDiagnostic>,
    pub documents_seen: usize,
}

/// Convert one document into a [`Resource`], applying the missing-field defaults and the
/// kind-specific attribute rules.
pub fn normalize_document(document: &Value) -> Result<Resource, SkipReason> {
    let root = match document {
        Value::Null => return Err(SkipReason::Empty),
        Value::Mapping(_) => document,
        Value::Tagged(tagged) if tagged.value.is_mapping() => &tagged.value,
        _ => return Err(SkipReason::NotAMapping),
    };

    let kind = match root.get("kind") {
        None => return Err(SkipReason::MissingKind),
        Some(kind) => scalar_string(kind)
            .filter(|k| !k.is_empty())
            .ok_or(SkipReason::InvalidKind)?,
    };

    let field = |path: &[&str], default: &str| {
        lookup(root, path)
            .and_then(scalar_string)
            .unwrap_or_else(|| default.to_string())
    };

    let mut resource = Resource {
        kind,
        api_version: field(&["apiVersion"], DEFAULT_API_VERSION),
        name: field(&["metadata", "name"], DEFAULT_NAME),
        namespace: field(&["metadata", "namespace"], DEFAULT_NAMESPACE),
        labels: string_map_at(root, &["metadata", "labels"]),
        ..Default::default()
    };
    apply_attributes(&mut resource, root);
    Ok(resource)
}

/// Consume a lazy document sequence into a [`ResourceSet`].
///
/// Malformed and undecodable documents are skipped. The first stream-level error aborts the
/// whole run and is returned as is. Identity-key collisions are last-write-wins.
pub fn normalize_stream<I>(documents: I) -> Result<Normalized, ManifestGraphError>
where
    I: IntoIterator<Item = Result<StreamDocument, ManifestGraphError>>,
{
    let mut normalized = Normalized::default();

    for (index, document) in documents.into_iter().enumerate() {
        let document = document?;
        normalized.documents_seen += 1;

        let document = match document {
            StreamDocument::Decoded(value) => value,
            StreamDocument::Undecodable(message) => {
                tracing::debug!("[normalize] skipping document {}: {}", index, message);
                normalized.diagnostics.push(GraphDiagnostic::SkippedDocument {
                    index,
                    reason: SkipReason::Undecodable,
                });
                continue;
            }
        };

        match normalize_document(&document) {
            Ok(resource) => {
                let key = resource.key();
                tracing::trace!("[normalize] document {} is {}", index, key);
                let root = match document {
                    Value::Tagged(tagged) => tagged.value,
                    other => other,
                };
                if normalized.resources.insert(resource, root).is_some() {
                    tracing::debug!("[normalize] document {} overwrites {}", index, key);
                    normalized
                        .diagnostics
                        .push(GraphDiagnostic::Overwritten { index, key });
                }
            }
            Err(reason) => {
                tracing::debug!("[normalize] skipping document {}: {}", index, reason);
                normalized
                    .diagnostics
                    .push(GraphDiagnostic::SkippedDocument { index, reason });
            }
        }
    }

    tracing::debug!(
        "[normalize] {} resource(s) from {} document(s)",
        normalized.resources.len(),
        normalized.documents_seen
    );
    Ok(normalized)
}
