//! Manifest stream decoding and per-document extraction.
//!
//! This module turns raw multi-document YAML into [`Resource`](crate::properties::Resource)
//! records and unresolved [`RelationFact`]s.
//!
//! ## Key Components
//!
//! - [`YamlStream`] - lazy, single-pass iterator over the documents of one YAML stream
//! - [`normalize`] - Document Normalizer, builds the [`ResourceSet`](crate::graph::ResourceSet)
//! - [`extract`] - Relationship Extractor, a kind-indexed rule table producing [`RelationFact`]s
//! - [`diagnostic`] - skipped documents and unresolved facts
//!
//! Only a stream-level syntax error aborts decoding. Documents that are null, scalars,
//! sequences, mappings without a `kind`, or that fail to decode on their own (a duplicate
//! mapping key) are skipped and recorded as diagnostics. Merge keys are expanded.

use serde::Deserialize;
use serde_yaml::{Error as YamlError, Value};

use crate::{error::ManifestGraphError, properties::Labels};

pub mod diagnostic;
pub mod extract;
pub mod normalize;

pub use diagnostic::{GraphDiagnostic, SkipReason, UnresolvedFact, UnresolvedReason};
pub use extract::{extract_relations, ExtractionRule, FactTarget, RelationFact, RULES};
pub use normalize::{normalize_document, normalize_stream, Normalized};

/// One entry of a decoded stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDocument {
    /// A generic tree with merge keys (`<<`) already expanded
    Decoded(Value),
    /// The document is well-formed YAML but cannot be built into a tree, e.g. a mapping
    /// with a duplicate key. Carries the decoder message.
    Undecodable(String),
}

impl From<Value> for StreamDocument {
    fn from(value: Value) -> Self {
        StreamDocument::Decoded(value)
    }
}

/// Lazily decodes the documents of a YAML multi-document stream.
///
/// A document that fails to decode on its own is yielded as
/// [`StreamDocument::Undecodable`] and decoding carries on. A syntax error leaves the
/// parser stuck at the same position: it is yielded once as an `Err` and the iterator is
/// exhausted afterwards. The stream is not restartable.
pub struct YamlStream<'a> {
    source_id: String,
    documents: serde_yaml::Deserializer<'a>,
    pending: Option<Result<Value, YamlError>>,
    failed: bool,
}

impl<'a> YamlStream<'a> {
    pub fn new(content: &'a str, source_id: impl Into<String>) -> Self {
        YamlStream {
            source_id: source_id.into(),
            documents: serde_yaml::Deserializer::from_str(content),
            pending: None,
            failed: false,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    fn decode_next(&mut self) -> Option<Result<Value, YamlError>> {
        if let Some(decoded) = self.pending.take() {
            return Some(decoded);
        }
        let document = self.documents.next()?;
        Some(Value::deserialize(document).and_then(|mut value| {
            value.apply_merge()?;
            Ok(value)
        }))
    }
}

/// The parser repeats a syntax error, at the same mark, for every document requested after it.
fn is_repeated_syntax_error(err: &YamlError, next: &YamlError) -> bool {
    match (err.location(), next.location()) {
        (Some(a), Some(b)) => a.index() == b.index() && err.to_string() == next.to_string(),
        _ => false,
    }
}

impl Iterator for YamlStream<'_> {
    type Item = Result<StreamDocument, ManifestGraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let err = match self.decode_next()? {
            Ok(value) => return Some(Ok(StreamDocument::Decoded(value))),
            Err(err) => err,
        };

        match self.decode_next() {
            Some(Err(next)) if is_repeated_syntax_error(&err, &next) => {
                self.failed = true;
                Some(Err(ManifestGraphError::decode(&self.source_id, err)))
            }
            lookahead => {
                self.pending = lookahead;
                tracing::debug!("[decode] {}: undecodable document: {}", self.source_id, err);
                Some(Ok(StreamDocument::Undecodable(err.to_string())))
            }
        }
    }
}

/// Render a scalar node as text. Mappings, sequences and nulls have no scalar form.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Follow a chain of mapping keys.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// Scalar text at `path`, treating the empty string as absent.
pub fn non_empty_string(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path)
        .and_then(scalar_string)
        .filter(|s| !s.is_empty())
}

/// Sequence items at `path`; anything absent or not a sequence reads as empty.
pub fn sequence_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Collect a string map at `path`, stringifying scalar keys and values and ignoring
/// entries that are not scalars.
pub fn string_map_at(value: &Value, path: &[&str]) -> Labels {
    let Some(mapping) = lookup(value, path).and_then(Value::as_mapping) else {
        return Labels::new();
    };
    mapping
        .iter()
        .filter_map(|(k, v)| Some((scalar_string(k)?, scalar_string(v)?)))
        .collect()
}
