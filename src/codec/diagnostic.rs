//! Diagnostic types for manifest normalization and relationship resolution.
//!
//! None of these are errors. Skipped documents and unresolved facts are the expected
//! by-products of partial manifest sets, so they are collected here instead of failing
//! the run. Only strict mode turns [`UnresolvedFact`]s into an error.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::{codec::RelationFact, properties::ResourceKey};

/// Why a document of the stream produced no resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Empty document (`---` with no content) or explicit null
    Empty,
    /// A scalar or a sequence at the document root
    NotAMapping,
    /// A mapping without a `kind` field
    MissingKind,
    /// `kind` is present but is not a non-empty scalar
    InvalidKind,
    /// The document could not be decoded into a tree (duplicate mapping key, bad merge)
    Undecodable,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let text = match self {
            SkipReason::Empty => "empty document",
            SkipReason::NotAMapping => "document root is not a mapping",
            SkipReason::MissingKind => "no kind field",
            SkipReason::InvalidKind => "kind is not a scalar",
            SkipReason::Undecodable => "document could not be decoded",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// The fact's originating resource is not in the resource set
    MissingSource,
    /// No resource carries the referenced identity key
    MissingTarget,
    /// No resource in the namespace satisfies the label selector
    NoSelectorMatch,
}

/// A relationship fact that produced no edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedFact {
    pub fact: RelationFact,
    pub reason: UnresolvedReason,
}

impl Display for UnresolvedFact {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.reason {
            UnresolvedReason::MissingSource => {
                write!(f, "{} source {} not found", self.fact.relation, self.fact.source)
            }
            UnresolvedReason::MissingTarget | UnresolvedReason::NoSelectorMatch => write!(
                f,
                "{} {} -> {} not found",
                self.fact.relation, self.fact.source, self.fact.target
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphDiagnostic {
    /// Document at `index` (zero-based position in the stream) was skipped
    SkippedDocument { index: usize, reason: SkipReason },

    /// Document at `index` replaced an earlier resource with the same identity key
    Overwritten { index: usize, key: ResourceKey },

    Unresolved(UnresolvedFact),
}

impl Display for GraphDiagnostic {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            GraphDiagnostic::SkippedDocument { index, reason } => {
                write!(f, "document {index} skipped: {reason}")
            }
            GraphDiagnostic::Overwritten { index, key } => {
                write!(f, "document {index} overwrites earlier {key}")
            }
            GraphDiagnostic::Unresolved(unresolved) => write!(f, "unresolved: {unresolved}"),
        }
    }
}
