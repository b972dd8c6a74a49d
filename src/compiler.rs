//! Pipeline entry point: decode → normalize → extract → resolve → render.
//!
//! Every run is independent. Input and output locations are parameters; nothing is kept
//! between calls.

use serde::Serialize;
use std::{
    fs::{read_to_string, write},
    path::Path,
};

use crate::{
    codec::{
        extract_relations, normalize_stream, GraphDiagnostic, StreamDocument, UnresolvedFact,
        YamlStream,
    },
    config::RenderConfig,
    error::{ManifestGraphError, Result},
    graph::{resolve_graph, Edge, ManifestGraph, ResolveMode, ResourceSet},
    properties::Resource,
};

/// Everything one pipeline run knows about its input.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resources: ResourceSet,
    pub graph: ManifestGraph,
    pub unresolved: Vec<UnresolvedFact>,
    pub diagnostics: Vec<GraphDiagnostic>,
}

impl Resolution {
    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    /// Serializable view used by `inspect`.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            resources: self.resources.iter().collect(),
            edges: self.edges(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub resources: Vec<&'a Resource>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestCompiler {
    mode: ResolveMode,
}

impl ManifestCompiler {
    pub fn new(mode: ResolveMode) -> Self {
        ManifestCompiler { mode }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    /// Run the graph stages over an already decoded document sequence.
    pub fn compile_documents<I>(&self, documents: I) -> Result<Resolution>
    where
        I: IntoIterator<Item = Result<StreamDocument>>,
    {
        let normalized = normalize_stream(documents)?;
        let facts = extract_relations(&normalized.resources);
        let (graph, unresolved) = resolve_graph(&normalized.resources, &facts);

        if self.mode == ResolveMode::Strict && !unresolved.is_empty() {
            let summary = unresolved
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ManifestGraphError::Unresolved {
                count: unresolved.len(),
                summary,
            });
        }

        let mut diagnostics = normalized.diagnostics;
        diagnostics.extend(unresolved.iter().cloned().map(GraphDiagnostic::Unresolved));

        let (nodes, edges) = graph.stats();
        tracing::info!(
            "Built graph with {} resource(s) and {} edge(s) from {} document(s)",
            nodes,
            edges,
            normalized.documents_seen
        );

        Ok(Resolution {
            resources: normalized.resources,
            graph,
            unresolved,
            diagnostics,
        })
    }

    /// Decode and compile one YAML stream. `source_id` names the input in decode errors.
    pub fn compile_str(&self, content: &str, source_id: &str) -> Result<Resolution> {
        self.compile_documents(YamlStream::new(content, source_id))
    }

    pub fn compile_path<P: AsRef<Path>>(&self, path: P) -> Result<Resolution> {
        let path = path.as_ref();
        let content = get_content(path)?;
        self.compile_str(&content, &path.display().to_string())
    }
}

/// Render an already compiled resolution with the configured diagram format.
pub fn render(resolution: &Resolution, config: &RenderConfig) -> Result<String> {
    config
        .format
        .renderer(&config.theme)
        .render(&resolution.resources, &resolution.edges())
}

/// Compile `input`, render it, and write the diagram to `output`. Returns the diagram text.
///
/// Nothing is written when decoding or strict resolution fails.
pub fn render_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &RenderConfig,
) -> Result<String> {
    let resolution = ManifestCompiler::new(config.resolve_mode()).compile_path(input)?;
    let text = render(&resolution, config)?;
    set_content(output, &text)?;
    Ok(text)
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}

pub fn set_content<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!("Writing {:?}", path);
    Ok(write(path, text)?)
}
