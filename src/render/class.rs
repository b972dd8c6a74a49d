use std::fmt::Write;

use super::{
    edge_entities, entity_names, DiagramRenderer, NO_RESOURCES_ENTITY, NO_RESOURCES_MESSAGE,
};
use crate::{
    error::Result,
    graph::{Edge, ResourceSet},
    properties::Resource,
};

/// Mermaid class diagram. Attributes become class members of the form `+field value`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClassDiagram;

/// Class members end at a newline and turn into methods when they contain parentheses, and
/// braces would close the class body.
fn member_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '(' | '{' => '[',
            ')' | '}' => ']',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

impl ClassDiagram {
    fn write_class(out: &mut String, entity: &str, resource: &Resource) -> Result<()> {
        writeln!(out, "  class {entity} {{")?;
        let mut member = |name: &str, value: &str| {
            writeln!(out, "    +{name} {}", member_text(value))
        };
        member("kind", &resource.kind)?;
        member("name", &resource.name)?;
        member("apiVersion", &resource.api_version)?;
        member("namespace", &resource.namespace)?;
        if let Some(account) = &resource.service_account_name {
            member("serviceAccountName", account)?;
        }
        if let Some(image) = &resource.image {
            member("image", image)?;
        }
        for port in &resource.ports {
            member(
                "port",
                &format!("{}/{}", port.port.as_deref().unwrap_or("None"), port.protocol),
            )?;
        }
        writeln!(out, "  }}")?;
        Ok(())
    }
}

impl DiagramRenderer for ClassDiagram {
    fn render(&self, resources: &ResourceSet, edges: &[Edge]) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "classDiagram")?;

        if resources.is_empty() {
            writeln!(out, "  class {NO_RESOURCES_ENTITY} {{")?;
            writeln!(out, "    +message {NO_RESOURCES_MESSAGE}")?;
            writeln!(out, "  }}")?;
            return Ok(out);
        }

        let names = entity_names(resources);
        for resource in resources.iter() {
            Self::write_class(&mut out, &names[&resource.key()], resource)?;
        }
        for (source, target, edge) in edge_entities(&names, edges)? {
            writeln!(out, "  {source} --> {target} : {}", edge.relation)?;
        }
        Ok(out)
    }
}
