use std::fmt::Write;

use super::{
    edge_entities, entity_names, escape_quoted, DiagramRenderer, NO_RESOURCES_ENTITY,
    NO_RESOURCES_MESSAGE,
};
use crate::{
    error::Result,
    graph::{Edge, ResourceSet},
    properties::Resource,
};

pub const DEFAULT_THEME: &str = "forest";

/// Mermaid entity-relationship diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErDiagram {
    theme: String,
}

impl Default for ErDiagram {
    fn default() -> Self {
        ErDiagram::new(DEFAULT_THEME)
    }
}

impl ErDiagram {
    pub fn new(theme: impl Into<String>) -> Self {
        ErDiagram {
            theme: theme.into(),
        }
    }

    fn write_entity(out: &mut String, entity: &str, resource: &Resource) -> Result<()> {
        writeln!(out, "{entity} {{")?;
        let mut attribute = |name: &str, value: &str| {
            writeln!(out, "  string {name} \"{}\"", escape_quoted(value))
        };
        attribute("kind", &resource.kind)?;
        attribute("name", &resource.name)?;
        attribute("api_version", &resource.api_version)?;
        attribute("namespace", &resource.namespace)?;
        if let Some(account) = &resource.service_account_name {
            attribute("serviceAccountName", account)?;
        }
        if let Some(image) = &resource.image {
            attribute("image", image)?;
        }
        if !resource.ports.is_empty() {
            let networking = resource
                .ports
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            attribute("networking", &networking)?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

impl DiagramRenderer for ErDiagram {
    fn render(&self, resources: &ResourceSet, edges: &[Edge]) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "%%{{init: {{'theme':'{}'}}}}%%", self.theme.replace('\'', ""))?;
        writeln!(out, "erDiagram")?;

        if resources.is_empty() {
            writeln!(out, "{NO_RESOURCES_ENTITY} {{")?;
            writeln!(out, "  string message \"{NO_RESOURCES_MESSAGE}\"")?;
            writeln!(out, "}}")?;
            return Ok(out);
        }

        let names = entity_names(resources);
        for resource in resources.iter() {
            Self::write_entity(&mut out, &names[&resource.key()], resource)?;
        }
        for (source, target, edge) in edge_entities(&names, edges)? {
            writeln!(out, "{source} ||--o| {target} : {}", edge.relation)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{Port, RelationKind};

    #[test]
    fn empty_set_renders_placeholder() {
        let text = ErDiagram::default()
            .render(&ResourceSet::new(), &[])
            .unwrap();
        assert_eq!(
            text,
            "%%{init: {'theme':'forest'}}%%\nerDiagram\nNoResourcesFound {\n  string message \"No Kubernetes resources found in the provided YAML.\"\n}\n"
        );
    }

    #[test]
    fn entities_and_relations() {
        let deployment = Resource {
            kind: "Deployment".to_string(),
            api_version: "apps/v1".to_string(),
            name: "web".to_string(),
            image: Some("nginx:1.25".to_string()),
            service_account_name: Some("web-sa".to_string()),
            ..Default::default()
        };
        let account = Resource {
            kind: "ServiceAccount".to_string(),
            api_version: "v1".to_string(),
            name: "web-sa".to_string(),
            ..Default::default()
        };
        let service = Resource {
            kind: "Service".to_string(),
            api_version: "v1".to_string(),
            name: "web".to_string(),
            ports: vec![
                Port {
                    port: Some("80".to_string()),
                    protocol: "TCP".to_string(),
                },
                Port {
                    port: Some("53".to_string()),
                    protocol: "UDP".to_string(),
                },
            ],
            ..Default::default()
        };
        let edges = vec![
            Edge {
                source: deployment.key(),
                target: account.key(),
                relation: RelationKind::UsesServiceaccount,
            },
            Edge {
                source: service.key(),
                target: deployment.key(),
                relation: RelationKind::Targets,
            },
        ];
        let resources = vec![deployment, account, service]
            .into_iter()
            .collect::<ResourceSet>();

        let text = ErDiagram::new("dark").render(&resources, &edges).unwrap();
        let expected = r#"%%{init: {'theme':'dark'}}%%
erDiagram
Deployment_1 {
  string kind "Deployment"
  string name "web"
  string api_version "apps/v1"
  string namespace "default"
  string serviceAccountName "web-sa"
  string image "nginx:1.25"
}
ServiceAccount_1 {
  string kind "ServiceAccount"
  string name "web-sa"
  string api_version "v1"
  string namespace "default"
}
Service_1 {
  string kind "Service"
  string name "web"
  string api_version "v1"
  string namespace "default"
  string networking "Port: 80, Protocol: TCP, Port: 53, Protocol: UDP"
}
Deployment_1 ||--o| ServiceAccount_1 : uses_serviceaccount
Service_1 ||--o| Deployment_1 : targets
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn dangling_edges_are_rejected() {
        let resources = vec![Resource {
            kind: "Secret".to_string(),
            ..Default::default()
        }]
        .into_iter()
        .collect::<ResourceSet>();
        let edges = vec![Edge {
            source: crate::properties::ResourceKey::new("Deployment", "default", "ghost"),
            target: resources.iter().next().unwrap().key(),
            relation: RelationKind::UsesSecret,
        }];
        assert!(ErDiagram::default().render(&resources, &edges).is_err());
    }
}
