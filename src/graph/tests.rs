//! Tests for relationship resolution

use super::*;
use crate::{
    codec::{extract_relations, normalize_stream, FactTarget, RelationFact, UnresolvedReason, YamlStream},
    properties::{Labels, RelationKind, Resource, ResourceKey},
};

fn build(content: &str) -> (ResourceSet, Resolved) {
    let normalized = normalize_stream(YamlStream::new(content, "test")).unwrap();
    let facts = extract_relations(&normalized.resources);
    let resolved = resolve(&normalized.resources, &facts);
    (normalized.resources, resolved)
}

fn key(kind: &str, namespace: &str, name: &str) -> ResourceKey {
    ResourceKey::new(kind, namespace, name)
}

fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn service_account_reference_resolves_to_one_edge() {
    let (_, resolved) = build(
        r#"
kind: ServiceAccount
metadata: {name: sa1, namespace: apps}
---
kind: Deployment
metadata: {name: web, namespace: apps}
spec:
  template:
    spec:
      serviceAccountName: sa1
"#,
    );
    assert_eq!(
        resolved.edges,
        vec![Edge {
            source: key("Deployment", "apps", "web"),
            target: key("ServiceAccount", "apps", "sa1"),
            relation: RelationKind::UsesServiceaccount,
        }]
    );
    assert!(resolved.unresolved.is_empty());
}

#[test]
fn service_account_in_other_namespace_does_not_resolve() {
    let (_, resolved) = build(
        r#"
kind: ServiceAccount
metadata: {name: sa1, namespace: other}
---
kind: Deployment
metadata: {name: web, namespace: apps}
spec:
  template:
    spec:
      serviceAccountName: sa1
"#,
    );
    assert!(resolved.edges.is_empty());
    assert_eq!(resolved.unresolved.len(), 1);
}

#[test]
fn missing_secret_is_dropped_silently() {
    let (resources, resolved) = build(
        r#"
kind: Deployment
metadata: {name: web}
spec:
  template:
    spec:
      containers:
        - image: nginx
          env:
            - name: TOKEN
              valueFrom:
                secretKeyRef: {name: s1, key: token}
"#,
    );
    assert_eq!(resources.len(), 1);
    assert!(resolved.edges.is_empty());
    assert_eq!(resolved.unresolved[0].reason, UnresolvedReason::MissingTarget);
}

#[test]
fn service_selector_targets_only_matching_labels() {
    let (_, resolved) = build(
        r#"
kind: Service
metadata: {name: web, namespace: shop}
spec:
  selector: {app: x}
---
kind: Deployment
metadata: {name: frontend, namespace: shop, labels: {app: x, tier: web}}
---
kind: Deployment
metadata: {name: backend, namespace: shop, labels: {app: y}}
---
kind: Deployment
metadata: {name: elsewhere, namespace: other, labels: {app: x}}
"#,
    );
    let targets = resolved
        .edges
        .iter()
        .filter(|edge| edge.relation == RelationKind::Targets)
        .collect::<Vec<_>>();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].source, key("Service", "shop", "web"));
    assert_eq!(targets[0].target, key("Deployment", "shop", "frontend"));
}

#[test]
fn selector_matches_any_kind() {
    let (_, resolved) = build(
        r#"
kind: Service
metadata: {name: db}
spec:
  selector: {app: db}
---
kind: StatefulSet
metadata: {name: postgres, labels: {app: db}}
---
kind: Pod
metadata: {name: adhoc, labels: {app: db}}
"#,
    );
    let targets = resolved
        .edges
        .iter()
        .map(|edge| edge.target.kind.as_str())
        .collect::<Vec<_>>();
    assert_eq!(targets, vec!["StatefulSet", "Pod"]);
}

#[test]
fn empty_pod_selector_applies_to_whole_namespace() {
    let (resources, resolved) = build(
        r#"
kind: NetworkPolicy
metadata: {name: deny-all, namespace: ns}
spec:
  podSelector: {}
---
kind: Deployment
metadata: {name: web, namespace: ns, labels: {app: web}}
---
kind: ConfigMap
metadata: {name: settings, namespace: ns}
---
kind: Deployment
metadata: {name: api, namespace: other}
"#,
    );
    let applied = resolved
        .edges
        .iter()
        .filter(|edge| edge.relation == RelationKind::AppliesTo)
        .map(|edge| edge.target.clone())
        .collect::<Vec<_>>();
    let in_ns = resources
        .in_namespace("ns")
        .map(Resource::key)
        .collect::<Vec<_>>();
    assert_eq!(applied, in_ns);
    assert_eq!(applied.len(), 3);
    assert!(applied.iter().all(|target| target.namespace == "ns"));
}

#[test]
fn repeated_references_produce_repeated_edges() {
    let (_, resolved) = build(
        r#"
kind: Secret
metadata: {name: shared}
---
kind: Deployment
metadata: {name: web}
spec:
  template:
    spec:
      containers:
        - envFrom: [{secretRef: {name: shared}}]
        - envFrom: [{secretRef: {name: shared}}]
"#,
    );
    assert_eq!(resolved.edges.len(), 2);
    assert_eq!(resolved.edges[0], resolved.edges[1]);
}

#[test]
fn facts_from_unknown_sources_are_dropped() {
    let resources = vec![Resource {
        kind: "Secret".to_string(),
        name: "s1".to_string(),
        ..Default::default()
    }]
    .into_iter()
    .collect::<ResourceSet>();
    let facts = vec![RelationFact {
        source: key("Deployment", "default", "ghost"),
        relation: RelationKind::UsesSecret,
        target: FactTarget::Key(key("Secret", "default", "s1")),
    }];
    let resolved = resolve(&resources, &facts);
    assert!(resolved.edges.is_empty());
    assert_eq!(resolved.unresolved[0].reason, UnresolvedReason::MissingSource);
}

#[test]
fn selector_without_matches_is_unresolved() {
    let resources = vec![Resource {
        kind: "Service".to_string(),
        name: "web".to_string(),
        ..Default::default()
    }]
    .into_iter()
    .collect::<ResourceSet>();
    let facts = vec![RelationFact {
        source: key("Service", "default", "web"),
        relation: RelationKind::Targets,
        target: FactTarget::Selector(labels(&[("app", "web")])),
    }];
    let resolved = resolve(&resources, &facts);
    assert!(resolved.edges.is_empty());
    assert_eq!(resolved.unresolved[0].reason, UnresolvedReason::NoSelectorMatch);
}

#[test]
fn overwritten_resource_contributes_only_its_latest_facts() {
    let (_, resolved) = build(
        r#"
kind: ConfigMap
metadata: {name: old-config}
---
kind: ConfigMap
metadata: {name: new-config}
---
kind: Deployment
metadata: {name: web}
spec:
  template:
    spec:
      volumes: [{name: c, configMap: {name: old-config}}]
---
kind: Deployment
metadata: {name: web}
spec:
  template:
    spec:
      volumes: [{name: c, configMap: {name: new-config}}]
"#,
    );
    assert_eq!(resolved.edges.len(), 1);
    assert_eq!(resolved.edges[0].target, key("ConfigMap", "default", "new-config"));
}

#[test]
fn resolution_order_is_stable() {
    let content = r#"
kind: Secret
metadata: {name: a}
---
kind: Secret
metadata: {name: b}
---
kind: Deployment
metadata: {name: web, labels: {app: web}}
spec:
  template:
    spec:
      containers:
        - envFrom: [{secretRef: {name: b}}, {secretRef: {name: a}}]
---
kind: Service
metadata: {name: web}
spec:
  selector: {app: web}
"#;
    let (_, first) = build(content);
    let (_, second) = build(content);
    assert_eq!(first.edges, second.edges);
    let targets = first
        .edges
        .iter()
        .map(|edge| edge.target.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(targets, vec!["b", "a", "web"]);
}

#[test]
fn manifest_graph_keeps_edges_in_resolution_order() {
    let content = r#"
kind: ServiceAccount
metadata: {name: runner}
---
kind: ConfigMap
metadata: {name: settings}
---
kind: Job
metadata: {name: migrate}
spec:
  template:
    spec:
      serviceAccountName: runner
      volumes: [{name: s, configMap: {name: settings}}]
---
kind: Secret
metadata: {name: unused}
"#;
    let normalized = normalize_stream(YamlStream::new(content, "test")).unwrap();
    let facts = extract_relations(&normalized.resources);
    let (graph, unresolved) = resolve_graph(&normalized.resources, &facts);
    assert!(unresolved.is_empty());
    assert_eq!(graph.stats(), (4, 2));

    let job = key("Job", "default", "migrate");
    let outgoing = graph
        .outgoing(&job)
        .into_iter()
        .map(|(target, relation)| (target.name.clone(), relation))
        .collect::<Vec<_>>();
    assert_eq!(
        outgoing,
        vec![
            ("runner".to_string(), RelationKind::UsesServiceaccount),
            ("settings".to_string(), RelationKind::MountsConfigmap),
        ]
    );
    assert_eq!(graph.incoming(&key("ConfigMap", "default", "settings")).len(), 1);
    assert_eq!(graph.isolated(), vec![&key("Secret", "default", "unused")]);
    assert_eq!(graph.edges(), resolve(&normalized.resources, &facts).edges);
}
