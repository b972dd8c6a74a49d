//! Relationship Extractor: kind-indexed extraction rules.
//!
//! Each known kind maps to an [`ExtractionRule`]: one function that fills the optional
//! resource attributes (image, serviceAccountName, ports) during normalization, and one
//! that emits unresolved [`RelationFact`]s once the resource set is complete. Kinds
//! that are not in the table get neither.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use super::{lookup, non_empty_string, scalar_string, sequence_at, string_map_at};
use crate::{
    graph::ResourceSet,
    properties::{KnownKind, Labels, Port, RelationKind, Resource, ResourceKey, DEFAULT_PROTOCOL},
};

/// What a relationship fact points at before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactTarget {
    /// Exact identity key lookup
    Key(ResourceKey),
    /// Label selector matched against every resource of the source namespace
    Selector(Labels),
}

impl Display for FactTarget {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FactTarget::Key(key) => write!(f, "{key}"),
            FactTarget::Selector(selector) => {
                let pairs = selector
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "selector{{{pairs}}}")
            }
        }
    }
}

/// An unresolved relationship discovered in one resource's document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFact {
    pub source: ResourceKey,
    pub relation: RelationKind,
    pub target: FactTarget,
}

impl RelationFact {
    fn keyed(source: &Resource, relation: RelationKind, kind: &str, name: String) -> Self {
        RelationFact {
            source: source.key(),
            relation,
            target: FactTarget::Key(ResourceKey::new(kind, &source.namespace, name)),
        }
    }

    fn selected(source: &Resource, relation: RelationKind, selector: Labels) -> Self {
        RelationFact {
            source: source.key(),
            relation,
            target: FactTarget::Selector(selector),
        }
    }
}

pub type AttributeFn = fn(KnownKind, &Value, &mut Resource);
pub type RelationFn = fn(KnownKind, &Resource, &Value, &mut Vec<RelationFact>);

#[derive(Clone, Copy)]
pub struct ExtractionRule {
    pub kind: KnownKind,
    pub attributes: AttributeFn,
    pub relations: RelationFn,
}

impl ExtractionRule {
    pub fn for_kind(kind: KnownKind) -> Self {
        let (attributes, relations): (AttributeFn, RelationFn) = match kind {
            KnownKind::Pod
            | KnownKind::Deployment
            | KnownKind::StatefulSet
            | KnownKind::DaemonSet
            | KnownKind::ReplicaSet
            | KnownKind::Job
            | KnownKind::CronJob => (pod_attributes, pod_relations),
            KnownKind::Service => (service_attributes, service_relations),
            KnownKind::Ingress => (no_attributes, ingress_relations),
            KnownKind::NetworkPolicy => (no_attributes, network_policy_relations),
            KnownKind::HorizontalPodAutoscaler => (no_attributes, autoscaler_relations),
        };
        ExtractionRule {
            kind,
            attributes,
            relations,
        }
    }
}

/// Global rule table, keyed by the exact `kind` tag.
pub static RULES: Lazy<BTreeMap<&'static str, ExtractionRule>> = Lazy::new(|| {
    KnownKind::all()
        .iter()
        .map(|kind| (kind.as_str(), ExtractionRule::for_kind(*kind)))
        .collect()
});

pub fn rule_for(kind: &str) -> Option<&'static ExtractionRule> {
    RULES.get(kind)
}

/// Fill the kind-specific optional attributes of a freshly normalized resource.
pub fn apply_attributes(resource: &mut Resource, document: &Value) {
    if let Some(rule) = rule_for(&resource.kind) {
        (rule.attributes)(rule.kind, document, resource);
    }
}

/// Facts of a single resource, in document order.
pub fn extract_resource(resource: &Resource, document: &Value) -> Vec<RelationFact> {
    let mut facts = Vec::new();
    match rule_for(&resource.kind) {
        Some(rule) => (rule.relations)(rule.kind, resource, document, &mut facts),
        None => {
            tracing::trace!("[extract] no rule for kind {}, skipping", resource.kind);
        }
    }
    facts
}

/// Facts of every resource, in resource-set order.
pub fn extract_relations(resources: &ResourceSet) -> Vec<RelationFact> {
    let facts = resources
        .entries()
        .flat_map(|entry| extract_resource(&entry.resource, &entry.document))
        .collect::<Vec<_>>();
    tracing::debug!(
        "[extract] {} fact(s) from {} resource(s)",
        facts.len(),
        resources.len()
    );
    facts
}

/// Locate the pod spec of a pod-spec-bearing kind.
pub fn pod_spec(kind: KnownKind, document: &Value) -> Option<&Value> {
    let spec = match kind {
        KnownKind::Pod => lookup(document, &["spec"]),
        KnownKind::CronJob => {
            lookup(document, &["spec", "jobTemplate", "spec", "template", "spec"])
                .or_else(|| lookup(document, &["spec", "template", "spec"]))
        }
        _ => lookup(document, &["spec", "template", "spec"]),
    };
    spec.filter(|spec| spec.is_mapping())
}

fn no_attributes(_kind: KnownKind, _document: &Value, _resource: &mut Resource) {}

fn pod_attributes(kind: KnownKind, document: &Value, resource: &mut Resource) {
    let Some(spec) = pod_spec(kind, document) else {
        return;
    };
    resource.service_account_name = non_empty_string(spec, &["serviceAccountName"]);
    resource.image = sequence_at(spec, &["containers"])
        .first()
        .and_then(|container| non_empty_string(container, &["image"]));
}

fn service_attributes(_kind: KnownKind, document: &Value, resource: &mut Resource) {
    resource.ports = sequence_at(document, &["spec", "ports"])
        .iter()
        .map(|entry| Port {
            port: lookup(entry, &["port"]).and_then(scalar_string),
            protocol: non_empty_string(entry, &["protocol"])
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
        })
        .collect();
}

fn pod_relations(kind: KnownKind, resource: &Resource, document: &Value, out: &mut Vec<RelationFact>) {
    let Some(spec) = pod_spec(kind, document) else {
        return;
    };

    if let Some(account) = non_empty_string(spec, &["serviceAccountName"]) {
        out.push(RelationFact::keyed(
            resource,
            RelationKind::UsesServiceaccount,
            "ServiceAccount",
            account,
        ));
    }

    let containers = sequence_at(spec, &["containers"])
        .iter()
        .chain(sequence_at(spec, &["initContainers"]));
    for container in containers {
        container_relations(resource, container, out);
    }

    for volume in sequence_at(spec, &["volumes"]) {
        volume_relations(resource, volume, out);
    }
}

fn container_relations(resource: &Resource, container: &Value, out: &mut Vec<RelationFact>) {
    for env in sequence_at(container, &["env"]) {
        let Some(value_from) = lookup(env, &["valueFrom"]) else {
            continue;
        };
        if let Some(name) = non_empty_string(value_from, &["secretKeyRef", "name"]) {
            out.push(RelationFact::keyed(resource, RelationKind::UsesSecret, "Secret", name));
        }
        if let Some(name) = non_empty_string(value_from, &["configMapKeyRef", "name"]) {
            out.push(RelationFact::keyed(
                resource,
                RelationKind::UsesConfigmap,
                "ConfigMap",
                name,
            ));
        }
    }

    for import in sequence_at(container, &["envFrom"]) {
        if let Some(name) = non_empty_string(import, &["secretRef", "name"]) {
            out.push(RelationFact::keyed(resource, RelationKind::UsesSecret, "Secret", name));
        }
        if let Some(name) = non_empty_string(import, &["configMapRef", "name"]) {
            out.push(RelationFact::keyed(
                resource,
                RelationKind::UsesConfigmap,
                "ConfigMap",
                name,
            ));
        }
    }
}

const VOLUME_SOURCES: &[(&str, RelationKind, &str)] = &[
    ("configMap", RelationKind::MountsConfigmap, "ConfigMap"),
    ("secret", RelationKind::MountsSecret, "Secret"),
    (
        "persistentVolumeClaim",
        RelationKind::MountsPersistentvolumeclaim,
        "PersistentVolumeClaim",
    ),
];

fn volume_relations(resource: &Resource, volume: &Value, out: &mut Vec<RelationFact>) {
    for (field, relation, target_kind) in VOLUME_SOURCES {
        let Some(source) = lookup(volume, &[*field]) else {
            continue;
        };
        let name = ["name", "claimName", "secretName"]
            .iter()
            .find_map(|key| non_empty_string(source, &[*key]));
        if let Some(name) = name {
            out.push(RelationFact::keyed(resource, *relation, target_kind, name));
        }
    }
}

fn service_relations(_kind: KnownKind, resource: &Resource, document: &Value, out: &mut Vec<RelationFact>) {
    let selector = string_map_at(document, &["spec", "selector"]);
    if !selector.is_empty() {
        out.push(RelationFact::selected(resource, RelationKind::Targets, selector));
    }
}

/// Backend service name, accepting both `networking.k8s.io/v1` and the older
/// `serviceName` form.
fn backend_service(backend: &Value) -> Option<String> {
    non_empty_string(backend, &["service", "name"])
        .or_else(|| non_empty_string(backend, &["serviceName"]))
}

fn ingress_relations(_kind: KnownKind, resource: &Resource, document: &Value, out: &mut Vec<RelationFact>) {
    for rule in sequence_at(document, &["spec", "rules"]) {
        for path in sequence_at(rule, &["http", "paths"]) {
            if let Some(service) = lookup(path, &["backend"]).and_then(backend_service) {
                out.push(RelationFact::keyed(resource, RelationKind::RoutesTo, "Service", service));
            }
        }
    }

    let default_backend = lookup(document, &["spec", "defaultBackend"])
        .or_else(|| lookup(document, &["spec", "backend"]));
    if let Some(service) = default_backend.and_then(backend_service) {
        out.push(RelationFact::keyed(resource, RelationKind::RoutesTo, "Service", service));
    }

    for tls in sequence_at(document, &["spec", "tls"]) {
        if let Some(secret) = non_empty_string(tls, &["secretName"]) {
            out.push(RelationFact::keyed(resource, RelationKind::UsesSecret, "Secret", secret));
        }
    }
}

fn network_policy_relations(
    _kind: KnownKind,
    resource: &Resource,
    document: &Value,
    out: &mut Vec<RelationFact>,
) {
    // An absent or empty podSelector selects every pod of the namespace.
    let selector = string_map_at(document, &["spec", "podSelector", "matchLabels"]);
    out.push(RelationFact::selected(resource, RelationKind::AppliesTo, selector));
}

fn autoscaler_relations(
    _kind: KnownKind,
    resource: &Resource,
    document: &Value,
    out: &mut Vec<RelationFact>,
) {
    let target = lookup(document, &["spec", "scaleTargetRef"]);
    let kind = target.and_then(|t| non_empty_string(t, &["kind"]));
    let name = target.and_then(|t| non_empty_string(t, &["name"]));
    if let (Some(kind), Some(name)) = (kind, name) {
        out.push(RelationFact::keyed(resource, RelationKind::Controls, &kind, name));
    }
}
