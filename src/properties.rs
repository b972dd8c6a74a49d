//! [crate::properties] holds the node and edge vocabulary of a manifest graph: the
//! [Resource] record, its [ResourceKey] identity, and the [RelationKind] edge tags.
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::ManifestGraphError;

pub const DEFAULT_API_VERSION: &str = "Unknown";
pub const DEFAULT_NAME: &str = "Unnamed";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_PROTOCOL: &str = "TCP";

/// Label mappings (and label selectors) are plain string to string maps.
pub type Labels = BTreeMap<String, String>;

/// Identity of a [Resource] within one run: `(kind, namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        ResourceKey {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// One entry of a Service's `ports` list. `port` is kept as text since manifests use both
/// numeric and named ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub port: Option<String>,
    pub protocol: String,
}

impl Display for Port {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Port: {}, Protocol: {}",
            self.port.as_deref().unwrap_or("None"),
            self.protocol
        )
    }
}

/// A normalized manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
}

impl Default for Resource {
    fn default() -> Self {
        Resource {
            kind: String::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            name: DEFAULT_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            labels: Labels::default(),
            image: None,
            service_account_name: None,
            ports: Vec::new(),
        }
    }
}

impl Resource {
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, &self.namespace, &self.name)
    }

    pub fn known_kind(&self) -> Option<KnownKind> {
        KnownKind::from_kind(&self.kind)
    }

    /// Label-subset containment: every selector pair must be present and equal in
    /// `self.labels`. An empty selector matches everything.
    pub fn matches_selector(&self, selector: &Labels) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|label| label == v))
    }
}

/// [RelationKind] tags the semantic meaning of an edge between two resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    UsesSecret,
    UsesConfigmap,
    MountsConfigmap,
    MountsSecret,
    MountsPersistentvolumeclaim,
    UsesServiceaccount,
    Targets,
    RoutesTo,
    AppliesTo,
    Controls,
}

impl RelationKind {
    pub fn all() -> &'static [RelationKind] {
        &[
            RelationKind::UsesSecret,
            RelationKind::UsesConfigmap,
            RelationKind::MountsConfigmap,
            RelationKind::MountsSecret,
            RelationKind::MountsPersistentvolumeclaim,
            RelationKind::UsesServiceaccount,
            RelationKind::Targets,
            RelationKind::RoutesTo,
            RelationKind::AppliesTo,
            RelationKind::Controls,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::UsesSecret => "uses_secret",
            RelationKind::UsesConfigmap => "uses_configmap",
            RelationKind::MountsConfigmap => "mounts_configmap",
            RelationKind::MountsSecret => "mounts_secret",
            RelationKind::MountsPersistentvolumeclaim => "mounts_persistentvolumeclaim",
            RelationKind::UsesServiceaccount => "uses_serviceaccount",
            RelationKind::Targets => "targets",
            RelationKind::RoutesTo => "routes_to",
            RelationKind::AppliesTo => "applies_to",
            RelationKind::Controls => "controls",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = ManifestGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::all()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| ManifestGraphError::Serialization(format!("Unknown relation kind '{s}'")))
    }
}

/// The finite set of kinds that carry extraction rules. Any other `kind` string is still a
/// valid [Resource]; it just contributes no relationships of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KnownKind {
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    Job,
    CronJob,
    Service,
    Ingress,
    NetworkPolicy,
    HorizontalPodAutoscaler,
}

impl KnownKind {
    pub fn all() -> &'static [KnownKind] {
        &[
            KnownKind::Pod,
            KnownKind::Deployment,
            KnownKind::StatefulSet,
            KnownKind::DaemonSet,
            KnownKind::ReplicaSet,
            KnownKind::Job,
            KnownKind::CronJob,
            KnownKind::Service,
            KnownKind::Ingress,
            KnownKind::NetworkPolicy,
            KnownKind::HorizontalPodAutoscaler,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownKind::Pod => "Pod",
            KnownKind::Deployment => "Deployment",
            KnownKind::StatefulSet => "StatefulSet",
            KnownKind::DaemonSet => "DaemonSet",
            KnownKind::ReplicaSet => "ReplicaSet",
            KnownKind::Job => "Job",
            KnownKind::CronJob => "CronJob",
            KnownKind::Service => "Service",
            KnownKind::Ingress => "Ingress",
            KnownKind::NetworkPolicy => "NetworkPolicy",
            KnownKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
        }
    }

    /// Kind tags are matched exactly, the way the API server treats them.
    pub fn from_kind(kind: &str) -> Option<KnownKind> {
        KnownKind::all().iter().find(|k| k.as_str() == kind).copied()
    }

    /// Kinds whose documents embed a pod spec.
    pub fn has_pod_spec(&self) -> bool {
        matches!(
            self,
            KnownKind::Pod
                | KnownKind::Deployment
                | KnownKind::StatefulSet
                | KnownKind::DaemonSet
                | KnownKind::ReplicaSet
                | KnownKind::Job
                | KnownKind::CronJob
        )
    }
}

impl Display for KnownKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
