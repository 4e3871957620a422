use super::{DomainSpec, ObjectMeta, TemplateMeta, Volume};

/// VirtualMachine : A virtual machine definition as stored by the cluster.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(rename = "apiVersion", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(rename = "kind")]
    pub kind: String,
    #[serde(rename = "metadata", default)]
    pub metadata: ObjectMeta,
    #[serde(rename = "spec", default)]
    pub spec: VirtualMachineSpec,
    /// Reported by the cluster, never written by clients.
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachineSpec {
    #[serde(rename = "running", skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(rename = "template", default)]
    pub template: VirtualMachineTemplate,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachineTemplate {
    #[serde(rename = "metadata", default)]
    pub metadata: TemplateMeta,
    #[serde(rename = "spec", default)]
    pub spec: VirtualMachineInstanceSpec,
}

/// VirtualMachineInstanceSpec : Specification of the instance started from the
/// virtual machine. Networks are opaque objects (`pod`, `multus`, ...).
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachineInstanceSpec {
    #[serde(rename = "domain", default)]
    pub domain: DomainSpec,
    #[serde(rename = "networks", skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<serde_json::Value>>,
    #[serde(
        rename = "terminationGracePeriodSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub termination_grace_period_seconds: Option<i64>,
    #[serde(rename = "volumes", default)]
    pub volumes: Vec<Volume>,
}
