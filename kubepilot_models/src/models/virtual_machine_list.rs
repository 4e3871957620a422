use super::{ListMeta, VirtualMachine};

/// VirtualMachineList : Envelope returned when listing virtual machines.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachineList {
    #[serde(rename = "apiVersion", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(rename = "kind", default)]
    pub kind: String,
    #[serde(rename = "metadata", default)]
    pub metadata: ListMeta,
    #[serde(rename = "items", default)]
    pub items: Vec<VirtualMachine>,
}
