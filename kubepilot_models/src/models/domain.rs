use std::collections::BTreeMap;

/// DomainSpec : Hardware of the virtual machine instance.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainSpec {
    #[serde(rename = "cpu", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    #[serde(rename = "devices", default)]
    pub devices: Devices,
    #[serde(rename = "machine", skip_serializing_if = "Option::is_none")]
    pub machine: Option<Machine>,
    #[serde(rename = "resources", default)]
    pub resources: ResourceRequirements,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Cpu {
    #[serde(rename = "cores", skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
}

impl Cpu {
    pub fn new(cores: u32) -> Cpu {
        Cpu { cores: Some(cores) }
    }
}

/// Devices : Disks and network interfaces attached to the domain.
///
/// Interfaces are opaque objects, they are correlated to the networks of the
/// instance by their `name` field.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Devices {
    #[serde(rename = "disks", default)]
    pub disks: Vec<Disk>,
    #[serde(rename = "interfaces", skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<serde_json::Value>>,
}

/// Disk : Attaches the volume of the same name to the domain.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Disk {
    #[serde(rename = "disk", skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskTarget>,
    #[serde(rename = "name")]
    pub name: String,
}

impl Disk {
    pub fn new(name: String, bus: String) -> Disk {
        Disk {
            disk: Some(DiskTarget { bus: Some(bus) }),
            name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DiskTarget {
    #[serde(rename = "bus", skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Machine {
    #[serde(rename = "type")]
    pub _type: String,
}

impl Machine {
    pub fn new(_type: String) -> Machine {
        Machine { _type }
    }
}

/// ResourceRequirements : Quantities requested for the instance, e.g.
/// `memory: "512M"`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(rename = "requests", skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, String>>,
}
