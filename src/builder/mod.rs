//! # VirtualMachine Builder Pattern
//!
//! This module turns a compact description of a virtual machine into a
//! complete KubeVirt `VirtualMachine` document. All fields of [VmBuilder] are
//! optional and are validated once you run the [`Builder::try_build`] method.
//! Once the build is successful, the document can be submitted as is to the
//! cluster.
//!
//! Generated disks and volumes are paired by name, see [naming] for the
//! naming rules.
//!
//! ## Example
//!
//! ```rust
//! use kubepilot::builder::{Builder, VmBuilder};
//!
//! let vm = VmBuilder::new()
//!     .with_name("fedora.test".to_string())
//!     .with_namespace("default".to_string())
//!     .with_memory_size_mb(1024)
//!     .with_cpu_cores(2)
//!     .with_pvc("fedora-root".to_string())
//!     .with_pvc("fedora-data".to_string())
//!     .try_build()
//!     .unwrap();
//!
//! let volumes = &vm.spec.template.spec.volumes;
//! assert_eq!(volumes[0].name, "fedora-test-disk-00");
//! assert_eq!(volumes[1].name, "fedora-test-disk-01");
//! ```
use std::collections::BTreeMap;

use kubepilot_models::models::{
    ContainerDiskSource, Cpu, Devices, Disk, DomainSpec, Machine, ObjectMeta,
    PersistentVolumeClaimSource, ResourceRequirements, TemplateMeta, VirtualMachine,
    VirtualMachineInstanceSpec, VirtualMachineSpec, VirtualMachineTemplate, Volume, API_VERSION,
    VIRTUAL_MACHINE_KIND, VM_NAME_LABEL,
};
use serde::Deserializer;
use serde_json::{Map, Value};

use crate::merge::Merge;

pub mod client;
pub mod naming;

/// Bus used by every generated disk.
pub const DISK_BUS: &str = "virtio";

fn require<T>(key: &str, value: Option<T>) -> Result<T, BuilderError> {
    match value {
        Some(value) => Ok(value),
        None => Err(BuilderError::MissingRequiredField(key.to_string())),
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// The field is required but was not provided in the builder object
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    /// Neither an image nor a persistent volume claim was given, the VM
    /// would have nothing to boot from
    #[error("A virtual machine needs an image or at least one persistent volume claim")]
    MissingBootSource,
    /// The API endpoint could not be parsed or uses an unsupported scheme
    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),
    /// The endpoint points to a Unix socket which doesn't exist
    #[error("Unix socket not found: {0}")]
    SocketNotFound(String),
}

/// Generic trait which all builder components must implement
pub trait Builder<T> {
    /// Validate all the fields from the builder object and apply it to the
    /// final object
    ///
    /// ## Example
    ///
    /// ```rust
    /// use kubepilot::builder::{Builder, BuilderError, VmBuilder};
    ///
    /// let result = VmBuilder::new()
    ///     .with_name("no-disk".to_string())
    ///     .with_memory_size_mb(512)
    ///     .try_build();
    /// assert_eq!(result.unwrap_err(), BuilderError::MissingBootSource);
    /// ```
    fn try_build(self) -> Result<T, BuilderError>;
}

/// Parameters accepted when creating a virtual machine.
///
/// It can be deserialized from JSON, `pvc` is accepted as an alias of
/// `pvcNames` and may hold a single claim name:
///
/// ```json
/// { "name": "demo", "memorySizeMB": 512, "pvc": "demo-root" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmCreateParameters {
    /// Name of the resource, also used for the `kubevirt.io/vm` label
    pub name: String,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    /// Memory requested for the instance, in megabytes
    #[serde(rename = "memorySizeMB")]
    pub memory_size_mb: u64,
    /// Container disk image to boot from, takes precedence over `pvc_names`
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "pvc", deserialize_with = "one_or_many")]
    pub pvc_names: Vec<String>,
    /// NoCloud payload, no cloud-init volume is created when empty
    #[serde(default)]
    pub cloud_init: Map<String, Value>,
    /// e.g. `[{"name": "default", "pod": {}}]`
    #[serde(default)]
    pub networks: Option<Vec<Value>>,
    /// e.g. `[{"name": "default", "bridge": {}}]`
    #[serde(default)]
    pub interfaces: Option<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match <OneOrMany as serde::Deserialize>::deserialize(deserializer)? {
            OneOrMany::One(pvc) => vec![pvc],
            OneOrMany::Many(pvcs) => pvcs,
        },
    )
}

/// Builder of a [VirtualMachine] document, it doesn't talk to the cluster.
#[derive(Debug, Default)]
pub struct VmBuilder {
    name: Option<String>,
    namespace: Option<String>,
    cpu_cores: Option<u32>,
    memory_size_mb: Option<u64>,
    image: Option<String>,
    pvc_names: Vec<String>,
    cloud_init: Map<String, Value>,
    networks: Option<Vec<Value>>,
    interfaces: Option<Vec<Value>>,
}

impl VmBuilder {
    pub fn new() -> VmBuilder {
        VmBuilder::default()
    }

    pub fn with_name(mut self, name: String) -> VmBuilder {
        self.name = Some(name);
        self
    }

    pub fn with_namespace(mut self, namespace: String) -> VmBuilder {
        self.namespace = Some(namespace);
        self
    }

    pub fn with_cpu_cores(mut self, cores: u32) -> VmBuilder {
        self.cpu_cores = Some(cores);
        self
    }

    pub fn with_memory_size_mb(mut self, memory_size_mb: u64) -> VmBuilder {
        self.memory_size_mb = Some(memory_size_mb);
        self
    }

    pub fn with_image(mut self, image: String) -> VmBuilder {
        self.image = Some(image);
        self
    }

    /// Append a persistent volume claim, claims are attached in insertion order
    pub fn with_pvc(mut self, claim_name: String) -> VmBuilder {
        self.pvc_names.push(claim_name);
        self
    }

    pub fn with_cloud_init(mut self, cloud_init: Map<String, Value>) -> VmBuilder {
        self.cloud_init = cloud_init;
        self
    }

    pub fn with_networks(mut self, networks: Vec<Value>) -> VmBuilder {
        self.networks = Some(networks);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<Value>) -> VmBuilder {
        self.interfaces = Some(interfaces);
        self
    }
}

impl From<VmCreateParameters> for VmBuilder {
    fn from(params: VmCreateParameters) -> Self {
        VmBuilder {
            name: Some(params.name),
            namespace: None,
            cpu_cores: params.cpu_cores,
            memory_size_mb: Some(params.memory_size_mb),
            image: params.image,
            pvc_names: params.pvc_names,
            cloud_init: params.cloud_init,
            networks: params.networks,
            interfaces: params.interfaces,
        }
    }
}

fn virtio_disk(name: &str) -> Disk {
    Disk::new(name.to_string(), DISK_BUS.to_string())
}

fn vm_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(VM_NAME_LABEL.to_string(), name.to_string())])
}

impl Builder<VirtualMachine> for VmBuilder {
    fn try_build(self) -> Result<VirtualMachine, BuilderError> {
        let name = require(stringify!(self.name), self.name)?;
        let memory_size_mb = require(stringify!(self.memory_size_mb), self.memory_size_mb)?;

        let image = self.image.filter(|image| !image.is_empty());
        if image.is_none() && self.pvc_names.is_empty() {
            return Err(BuilderError::MissingBootSource);
        }

        let prefix = naming::normalize_vm_name(&name);
        let (mut disks, mut volumes): (Vec<Disk>, Vec<Volume>) = match image {
            Some(image) => {
                let volume_name = naming::image_volume_name(&prefix);
                let volume = Volume {
                    container_disk: Some(ContainerDiskSource { image }),
                    ..Volume::new(volume_name.clone())
                };
                (vec![virtio_disk(&volume_name)], vec![volume])
            }
            None => self
                .pvc_names
                .into_iter()
                .enumerate()
                .map(|(index, claim_name)| {
                    let volume_name = naming::pvc_volume_name(&prefix, index);
                    let volume = Volume {
                        persistent_volume_claim: Some(PersistentVolumeClaimSource { claim_name }),
                        ..Volume::new(volume_name.clone())
                    };
                    (virtio_disk(&volume_name), volume)
                })
                .unzip(),
        };

        // The cloud-init disk always comes after the boot disks
        if !self.cloud_init.is_empty() {
            volumes.push(Volume {
                cloud_init_no_cloud: Some(self.cloud_init),
                ..Volume::new(naming::CLOUD_INIT_VOLUME.to_string())
            });
            disks.push(virtio_disk(naming::CLOUD_INIT_VOLUME));
        }

        let mut vm = VirtualMachine {
            api_version: Some(API_VERSION.to_string()),
            kind: VIRTUAL_MACHINE_KIND.to_string(),
            metadata: ObjectMeta {
                namespace: self.namespace,
                labels: Some(vm_labels(&name)),
                ..ObjectMeta::new(name.clone())
            },
            spec: VirtualMachineSpec {
                running: Some(false),
                template: VirtualMachineTemplate {
                    metadata: TemplateMeta {
                        creation_timestamp: None,
                        labels: Some(vm_labels(&name)),
                    },
                    spec: VirtualMachineInstanceSpec {
                        domain: DomainSpec {
                            cpu: None,
                            devices: Devices {
                                disks,
                                interfaces: None,
                            },
                            machine: Some(Machine::new(String::new())),
                            resources: ResourceRequirements {
                                requests: Some(BTreeMap::from([(
                                    "memory".to_string(),
                                    format!("{}M", memory_size_mb),
                                )])),
                            },
                        },
                        networks: None,
                        termination_grace_period_seconds: Some(0),
                        volumes,
                    },
                },
            },
            status: None,
        };

        let template = &mut vm.spec.template.spec;
        template.domain.cpu.merge(self.cpu_cores.map(Cpu::new));
        template.networks.merge(self.networks);
        template.domain.devices.interfaces.merge(self.interfaces);

        Ok(vm)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn params(name: &str) -> VmCreateParameters {
        VmCreateParameters {
            name: name.to_string(),
            memory_size_mb: 512,
            ..VmCreateParameters::default()
        }
    }

    fn build(params: VmCreateParameters) -> Result<VirtualMachine, BuilderError> {
        VmBuilder::from(params)
            .with_namespace("default".to_string())
            .try_build()
    }

    fn disk_names(vm: &VirtualMachine) -> Vec<&str> {
        vm.spec.template.spec.domain.devices.disks.iter().map(|d| d.name.as_str()).collect()
    }

    fn volume_names(vm: &VirtualMachine) -> Vec<&str> {
        vm.spec.template.spec.volumes.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn require_field() {
        assert_eq!(require("x", Some(1)), Ok(1));
        assert_eq!(
            require::<String>("y", None),
            Err(BuilderError::MissingRequiredField("y".to_string()))
        );
    }

    #[test]
    fn stringify_from_struct() {
        let _str = VmBuilder::new();
        assert_eq!(stringify!(_str.name), "_str.name");
    }

    #[test]
    fn missing_name() {
        let vm = VmBuilder::new()
            .with_memory_size_mb(512)
            .with_image("fedora".to_string())
            .try_build();
        assert_eq!(
            vm.unwrap_err(),
            BuilderError::MissingRequiredField(stringify!(self.name).to_string())
        );
    }

    #[test]
    fn missing_memory() {
        let vm = VmBuilder::new()
            .with_name("demo".to_string())
            .with_image("fedora".to_string())
            .try_build();
        assert_eq!(
            vm.unwrap_err(),
            BuilderError::MissingRequiredField(stringify!(self.memory_size_mb).to_string())
        );
    }

    #[test]
    fn no_boot_source() {
        assert_eq!(build(params("demo")).unwrap_err(), BuilderError::MissingBootSource);
    }

    #[test]
    fn empty_image_is_no_boot_source() {
        let vm = build(VmCreateParameters {
            image: Some(String::new()),
            ..params("demo")
        });
        assert_eq!(vm.unwrap_err(), BuilderError::MissingBootSource);
    }

    #[test]
    fn image_creates_single_disk() {
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            ..params("my.vm_1")
        })
        .unwrap();

        assert_eq!(disk_names(&vm), vec!["my-vm-1-disk-01"]);
        assert_eq!(volume_names(&vm), vec!["my-vm-1-disk-01"]);
        let volume = &vm.spec.template.spec.volumes[0];
        assert_eq!(volume.container_disk.as_ref().unwrap().image, "fedora");
        assert_eq!(volume.persistent_volume_claim, None);
        // raw name is kept for the resource itself
        assert_eq!(vm.metadata.name.as_deref(), Some("my.vm_1"));
    }

    #[test]
    fn image_takes_precedence_over_pvcs() {
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            pvc_names: vec!["root".to_string()],
            ..params("demo")
        })
        .unwrap();
        assert_eq!(volume_names(&vm), vec!["demo-disk-01"]);
    }

    #[test]
    fn pvcs_create_one_disk_each_in_order() {
        let vm = build(VmCreateParameters {
            pvc_names: vec!["root".to_string(), "data".to_string(), "logs".to_string()],
            ..params("db_01")
        })
        .unwrap();

        assert_eq!(disk_names(&vm), vec!["db-01-disk-00", "db-01-disk-01", "db-01-disk-02"]);
        assert_eq!(volume_names(&vm), disk_names(&vm));
        let claims: Vec<&str> = vm
            .spec
            .template
            .spec
            .volumes
            .iter()
            .map(|v| v.persistent_volume_claim.as_ref().unwrap().claim_name.as_str())
            .collect();
        assert_eq!(claims, vec!["root", "data", "logs"]);
    }

    #[test]
    fn pvc_index_is_not_padded() {
        let vm = build(VmCreateParameters {
            pvc_names: (0..11).map(|i| format!("claim-{}", i)).collect(),
            ..params("big")
        })
        .unwrap();
        let names = disk_names(&vm);
        assert_eq!(names.len(), 11);
        assert_eq!(names[9], "big-disk-09");
        assert_eq!(names[10], "big-disk-010");
    }

    #[test]
    fn cloud_init_disk_is_last() {
        let payload = json!({"userData": "#cloud-config\npassword: fedora\n"});
        let vm = build(VmCreateParameters {
            pvc_names: vec!["root".to_string(), "data".to_string()],
            cloud_init: payload.as_object().unwrap().clone(),
            ..params("demo")
        })
        .unwrap();

        assert_eq!(
            disk_names(&vm),
            vec!["demo-disk-00", "demo-disk-01", naming::CLOUD_INIT_VOLUME]
        );
        assert_eq!(volume_names(&vm), disk_names(&vm));
        let volume = vm.spec.template.spec.volumes.last().unwrap();
        assert_eq!(
            volume.cloud_init_no_cloud.clone().map(Value::Object),
            Some(payload)
        );
    }

    #[test]
    fn every_disk_uses_virtio() {
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            cloud_init: json!({"userData": "x"}).as_object().unwrap().clone(),
            ..params("demo")
        })
        .unwrap();
        for disk in &vm.spec.template.spec.domain.devices.disks {
            assert_eq!(disk.disk.as_ref().unwrap().bus.as_deref(), Some(DISK_BUS));
        }
    }

    #[test]
    fn demo_document() {
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            cpu_cores: Some(2),
            ..params("demo")
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&vm).unwrap(),
            json!({
                "apiVersion": "kubevirt.io/v1",
                "kind": "VirtualMachine",
                "metadata": {
                    "labels": {"kubevirt.io/vm": "demo"},
                    "name": "demo",
                    "namespace": "default"
                },
                "spec": {
                    "running": false,
                    "template": {
                        "metadata": {
                            "creationTimestamp": null,
                            "labels": {"kubevirt.io/vm": "demo"}
                        },
                        "spec": {
                            "domain": {
                                "cpu": {"cores": 2},
                                "devices": {
                                    "disks": [{"disk": {"bus": "virtio"}, "name": "demo-disk-01"}]
                                },
                                "machine": {"type": ""},
                                "resources": {"requests": {"memory": "512M"}}
                            },
                            "terminationGracePeriodSeconds": 0,
                            "volumes": [{"containerDisk": {"image": "fedora"}, "name": "demo-disk-01"}]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn optional_sections_are_omitted() {
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            ..params("demo")
        })
        .unwrap();
        let doc = serde_json::to_value(&vm).unwrap();
        let spec = &doc["spec"]["template"]["spec"];
        assert!(spec["domain"].get("cpu").is_none());
        assert!(spec.get("networks").is_none());
        assert!(spec["domain"]["devices"].get("interfaces").is_none());
    }

    #[test]
    fn networks_and_interfaces_are_passed_through() {
        let networks = vec![
            json!({"name": "default", "pod": {}}),
            json!({"name": "ovs-red", "multus": {"networkName": "red"}}),
        ];
        let interfaces = vec![
            json!({"name": "default", "bridge": {}}),
            json!({"name": "red", "bridge": {}, "bootOrder": 1, "macAddress": "12:34:56:AB:CD:EF"}),
        ];
        let vm = build(VmCreateParameters {
            image: Some("fedora".to_string()),
            networks: Some(networks.clone()),
            interfaces: Some(interfaces.clone()),
            ..params("demo")
        })
        .unwrap();

        let spec = &vm.spec.template.spec;
        assert_eq!(spec.networks, Some(networks));
        assert_eq!(spec.domain.devices.interfaces, Some(interfaces));
        assert_eq!(spec.domain.cpu, None);
    }

    #[test]
    fn parameters_from_json() {
        let params: VmCreateParameters = serde_json::from_value(json!({
            "name": "demo",
            "memorySizeMB": 2048,
            "cpuCores": 4,
            "pvc": "demo-root",
            "cloudInit": {"userData": "#cloud-config"}
        }))
        .unwrap();
        assert_eq!(params.pvc_names, vec!["demo-root".to_string()]);
        assert_eq!(params.cpu_cores, Some(4));
        assert_eq!(params.memory_size_mb, 2048);
        assert_eq!(params.image, None);

        let params: VmCreateParameters = serde_json::from_value(json!({
            "name": "demo",
            "memorySizeMB": 2048,
            "pvcNames": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(params.pvc_names, vec!["a".to_string(), "b".to_string()]);
        assert!(params.cloud_init.is_empty());
    }
}
