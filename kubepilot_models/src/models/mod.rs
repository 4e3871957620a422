pub mod domain;
pub use self::domain::{Cpu, Devices, Disk, DiskTarget, DomainSpec, Machine, ResourceRequirements};
pub mod object_meta;
pub use self::object_meta::{ListMeta, ObjectMeta, TemplateMeta};
pub mod virtual_machine;
pub use self::virtual_machine::{
    VirtualMachine, VirtualMachineInstanceSpec, VirtualMachineSpec, VirtualMachineTemplate,
};
pub mod virtual_machine_list;
pub use self::virtual_machine_list::VirtualMachineList;
pub mod volume;
pub use self::volume::{ContainerDiskSource, PersistentVolumeClaimSource, Volume};

/// API group and version of every KubeVirt object in this crate.
pub const API_VERSION: &str = "kubevirt.io/v1";
/// Kind of a single virtual machine object.
pub const VIRTUAL_MACHINE_KIND: &str = "VirtualMachine";
/// Label carrying the virtual machine name on the VM and its template.
pub const VM_NAME_LABEL: &str = "kubevirt.io/vm";
