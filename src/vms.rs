//! # Virtual machine collection
//!
//! [Vms] lists, fetches and creates virtual machines through a [VmService].
//! Objects returned by the cluster are wrapped in [Vm].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//!
//! use kubepilot::builder::{client::ClientBuilder, Builder, VmCreateParameters};
//! use kubepilot::vms::Vms;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vms = Vms::new(ClientBuilder::auto().try_build()?);
//!     let list = vms.list(&BTreeMap::new()).await?;
//!     println!("{} VMs at version {}", list.len(), list.resource_version);
//!
//!     let vm = vms
//!         .create(VmCreateParameters {
//!             name: "demo".to_string(),
//!             memory_size_mb: 512,
//!             image: Some("quay.io/kubevirt/cirros-container-disk-demo".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("created {} ({:?})", vm.name(), vm.uid());
//!     Ok(())
//! }
//! ```
use std::collections::BTreeMap;

use kubepilot_models::models::{Disk, VirtualMachine, VirtualMachineList, Volume};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::{
    builder::{Builder, BuilderError, VmBuilder, VmCreateParameters},
    service::{check_vm_name, ClientError, VmService},
};

#[derive(thiserror::Error, Debug)]
pub enum VmsError {
    #[error("Invalid virtual machine definition: {0}")]
    Build(#[from] BuilderError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A virtual machine as returned by the cluster
#[derive(Debug, Clone, PartialEq)]
pub struct Vm {
    raw: VirtualMachine,
}

impl From<VirtualMachine> for Vm {
    fn from(raw: VirtualMachine) -> Self {
        Vm { raw }
    }
}

impl Vm {
    pub fn name(&self) -> &str {
        self.raw.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.raw.metadata.namespace.as_deref()
    }

    /// Assigned by the server once the VM is created
    pub fn uid(&self) -> Option<Uuid> {
        self.raw.metadata.uid
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.raw.metadata.resource_version.as_deref()
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.raw.metadata.labels.as_ref()
    }

    pub fn running(&self) -> bool {
        self.raw.spec.running.unwrap_or(false)
    }

    pub fn cpu_cores(&self) -> Option<u32> {
        self.raw
            .spec
            .template
            .spec
            .domain
            .cpu
            .as_ref()
            .and_then(|cpu| cpu.cores)
    }

    /// Requested memory, e.g. `512M`
    pub fn memory(&self) -> Option<&str> {
        self.raw
            .spec
            .template
            .spec
            .domain
            .resources
            .requests
            .as_ref()
            .and_then(|requests| requests.get("memory"))
            .map(String::as_str)
    }

    pub fn disks(&self) -> &[Disk] {
        &self.raw.spec.template.spec.domain.devices.disks
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.raw.spec.template.spec.volumes
    }

    pub fn raw(&self) -> &VirtualMachine {
        &self.raw
    }

    pub fn into_inner(self) -> VirtualMachine {
        self.raw
    }
}

/// Result of a single list call, items keep the order of the API answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmList {
    /// Kind of the list envelope, empty when the collection was not found
    pub kind: String,
    /// Version of the collection at the time of the call, empty when the
    /// collection was not found
    pub resource_version: String,
    items: Vec<Vm>,
}

impl From<VirtualMachineList> for VmList {
    fn from(list: VirtualMachineList) -> Self {
        VmList {
            kind: list.kind,
            resource_version: list.metadata.resource_version.unwrap_or_default(),
            items: list.items.into_iter().map(Vm::from).collect(),
        }
    }
}

impl VmList {
    pub fn get(&self, name: &str) -> Option<&Vm> {
        self.items.iter().find(|vm| vm.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Vm::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vm> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for VmList {
    type Item = Vm;
    type IntoIter = std::vec::IntoIter<Vm>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a VmList {
    type Item = &'a Vm;
    type IntoIter = std::slice::Iter<'a, Vm>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Some backends answer 404 for a namespace without any virtual machine,
/// which can't be told apart from a missing collection: both mean no VMs.
/// This is the only place where a not found error is swallowed.
fn not_found_as_empty(
    result: Result<VirtualMachineList, ClientError>,
) -> Result<VirtualMachineList, ClientError> {
    match result {
        Err(ClientError::NotFound(what)) => {
            warn!("Collection not found ({}), assuming no virtual machine", what);
            Ok(VirtualMachineList::default())
        }
        other => other,
    }
}

/// Accessor to the virtual machines of the service namespace
#[derive(Debug)]
pub struct Vms<S> {
    service: S,
}

impl<S: VmService> Vms<S> {
    pub fn new(service: S) -> Vms<S> {
        Vms { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// List the virtual machines matching `filters`, a missing collection is
    /// an empty list
    #[instrument(skip(self), fields(namespace = %self.service.namespace()))]
    pub async fn list(&self, filters: &BTreeMap<String, String>) -> Result<VmList, ClientError> {
        let list = not_found_as_empty(self.service.list_vms(filters).await)?;
        debug!("Found {} virtual machines", list.items.len());
        Ok(VmList::from(list))
    }

    /// Fetch a virtual machine by name, a missing VM is an error
    #[instrument(skip(self), fields(namespace = %self.service.namespace()))]
    pub async fn get(&self, name: &str) -> Result<Vm, ClientError> {
        check_vm_name(name)?;
        let vm = self.service.get_vm(name).await?;
        Ok(Vm::from(vm))
    }

    /// Build the virtual machine described by `params` in the service
    /// namespace and submit it
    #[instrument(skip_all, fields(namespace = %self.service.namespace(), name = %params.name))]
    pub async fn create(&self, params: VmCreateParameters) -> Result<Vm, VmsError> {
        let vm = VmBuilder::from(params)
            .with_namespace(self.service.namespace().to_string())
            .try_build()?;
        trace!("VirtualMachine: {:#?}", vm);

        let created = self.service.create_vm(&vm).await?;
        info!("Virtual machine created");
        Ok(Vm::from(created))
    }
}
