//! # Cluster API boundary
//!
//! [VmService] is the contract the collection accessor relies on to talk to
//! the cluster. [crate::http::HttpVmService] is the implementation shipped
//! with this crate, tests and embedders may provide their own.
use std::collections::BTreeMap;

use async_trait::async_trait;
use kubepilot_models::models::{VirtualMachine, VirtualMachineList};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("API server answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Could not send request, reason: {0}")]
    Request(String),
    #[error("Could not serialize request, reason: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Could not deserialize response, reason: {0}")]
    Deserialize(String),
    #[error("Invalid virtual machine name: {0:?}")]
    InvalidName(String),
}

impl ClientError {
    /// Tells whether the API reported the resource or collection as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// A name must address a single VM: an empty name would address the whole
/// collection, a `/` another resource.
pub(crate) fn check_vm_name(name: &str) -> Result<(), ClientError> {
    if name.is_empty() || name.contains('/') {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Operations on `VirtualMachine` objects of a single namespace.
///
/// Implementations must not retry nor translate errors, the callers decide
/// what a missing resource means.
#[async_trait]
pub trait VmService: Send + Sync {
    /// Namespace every operation applies to
    fn namespace(&self) -> &str;

    /// List the virtual machines matching `filters` (`labelSelector`,
    /// `fieldSelector`, ...)
    async fn list_vms(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<VirtualMachineList, ClientError>;

    async fn get_vm(&self, name: &str) -> Result<VirtualMachine, ClientError>;

    /// Submit a new virtual machine, the returned object carries the fields
    /// assigned by the server (uid, resource version, ...)
    async fn create_vm(&self, vm: &VirtualMachine) -> Result<VirtualMachine, ClientError>;
}
