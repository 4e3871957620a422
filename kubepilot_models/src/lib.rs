//! Serde models of the KubeVirt `VirtualMachine` resource (`kubevirt.io/v1`).
//!
//! Only the subset of the API that is written by the builder or read back by
//! the collection accessor is modelled. Optional sections are skipped when
//! serializing so that an absent section never reaches the API server.

#[macro_use]
extern crate serde_derive;

extern crate serde;
extern crate serde_json;
extern crate uuid;

pub mod models;
