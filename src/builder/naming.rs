//! Names of the disks and volumes generated for a virtual machine.
//!
//! Volume names are derived from the VM name, so they must stay stable: a VM
//! created by an earlier release must resolve to the same volume names.

/// Name of both the volume and the disk carrying the cloud-init payload.
pub const CLOUD_INIT_VOLUME: &str = "cloudinitvolume";

/// Replace every run of `.` or `_` with a single `-`.
///
/// ```rust
/// use kubepilot::builder::naming::normalize_vm_name;
///
/// assert_eq!(normalize_vm_name("my.vm_1"), "my-vm-1");
/// assert_eq!(normalize_vm_name("a._.b"), "a-b");
/// ```
pub fn normalize_vm_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c == '.' || c == '_' {
            if !in_run {
                normalized.push('-');
            }
            in_run = true;
        } else {
            normalized.push(c);
            in_run = false;
        }
    }
    normalized
}

/// Volume holding the container disk image.
pub fn image_volume_name(prefix: &str) -> String {
    format!("{}-disk-01", prefix)
}

/// Volume bound to the persistent volume claim at `index`.
///
/// The index is appended to a literal `0` and is not padded, index 10 gives
/// `-disk-010`, which sorts before `-disk-02`. Existing VMs rely on these
/// names, keep it that way.
pub fn pvc_volume_name(prefix: &str, index: usize) -> String {
    format!("{}-disk-0{}", prefix, index)
}
